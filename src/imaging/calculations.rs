//! Pure calculation functions for trim bounds and fit dimensions.
//!
//! Nothing here allocates an output image; [`trim`](super::trim) and
//! [`scale`](super::scale) turn these results into pixels.

use super::raster::{Color, RasterImage, Rect};

/// Channel difference a pixel must exceed to count as content.
pub const TRIM_TOLERANCE: u8 = 5;

/// Every channel differs from `reference` by more than `tolerance`.
pub fn differs_on_every_channel(reference: Color, px: Color, tolerance: u8) -> bool {
    reference
        .channel_diffs(px)
        .iter()
        .all(|&d| d > tolerance)
}

/// At least one channel differs from `reference` by more than `tolerance`.
pub fn differs_on_any_channel(reference: Color, px: Color, tolerance: u8) -> bool {
    reference
        .channel_diffs(px)
        .iter()
        .any(|&d| d > tolerance)
}

/// Every channel is within `tolerance` of `reference`.
pub fn is_near(reference: Color, px: Color, tolerance: u8) -> bool {
    !differs_on_any_channel(reference, px, tolerance)
}

/// Compute the content rectangle of `image` relative to its top-left color.
///
/// Each edge is located independently:
///
/// | Edge | Scan | Pixel counts as content when |
/// |---|---|---|
/// | top | rows 0 → h-1 | **every** channel differs by > 5 |
/// | bottom | rows h-1 → 0 | **any** channel differs by > 5 |
/// | left | columns 0 → w-1 | any channel differs by > 5 |
/// | right | columns w-1 → 0 | any channel differs by > 5 |
///
/// The top edge is deliberately stricter than the other three. Bottom and
/// right are exclusive (`index + 1`). An edge that never finds content stays
/// at 0, so the result may be empty; callers decide what that means.
pub fn find_trim_bounds(image: &RasterImage) -> Rect {
    let Some(reference) = image.corner() else {
        return Rect::full(0, 0);
    };
    let (width, height) = image.dimensions();

    let row_has = |y: u32, strict: bool| {
        (0..width).any(|x| {
            let px = image.get(x, y);
            if strict {
                differs_on_every_channel(reference, px, TRIM_TOLERANCE)
            } else {
                differs_on_any_channel(reference, px, TRIM_TOLERANCE)
            }
        })
    };
    let column_has = |x: u32| {
        (0..height).any(|y| differs_on_any_channel(reference, image.get(x, y), TRIM_TOLERANCE))
    };

    let top = (0..height).find(|&y| row_has(y, true)).unwrap_or(0);
    let bottom = (0..height)
        .rev()
        .find(|&y| row_has(y, false))
        .map_or(0, |y| (y + 1).min(height));
    let left = (0..width).find(|&x| column_has(x)).unwrap_or(0);
    let right = (0..width)
        .rev()
        .find(|&x| column_has(x))
        .map_or(0, |x| (x + 1).min(width));

    Rect {
        left,
        top,
        right,
        bottom,
    }
}

/// Scale factor that fits `source` inside `bounds`: `min(bw / w, bh / h)`.
///
/// Both dimensions must be non-zero.
pub fn calculate_fit_ratio(source: (u32, u32), bounds: (u32, u32)) -> f64 {
    let (w, h) = source;
    let (bw, bh) = bounds;
    let ratio_x = bw as f64 / w as f64;
    let ratio_y = bh as f64 / h as f64;
    ratio_x.min(ratio_y)
}

/// Dimensions of `source` scaled by [`calculate_fit_ratio`], floored.
///
/// The constraining axis lands exactly on the bound; the other axis is
/// `floor(len * bound / constraining_len)` in integer arithmetic, so a ratio
/// like 735/900 never loses a pixel to rounding. Neither result is below 1.
/// Both dimensions of both arguments must be non-zero.
///
/// ```
/// # use image_resizer::imaging::calculate_fit_dimensions;
/// assert_eq!(calculate_fit_dimensions((900, 400), (735, 735)), (735, 326));
/// assert_eq!(calculate_fit_dimensions((100, 50), (735, 735)), (735, 367));
/// ```
pub fn calculate_fit_dimensions(source: (u32, u32), bounds: (u32, u32)) -> (u32, u32) {
    let (w, h) = (source.0 as u64, source.1 as u64);
    let (bw, bh) = (bounds.0 as u64, bounds.1 as u64);

    // bw / w <= bh / h  ⇔  bw * h <= bh * w
    let (new_w, new_h) = if bw * h <= bh * w {
        (bw, h * bw / w)
    } else {
        (w * bh / h, bh)
    };

    (clamp_dimension(new_w), clamp_dimension(new_h))
}

fn clamp_dimension(v: u64) -> u32 {
    u32::try_from(v).unwrap_or(u32::MAX).max(1)
}
