//! Border trimming: crop away margins that match the top-left color.
//!
//! Bounds come from [`find_trim_bounds`]; this module validates them and
//! copies the region into a new buffer.

use super::calculations::find_trim_bounds;
use super::raster::{GeometryError, RasterImage, Rect};

/// Crop `image` to its content rectangle.
///
/// The input is consumed and a new, independently owned image is returned.
/// Fails with [`GeometryError::DegenerateTrimRegion`] when an edge scan finds
/// no content (for example a single-color image), and with
/// [`GeometryError::InvalidDimensions`] for an empty input.
pub fn trim(image: RasterImage) -> Result<RasterImage, GeometryError> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(GeometryError::InvalidDimensions { width, height });
    }

    let rect = find_trim_bounds(&image);
    crop(&image, rect)
}

/// Copy `rect` out of `image` into a new buffer anchored at (0, 0).
pub fn crop(image: &RasterImage, rect: Rect) -> Result<RasterImage, GeometryError> {
    let (width, height) = image.dimensions();
    if !rect.fits_within(width, height) {
        return Err(GeometryError::DegenerateTrimRegion(rect));
    }

    let region = image::imageops::crop_imm(
        image.as_rgb(),
        rect.left,
        rect.top,
        rect.width(),
        rect.height(),
    )
    .to_image();
    Ok(RasterImage::from_rgb(region))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::Color;

    fn framed(width: u32, height: u32, border: u32, content: impl Fn(u32, u32) -> Color) -> RasterImage {
        RasterImage::from_fn(width, height, |x, y| {
            if x >= border && x < width - border && y >= border && y < height - border {
                content(x, y)
            } else {
                Color::WHITE
            }
        })
    }

    #[test]
    fn removes_equal_border_on_every_side() {
        for border in [1, 5, 12] {
            let img = framed(60, 40, border, |_, _| Color::new(30, 60, 90));
            let trimmed = trim(img).unwrap();
            assert_eq!(
                trimmed.dimensions(),
                (60 - 2 * border, 40 - 2 * border),
                "border {border}"
            );
        }
    }

    #[test]
    fn trimmed_pixels_come_from_the_content_region() {
        let img = framed(20, 20, 5, |x, y| Color::new(x as u8, y as u8, 0));
        let trimmed = trim(img).unwrap();
        assert_eq!(trimmed.dimensions(), (10, 10));
        assert_eq!(trimmed.get(0, 0), Color::new(5, 5, 0));
        assert_eq!(trimmed.get(9, 9), Color::new(14, 14, 0));
    }

    #[test]
    fn content_at_every_edge_is_a_no_op() {
        let img = RasterImage::from_fn(16, 9, |x, y| {
            if x == 0 || y == 0 || x == 15 || y == 8 {
                if (x + y) % 2 == 0 { Color::WHITE } else { Color::BLACK }
            } else {
                Color::new(100, 100, 100)
            }
        });
        let original = img.clone();
        let trimmed = trim(img).unwrap();
        assert_eq!(trimmed, original);
    }

    #[test]
    fn top_border_survives_when_content_differs_on_one_channel() {
        // Yellow (255, 255, 0) differs from white only on blue, so the strict
        // top scan finds nothing and the top boundary stays at 0.
        let img = framed(30, 30, 4, |_, _| Color::new(255, 255, 0));
        let trimmed = trim(img).unwrap();
        assert_eq!(trimmed.dimensions(), (22, 26));
    }

    #[test]
    fn uniform_image_is_degenerate() {
        let img = RasterImage::filled(10, 10, Color::WHITE);
        assert!(matches!(
            trim(img),
            Err(GeometryError::DegenerateTrimRegion(_))
        ));
    }

    #[test]
    fn empty_image_is_invalid() {
        let img = RasterImage::filled(0, 0, Color::WHITE);
        assert_eq!(
            trim(img),
            Err(GeometryError::InvalidDimensions {
                width: 0,
                height: 0
            })
        );
    }

    #[test]
    fn crop_rejects_out_of_bounds_rect() {
        let img = RasterImage::filled(10, 10, Color::BLACK);
        let rect = Rect {
            left: 2,
            top: 2,
            right: 11,
            bottom: 5,
        };
        assert_eq!(
            crop(&img, rect),
            Err(GeometryError::DegenerateTrimRegion(rect))
        );
    }
}
