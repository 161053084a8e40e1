//! Owned raster buffer and the small value types the geometry code shares.
//!
//! - [`RasterImage`]: decoded RGB pixels. Each pipeline stage takes one by
//!   value and returns a fresh one; nothing aliases across stages.
//! - [`Color`]: 8-bit RGB. Alpha is dropped at decode time and never compared.
//! - [`Rect`]: pixel rectangle with exclusive `right`/`bottom` edges.
//! - [`GeometryError`]: why a trim or scale could not produce an image.

use image::{Rgb, RgbImage};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("Trim region is empty: {0:?}")]
    DegenerateTrimRegion(Rect),
}

/// An 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::new(255, 255, 255);
    pub const BLACK: Color = Color::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Per-channel absolute differences `(r, g, b)`.
    pub fn channel_diffs(self, other: Color) -> [u8; 3] {
        [
            self.r.abs_diff(other.r),
            self.g.abs_diff(other.g),
            self.b.abs_diff(other.b),
        ]
    }
}

impl From<Rgb<u8>> for Color {
    fn from(px: Rgb<u8>) -> Self {
        let [r, g, b] = px.0;
        Self { r, g, b }
    }
}

impl From<Color> for Rgb<u8> {
    fn from(c: Color) -> Self {
        Rgb([c.r, c.g, c.b])
    }
}

/// Pixel rectangle. `right` and `bottom` are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl Rect {
    /// The rectangle covering a whole `width × height` image.
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            left: 0,
            top: 0,
            right: width,
            bottom: height,
        }
    }

    /// Width, or 0 when the rectangle is collapsed or inverted.
    pub fn width(&self) -> u32 {
        self.right.saturating_sub(self.left)
    }

    /// Height, or 0 when the rectangle is collapsed or inverted.
    pub fn height(&self) -> u32 {
        self.bottom.saturating_sub(self.top)
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// True when the rectangle is non-empty and lies inside a `width × height` image.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        !self.is_empty() && self.right <= width && self.bottom <= height
    }
}

/// A decoded RGB image exclusively owned by whichever stage holds it.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    pixels: RgbImage,
}

impl RasterImage {
    pub fn from_rgb(pixels: RgbImage) -> Self {
        Self { pixels }
    }

    /// Build an image by evaluating `f` at every pixel.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> Color) -> Self {
        Self {
            pixels: RgbImage::from_fn(width, height, |x, y| f(x, y).into()),
        }
    }

    /// A `width × height` image filled with one color.
    pub fn filled(width: u32, height: u32, color: Color) -> Self {
        Self {
            pixels: RgbImage::from_pixel(width, height, color.into()),
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    /// Pixel at `(x, y)`. Panics when out of bounds, like `RgbImage::get_pixel`.
    pub fn get(&self, x: u32, y: u32) -> Color {
        (*self.pixels.get_pixel(x, y)).into()
    }

    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        self.pixels.put_pixel(x, y, color.into());
    }

    /// Top-left pixel, or `None` for an empty image.
    pub fn corner(&self) -> Option<Color> {
        (self.width() > 0 && self.height() > 0).then(|| self.get(0, 0))
    }

    pub fn as_rgb(&self) -> &RgbImage {
        &self.pixels
    }

    pub fn into_rgb(self) -> RgbImage {
        self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_diffs_are_absolute() {
        let a = Color::new(10, 200, 0);
        let b = Color::new(20, 190, 255);
        assert_eq!(a.channel_diffs(b), [10, 10, 255]);
        assert_eq!(b.channel_diffs(a), [10, 10, 255]);
    }

    #[test]
    fn rect_full_covers_image() {
        let r = Rect::full(30, 20);
        assert_eq!((r.width(), r.height()), (30, 20));
        assert!(r.fits_within(30, 20));
        assert!(!r.fits_within(29, 20));
    }

    #[test]
    fn inverted_rect_is_empty() {
        let r = Rect {
            left: 10,
            top: 0,
            right: 4,
            bottom: 8,
        };
        assert_eq!(r.width(), 0);
        assert!(r.is_empty());
        assert!(!r.fits_within(100, 100));
    }

    #[test]
    fn get_and_set_round_trip() {
        let mut img = RasterImage::filled(4, 3, Color::WHITE);
        img.set(2, 1, Color::new(1, 2, 3));
        assert_eq!(img.get(2, 1), Color::new(1, 2, 3));
        assert_eq!(img.get(0, 0), Color::WHITE);
        assert_eq!(img.dimensions(), (4, 3));
    }

    #[test]
    fn corner_of_empty_image_is_none() {
        let img = RasterImage::filled(0, 5, Color::WHITE);
        assert_eq!(img.corner(), None);
    }
}
