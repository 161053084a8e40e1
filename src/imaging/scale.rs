//! Proportional scale-to-fit.
//!
//! The scaler always applies the fit ratio, upscaling included. Whether an
//! image needs scaling at all is decided by the pipeline's size gate.

use super::calculations::{calculate_fit_dimensions, calculate_fit_ratio};
use super::raster::{GeometryError, RasterImage};
use image::imageops::FilterType;
use serde::{Deserialize, Serialize};

/// Bounding box a scaled image must fit inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaleTarget {
    pub max_width: u32,
    pub max_height: u32,
}

impl ScaleTarget {
    pub fn new(max_width: u32, max_height: u32) -> Self {
        Self {
            max_width,
            max_height,
        }
    }

    /// A square `limit × limit` box.
    pub fn square(limit: u32) -> Self {
        Self::new(limit, limit)
    }
}

/// Resampling filter. Nearest-neighbour is intentionally not offered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResampleFilter {
    /// Bilinear.
    Triangle,
    CatmullRom,
    Gaussian,
    #[default]
    Lanczos3,
}

impl From<ResampleFilter> for FilterType {
    fn from(f: ResampleFilter) -> Self {
        match f {
            ResampleFilter::Triangle => FilterType::Triangle,
            ResampleFilter::CatmullRom => FilterType::CatmullRom,
            ResampleFilter::Gaussian => FilterType::Gaussian,
            ResampleFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// The computed outcome of fitting one image into a [`ScaleTarget`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalePlan {
    pub ratio: f64,
    pub width: u32,
    pub height: u32,
}

/// Compute the scale ratio and output dimensions without touching pixels.
pub fn plan_scale(source: (u32, u32), target: ScaleTarget) -> Result<ScalePlan, GeometryError> {
    let (width, height) = source;
    if width == 0 || height == 0 {
        return Err(GeometryError::InvalidDimensions { width, height });
    }
    if target.max_width == 0 || target.max_height == 0 {
        return Err(GeometryError::InvalidDimensions {
            width: target.max_width,
            height: target.max_height,
        });
    }

    let bounds = (target.max_width, target.max_height);
    let (new_width, new_height) = calculate_fit_dimensions(source, bounds);
    Ok(ScalePlan {
        ratio: calculate_fit_ratio(source, bounds),
        width: new_width,
        height: new_height,
    })
}

/// Resample `image` so it fits inside `target`, preserving aspect ratio.
pub fn scale(
    image: RasterImage,
    target: ScaleTarget,
    filter: ResampleFilter,
) -> Result<RasterImage, GeometryError> {
    let plan = plan_scale(image.dimensions(), target)?;
    if (plan.width, plan.height) == image.dimensions() {
        return Ok(image);
    }

    let resized =
        image::imageops::resize(image.as_rgb(), plan.width, plan.height, filter.into());
    Ok(RasterImage::from_rgb(resized))
}
