//! Image geometry and codecs in pure Rust.
//!
//! | Operation | Implementation |
//! |---|---|
//! | **Trim** | corner-reference edge scans ([`find_trim_bounds`]) + `imageops::crop_imm` |
//! | **Scale to fit** | exact fit dimensions + `imageops::resize` (Lanczos3 by default) |
//! | **Decode** | `image` crate (JPEG, PNG) |
//! | **Encode** | `image::codecs::jpeg::JpegEncoder` |
//!
//! The module is split into:
//! - **Raster**: owned pixel buffer and value types
//! - **Calculations**: pure functions for bounds and dimension math (unit testable)
//! - **Trim / Scale**: buffer-in, buffer-out transforms
//! - **Parameters**: user-facing quality and size parsing
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]

pub mod backend;
mod calculations;
mod params;
mod raster;
pub mod rust_backend;
mod scale;
mod trim;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{
    TRIM_TOLERANCE, calculate_fit_dimensions, calculate_fit_ratio, differs_on_any_channel,
    differs_on_every_channel, find_trim_bounds, is_near,
};
pub use params::{ParamError, Quality, SizeLimit};
pub use raster::{Color, GeometryError, RasterImage, Rect};
pub use rust_backend::{RustBackend, is_supported_input, supported_input_extensions};
pub use scale::{ResampleFilter, ScalePlan, ScaleTarget, plan_scale, scale};
pub use trim::{crop, trim};
