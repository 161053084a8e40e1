//! # Image Resizer
//!
//! Trims uniform white margins off photos and scales them to fit a square
//! bounding box, then writes the result as JPEG.
//!
//! # Architecture: Gated Pipeline
//!
//! Every image goes through the same four steps, each taking ownership of
//! the buffer from the previous one:
//!
//! ```text
//! decode  →  trim gate  →  scale gate  →  save
//!            (white corner?) (larger than limit?) (bounded filename fallback)
//! ```
//!
//! - **Trim** scans inward from each edge for pixels that differ from the
//!   top-left color and crops to the rectangle found.
//! - **Scale** fits the image inside `limit × limit` keeping aspect ratio.
//! - **Save** encodes JPEG and, when writing fails, retries under derived
//!   names a fixed number of times before giving up.
//!
//! Images share no state, so batches run in parallel across images.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Pixel buffer, trim/scale geometry, codec backend |
//! | [`save`] | JPEG save with bounded retry under alternate names |
//! | [`pipeline`] | Trim and scale gates, resize/export/trim flows, parallel batches |
//! | [`config`] | `resizer.toml` loading and validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Asymmetric Edge Test
//!
//! The top edge only stops on a pixel that differs on **every** channel;
//! the other three stop on **any** channel. Saturated content (pure red on
//! white) therefore keeps its top margin.
//!
//! ## Empty Trims Are Errors
//!
//! A single-color image has no content rectangle. Trimming it fails with
//! [`imaging::GeometryError::DegenerateTrimRegion`] rather than producing a
//! zero-sized buffer; in a batch that image is reported and skipped.
//!
//! ## Never Overwrite the Source
//!
//! The resize flow writes `<stem>(1).jpg` beside the original. Export writes
//! `<stem>.jpg` into a chosen directory and falls back to `<stem>(1).jpg`
//! if that would land on the source itself.
//!
//! ## One File per Image
//!
//! Outputs of a batch are planned up front from a shared set of claimed
//! paths. Sources sharing a stem (`photo.jpg`, `photo.png`) get `(1)`,
//! `(2)`, ... in input order, and save retries skip every claimed name.

pub mod config;
pub mod imaging;
pub mod output;
pub mod pipeline;
pub mod save;
