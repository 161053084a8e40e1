//! Per-image pipeline: decode → trim gate → scale gate → save.
//!
//! ## Gates
//!
//! | Gate | Runs when | Action |
//! |---|---|---|
//! | Trim | top-left pixel is within 5 of white on every channel | [`trim`](crate::imaging::trim) |
//! | Scale | `width > limit` or `height > limit` | [`scale`](crate::imaging::scale) into `limit × limit` |
//!
//! Trimming always precedes scaling. Both gates are exposed on their own
//! ([`needs_trim`], [`needs_scale`]) and composed by [`prepare`].
//!
//! ## Flows
//!
//! - [`resize_file`]: trim gate + scale gate, saved next to the source as
//!   `<stem>(1).jpg` so the original is never overwritten.
//! - [`export_file`]: scale gate only, saved into a destination directory
//!   as `<stem>.jpg`.
//! - [`trim_preview`]: unconditional trim, saved to a chosen path.
//!
//! [`resize_all`] and [`export_all`] run those flows over many inputs in
//! parallel with [rayon](https://docs.rs/rayon). One failure never stops the
//! others; every outcome is reported as a [`ProcessEvent`].
//!
//! ## Output names in a batch
//!
//! Different sources can map to the same output (`photo.jpg` and `photo.png`
//! both resize to `photo(1).jpg`). Before any work starts, outputs are
//! assigned in input order from one shared [`OutputClaims`]: the first
//! source gets the plain name and later ones the next free `(n)` suffix.
//! Batch sources are reserved up front, so no output lands on an input.

use crate::config::ResizerConfig;
use crate::imaging::{
    BackendError, Color, GeometryError, ImageBackend, ParamError, Quality, RasterImage,
    ResampleFilter, ScaleTarget, SizeLimit, TRIM_TOLERANCE, is_near, is_supported_input,
    plan_scale, scale, trim,
};
use crate::save::{
    OutputClaims, RetryPolicy, SaveError, SaveRequest, SavedImage, alternate_path, save_claimed,
};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Image codec failed: {0}")]
    Backend(#[from] BackendError),
    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),
    #[error(transparent)]
    Save(#[from] SaveError),
    #[error(transparent)]
    Param(#[from] ParamError),
    #[error("Source image not found: {0}")]
    SourceNotFound(PathBuf),
}

/// Settings shared by every image in a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeOptions {
    pub size_limit: SizeLimit,
    pub quality: Quality,
    pub filter: ResampleFilter,
    /// Apply the trim gate. Ignored by [`export_file`], which never trims.
    pub auto_trim: bool,
    pub retry: RetryPolicy,
}

impl ResizeOptions {
    pub fn from_config(config: &ResizerConfig) -> Self {
        Self {
            size_limit: config.size_limit(),
            quality: config.quality(),
            filter: config.resize.filter,
            auto_trim: config.trim.auto,
            retry: config.retry_policy(),
        }
    }
}

impl Default for ResizeOptions {
    fn default() -> Self {
        Self::from_config(&ResizerConfig::default())
    }
}

// =============================================================================
// Gates
// =============================================================================

/// Trim gate: the top-left pixel is white within the trim tolerance.
pub fn needs_trim(image: &RasterImage) -> bool {
    image
        .corner()
        .is_some_and(|c| is_near(Color::WHITE, c, TRIM_TOLERANCE))
}

/// Scale gate: either dimension exceeds `limit`.
pub fn needs_scale(image: &RasterImage, limit: SizeLimit) -> bool {
    image.width() > limit.value() || image.height() > limit.value()
}

/// An image after both gates, with the dimensions seen along the way.
#[derive(Debug, Clone, PartialEq)]
pub struct Prepared {
    pub image: RasterImage,
    pub original: (u32, u32),
    /// Dimensions after trimming, when the trim gate fired.
    pub trimmed: Option<(u32, u32)>,
    /// Dimensions after scaling, when the scale gate fired.
    pub scaled: Option<(u32, u32)>,
}

/// Run the trim gate (if `auto_trim`) and then the scale gate.
pub fn prepare(image: RasterImage, options: &ResizeOptions) -> Result<Prepared, GeometryError> {
    let original = image.dimensions();
    let mut trimmed = None;

    let image = if options.auto_trim && needs_trim(&image) {
        let out = trim(image)?;
        log::debug!(
            "trim gate: {}x{} → {}x{}",
            original.0,
            original.1,
            out.width(),
            out.height()
        );
        trimmed = Some(out.dimensions());
        out
    } else {
        log::debug!("trim gate: skipped");
        image
    };

    let (image, scaled) = apply_scale_gate(image, options.size_limit, options.filter)?;
    Ok(Prepared {
        image,
        original,
        trimmed,
        scaled,
    })
}

/// Scale `image` into a `limit × limit` box when the scale gate fires.
pub fn apply_scale_gate(
    image: RasterImage,
    limit: SizeLimit,
    filter: ResampleFilter,
) -> Result<(RasterImage, Option<(u32, u32)>), GeometryError> {
    if !needs_scale(&image, limit) {
        log::debug!(
            "scale gate: {}x{} fits {}",
            image.width(),
            image.height(),
            limit.value()
        );
        return Ok((image, None));
    }

    let target = ScaleTarget::square(limit.value());
    let plan = plan_scale(image.dimensions(), target)?;
    log::debug!(
        "scale gate: {}x{} × {:.4} → {}x{}",
        image.width(),
        image.height(),
        plan.ratio,
        plan.width,
        plan.height
    );
    let out = scale(image, target, filter)?;
    let dims = out.dimensions();
    Ok((out, Some(dims)))
}

// =============================================================================
// Flows
// =============================================================================

/// What happened to one source image.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageReport {
    pub source: PathBuf,
    pub output: PathBuf,
    pub original: (u32, u32),
    pub trimmed: Option<(u32, u32)>,
    pub scaled: Option<(u32, u32)>,
    /// Save attempts used; more than 1 means a fallback name was written.
    pub attempts: u32,
}

impl ImageReport {
    fn new(source: &Path, original: (u32, u32), saved: SavedImage) -> Self {
        Self {
            source: source.to_path_buf(),
            output: saved.path,
            original,
            trimmed: None,
            scaled: None,
            attempts: saved.attempts,
        }
    }

    pub fn final_dimensions(&self) -> (u32, u32) {
        self.scaled.or(self.trimmed).unwrap_or(self.original)
    }
}

/// Where [`resize_file`] writes: `<stem>(1).jpg` next to the source.
pub fn resized_output_path(source: &Path) -> PathBuf {
    alternate_path(source, 1)
}

/// Where [`export_file`] writes: `<dest_dir>/<stem>.jpg`.
pub fn export_output_path(source: &Path, dest_dir: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    dest_dir.join(format!("{stem}.jpg"))
}

/// Default output of [`trim_preview`]: `<stem>(trimmed).jpg` next to the source.
pub fn trim_preview_path(source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    source.with_file_name(format!("{stem}(trimmed).jpg"))
}

/// Distinct resize outputs for `sources`, in order: `<stem>(1).jpg`, or the
/// next free `<stem>(n).jpg` when an earlier source already took it.
pub fn plan_resize_outputs(sources: &[PathBuf], claims: &OutputClaims) -> Vec<PathBuf> {
    sources
        .iter()
        .map(|source| claims.claim_first(|n| alternate_path(source, n + 1)))
        .collect()
}

/// Distinct export outputs for `sources`, in order: `<dest_dir>/<stem>.jpg`,
/// then `<stem>(1).jpg`, `<stem>(2).jpg`, ... on a clash.
pub fn plan_export_outputs(
    sources: &[PathBuf],
    dest_dir: &Path,
    claims: &OutputClaims,
) -> Vec<PathBuf> {
    sources
        .iter()
        .map(|source| {
            let plain = export_output_path(source, dest_dir);
            claims.claim_first(|n| {
                if n == 0 {
                    plain.clone()
                } else {
                    alternate_path(&plain, n)
                }
            })
        })
        .collect()
}

fn decode_source(backend: &impl ImageBackend, source: &Path) -> Result<RasterImage, ProcessError> {
    if !source.exists() {
        return Err(ProcessError::SourceNotFound(source.to_path_buf()));
    }
    Ok(backend.decode(source)?)
}

/// Trim (gated), scale (gated) and save one image next to its source.
pub fn resize_file(
    backend: &impl ImageBackend,
    source: &Path,
    options: &ResizeOptions,
) -> Result<ImageReport, ProcessError> {
    let claims = OutputClaims::with_reserved([source]);
    let output = resized_output_path(source);
    claims.claim(&output);
    resize_to(backend, source, output, options, &claims)
}

fn resize_to(
    backend: &impl ImageBackend,
    source: &Path,
    output: PathBuf,
    options: &ResizeOptions,
    claims: &OutputClaims,
) -> Result<ImageReport, ProcessError> {
    let image = decode_source(backend, source)?;
    let prepared = prepare(image, options)?;

    let saved = save_claimed(
        backend,
        SaveRequest::new(output, prepared.image, options.quality),
        options.retry,
        claims,
    )?;

    Ok(ImageReport {
        trimmed: prepared.trimmed,
        scaled: prepared.scaled,
        ..ImageReport::new(source, prepared.original, saved)
    })
}

/// Scale (gated) and save one image into `dest_dir`. Never trims.
///
/// `dest_dir` is created if missing. If the computed output would be the
/// source file itself, the first alternate name is used instead.
pub fn export_file(
    backend: &impl ImageBackend,
    source: &Path,
    dest_dir: &Path,
    options: &ResizeOptions,
) -> Result<ImageReport, ProcessError> {
    let sources = [source.to_path_buf()];
    let claims = OutputClaims::with_reserved(&sources);
    let output = plan_export_outputs(&sources, dest_dir, &claims)
        .pop()
        .unwrap_or_else(|| export_output_path(source, dest_dir));
    export_to(backend, source, output, options, &claims)
}

fn export_to(
    backend: &impl ImageBackend,
    source: &Path,
    output: PathBuf,
    options: &ResizeOptions,
    claims: &OutputClaims,
) -> Result<ImageReport, ProcessError> {
    let image = decode_source(backend, source)?;
    let original = image.dimensions();
    let (image, scaled) = apply_scale_gate(image, options.size_limit, options.filter)?;

    if let Some(dir) = output.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let saved = save_claimed(
        backend,
        SaveRequest::new(output, image, options.quality),
        options.retry,
        claims,
    )?;
    Ok(ImageReport {
        scaled,
        ..ImageReport::new(source, original, saved)
    })
}

/// Trim one image unconditionally and save it to `output`.
pub fn trim_preview(
    backend: &impl ImageBackend,
    source: &Path,
    output: &Path,
    quality: Quality,
    retry: RetryPolicy,
) -> Result<ImageReport, ProcessError> {
    let image = decode_source(backend, source)?;
    let original = image.dimensions();
    let trimmed = trim(image)?;
    let dims = trimmed.dimensions();

    let claims = OutputClaims::with_reserved([source, output]);
    let saved = save_claimed(
        backend,
        SaveRequest::new(output, trimmed, quality),
        retry,
        &claims,
    )?;
    Ok(ImageReport {
        trimmed: Some(dims),
        ..ImageReport::new(source, original, saved)
    })
}

// =============================================================================
// Batches
// =============================================================================

/// Progress events emitted by [`resize_all`].
#[derive(Debug, Clone)]
pub enum ProcessEvent {
    Started { image_count: usize },
    ImageProcessed(ImageReport),
    ImageFailed { source: PathBuf, error: String },
}

/// Outcome counts of a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub processed: usize,
    pub failed: usize,
}

impl std::fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} processed, {} failed", self.processed, self.failed)
    }
}

/// Expand inputs: files are kept as given, directories are walked for
/// supported images. Output is sorted and deduplicated.
pub fn collect_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, ProcessError> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            for entry in walkdir::WalkDir::new(input).follow_links(true) {
                let entry = entry?;
                if entry.file_type().is_file() && is_supported_input(entry.path()) {
                    files.push(entry.into_path());
                }
            }
        } else {
            files.push(input.clone());
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

/// Resize every source in parallel, each to its own planned output.
///
/// When `events` is given, one event is sent per image (completion order).
pub fn resize_all(
    backend: &impl ImageBackend,
    sources: &[PathBuf],
    options: &ResizeOptions,
    events: Option<Sender<ProcessEvent>>,
) -> BatchSummary {
    let claims = OutputClaims::with_reserved(sources);
    let outputs = plan_resize_outputs(sources, &claims);
    run_batch(sources, outputs, events, |source, output| {
        resize_to(backend, source, output, options, &claims)
    })
}

/// Export every source into `dest_dir` in parallel, each to its own
/// planned output.
pub fn export_all(
    backend: &impl ImageBackend,
    sources: &[PathBuf],
    dest_dir: &Path,
    options: &ResizeOptions,
    events: Option<Sender<ProcessEvent>>,
) -> BatchSummary {
    let claims = OutputClaims::with_reserved(sources);
    let outputs = plan_export_outputs(sources, dest_dir, &claims);
    run_batch(sources, outputs, events, |source, output| {
        export_to(backend, source, output, options, &claims)
    })
}

fn run_batch<F>(
    sources: &[PathBuf],
    outputs: Vec<PathBuf>,
    events: Option<Sender<ProcessEvent>>,
    process: F,
) -> BatchSummary
where
    F: Fn(&Path, PathBuf) -> Result<ImageReport, ProcessError> + Sync,
{
    if let Some(tx) = &events {
        tx.send(ProcessEvent::Started {
            image_count: sources.len(),
        })
        .ok();
    }

    let outcomes: Vec<bool> = sources
        .par_iter()
        .zip(outputs)
        .map(|(source, output)| {
            let event = match process(source.as_path(), output) {
                Ok(report) => ProcessEvent::ImageProcessed(report),
                Err(err) => {
                    log::error!("{}: {err}", source.display());
                    ProcessEvent::ImageFailed {
                        source: source.clone(),
                        error: err.to_string(),
                    }
                }
            };
            let ok = matches!(event, ProcessEvent::ImageProcessed(_));
            if let Some(tx) = &events {
                tx.send(event).ok();
            }
            ok
        })
        .collect();

    let processed = outcomes.iter().filter(|&&ok| ok).count();
    BatchSummary {
        processed,
        failed: outcomes.len() - processed,
    }
}
