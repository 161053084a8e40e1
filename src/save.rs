//! JPEG save with bounded filename fallback.
//!
//! A save first tries the requested path. When encoding or writing fails it
//! derives an alternate name in the same directory and tries again, up to
//! [`RetryPolicy::max_attempts`] distinct paths in total:
//!
//! ```text
//! attempt 1   out/photo.final.jpg
//! attempt 2   out/photo(1).jpg
//! attempt 3   out/photo(2).jpg
//! ```
//!
//! After the last attempt the caller gets [`SaveError::RetryExhausted`]
//! carrying every path tried and the final underlying error.
//!
//! Batches share one [`OutputClaims`] so that no two images in a run write
//! the same file: fallback names already claimed by another image are
//! skipped.

use crate::imaging::{BackendError, ImageBackend, Quality, RasterImage};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SaveError {
    #[error("Save failed after {attempts} attempt(s): {source}")]
    RetryExhausted {
        attempts: u32,
        tried: Vec<PathBuf>,
        source: BackendError,
    },
}

/// How many distinct paths a save may try.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 3 }
    }
}

/// One image to be written. Consumed by [`save`].
#[derive(Debug)]
pub struct SaveRequest {
    pub path: PathBuf,
    pub image: RasterImage,
    pub quality: Quality,
}

impl SaveRequest {
    pub fn new(path: impl Into<PathBuf>, image: RasterImage, quality: Quality) -> Self {
        Self {
            path: path.into(),
            image,
            quality,
        }
    }
}

/// A successfully written file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedImage {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    /// 1 when the requested path worked first time.
    pub attempts: u32,
}

/// The `n`th fallback name for `path`: the file name up to its first `.`,
/// followed by `(n).jpg`, in the same directory.
///
/// ```
/// # use image_resizer::save::alternate_path;
/// # use std::path::Path;
/// assert_eq!(alternate_path(Path::new("out/photo.final.png"), 1), Path::new("out/photo(1).jpg"));
/// ```
pub fn alternate_path(path: &Path, n: u32) -> PathBuf {
    let name = path
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = name.split('.').next().unwrap_or_default();
    let stem = if stem.is_empty() { "image" } else { stem };
    path.with_file_name(format!("{stem}({n}).jpg"))
}

/// Output paths spoken for during one run.
///
/// Paths are compared after `canonicalize` when the file exists, so a
/// relative and an absolute spelling of the same source collide.
#[derive(Debug, Default)]
pub struct OutputClaims {
    taken: Mutex<HashSet<PathBuf>>,
}

impl OutputClaims {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims with `paths` already taken, e.g. the sources of a batch.
    pub fn with_reserved<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let taken = paths.into_iter().map(|p| claim_key(p.as_ref())).collect();
        Self {
            taken: Mutex::new(taken),
        }
    }

    /// Take `path`. Returns `false` if it was already taken.
    pub fn claim(&self, path: &Path) -> bool {
        self.taken
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(claim_key(path))
    }

    pub fn is_claimed(&self, path: &Path) -> bool {
        self.taken
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&claim_key(path))
    }

    /// First of `candidate(0)`, `candidate(1)`, ... not yet taken, claimed.
    ///
    /// `candidate` must yield distinct paths for distinct `n`.
    pub fn claim_first(&self, mut candidate: impl FnMut(u32) -> PathBuf) -> PathBuf {
        let mut n = 0;
        loop {
            let path = candidate(n);
            if self.claim(&path) {
                return path;
            }
            n += 1;
        }
    }
}

fn claim_key(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

/// Encode `request.image` as JPEG, falling back to alternate names on failure.
pub fn save(
    backend: &impl ImageBackend,
    request: SaveRequest,
    policy: RetryPolicy,
) -> Result<SavedImage, SaveError> {
    save_claimed(backend, request, policy, &OutputClaims::new())
}

/// Like [`save`], but fallback names are taken from `claims` so they never
/// land on a path another image in the run holds. The requested path is
/// assumed to be claimed by the caller already.
pub fn save_claimed(
    backend: &impl ImageBackend,
    request: SaveRequest,
    policy: RetryPolicy,
    claims: &OutputClaims,
) -> Result<SavedImage, SaveError> {
    let SaveRequest {
        path,
        image,
        quality,
    } = request;
    let max_attempts = policy.max_attempts.max(1);
    let mut tried = Vec::new();
    let mut candidate = path.clone();
    let mut attempt = 1;

    loop {
        match backend.encode_jpeg(&image, &candidate, quality) {
            Ok(()) => {
                log::info!(
                    "saved {} ({}x{}, q{})",
                    candidate.display(),
                    image.width(),
                    image.height(),
                    quality.value()
                );
                return Ok(SavedImage {
                    path: candidate,
                    width: image.width(),
                    height: image.height(),
                    attempts: attempt,
                });
            }
            Err(err) => {
                tried.push(candidate);
                if attempt >= max_attempts {
                    return Err(SaveError::RetryExhausted {
                        attempts: attempt,
                        tried,
                        source: err,
                    });
                }
                candidate = claims.claim_first(|n| alternate_path(&path, n + 1));
                log::warn!(
                    "save attempt {attempt}/{max_attempts} failed: {err}; retrying as {}",
                    candidate.display()
                );
                attempt += 1;
            }
        }
    }
}
