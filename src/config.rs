//! Resizer configuration.
//!
//! Defaults for the shell-facing parameters live in an optional
//! `resizer.toml`. The file is only ever read; command-line flags override
//! whatever it says.
//!
//! ## Config File Location
//!
//! `--config <path>` if given, otherwise `resizer.toml` in the working
//! directory. A missing file means stock defaults.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [resize]
//! size = 735                # Longest edge before an image is scaled down
//! quality = 90              # JPEG quality (0-100)
//! filter = "lanczos3"       # triangle | catmull-rom | gaussian | lanczos3
//!
//! [trim]
//! auto = true               # Trim white borders when resizing
//!
//! [save]
//! max_attempts = 3          # Distinct filenames tried before giving up
//! # output_dir = "exports"  # Default directory for `export`
//!
//! [processing]
//! max_processes = 4         # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{Quality, ResampleFilter, SizeLimit};
use crate::save::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "resizer.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Top-level configuration loaded from `resizer.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResizerConfig {
    /// Scale bound, JPEG quality and resampling filter.
    pub resize: ResizeConfig,
    /// Automatic border trimming.
    pub trim: TrimConfig,
    /// Save retry behaviour and default export directory.
    pub save: SaveConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl ResizerConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.resize.quality > 100 {
            return Err(ConfigError::Validation(
                "resize.quality must be 0-100".into(),
            ));
        }
        if self.resize.size == 0 {
            return Err(ConfigError::Validation(
                "resize.size must be greater than 0".into(),
            ));
        }
        if self.save.max_attempts == 0 {
            return Err(ConfigError::Validation(
                "save.max_attempts must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn size_limit(&self) -> SizeLimit {
        SizeLimit::new(self.resize.size).unwrap_or_default()
    }

    pub fn quality(&self) -> Quality {
        Quality::new(self.resize.quality)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.save.max_attempts)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResizeConfig {
    /// Longest allowed edge in pixels. Also the fallback when size text is invalid.
    pub size: u32,
    /// JPEG encoding quality (0 = worst, 100 = best).
    pub quality: u32,
    pub filter: ResampleFilter,
}

impl Default for ResizeConfig {
    fn default() -> Self {
        Self {
            size: SizeLimit::DEFAULT.value(),
            quality: 90,
            filter: ResampleFilter::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrimConfig {
    /// Apply the white-corner trim gate in the resize flow.
    pub auto: bool,
}

impl Default for TrimConfig {
    fn default() -> Self {
        Self { auto: true }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SaveConfig {
    pub max_attempts: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
}

impl Default for SaveConfig {
    fn default() -> Self {
        Self {
            max_attempts: RetryPolicy::default().max_attempts,
            output_dir: None,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel image processing workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)`, never less than 1
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading and validation
// =============================================================================

/// Parse and validate config text.
pub fn parse_config(content: &str) -> Result<ResizerConfig, ConfigError> {
    let config: ResizerConfig = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

/// Load config from `path`.
///
/// Returns stock defaults when the file does not exist.
pub fn load_config(path: &Path) -> Result<ResizerConfig, ConfigError> {
    if !path.exists() {
        return Ok(ResizerConfig::default());
    }
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Returns a fully-commented stock `resizer.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Image Resizer Configuration
# ===========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Command-line flags win over this file.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Resizing
# ---------------------------------------------------------------------------
[resize]
# Longest edge in pixels. Images wider or taller than this are scaled down
# to fit a size x size box. Also used when --size text is not a number.
size = 735

# JPEG encoding quality (0 = worst, 100 = best).
quality = 90

# Resampling filter: "triangle" (bilinear), "catmull-rom", "gaussian", "lanczos3".
filter = "lanczos3"

# ---------------------------------------------------------------------------
# Trimming
# ---------------------------------------------------------------------------
[trim]
# Crop uniform margins before resizing when the top-left pixel is white.
auto = true

# ---------------------------------------------------------------------------
# Saving
# ---------------------------------------------------------------------------
[save]
# How many distinct filenames to try before reporting a failed save.
# Retries use the name up to its first dot plus "(1).jpg", "(2).jpg", ...
max_attempts = 3

# Default destination for `export` when --to is not given.
# output_dir = "exports"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel image-processing workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
