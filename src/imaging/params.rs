//! Parameter types for the resize pipeline and the text parsing that feeds them.
//!
//! Size and quality reach the core as free text typed by a user. They are
//! validated here, before any image is decoded.
//!
//! ## Types
//!
//! - [`Quality`]: JPEG encoding quality (1–100, default 90). Clamped on construction.
//! - [`SizeLimit`]: square bound for the scale gate (default 735).
//! - [`ParamError`]: rejected user input.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParamError {
    #[error("Invalid {name} '{value}': {reason}")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: &'static str,
    },
}

impl ParamError {
    fn invalid(name: &'static str, value: &str, reason: &'static str) -> Self {
        ParamError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }
}

/// Quality setting for JPEG encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u8);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100) as u8)
    }

    /// Parse quality text. Accepts integers 0–100; 0 is encoded as 1.
    pub fn parse(text: &str) -> Result<Self, ParamError> {
        let value: i64 = text
            .trim()
            .parse()
            .map_err(|_| ParamError::invalid("quality", text, "not an integer"))?;
        if !(0..=100).contains(&value) {
            return Err(ParamError::invalid("quality", text, "must be 0-100"));
        }
        Ok(Self::new(value as u32))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// Longest allowed edge, in pixels, before an image is scaled down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeLimit(u32);

impl SizeLimit {
    pub const DEFAULT: SizeLimit = SizeLimit(735);

    /// Returns `None` for 0.
    pub fn new(value: u32) -> Option<Self> {
        (value > 0).then_some(Self(value))
    }

    /// Parse size text, rejecting anything that is not a positive integer.
    pub fn parse(text: &str) -> Result<Self, ParamError> {
        let value: u32 = text
            .trim()
            .parse()
            .map_err(|_| ParamError::invalid("size", text, "not a positive integer"))?;
        Self::new(value).ok_or_else(|| ParamError::invalid("size", text, "must be greater than 0"))
    }

    /// Parse size text, falling back to `fallback` when it is not usable.
    pub fn parse_or(text: &str, fallback: SizeLimit) -> Self {
        Self::parse(text).unwrap_or_else(|e| {
            log::debug!("{e}; using size {}", fallback.value());
            fallback
        })
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for SizeLimit {
    fn default() -> Self {
        Self::DEFAULT
    }
}
