//! Error types for calibration validation and configuration
//!
//! The resolver, freshness gate and detector never fail: malformed correction
//! data is accepted as given and simply never matches. The only hard gate is
//! the check performed before an offset is stored, and its failures live here
//! so every store implementation reports them the same way.
//!
//! Errors stay small and `Copy` where possible. The channel of a conflicting
//! offset is not repeated in [`CalibrationError::Overlap`]; the caller already
//! knows which channel it asked about.
//!
//! ```
//! use riverwatch_core::CalibrationError;
//!
//! let err = CalibrationError::Overlap { existing_id: 7 };
//! assert!(err.is_conflict());
//! assert_eq!(err.to_string(), "validity window overlaps existing offset 7");
//! ```

use thiserror_no_std::Error;

use crate::calibration::OffsetId;

/// Result type for calibration validation
pub type CalibrationResult<T> = Result<T, CalibrationError>;

/// Rejections raised by the pre-insert validation gate
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationError {
    /// The candidate window intersects an existing offset of the same channel
    #[error("validity window overlaps existing offset {existing_id}")]
    Overlap {
        /// Offset that already claims part of the window
        existing_id: OffsetId,
    },

    /// `valid_until` lies before `valid_from`
    #[error("valid_until precedes valid_from")]
    InvertedWindow,

    /// A required field was blank
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// Offset value is NaN or infinite
    #[error("offset value must be a finite number")]
    NonFiniteOffset,
}

impl CalibrationError {
    /// True for the conflict case, which callers usually surface differently
    /// from plain input mistakes
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Overlap { .. })
    }
}

/// Invalid component configuration
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A setting that must be strictly positive was zero or negative
    #[error("{0} must be greater than zero")]
    NotPositive(&'static str),

    /// Two settings contradict each other
    #[error("inconsistent settings: {0}")]
    Inconsistent(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn messages_are_readable() {
        assert_eq!(
            CalibrationError::MissingField("reason").to_string(),
            "missing required field: reason"
        );
        assert_eq!(
            ConfigError::NotPositive("window").to_string(),
            "window must be greater than zero"
        );
    }

    #[test]
    fn only_overlap_is_a_conflict() {
        assert!(CalibrationError::Overlap { existing_id: 1 }.is_conflict());
        assert!(!CalibrationError::InvertedWindow.is_conflict());
        assert!(!CalibrationError::NonFiniteOffset.is_conflict());
    }
}
