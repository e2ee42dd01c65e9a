//! Error types for HVSR analysis.
//!
//! Only configuration problems surface as errors. Data-shape mismatches and
//! numeric degeneracies (zero vertical power, NaN curves) are absorbed by the
//! pipeline and show up as empty peak sets or an absent best peak.

use thiserror::Error;

use crate::settings::CombinationMethod;

/// Errors that can occur while configuring an HVSR analysis.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum HvsrError {
    /// Combination method name or code that does not map to any method.
    #[error("unknown combination method: {0}")]
    UnknownMethod(String),

    /// Combination method that exists but cannot be computed.
    #[error("combination method not supported: {0}")]
    UnsupportedMethod(CombinationMethod),

    /// Peak search band with inverted, negative, or non-finite limits.
    #[error("invalid frequency band [{low}, {high}]")]
    InvalidBand {
        /// Lower band limit in Hz.
        low: f64,
        /// Upper band limit in Hz.
        high: f64,
    },

    /// Any other out-of-range setting.
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter {
        /// Name of the offending setting.
        name: &'static str,
        /// Description of why the value is rejected.
        reason: String,
    },
}

impl HvsrError {
    /// Create an invalid parameter error.
    pub fn invalid_parameter(name: &'static str, reason: impl Into<String>) -> Self {
        HvsrError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}
