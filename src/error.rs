//! Error types for ember.
//!
//! Only construction and reconfiguration can fail. Once an [`Emitter`](crate::Emitter)
//! exists, `trigger` and `update` never return errors: a full particle store
//! simply releases fewer particles.

use thiserror::Error;

/// Errors raised while validating emitter configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// The particle store was asked for zero slots.
    #[error("Emitter capacity must be greater than zero")]
    ZeroCapacity,

    /// A release range is inverted or has non-finite bounds.
    #[error("Invalid range for `{parameter}`: min {min} must not exceed max {max}")]
    InvalidRange {
        /// Name of the release parameter.
        parameter: &'static str,
        /// Configured lower bound.
        min: f32,
        /// Configured upper bound.
        max: f32,
    },

    /// Profile geometry cannot be sampled.
    #[error("Invalid {profile} profile: {reason}")]
    InvalidProfile {
        /// Profile variant name.
        profile: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// A reclaim or modifier frequency is not strictly positive.
    #[error("Frequency for {target} must be positive and finite (got {value})")]
    InvalidFrequency {
        /// What the frequency drives.
        target: &'static str,
        /// Configured frequency in Hz.
        value: f32,
    },

    /// Modifier parameters are out of domain.
    #[error("Invalid {modifier} modifier: {reason}")]
    InvalidModifier {
        /// Modifier variant name.
        modifier: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

/// Convenience alias used throughout the crate.
pub type Result<T, E = ConfigError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_error_message() {
        let err = ConfigError::InvalidRange {
            parameter: "speed",
            min: 2.0,
            max: 1.0,
        };
        assert_eq!(
            err.to_string(),
            "Invalid range for `speed`: min 2 must not exceed max 1"
        );
    }

    #[test]
    fn test_frequency_error_message() {
        let err = ConfigError::InvalidFrequency {
            target: "reclaim",
            value: 0.0,
        };
        assert!(err.to_string().contains("reclaim"));
    }
}
