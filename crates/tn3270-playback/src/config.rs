//! Pacing configuration and validation.

use std::error::Error;
use std::fmt;

use tn3270_recording::DelayRange;

/// Per-step pacing, validated eagerly at construction.
///
/// Mirrors the inherited engine's `WorldConfig::validate` pattern: reject
/// non-finite or non-positive durations rather than letting a bad value
/// surface later as a panic in `Duration::from_secs_f64` or an infinite
/// sleep.
#[derive(Clone, Debug)]
pub struct PacingConfig {
    /// Default delay applied between steps that carry no override.
    pub every_step_delay: DelayRange,
    /// How often a cancellable sleep wakes to recheck the stop flag.
    pub poll_interval_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            every_step_delay: DelayRange::new(0.1, 0.3),
            poll_interval_ms: 100,
        }
    }
}

/// Errors detected during [`PacingConfig::validate`].
#[derive(Debug, PartialEq)]
pub enum PacingError {
    /// A delay bound was NaN, infinite, or negative.
    InvalidDelay {
        /// The offending value.
        value: f64,
    },
    /// `poll_interval_ms` was zero, which would busy-loop.
    ZeroPollInterval,
}

impl fmt::Display for PacingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDelay { value } => {
                write!(f, "delay bound must be finite and non-negative, got {value}")
            }
            Self::ZeroPollInterval => write!(f, "poll_interval_ms must be at least 1"),
        }
    }
}

impl Error for PacingError {}

impl PacingConfig {
    /// Validate this config's structural invariants.
    pub fn validate(&self) -> Result<(), PacingError> {
        for value in [self.every_step_delay.min, self.every_step_delay.max] {
            if !value.is_finite() || value < 0.0 {
                return Err(PacingError::InvalidDelay { value });
            }
        }
        if self.poll_interval_ms == 0 {
            return Err(PacingError::ZeroPollInterval);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        assert!(PacingConfig::default().validate().is_ok());
    }

    #[test]
    fn nan_delay_is_rejected() {
        let mut cfg = PacingConfig::default();
        cfg.every_step_delay.max = f64::NAN;
        assert!(matches!(
            cfg.validate(),
            Err(PacingError::InvalidDelay { .. })
        ));
    }

    #[test]
    fn zero_poll_interval_is_rejected() {
        let mut cfg = PacingConfig::default();
        cfg.poll_interval_ms = 0;
        assert_eq!(cfg.validate(), Err(PacingError::ZeroPollInterval));
    }
}
