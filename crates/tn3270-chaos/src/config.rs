//! Chaos run configuration (§3, §4.6).

use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::ChaosConfigError;

/// A seed hint: a candidate transaction code plus free-form known-good
/// input values, used to bias field-value selection before the engine
/// falls back to random generation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Hint {
    /// A short transaction-like code, e.g. `"IKJEFT"`.
    pub transaction: String,
    /// Other known-good values worth trying (account numbers, menu picks).
    pub known_data: Vec<String>,
}

/// Tuning knobs for one [`crate::ChaosEngine`] run.
#[derive(Clone, Debug)]
pub struct ChaosConfig {
    /// Stop after this many steps. `None` runs until the time budget or
    /// an explicit `stop()`.
    pub max_steps: Option<u32>,
    /// Stop once this many seconds have elapsed since `start()`.
    pub time_budget_secs: Option<f64>,
    /// Delay between steps, in seconds.
    pub step_delay_secs: f64,
    /// RNG seed. `0` seeds from wall-clock time instead of a fixed value.
    pub seed: u64,
    /// Baseline AID key weights before adaptive boosting.
    pub aid_key_weights: HashMap<String, u32>,
    /// Where `export_workflow` should write, if the caller wants the
    /// engine to manage the file itself.
    pub output_file: Option<PathBuf>,
    /// Upper bound on a single generated or replayed field value's length.
    pub max_field_length: usize,
    /// Seed hints biasing field-value and transaction selection.
    pub hints: Vec<Hint>,
    /// Drop attempts that made no progress from the recorded history.
    pub exclude_no_progress_events: bool,
}

impl Default for ChaosConfig {
    fn default() -> Self {
        let mut aid_key_weights = HashMap::new();
        aid_key_weights.insert("Enter".to_string(), 70);
        aid_key_weights.insert("Tab".to_string(), 10);
        aid_key_weights.insert("PF1".to_string(), 5);
        aid_key_weights.insert("PF3".to_string(), 5);
        aid_key_weights.insert("Clear".to_string(), 5);
        Self {
            max_steps: None,
            time_budget_secs: None,
            step_delay_secs: 0.0,
            seed: 0,
            aid_key_weights,
            output_file: None,
            max_field_length: 40,
            hints: Vec::new(),
            exclude_no_progress_events: false,
        }
    }
}

impl ChaosConfig {
    /// Reject non-finite/negative durations and empty AID key names.
    pub fn validate(&self) -> Result<(), ChaosConfigError> {
        if !self.step_delay_secs.is_finite() || self.step_delay_secs < 0.0 {
            return Err(ChaosConfigError::InvalidDuration {
                value: self.step_delay_secs,
            });
        }
        if let Some(budget) = self.time_budget_secs {
            if !budget.is_finite() || budget <= 0.0 {
                return Err(ChaosConfigError::InvalidDuration { value: budget });
            }
        }
        if self.aid_key_weights.keys().any(|k| k.is_empty()) {
            return Err(ChaosConfigError::EmptyAidKeyName);
        }
        Ok(())
    }

    /// `max_field_length`, clamped to a sane floor of 1 cell.
    pub fn effective_max_field_length(&self) -> usize {
        self.max_field_length.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        assert!(ChaosConfig::default().validate().is_ok());
    }

    #[test]
    fn nan_step_delay_is_rejected() {
        let mut config = ChaosConfig::default();
        config.step_delay_secs = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn negative_time_budget_is_rejected() {
        let mut config = ChaosConfig::default();
        config.time_budget_secs = Some(-1.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_aid_key_name_is_rejected() {
        let mut config = ChaosConfig::default();
        config.aid_key_weights.insert(String::new(), 1);
        assert_eq!(config.validate(), Err(ChaosConfigError::EmptyAidKeyName));
    }

    #[test]
    fn zero_max_field_length_floors_to_one() {
        let mut config = ChaosConfig::default();
        config.max_field_length = 0;
        assert_eq!(config.effective_max_field_length(), 1);
    }
}
