//! The workflow document's wire types (§6).
//!
//! Field names match the JSON schema exactly (`PascalCase`) via `serde`
//! rename attributes, so the document round-trips byte-for-byte through
//! any conforming caller without a translation layer.

use serde::{Deserialize, Serialize};

/// An inclusive `[Min, Max]` delay range in seconds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DelayRange {
    /// Lower bound, inclusive.
    #[serde(rename = "Min")]
    pub min: f64,
    /// Upper bound, inclusive.
    #[serde(rename = "Max")]
    pub max: f64,
}

impl DelayRange {
    /// Build a range, swapping bounds if given out of order.
    pub fn new(min: f64, max: f64) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    /// The default per-step delay, `[0.1, 0.3]` seconds.
    pub const DEFAULT_STEP_DELAY: DelayRange = DelayRange { min: 0.1, max: 0.3 };

    /// The default end-of-task delay, `[60, 120]` seconds.
    pub const DEFAULT_END_OF_TASK_DELAY: DelayRange = DelayRange {
        min: 60.0,
        max: 120.0,
    };
}

/// 1-based screen coordinates, as they appear on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coordinates {
    /// 1-based row.
    #[serde(rename = "Row")]
    pub row: u32,
    /// 1-based column.
    #[serde(rename = "Column")]
    pub column: u32,
    /// Field length, when known (used to split a multi-row `FillString`
    /// back into per-row steps on replay).
    #[serde(rename = "Length", skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,
}

/// One step of a workflow.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorkflowStep {
    /// Step type: `Connect`, `Disconnect`, `FillString`, or one of the
    /// `Press*` AID names.
    #[serde(rename = "Type")]
    pub step_type: String,
    /// Target coordinates, present on `FillString` steps.
    #[serde(rename = "Coordinates", skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    /// Text to write, present on `FillString` steps.
    #[serde(rename = "Text", skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Per-step delay override.
    #[serde(rename = "StepDelay", skip_serializing_if = "Option::is_none")]
    pub step_delay: Option<DelayRange>,
}

impl WorkflowStep {
    /// A `Connect` step.
    pub fn connect() -> Self {
        Self {
            step_type: "Connect".into(),
            coordinates: None,
            text: None,
            step_delay: None,
        }
    }

    /// A `Disconnect` step.
    pub fn disconnect() -> Self {
        Self {
            step_type: "Disconnect".into(),
            coordinates: None,
            text: None,
            step_delay: None,
        }
    }

    /// A `FillString` step at 1-based `(row, column)`.
    pub fn fill_string(row: u32, column: u32, text: impl Into<String>) -> Self {
        Self {
            step_type: "FillString".into(),
            coordinates: Some(Coordinates {
                row,
                column,
                length: None,
            }),
            text: Some(text.into()),
            step_delay: None,
        }
    }

    /// A `Press<Aid>` step, e.g. `WorkflowStep::press("Enter")`.
    pub fn press(aid_canonical_name: impl AsRef<str>) -> Self {
        Self {
            step_type: format!("Press{}", aid_canonical_name.as_ref()),
            coordinates: None,
            text: None,
            step_delay: None,
        }
    }

    /// The AID name this step presses, if it is a `Press*` step.
    pub fn press_aid_name(&self) -> Option<&str> {
        self.step_type.strip_prefix("Press")
    }
}

/// The full workflow document (§6's top-level JSON object).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDocument {
    /// Target host name or address.
    #[serde(rename = "Host")]
    pub host: String,
    /// Target port.
    #[serde(rename = "Port")]
    pub port: u16,
    /// Default delay applied between steps without their own override.
    #[serde(rename = "EveryStepDelay")]
    pub every_step_delay: Option<DelayRange>,
    /// Where a generated export was written, if any.
    #[serde(rename = "OutputFilePath", skip_serializing_if = "Option::is_none")]
    pub output_file_path: Option<String>,
    /// Number of steps per ramp-up batch.
    #[serde(rename = "RampUpBatchSize", skip_serializing_if = "Option::is_none")]
    pub ramp_up_batch_size: Option<u32>,
    /// Delay between ramp-up batches, in seconds.
    #[serde(rename = "RampUpDelay", skip_serializing_if = "Option::is_none")]
    pub ramp_up_delay: Option<f64>,
    /// Delay inserted once all steps complete.
    #[serde(rename = "EndOfTaskDelay")]
    pub end_of_task_delay: Option<DelayRange>,
    /// The recorded or authored step list.
    #[serde(rename = "Steps")]
    pub steps: Vec<WorkflowStep>,
}

impl WorkflowDocument {
    /// An empty document with the default delay header and no steps,
    /// ready for a recorder to append to.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            every_step_delay: Some(DelayRange::DEFAULT_STEP_DELAY),
            output_file_path: None,
            ramp_up_batch_size: Some(50),
            ramp_up_delay: Some(1.5),
            end_of_task_delay: Some(DelayRange::DEFAULT_END_OF_TASK_DELAY),
            steps: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_aid_name_strips_prefix() {
        let step = WorkflowStep::press("PF3");
        assert_eq!(step.press_aid_name(), Some("PF3"));
        assert_eq!(WorkflowStep::connect().press_aid_name(), None);
    }

    #[test]
    fn new_document_carries_spec_defaults() {
        let doc = WorkflowDocument::new("mvs.example.com", 23);
        assert_eq!(doc.every_step_delay, Some(DelayRange::new(0.1, 0.3)));
        assert_eq!(doc.end_of_task_delay, Some(DelayRange::new(60.0, 120.0)));
        assert_eq!(doc.ramp_up_batch_size, Some(50));
        assert_eq!(doc.ramp_up_delay, Some(1.5));
    }
}
