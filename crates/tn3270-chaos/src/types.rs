//! Per-attempt and per-run records the Chaos Engine produces (§3).

use serde::{Deserialize, Serialize};
use tn3270_recording::WorkflowStep;

use crate::mindmap::MindMap;

/// One field write attempted during a step.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldWrite {
    /// 0-based row.
    pub row: u16,
    /// 0-based column.
    pub col: u16,
    /// The field's capacity in cells.
    pub length: u32,
    /// The value written.
    pub value: String,
    /// Whether the Host Adapter accepted the write.
    pub success: bool,
    /// Failure detail, when `success` is `false`.
    pub error: Option<String>,
}

/// One iteration of the exploration loop.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Attempt {
    /// 1-based attempt number within the run.
    pub attempt: u32,
    /// Unix seconds when the attempt started.
    pub time: u64,
    /// Screen hash observed before this attempt's writes.
    pub from_hash: String,
    /// Screen hash observed after this attempt's AID press.
    pub to_hash: String,
    /// The AID key chosen for this attempt.
    pub aid_key: String,
    /// Number of unprotected fields the attempt considered.
    pub fields_targeted: u32,
    /// Number of fields actually written successfully.
    pub fields_written: u32,
    /// Whether `to_hash` differs from `from_hash`.
    pub transitioned: bool,
    /// Set if the attempt aborted with an error.
    pub error: Option<String>,
    /// Individual field writes attempted.
    pub writes: Vec<FieldWrite>,
}

/// A recorded `from -> to` screen transition and the steps that caused it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    /// Screen hash before the transition.
    pub from_hash: String,
    /// Screen hash after the transition.
    pub to_hash: String,
    /// The workflow steps (fills and the AID press) that caused it.
    pub steps: Vec<WorkflowStep>,
}

/// A live, pollable snapshot of a running or finished Chaos Engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChaosStatus {
    /// Whether the background loop is currently running.
    pub active: bool,
    /// Total steps executed so far.
    pub steps_run: u32,
    /// Number of distinct screen hashes observed.
    pub unique_screens: u32,
    /// Per-AID-key press counts.
    pub aid_key_counts: std::collections::HashMap<String, u32>,
    /// The most recent attempts, oldest first, capped at 40.
    pub recent_attempts: Vec<Attempt>,
    /// The terminal error, if the run stopped abnormally.
    pub error: Option<String>,
    /// Unix seconds when `start`/`resume` was called.
    pub started_at: Option<u64>,
    /// Unix seconds when the run stopped, if it has.
    pub stopped_at: Option<u64>,
}

/// A persisted snapshot of a chaos run, as written by `tn3270-persistence`
/// and produced by [`crate::ChaosEngine::snapshot`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SavedRun {
    /// Run id, `YYYYMMDD-HHMMSS-XXXX`.
    pub id: String,
    /// Target host name or address.
    pub host: String,
    /// Target port.
    pub port: u16,
    /// Unix seconds when the run started.
    pub started_at: u64,
    /// Unix seconds when the run stopped, if it has.
    pub stopped_at: Option<u64>,
    /// Total steps executed.
    pub steps_run: u32,
    /// Total recorded transitions.
    pub transitions: usize,
    /// All distinct screen hashes observed, in first-seen order.
    pub screen_hashes: Vec<String>,
    /// Recorded transitions.
    pub transition_list: Vec<Transition>,
    /// The full accumulated step history (for re-export as a workflow).
    pub steps: Vec<WorkflowStep>,
    /// Per-AID-key press counts.
    pub aid_key_counts: std::collections::HashMap<String, u32>,
    /// Distinct non-empty field values written, in first-seen order.
    pub unique_input_values: Vec<String>,
    /// The most recent attempts, capped at 40.
    pub attempts: Vec<Attempt>,
    /// The accumulated mind map.
    pub mind_map: MindMap,
}
