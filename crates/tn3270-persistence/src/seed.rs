//! Seeding a [`SavedRun`] from a recorded workflow, so a chaos run can
//! resume exploring from a hand-authored or previously recorded session
//! instead of starting cold (§4.8).

use tn3270_chaos::{ChaosStatus, MindMap, SavedRun};
use tn3270_recording::WorkflowDocument;

/// Build a [`SavedRun`] whose step history is `doc`'s steps and whose
/// accumulators (hashes, transitions, mind map) are otherwise empty —
/// the chaos engine fills them in as it explores from wherever replaying
/// these steps leaves the session.
pub fn seed_from_workflow(id: impl Into<String>, doc: &WorkflowDocument, started_at: u64) -> SavedRun {
    SavedRun {
        id: id.into(),
        host: doc.host.clone(),
        port: doc.port,
        started_at,
        stopped_at: None,
        steps_run: 0,
        transitions: 0,
        screen_hashes: Vec::new(),
        transition_list: Vec::new(),
        steps: doc.steps.clone(),
        aid_key_counts: Default::default(),
        unique_input_values: Vec::new(),
        attempts: Vec::new(),
        mind_map: MindMap::new(),
    }
}

/// Project a [`SavedRun`] down to the same [`ChaosStatus`] shape a live
/// engine reports, so callers can display a loaded-but-not-yet-resumed
/// run identically to an active one.
pub fn status_from_saved(run: &SavedRun) -> ChaosStatus {
    ChaosStatus {
        active: false,
        steps_run: run.steps_run,
        unique_screens: run.screen_hashes.len() as u32,
        aid_key_counts: run.aid_key_counts.clone(),
        recent_attempts: run.attempts.clone(),
        error: None,
        started_at: Some(run.started_at),
        stopped_at: run.stopped_at,
    }
}
