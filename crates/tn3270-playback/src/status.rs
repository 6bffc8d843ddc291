//! Playback status snapshot and the bounded per-session event log.

use std::collections::VecDeque;
use std::time::{SystemTime, UNIX_EPOCH};

/// Maximum number of event lines retained per session (§4.5).
pub const MAX_EVENTS: usize = 200;

/// Whether a playback pauses before every step (`Debug`) or runs
/// continuously (`Play`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackMode {
    /// Runs to completion without stopping, unless paused explicitly.
    Play,
    /// Starts paused; each step requires an explicit `Step` request.
    Debug,
}

/// Live state of one session's playback, polled by callers rather than
/// pushed — the executor thread updates this snapshot after every step.
#[derive(Clone, Debug, PartialEq)]
pub struct PlaybackStatus {
    /// Current mode.
    pub mode: PlaybackMode,
    /// Whether the executor thread is still running.
    pub active: bool,
    /// Whether execution is currently paused (always true at the start
    /// of a `Debug` playback).
    pub paused: bool,
    /// 1-based index of the step currently executing or about to run.
    pub current_step: u32,
    /// `Type` of the current step.
    pub current_step_type: Option<String>,
    /// Total number of steps in the loaded workflow.
    pub total_steps: u32,
    /// Lower bound of the delay applied before the current step.
    pub current_delay_min: Option<f64>,
    /// Upper bound of the delay applied before the current step.
    pub current_delay_max: Option<f64>,
    /// Actual sampled delay, in seconds.
    pub current_delay_used: Option<f64>,
    /// Unix timestamp (seconds) playback began.
    pub started_at: Option<u64>,
    /// Unix timestamp playback finished, set only on natural completion
    /// (a `Stop` clears it, per §4.5).
    pub playback_completed_at: Option<u64>,
}

impl PlaybackStatus {
    /// A fresh status for a playback about to start.
    pub fn starting(mode: PlaybackMode, total_steps: u32) -> Self {
        Self {
            mode,
            active: true,
            paused: matches!(mode, PlaybackMode::Debug),
            current_step: 0,
            current_step_type: None,
            total_steps,
            current_delay_min: None,
            current_delay_max: None,
            current_delay_used: None,
            started_at: Some(unix_now()),
            playback_completed_at: None,
        }
    }
}

/// Seconds since the Unix epoch, saturating to 0 if the clock is somehow
/// before it.
pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// A bounded FIFO of human-readable progress lines (`Step i/N: Type`).
///
/// Oldest entries are dropped once [`MAX_EVENTS`] is exceeded so a long
/// playback can't grow this without bound.
#[derive(Clone, Debug, Default)]
pub struct EventLog {
    lines: VecDeque<String>,
}

impl EventLog {
    /// An empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a line, evicting the oldest entry if at capacity.
    pub fn push(&mut self, line: impl Into<String>) {
        if self.lines.len() >= MAX_EVENTS {
            self.lines.pop_front();
        }
        self.lines.push_back(line.into());
    }

    /// All retained lines, oldest first.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    /// Number of retained lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_log_evicts_oldest_past_capacity() {
        let mut log = EventLog::new();
        for i in 0..MAX_EVENTS + 5 {
            log.push(format!("Step {i}"));
        }
        assert_eq!(log.len(), MAX_EVENTS);
        assert_eq!(log.lines().next(), Some("Step 5"));
    }

    #[test]
    fn starting_debug_mode_is_paused() {
        let status = PlaybackStatus::starting(PlaybackMode::Debug, 3);
        assert!(status.paused);
        assert!(status.active);
        assert_eq!(status.total_steps, 3);
    }

    #[test]
    fn starting_play_mode_is_not_paused() {
        let status = PlaybackStatus::starting(PlaybackMode::Play, 3);
        assert!(!status.paused);
    }
}
