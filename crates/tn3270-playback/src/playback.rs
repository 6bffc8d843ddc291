//! The Workflow Playback executor (C5): runs a loaded [`WorkflowDocument`]
//! against a session's Host Adapter on one dedicated background thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rand::Rng;

use tn3270_core::Aid;
use tn3270_host::EmulatorTransport;
use tn3270_recording::{DelayRange, WorkflowDocument, WorkflowStep};
use tn3270_session::Session;

use crate::config::PacingConfig;
use crate::error::PlaybackError;
use crate::status::{unix_now, EventLog, PlaybackMode, PlaybackStatus};

/// A running (or just-finished) playback.
///
/// Dropping a `Playback` does not stop it — call [`Self::stop`] and wait
/// for it to return, or [`Self::join`] if you only need to wait.
pub struct Playback {
    stop_flag: Arc<AtomicBool>,
    pause_flag: Arc<AtomicBool>,
    step_flag: Arc<AtomicBool>,
    status: Arc<Mutex<PlaybackStatus>>,
    events: Arc<Mutex<EventLog>>,
    handle: Option<JoinHandle<()>>,
}

impl Playback {
    /// Validate `pacing`, then spawn the executor thread named
    /// `playback-{session_id}` and return immediately — matching the
    /// inherited tick-thread convention of one dedicated OS thread per
    /// running session rather than a shared pool.
    pub fn start<T: EmulatorTransport + Send + 'static>(
        session_id: impl std::fmt::Display,
        session: Arc<Mutex<Session<T>>>,
        doc: WorkflowDocument,
        mode: PlaybackMode,
        pacing: PacingConfig,
    ) -> Result<Self, PlaybackError> {
        pacing
            .validate()
            .map_err(|e| PlaybackError::InvalidPacing {
                reason: e.to_string(),
            })?;

        let total_steps = doc.steps.len() as u32;
        let status = Arc::new(Mutex::new(PlaybackStatus::starting(mode, total_steps)));
        let events = Arc::new(Mutex::new(EventLog::new()));
        let stop_flag = Arc::new(AtomicBool::new(false));
        let pause_flag = Arc::new(AtomicBool::new(matches!(mode, PlaybackMode::Debug)));
        let step_flag = Arc::new(AtomicBool::new(false));

        let thread_status = Arc::clone(&status);
        let thread_events = Arc::clone(&events);
        let thread_stop = Arc::clone(&stop_flag);
        let thread_pause = Arc::clone(&pause_flag);
        let thread_step = Arc::clone(&step_flag);

        let handle = thread::Builder::new()
            .name(format!("playback-{session_id}"))
            .spawn(move || {
                run(
                    session,
                    doc,
                    mode,
                    pacing,
                    thread_status,
                    thread_events,
                    thread_stop,
                    thread_pause,
                    thread_step,
                )
            })
            .map_err(|e| PlaybackError::ThreadSpawnFailed {
                reason: e.to_string(),
            })?;

        Ok(Self {
            stop_flag,
            pause_flag,
            step_flag,
            status,
            events,
            handle: Some(handle),
        })
    }

    /// Pause execution before the next step.
    pub fn pause(&self) {
        self.pause_flag.store(true, Ordering::Release);
        self.unpark();
    }

    /// Resume a paused playback.
    pub fn resume(&self) {
        self.pause_flag.store(false, Ordering::Release);
        self.unpark();
    }

    /// In `debug` mode while paused, advance exactly one step.
    pub fn step(&self) {
        self.step_flag.store(true, Ordering::Release);
        self.unpark();
    }

    /// Request a stop and block until the executor thread exits. Idempotent.
    pub fn stop(&mut self) {
        self.stop_flag.store(true, Ordering::Release);
        self.unpark();
        self.join();
    }

    /// Block until the executor thread exits, without requesting a stop.
    pub fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    /// A snapshot of the current status.
    pub fn status(&self) -> PlaybackStatus {
        self.status.lock().expect("playback status mutex poisoned").clone()
    }

    /// All retained event lines, oldest first.
    pub fn events(&self) -> Vec<String> {
        self.events
            .lock()
            .expect("playback events mutex poisoned")
            .lines()
            .map(String::from)
            .collect()
    }

    fn unpark(&self) {
        if let Some(handle) = &self.handle {
            handle.thread().unpark();
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn run<T: EmulatorTransport>(
    session: Arc<Mutex<Session<T>>>,
    doc: WorkflowDocument,
    mode: PlaybackMode,
    pacing: PacingConfig,
    status: Arc<Mutex<PlaybackStatus>>,
    events: Arc<Mutex<EventLog>>,
    stop_flag: Arc<AtomicBool>,
    pause_flag: Arc<AtomicBool>,
    step_flag: Arc<AtomicBool>,
) {
    let total = doc.steps.len();
    let mut pending_input = false;
    let mut completed_naturally = true;

    for (idx, step) in doc.steps.iter().enumerate() {
        if stop_flag.load(Ordering::Acquire) {
            completed_naturally = false;
            break;
        }

        if !wait_for_permission(mode, &stop_flag, &pause_flag, &step_flag, pacing.poll_interval_ms) {
            completed_naturally = false;
            break;
        }

        let range = step.step_delay.unwrap_or(pacing.every_step_delay);
        let used = sample_delay(range);
        {
            let mut s = status.lock().expect("playback status mutex poisoned");
            s.current_step = idx as u32 + 1;
            s.current_step_type = Some(step.step_type.clone());
            s.current_delay_min = Some(range.min);
            s.current_delay_max = Some(range.max);
            s.current_delay_used = Some(used);
        }

        if !interruptible_sleep(used, &stop_flag, pacing.poll_interval_ms) {
            completed_naturally = false;
            break;
        }

        let result = dispatch(step, &session, &mut pending_input);
        let mut log = events.lock().expect("playback events mutex poisoned");
        match result {
            Ok(()) => log.push(format!("Step {}/{}: {}", idx + 1, total, step.step_type)),
            Err(err) => {
                tracing::warn!(step = idx + 1, %err, "playback step failed");
                log.push(format!("Step {} failed: {err}", idx + 1));
                completed_naturally = false;
                drop(log);
                break;
            }
        }
    }

    let mut s = status.lock().expect("playback status mutex poisoned");
    s.active = false;
    s.paused = false;
    s.playback_completed_at = if completed_naturally {
        Some(unix_now())
    } else {
        None
    };
}

/// Block until this step may run. Returns `false` if a stop was
/// requested while waiting.
fn wait_for_permission(
    mode: PlaybackMode,
    stop_flag: &AtomicBool,
    pause_flag: &AtomicBool,
    step_flag: &AtomicBool,
    poll_interval_ms: u64,
) -> bool {
    loop {
        if stop_flag.load(Ordering::Acquire) {
            return false;
        }
        if mode == PlaybackMode::Debug {
            if step_flag.swap(false, Ordering::AcqRel) {
                return true;
            }
        } else if !pause_flag.load(Ordering::Acquire) {
            return true;
        }
        thread::park_timeout(Duration::from_millis(poll_interval_ms));
    }
}

/// Sleep `seconds`, waking early (and returning `false`) if stopped.
fn interruptible_sleep(seconds: f64, stop_flag: &AtomicBool, poll_interval_ms: u64) -> bool {
    let mut remaining = Duration::from_secs_f64(seconds.max(0.0));
    let step = Duration::from_millis(poll_interval_ms);
    while remaining > Duration::ZERO {
        if stop_flag.load(Ordering::Acquire) {
            return false;
        }
        let slice = remaining.min(step);
        thread::park_timeout(slice);
        remaining -= slice;
    }
    !stop_flag.load(Ordering::Acquire)
}

fn sample_delay(range: DelayRange) -> f64 {
    if range.min >= range.max {
        range.min
    } else {
        rand::rng().random_range(range.min..=range.max)
    }
}

fn dispatch<T: EmulatorTransport>(
    step: &WorkflowStep,
    session: &Arc<Mutex<Session<T>>>,
    pending_input: &mut bool,
) -> Result<(), PlaybackError> {
    let mut guard = session.lock().expect("session mutex poisoned");
    let adapter = guard.adapter_mut();

    match step.step_type.as_str() {
        "Connect" => {
            if !adapter.is_connected() {
                adapter.start()?;
            }
        }
        "Disconnect" => {
            adapter.stop();
            return Ok(());
        }
        "FillString" => {
            let coords = step.coordinates.ok_or(PlaybackError::InvalidCoordinates {
                row: 0,
                column: 0,
            })?;
            if coords.row == 0 || coords.column == 0 {
                return Err(PlaybackError::InvalidCoordinates {
                    row: coords.row as i64,
                    column: coords.column as i64,
                });
            }
            let row = (coords.row - 1) as u16;
            let col = (coords.column - 1) as u16;
            let text = step.text.as_deref().unwrap_or("");
            adapter.write_string_at(row, col, text)?;
            *pending_input = true;
        }
        _ => {
            if let Some(name) = step.press_aid_name() {
                if *pending_input {
                    adapter.submit_screen()?;
                    *pending_input = false;
                }
                adapter.send_key(Aid::normalize(name))?;
            }
        }
    }

    if step.step_type != "Disconnect" {
        adapter.update_screen()?;
    }
    Ok(())
}
