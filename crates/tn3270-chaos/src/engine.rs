//! The Chaos Engine (C6): seeded, adaptive exploration of a connected
//! session (§4.6). Runs on one dedicated thread per engine, the same
//! park/unpark + atomic-flag idiom `tn3270-playback` uses for its
//! executor thread.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use tn3270_core::{screen_hash, Aid};
use tn3270_host::EmulatorTransport;
use tn3270_recording::WorkflowStep;
use tn3270_session::Session;

use crate::config::ChaosConfig;
use crate::error::ChaosError;
use crate::mindmap::{field_key, MindMap};
use crate::types::{Attempt, ChaosStatus, FieldWrite, SavedRun, Transition};

const MAX_RECENT_ATTEMPTS: usize = 40;
const FILL_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

fn unix_now() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0)
}

struct EngineState {
    active: bool,
    steps_run: u32,
    screen_hashes: Vec<String>,
    seen_hashes: HashSet<String>,
    transition_list: Vec<Transition>,
    steps: Vec<WorkflowStep>,
    aid_key_counts: HashMap<String, u32>,
    unique_input_values: Vec<String>,
    seen_input_values: HashSet<String>,
    attempts: VecDeque<Attempt>,
    mind_map: MindMap,
    error: Option<String>,
    started_at: Option<u64>,
    stopped_at: Option<u64>,
    next_attempt_no: u32,
}

impl EngineState {
    fn new() -> Self {
        Self {
            active: false,
            steps_run: 0,
            screen_hashes: Vec::new(),
            seen_hashes: HashSet::new(),
            transition_list: Vec::new(),
            steps: vec![WorkflowStep::connect()],
            aid_key_counts: HashMap::new(),
            unique_input_values: Vec::new(),
            seen_input_values: HashSet::new(),
            attempts: VecDeque::new(),
            mind_map: MindMap::new(),
            error: None,
            started_at: None,
            stopped_at: None,
            next_attempt_no: 1,
        }
    }

    fn from_saved(saved: &SavedRun) -> Self {
        Self {
            active: false,
            steps_run: saved.steps_run,
            seen_hashes: saved.screen_hashes.iter().cloned().collect(),
            screen_hashes: saved.screen_hashes.clone(),
            transition_list: saved.transition_list.clone(),
            steps: saved.steps.clone(),
            aid_key_counts: saved.aid_key_counts.clone(),
            seen_input_values: saved.unique_input_values.iter().cloned().collect(),
            unique_input_values: saved.unique_input_values.clone(),
            attempts: saved.attempts.iter().cloned().collect(),
            mind_map: saved.mind_map.clone(),
            error: None,
            started_at: Some(saved.started_at),
            stopped_at: None,
            next_attempt_no: saved.attempts.last().map(|a| a.attempt + 1).unwrap_or(1),
        }
    }

    fn record_hash(&mut self, hash: &str) {
        if self.seen_hashes.insert(hash.to_string()) {
            self.screen_hashes.push(hash.to_string());
        }
    }

    fn record_input_value(&mut self, value: &str) {
        if !value.is_empty() && self.seen_input_values.insert(value.to_string()) {
            self.unique_input_values.push(value.to_string());
        }
    }

    fn push_attempt(&mut self, attempt: Attempt) {
        if self.attempts.len() >= MAX_RECENT_ATTEMPTS {
            self.attempts.pop_front();
        }
        self.attempts.push_back(attempt);
    }

    fn status(&self) -> ChaosStatus {
        ChaosStatus {
            active: self.active,
            steps_run: self.steps_run,
            unique_screens: self.screen_hashes.len() as u32,
            aid_key_counts: self.aid_key_counts.clone(),
            recent_attempts: self.attempts.iter().cloned().collect(),
            error: self.error.clone(),
            started_at: self.started_at,
            stopped_at: self.stopped_at,
        }
    }

    fn snapshot(&self, id: String, host: String, port: u16) -> SavedRun {
        SavedRun {
            id,
            host,
            port,
            started_at: self.started_at.unwrap_or_else(unix_now),
            stopped_at: self.stopped_at,
            steps_run: self.steps_run,
            transitions: self.transition_list.len(),
            screen_hashes: self.screen_hashes.clone(),
            transition_list: self.transition_list.clone(),
            steps: self.steps.clone(),
            aid_key_counts: self.aid_key_counts.clone(),
            unique_input_values: self.unique_input_values.clone(),
            attempts: self.attempts.iter().cloned().collect(),
            mind_map: self.mind_map.clone(),
        }
    }
}

/// The Chaos Engine: drives one session through seeded, adaptive
/// exploration on a dedicated background thread.
pub struct ChaosEngine<T: EmulatorTransport> {
    host: String,
    port: u16,
    session: Arc<Mutex<Session<T>>>,
    config: ChaosConfig,
    state: Arc<Mutex<EngineState>>,
    stop_flag: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl<T: EmulatorTransport + Send + 'static> ChaosEngine<T> {
    /// Build an engine around `session`, not yet running. `config` is
    /// validated immediately.
    pub fn new(
        host: impl Into<String>,
        port: u16,
        session: Arc<Mutex<Session<T>>>,
        config: ChaosConfig,
    ) -> Result<Self, ChaosError> {
        config.validate()?;
        Ok(Self {
            host: host.into(),
            port,
            session,
            config,
            state: Arc::new(Mutex::new(EngineState::new())),
            stop_flag: Arc::new(AtomicBool::new(false)),
            handle: None,
        })
    }

    /// Begin exploring. Fails if already running or the session isn't
    /// connected.
    pub fn start(&mut self) -> Result<(), ChaosError> {
        if self.handle.is_some() {
            return Err(ChaosError::AlreadyRunning);
        }
        if !self.session.lock().expect("session mutex poisoned").adapter().is_connected() {
            return Err(ChaosError::NotConnected);
        }
        {
            let mut state = self.state.lock().expect("chaos state mutex poisoned");
            *state = EngineState::new();
            state.active = true;
            state.started_at = Some(unix_now());
        }
        self.spawn()
    }

    /// Resume a previously saved run: rehydrate the accumulators from
    /// `saved` and continue exploring from there.
    pub fn resume(&mut self, saved: SavedRun) -> Result<(), ChaosError> {
        if self.handle.is_some() {
            return Err(ChaosError::AlreadyRunning);
        }
        if !self.session.lock().expect("session mutex poisoned").adapter().is_connected() {
            return Err(ChaosError::NotConnected);
        }
        {
            let mut state = self.state.lock().expect("chaos state mutex poisoned");
            *state = EngineState::from_saved(&saved);
            state.active = true;
        }
        self.spawn()
    }

    fn spawn(&mut self) -> Result<(), ChaosError> {
        self.stop_flag.store(false, Ordering::SeqCst);
        let session_id = self.session.lock().expect("session mutex poisoned").id().clone();
        let session = self.session.clone();
        let state = self.state.clone();
        let stop_flag = self.stop_flag.clone();
        let config = self.config.clone();

        let handle = thread::Builder::new()
            .name(format!("chaos-{session_id}"))
            .spawn(move || run(session, state, stop_flag, config))
            .map_err(|e| ChaosError::ThreadSpawnFailed { reason: e.to_string() })?;
        self.handle = Some(handle);
        Ok(())
    }

    /// Signal the background loop to stop and wait for it to exit.
    /// Idempotent.
    pub fn stop(&mut self) {
        self.stop_flag.store(true, Ordering::SeqCst);
        if let Some(handle) = &self.handle {
            handle.thread().unpark();
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
        let mut state = self.state.lock().expect("chaos state mutex poisoned");
        state.active = false;
        if state.stopped_at.is_none() {
            state.stopped_at = Some(unix_now());
        }
    }

    /// A live snapshot of the run's progress.
    pub fn status(&self) -> ChaosStatus {
        self.state.lock().expect("chaos state mutex poisoned").status()
    }

    /// A persistable snapshot of the run under `run_id`.
    pub fn snapshot(&self, run_id: impl Into<String>) -> SavedRun {
        self.state
            .lock()
            .expect("chaos state mutex poisoned")
            .snapshot(run_id.into(), self.host.clone(), self.port)
    }

    /// Export the accumulated step history as a replayable workflow
    /// document, serialized as pretty JSON.
    pub fn export_workflow(&self) -> Result<Vec<u8>, ChaosError> {
        let state = self.state.lock().expect("chaos state mutex poisoned");
        let mut doc = tn3270_recording::WorkflowDocument::new(self.host.clone(), self.port);
        doc.steps = state.steps.clone();
        doc.steps.push(WorkflowStep::disconnect());
        let mut buf = Vec::new();
        tn3270_recording::write_document(&mut buf, &doc)
            .map_err(|e| ChaosError::ExportInvalid { reason: e.to_string() })?;
        Ok(buf)
    }
}

impl<T: EmulatorTransport> Drop for ChaosEngine<T> {
    fn drop(&mut self) {
        self.stop_flag.store(true, Ordering::SeqCst);
        if let Some(handle) = &self.handle {
            handle.thread().unpark();
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn new_rng(seed: u64) -> ChaCha8Rng {
    if seed == 0 {
        let nanos = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_nanos()).unwrap_or(1);
        ChaCha8Rng::seed_from_u64(nanos as u64)
    } else {
        ChaCha8Rng::seed_from_u64(seed)
    }
}

fn run<T: EmulatorTransport>(
    session: Arc<Mutex<Session<T>>>,
    state: Arc<Mutex<EngineState>>,
    stop_flag: Arc<AtomicBool>,
    config: ChaosConfig,
) {
    let mut rng = new_rng(config.seed);
    let deadline = config.time_budget_secs.map(|secs| Instant::now() + Duration::from_secs_f64(secs));
    let max_field_length = config.effective_max_field_length();

    loop {
        if stop_flag.load(Ordering::SeqCst) {
            break;
        }
        if let Some(max) = config.max_steps {
            if state.lock().expect("chaos state mutex poisoned").steps_run >= max {
                break;
            }
        }
        if let Some(deadline) = deadline {
            if Instant::now() >= deadline {
                break;
            }
        }

        match step(&session, &state, &config, &mut rng, max_field_length) {
            Ok(()) => {}
            Err(err) => {
                state.lock().expect("chaos state mutex poisoned").error = Some(err.to_string());
                break;
            }
        }

        if !interruptible_sleep(config.step_delay_secs, &stop_flag) {
            break;
        }
    }

    let mut state = state.lock().expect("chaos state mutex poisoned");
    state.active = false;
    state.stopped_at = Some(unix_now());
}

fn interruptible_sleep(seconds: f64, stop_flag: &AtomicBool) -> bool {
    if seconds <= 0.0 {
        return !stop_flag.load(Ordering::SeqCst);
    }
    let deadline = Instant::now() + Duration::from_secs_f64(seconds);
    loop {
        if stop_flag.load(Ordering::SeqCst) {
            return false;
        }
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return true;
        }
        thread::park_timeout(remaining.min(Duration::from_millis(50)));
    }
}

fn step<T: EmulatorTransport>(
    session: &Arc<Mutex<Session<T>>>,
    state: &Arc<Mutex<EngineState>>,
    config: &ChaosConfig,
    rng: &mut ChaCha8Rng,
    max_field_length: usize,
) -> Result<(), ChaosError> {
    let screen = {
        let mut session = session.lock().expect("session mutex poisoned");
        session.adapter_mut().update_screen()?;
        session.adapter().get_screen().cloned().ok_or(ChaosError::NotConnected)?
    };
    let from_hash = screen_hash(&screen);
    let seen_at = unix_now();

    {
        let mut state = state.lock().expect("chaos state mutex poisoned");
        state.mind_map.observe_screen(&from_hash, &screen, seen_at);
        state.record_hash(&from_hash);
    }

    let boosts = {
        let state = state.lock().expect("chaos state mutex poisoned");
        key_boosts(&state.mind_map, &from_hash)
    };
    let known_values = {
        let state = state.lock().expect("chaos state mutex poisoned");
        state.mind_map.areas.get(&from_hash).map(|a| a.known_working_values.clone()).unwrap_or_default()
    };

    let unprotected: Vec<_> = screen.fields().iter().filter(|f| !f.is_protected()).cloned().collect();
    let mut steps = Vec::new();
    let mut writes = Vec::new();
    {
        let mut session = session.lock().expect("session mutex poisoned");
        for (idx, field) in unprotected.iter().enumerate() {
            let key = field_key(field.start_row(), field.start_col(), field.length(screen.width));
            let cap = field.length(screen.width).min(max_field_length as u32).max(1) as usize;
            let value = pick_field_value(rng, config, &known_values, &key, idx == 0, field.is_numeric(), cap);
            let result = session.adapter_mut().write_string_at(field.start_row(), field.start_col(), &value);
            let success = result.is_ok();
            if success {
                steps.push(WorkflowStep::fill_string(
                    field.start_row() as u32 + 1,
                    field.start_col() as u32 + 1,
                    value.clone(),
                ));
            }
            writes.push(FieldWrite {
                row: field.start_row(),
                col: field.start_col(),
                length: field.length(screen.width),
                value,
                success,
                error: result.err().map(|e| e.to_string()),
            });
        }
        if !writes.is_empty() {
            let _ = session.adapter_mut().submit_screen();
        }
    }

    let aid_key = select_aid_key(rng, &config.aid_key_weights, &boosts);
    let aid = Aid::normalize(&aid_key);
    {
        let mut session = session.lock().expect("session mutex poisoned");
        session.adapter_mut().send_key(aid)?;
        session.adapter_mut().update_screen()?;
    }
    steps.push(WorkflowStep::press(aid.canonical_name()));

    let to_screen = session
        .lock()
        .expect("session mutex poisoned")
        .adapter()
        .get_screen()
        .cloned()
        .ok_or(ChaosError::NotConnected)?;
    let to_hash = screen_hash(&to_screen);
    let transitioned = to_hash != from_hash;

    let attempt_no = {
        let mut state = state.lock().expect("chaos state mutex poisoned");
        let n = state.next_attempt_no;
        state.next_attempt_no += 1;
        n
    };
    let attempt = Attempt {
        attempt: attempt_no,
        time: seen_at,
        from_hash: from_hash.clone(),
        to_hash: to_hash.clone(),
        aid_key: aid_key.clone(),
        fields_targeted: unprotected.len() as u32,
        fields_written: writes.iter().filter(|w| w.success).count() as u32,
        transitioned,
        error: None,
        writes: writes.clone(),
    };

    {
        let mut state = state.lock().expect("chaos state mutex poisoned");
        state.mind_map.observe_screen(&to_hash, &to_screen, unix_now());
        state.record_hash(&to_hash);
        state.mind_map.record_attempt(&attempt);
        *state.aid_key_counts.entry(aid_key.clone()).or_insert(0) += 1;
        state.steps_run += 1;
        state.steps.extend(steps.iter().cloned());
        for write in &writes {
            if write.success {
                state.record_input_value(&write.value);
            }
        }
        if transitioned {
            state.transition_list.push(Transition { from_hash, to_hash, steps });
        }
        if !config.exclude_no_progress_events || transitioned {
            state.push_attempt(attempt);
        }
    }

    Ok(())
}

/// `10 * progressions` if any progressions happened from this area via
/// this key, else `-presses` once `presses >= 5`, else `0`.
fn key_boosts(mind_map: &MindMap, area_hash: &str) -> HashMap<String, i64> {
    let Some(area) = mind_map.areas.get(area_hash) else {
        return HashMap::new();
    };
    area.key_presses
        .iter()
        .map(|(key, stats)| {
            let boost = if stats.progressions > 0 {
                10 * stats.progressions as i64
            } else if stats.presses >= 5 {
                -(stats.presses as i64)
            } else {
                0
            };
            (key.clone(), boost)
        })
        .collect()
}

fn select_aid_key(rng: &mut ChaCha8Rng, weights: &HashMap<String, u32>, boosts: &HashMap<String, i64>) -> String {
    let mut keys: Vec<&String> = weights.keys().collect();
    keys.sort();
    if keys.is_empty() {
        return Aid::Enter.canonical_name();
    }
    let effective: Vec<(String, u32)> = keys
        .iter()
        .map(|k| {
            let base = *weights.get(*k).unwrap_or(&1) as i64;
            let boost = boosts.get(*k).copied().unwrap_or(0);
            ((*k).clone(), (base + boost).max(1) as u32)
        })
        .collect();
    let total: u32 = effective.iter().map(|(_, w)| w).sum();
    let mut r = rng.random_range(0..total);
    for (key, weight) in &effective {
        if r < *weight {
            return key.clone();
        }
        r -= weight;
    }
    effective.last().expect("non-empty").0.clone()
}

fn pick_field_value(
    rng: &mut ChaCha8Rng,
    config: &ChaosConfig,
    known_values: &HashMap<String, Vec<String>>,
    key: &str,
    is_first_field: bool,
    numeric: bool,
    cap: usize,
) -> String {
    if rng.random_bool(0.8) {
        if let Some(candidates) = known_values.get(key) {
            let fitting: Vec<&String> = candidates.iter().filter(|v| v.len() <= cap).collect();
            if !fitting.is_empty() {
                let idx = rng.random_range(0..fitting.len());
                return fitting[idx].clone();
            }
        }
    }

    if is_first_field && rng.random_bool(0.75) {
        if let Some(hint) = config.hints.iter().find(|h| !h.transaction.is_empty()) {
            let value = hint.transaction.to_uppercase();
            return truncate(&value, cap);
        }
    }

    let all_hints: Vec<&String> = config
        .hints
        .iter()
        .flat_map(|h| std::iter::once(&h.transaction).chain(h.known_data.iter()))
        .filter(|v| !v.is_empty())
        .collect();
    if !all_hints.is_empty() {
        let idx = rng.random_range(0..all_hints.len());
        return truncate(all_hints[idx], cap);
    }

    random_value(rng, numeric, cap)
}

fn truncate(value: &str, cap: usize) -> String {
    value.chars().take(cap).collect()
}

fn random_value(rng: &mut ChaCha8Rng, numeric: bool, cap: usize) -> String {
    let len = rng.random_range(1..=cap);
    let alphabet: &[u8] = if numeric { b"0123456789" } else { FILL_CHARSET };
    (0..len)
        .map(|_| alphabet[rng.random_range(0..alphabet.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tn3270_host::transport::{RawField, RawScreen};
    use tn3270_host::HostAdapter;
    use tn3270_session::SessionStore;
    use tn3270_test_utils::MockTransport;

    fn unprotected_field(start: (u16, u16), end: (u16, u16)) -> RawField {
        RawField {
            start,
            end,
            protected: false,
            numeric: false,
            hidden: false,
            intensified: false,
            value: String::new(),
        }
    }

    fn screen(fields: Vec<RawField>) -> RawScreen {
        RawScreen {
            width: 80,
            height: 24,
            cursor_row: 0,
            cursor_col: 0,
            is_formatted: true,
            cells: vec![0u8; 80 * 24],
            fields,
        }
    }

    fn connected_session(screens: Vec<RawScreen>) -> Arc<Mutex<Session<MockTransport>>> {
        let mut transport = MockTransport::new();
        for s in screens {
            transport.push_screen(s);
        }
        let mut adapter = HostAdapter::new(transport);
        adapter.start().unwrap();
        let store: SessionStore<MockTransport> = SessionStore::new();
        let id = store.create(adapter);
        store.get(&id).unwrap()
    }

    #[test]
    fn start_runs_to_completion_within_max_steps() {
        let field = unprotected_field((2, 9), (2, 18));
        let screens = (0..20).map(|_| screen(vec![field.clone()])).collect();
        let session = connected_session(screens);
        let config = ChaosConfig {
            max_steps: Some(3),
            step_delay_secs: 0.0,
            seed: 42,
            ..ChaosConfig::default()
        };
        let mut engine = ChaosEngine::new("h", 23, session, config).unwrap();
        engine.start().unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if !engine.status().active {
                break;
            }
            assert!(Instant::now() < deadline, "engine did not stop within 5s");
            thread::sleep(Duration::from_millis(10));
        }
        engine.stop();
        let status = engine.status();
        assert_eq!(status.steps_run, 3);
        let total: u32 = status.aid_key_counts.values().sum();
        assert_eq!(total, 3);
        assert!(status.unique_screens >= 1);
    }

    #[test]
    fn aid_weighting_dominates_with_skewed_weights() {
        let mut weights = HashMap::new();
        weights.insert("Enter".to_string(), 70);
        weights.insert("Tab".to_string(), 10);
        weights.insert("PF1".to_string(), 10);
        weights.insert("PF3".to_string(), 5);
        weights.insert("Clear".to_string(), 5);

        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let boosts = HashMap::new();
        let mut enter_count = 0;
        for _ in 0..1000 {
            if select_aid_key(&mut rng, &weights, &boosts) == "Enter" {
                enter_count += 1;
            }
        }
        assert!(enter_count >= 500, "Enter picked {enter_count}/1000 times");
    }

    #[test]
    fn progressions_boost_a_keys_selection_weight() {
        let mut weights = HashMap::new();
        weights.insert("Enter".to_string(), 10);
        weights.insert("Tab".to_string(), 10);
        let mut boosts = HashMap::new();
        boosts.insert("Tab".to_string(), 500);

        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut tab_count = 0;
        for _ in 0..200 {
            if select_aid_key(&mut rng, &weights, &boosts) == "Tab" {
                tab_count += 1;
            }
        }
        assert!(tab_count > 150);
    }

    #[test]
    fn repeated_failure_suppresses_a_keys_selection_weight() {
        let mut weights = HashMap::new();
        weights.insert("Enter".to_string(), 50);
        weights.insert("Clear".to_string(), 50);
        let mut boosts = HashMap::new();
        boosts.insert("Clear".to_string(), -49);

        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut clear_count = 0;
        for _ in 0..500 {
            if select_aid_key(&mut rng, &weights, &boosts) == "Clear" {
                clear_count += 1;
            }
        }
        assert!(clear_count < 50);
    }

    #[test]
    fn generated_values_never_exceed_cap() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        for _ in 0..100 {
            let v = random_value(&mut rng, false, 5);
            assert!(v.len() <= 5);
            assert!(!v.is_empty());
        }
    }

    #[test]
    fn stop_before_start_is_a_no_op() {
        let field = unprotected_field((2, 9), (2, 18));
        let session = connected_session(vec![screen(vec![field])]);
        let mut engine = ChaosEngine::new("h", 23, session, ChaosConfig::default()).unwrap();
        engine.stop();
        assert!(!engine.status().active);
    }

    #[test]
    fn starting_twice_is_rejected() {
        let field = unprotected_field((2, 9), (2, 18));
        let screens = (0..20).map(|_| screen(vec![field.clone()])).collect();
        let session = connected_session(screens);
        let config = ChaosConfig {
            step_delay_secs: 0.05,
            ..ChaosConfig::default()
        };
        let mut engine = ChaosEngine::new("h", 23, session, config).unwrap();
        engine.start().unwrap();
        assert!(matches!(engine.start(), Err(ChaosError::AlreadyRunning)));
        engine.stop();
    }

    #[test]
    fn export_workflow_wraps_steps_in_connect_and_disconnect() {
        let field = unprotected_field((2, 9), (2, 18));
        let session = connected_session(vec![screen(vec![field])]);
        let engine = ChaosEngine::new("h", 23, session, ChaosConfig::default()).unwrap();
        let bytes = engine.export_workflow().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("\"Connect\""));
        assert!(text.contains("\"Disconnect\""));
    }
}
