//! The Chaos Controller (C9): a per-session registry of [`ChaosEngine`]s
//! and staged [`SavedRun`]s, backed by one shared sidecar thread that
//! mirrors engine status and auto-saves completed runs (§4.9).

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tn3270_chaos::{ChaosConfig, ChaosEngine, ChaosStatus, SavedRun};
use tn3270_core::{RunId, SessionId};
use tn3270_host::EmulatorTransport;
use tn3270_persistence::RunStore;
use tn3270_session::SessionStore;

use crate::error::ControllerError;

const SIDECAR_INTERVAL: Duration = Duration::from_millis(500);

struct Registry<T: EmulatorTransport> {
    engines: HashMap<SessionId, (String, u16, ChaosEngine<T>)>,
    staged_runs: HashMap<SessionId, SavedRun>,
    removed_run_ids: HashSet<String>,
}

impl<T: EmulatorTransport> Registry<T> {
    fn new() -> Self {
        Self {
            engines: HashMap::new(),
            staged_runs: HashMap::new(),
            removed_run_ids: HashSet::new(),
        }
    }
}

/// Owns the per-session chaos engine registry and the background sidecar
/// that mirrors their status and auto-saves finished runs.
pub struct ChaosController<T: EmulatorTransport> {
    run_store: Arc<RunStore>,
    registry: Arc<Mutex<Registry<T>>>,
    sidecar_stop: Arc<AtomicBool>,
    sidecar_handle: Option<JoinHandle<()>>,
}

impl<T: EmulatorTransport + Send + 'static> ChaosController<T> {
    /// Start a controller backed by `run_store`, spawning the shared
    /// 500ms status-mirror sidecar.
    pub fn new(run_store: RunStore) -> Self {
        let run_store = Arc::new(run_store);
        let registry = Arc::new(Mutex::new(Registry::new()));
        let sidecar_stop = Arc::new(AtomicBool::new(false));

        let sidecar_handle = {
            let run_store = run_store.clone();
            let registry = registry.clone();
            let stop = sidecar_stop.clone();
            thread::Builder::new()
                .name("chaos-controller-sidecar".into())
                .spawn(move || sidecar_loop(registry, run_store, stop))
                .expect("failed to spawn chaos controller sidecar thread")
        };

        Self {
            run_store,
            registry,
            sidecar_stop,
            sidecar_handle: Some(sidecar_handle),
        }
    }

    /// Start a new chaos run against `session_id`, targeting `host:port`
    /// for the resulting [`SavedRun`]/exported workflow.
    pub fn start_chaos(
        &self,
        session_store: &SessionStore<T>,
        session_id: &SessionId,
        host: impl Into<String>,
        port: u16,
        config: ChaosConfig,
    ) -> Result<(), ControllerError> {
        let session = session_store.get(session_id).ok_or_else(|| ControllerError::SessionNotFound(session_id.clone()))?;
        let host = host.into();
        let mut engine = ChaosEngine::new(host.clone(), port, session, config)?;
        engine.start()?;

        let mut registry = self.registry.lock().expect("controller registry mutex poisoned");
        registry.engines.insert(session_id.clone(), (host, port, engine));
        Ok(())
    }

    /// Load `run_id` from the run store and stage it against
    /// `session_id`, ready for [`Self::resume_chaos`].
    pub fn stage_run(&self, session_id: &SessionId, run_id: &str) -> Result<(), ControllerError> {
        let saved = self.run_store.load(run_id)?;
        self.registry
            .lock()
            .expect("controller registry mutex poisoned")
            .staged_runs
            .insert(session_id.clone(), saved);
        Ok(())
    }

    /// Resume the run staged for `session_id` via [`Self::stage_run`].
    pub fn resume_chaos(
        &self,
        session_store: &SessionStore<T>,
        session_id: &SessionId,
        config: ChaosConfig,
    ) -> Result<(), ControllerError> {
        let session = session_store.get(session_id).ok_or_else(|| ControllerError::SessionNotFound(session_id.clone()))?;
        let saved = {
            let mut registry = self.registry.lock().expect("controller registry mutex poisoned");
            registry.staged_runs.remove(session_id).ok_or(ControllerError::NoRunStaged)?
        };
        let host = saved.host.clone();
        let port = saved.port;
        let mut engine = ChaosEngine::new(host.clone(), port, session, config)?;
        engine.resume(saved)?;

        let mut registry = self.registry.lock().expect("controller registry mutex poisoned");
        registry.engines.insert(session_id.clone(), (host, port, engine));
        Ok(())
    }

    /// Stop the chaos run for `session_id`, if one is active. A no-op if
    /// none is registered.
    pub fn stop_chaos(&self, session_id: &SessionId) {
        let mut registry = self.registry.lock().expect("controller registry mutex poisoned");
        if let Some((_, _, mut engine)) = registry.engines.remove(session_id) {
            engine.stop();
        }
    }

    /// A live status snapshot for `session_id`'s chaos run.
    pub fn status(&self, session_id: &SessionId) -> Result<ChaosStatus, ControllerError> {
        let registry = self.registry.lock().expect("controller registry mutex poisoned");
        let (_, _, engine) = registry.engines.get(session_id).ok_or_else(|| ControllerError::SessionNotFound(session_id.clone()))?;
        Ok(engine.status())
    }

    /// Snapshot and persist `session_id`'s run under a freshly minted id,
    /// returning that id.
    pub fn save_run(&self, session_id: &SessionId) -> Result<String, ControllerError> {
        let registry = self.registry.lock().expect("controller registry mutex poisoned");
        let (_, _, engine) = registry.engines.get(session_id).ok_or_else(|| ControllerError::SessionNotFound(session_id.clone()))?;
        let id = RunId::generate().to_string();
        let saved = engine.snapshot(id.clone());
        self.run_store.save(&saved)?;
        Ok(id)
    }

    /// Delete a saved run. The id is tombstoned so a sidecar auto-save
    /// already in flight under that id cannot resurrect it.
    pub fn remove_run(&self, run_id: &str) -> Result<(), ControllerError> {
        self.run_store.delete(run_id)?;
        self.registry
            .lock()
            .expect("controller registry mutex poisoned")
            .removed_run_ids
            .insert(run_id.to_string());
        Ok(())
    }

    /// Export `session_id`'s accumulated steps as a workflow document. If
    /// `preferred_path` is given and a file already exists there, the
    /// export is rewritten to `<stem>-chaos<ext>` beside it instead of
    /// overwriting.
    pub fn export_workflow(
        &self,
        session_id: &SessionId,
        preferred_path: Option<&Path>,
    ) -> Result<(Vec<u8>, Option<PathBuf>), ControllerError> {
        let registry = self.registry.lock().expect("controller registry mutex poisoned");
        let (_, _, engine) = registry.engines.get(session_id).ok_or_else(|| ControllerError::SessionNotFound(session_id.clone()))?;
        let bytes = engine.export_workflow()?;
        let path = preferred_path.map(resolve_output_path);
        Ok((bytes, path))
    }
}

impl<T: EmulatorTransport> Drop for ChaosController<T> {
    fn drop(&mut self) {
        self.sidecar_stop.store(true, Ordering::SeqCst);
        if let Some(handle) = &self.sidecar_handle {
            handle.thread().unpark();
        }
        if let Some(handle) = self.sidecar_handle.take() {
            let _ = handle.join();
        }
    }
}

/// Rewrite `path` to `<stem>-chaos<ext>` if something already occupies
/// it, leaving it unchanged otherwise.
fn resolve_output_path(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }
    let stem = path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
    let ext = path.extension().map(|e| format!(".{}", e.to_string_lossy())).unwrap_or_default();
    path.with_file_name(format!("{stem}-chaos{ext}"))
}

fn sidecar_loop<T: EmulatorTransport + 'static>(registry: Arc<Mutex<Registry<T>>>, run_store: Arc<RunStore>, stop: Arc<AtomicBool>) {
    loop {
        if stop.load(Ordering::SeqCst) {
            return;
        }
        thread::park_timeout(SIDECAR_INTERVAL);
        if stop.load(Ordering::SeqCst) {
            return;
        }

        let mut registry = registry.lock().expect("controller registry mutex poisoned");
        let finished: Vec<SessionId> = registry
            .engines
            .iter()
            .filter(|(_, (_, _, engine))| !engine.status().active)
            .map(|(id, _)| id.clone())
            .collect();

        for session_id in finished {
            if let Some((host, port, mut engine)) = registry.engines.remove(&session_id) {
                engine.stop();
                let id = RunId::generate().to_string();
                if !registry.removed_run_ids.contains(&id) {
                    let saved = engine.snapshot(id);
                    if let Err(e) = run_store.save(&saved) {
                        tracing::debug!(session = %session_id, host, port, error = %e, "auto-save of completed chaos run failed");
                    }
                }
            }
        }
    }
}
