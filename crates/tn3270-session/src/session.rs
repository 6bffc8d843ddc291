//! The Session Store (C3): a `sessionId -> Session` map guarded by one
//! mutex per entry.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tn3270_core::SessionId;
use tn3270_host::{EmulatorTransport, HostAdapter};

/// Everything one caller's interactive session owns.
///
/// Every mutation of a `Session`'s fields happens under its own lock (see
/// [`SessionStore::get`]); the store's outer mutex only ever guards the
/// map's shape (insert/remove), never a session's contents, so two
/// sessions never contend on each other's state.
pub struct Session<T: EmulatorTransport> {
    id: SessionId,
    adapter: HostAdapter<T>,
}

impl<T: EmulatorTransport> Session<T> {
    /// This session's id.
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// The Host Adapter this session owns.
    pub fn adapter(&self) -> &HostAdapter<T> {
        &self.adapter
    }

    /// Mutable access to the Host Adapter.
    pub fn adapter_mut(&mut self) -> &mut HostAdapter<T> {
        &mut self.adapter
    }
}

/// A thread-safe `sessionId -> Session` map.
///
/// `create` allocates an opaque, unguessable id (see
/// [`tn3270_core::SessionId`]) — the store never interprets it, only uses
/// it as a map key. `remove` stops the adapter before dropping the entry
/// so the emulator subprocess never leaks past session teardown.
pub struct SessionStore<T: EmulatorTransport> {
    sessions: Mutex<HashMap<SessionId, Arc<Mutex<Session<T>>>>>,
}

impl<T: EmulatorTransport> SessionStore<T> {
    /// An empty store.
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Allocate a fresh session around `host` and register it.
    pub fn create(&self, host: HostAdapter<T>) -> SessionId {
        let id = SessionId::generate();
        let session = Session {
            id: id.clone(),
            adapter: host,
        };
        self.sessions
            .lock()
            .expect("session map mutex poisoned")
            .insert(id.clone(), Arc::new(Mutex::new(session)));
        id
    }

    /// Look up a session by id, if present.
    pub fn get(&self, id: &SessionId) -> Option<Arc<Mutex<Session<T>>>> {
        self.sessions
            .lock()
            .expect("session map mutex poisoned")
            .get(id)
            .cloned()
    }

    /// Stop the adapter and remove the session. Returns `false` if `id`
    /// was not found.
    pub fn remove(&self, id: &SessionId) -> bool {
        let removed = self
            .sessions
            .lock()
            .expect("session map mutex poisoned")
            .remove(id);
        match removed {
            Some(session) => {
                session
                    .lock()
                    .expect("session mutex poisoned")
                    .adapter
                    .stop();
                true
            }
            None => false,
        }
    }

    /// Number of active sessions.
    pub fn len(&self) -> usize {
        self.sessions.lock().expect("session map mutex poisoned").len()
    }

    /// Whether the store holds no sessions.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: EmulatorTransport> Default for SessionStore<T> {
    fn default() -> Self {
        Self::new()
    }
}
