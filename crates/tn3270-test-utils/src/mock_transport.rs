//! A scriptable [`EmulatorTransport`] backed by an in-memory queue of
//! screens and a log of every command it received, so tests can assert on
//! adapter/playback/chaos behavior without spawning a subprocess.

use std::collections::VecDeque;

use tn3270_host::transport::{EmulatorTransport, RawScreen};
use tn3270_host::HostError;

/// One call the mock recorded, for assertions in calling tests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordedCall {
    Start,
    SubmitScreen,
    SubmitUnformatted(String),
    WriteStringAt(u16, u16, String),
    SendKey(String),
    MoveCursor(u16, u16),
}

/// A mock [`EmulatorTransport`]. Queue screens with
/// [`push_screen`](Self::push_screen); every `query_screen` call pops the
/// front of the queue, returning [`HostError::IoError`] once it is empty
/// unless [`fail_start`](Self::fail_start) or
/// [`die_after`](Self::die_after) are configured.
#[derive(Default)]
pub struct MockTransport {
    alive: bool,
    screens: VecDeque<RawScreen>,
    pub calls: Vec<RecordedCall>,
    fail_start: bool,
    die_after: Option<usize>,
    queries_seen: usize,
}

impl MockTransport {
    /// A mock that starts successfully and has no screens queued.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a screen to be returned by the next `query_screen` call.
    pub fn push_screen(&mut self, screen: RawScreen) -> &mut Self {
        self.screens.push_back(screen);
        self
    }

    /// Make `start()` fail with `HostStartFailed`.
    pub fn fail_start(&mut self) -> &mut Self {
        self.fail_start = true;
        self
    }

    /// Make the `n`th `query_screen` call (1-based) report an I/O error,
    /// simulating the subprocess exiting mid-session.
    pub fn die_after(&mut self, n: usize) -> &mut Self {
        self.die_after = Some(n);
        self
    }
}

impl EmulatorTransport for MockTransport {
    fn start(&mut self) -> Result<(), HostError> {
        self.calls.push(RecordedCall::Start);
        if self.fail_start {
            return Err(HostError::StartFailed {
                reason: "mock configured to fail".into(),
            });
        }
        self.alive = true;
        Ok(())
    }

    fn is_alive(&self) -> bool {
        self.alive
    }

    fn shutdown(&mut self) {
        self.alive = false;
    }

    fn query_screen(&mut self) -> Result<RawScreen, HostError> {
        self.queries_seen += 1;
        if self.die_after == Some(self.queries_seen) {
            self.alive = false;
            return Err(HostError::IoError {
                reason: "mock subprocess exited".into(),
            });
        }
        self.screens.pop_front().ok_or(HostError::IoError {
            reason: "mock has no screen queued".into(),
        })
    }

    fn submit_screen(&mut self) -> Result<(), HostError> {
        self.calls.push(RecordedCall::SubmitScreen);
        Ok(())
    }

    fn submit_unformatted(&mut self, text: &str) -> Result<(), HostError> {
        self.calls
            .push(RecordedCall::SubmitUnformatted(text.to_string()));
        Ok(())
    }

    fn write_string_at(&mut self, row: u16, col: u16, text: &str) -> Result<(), HostError> {
        self.calls
            .push(RecordedCall::WriteStringAt(row, col, text.to_string()));
        Ok(())
    }

    fn send_key(&mut self, aid: &str) -> Result<(), HostError> {
        self.calls.push(RecordedCall::SendKey(aid.to_string()));
        Ok(())
    }

    fn move_cursor(&mut self, row: u16, col: u16) -> Result<(), HostError> {
        self.calls.push(RecordedCall::MoveCursor(row, col));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_calls_in_order() {
        let mut t = MockTransport::new();
        t.start().unwrap();
        t.send_key("Enter").unwrap();
        assert_eq!(
            t.calls,
            vec![RecordedCall::Start, RecordedCall::SendKey("Enter".into())]
        );
    }

    #[test]
    fn die_after_reports_io_error_on_the_nth_query() {
        let mut t = MockTransport::new();
        t.push_screen(crate::fixtures::blank_screen(80, 24));
        t.push_screen(crate::fixtures::blank_screen(80, 24));
        t.die_after(2);
        t.start().unwrap();
        assert!(t.query_screen().is_ok());
        assert!(t.query_screen().is_err());
        assert!(!t.is_alive());
    }
}
