//! The Host Adapter (C1): owns one emulator transport per session and
//! projects its state into a [`Screen`].

use tn3270_core::{Aid, Field, FieldAttrs, Screen};

use crate::error::HostError;
use crate::transport::{EmulatorTransport, RawField};

/// Owns one emulator transport and the last [`Screen`] snapshot pulled
/// from it.
///
/// `HostAdapter` is generic over [`EmulatorTransport`] so tests can swap
/// in `tn3270-test-utils`'s mock without spawning a subprocess; the
/// production path uses [`crate::transport::ProcessTransport`].
pub struct HostAdapter<T: EmulatorTransport> {
    transport: T,
    connected: bool,
    last_screen: Option<Screen>,
}

impl<T: EmulatorTransport> HostAdapter<T> {
    /// Wrap a not-yet-started transport.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            connected: false,
            last_screen: None,
        }
    }

    /// Spawn the emulator and block until it reports ready.
    pub fn start(&mut self) -> Result<(), HostError> {
        self.transport.start()?;
        self.connected = true;
        Ok(())
    }

    /// Terminate the subprocess. Idempotent.
    pub fn stop(&mut self) {
        self.transport.shutdown();
        self.connected = false;
    }

    /// Whether the adapter believes it has a live connection.
    ///
    /// A prior I/O failure already downgrades this to `false` — see the
    /// failure model in §4.1: once `updateScreen` reports `HostIoError`,
    /// the session is unusable until `start()` is called again.
    pub fn is_connected(&self) -> bool {
        self.connected && self.transport.is_alive()
    }

    /// Query the emulator for its current buffer and refresh the cached
    /// snapshot. A subprocess exit surfaces as [`HostError::IoError`] and
    /// marks the adapter disconnected.
    pub fn update_screen(&mut self) -> Result<(), HostError> {
        if !self.connected {
            return Err(HostError::NotConnected);
        }
        match self.transport.query_screen() {
            Ok(raw) => {
                self.last_screen = Some(decode_screen(raw));
                Ok(())
            }
            Err(err) => {
                self.connected = false;
                Err(err)
            }
        }
    }

    /// The last snapshot taken by [`Self::update_screen`]. No I/O.
    pub fn get_screen(&self) -> Option<&Screen> {
        self.last_screen.as_ref()
    }

    /// Send buffered field modifications as a screen write.
    pub fn submit_screen(&mut self) -> Result<(), HostError> {
        self.require_connected()?;
        self.transport.submit_screen().inspect_err(|_| self.connected = false)
    }

    /// Submit free text on a non-formatted screen.
    pub fn submit_unformatted(&mut self, text: &str) -> Result<(), HostError> {
        self.require_connected()?;
        self.transport
            .submit_unformatted(text)
            .inspect_err(|_| self.connected = false)
    }

    /// Position and write one field's worth of text. Coordinates are
    /// 0-based; out-of-bounds coordinates are rejected before any I/O.
    pub fn write_string_at(&mut self, row: u16, col: u16, text: &str) -> Result<(), HostError> {
        self.require_connected()?;
        if let Some(screen) = &self.last_screen {
            if row >= screen.height || col >= screen.width {
                return Err(HostError::WriteOutOfBounds { row, col });
            }
        }
        self.transport
            .write_string_at(row, col, text)
            .inspect_err(|_| self.connected = false)
    }

    /// Send one Attention Identifier. Only canonical names are forwarded
    /// — callers must normalize through [`Aid::normalize`] first, since
    /// the transport has no way to distinguish a malicious string from a
    /// typo once it reaches this layer.
    pub fn send_key(&mut self, aid: Aid) -> Result<(), HostError> {
        self.require_connected()?;
        self.transport
            .send_key(&aid.canonical_name())
            .inspect_err(|_| self.connected = false)
    }

    /// Move the cursor without submitting.
    pub fn move_cursor(&mut self, row: u16, col: u16) -> Result<(), HostError> {
        self.require_connected()?;
        self.transport
            .move_cursor(row, col)
            .inspect_err(|_| self.connected = false)
    }

    fn require_connected(&self) -> Result<(), HostError> {
        if self.connected {
            Ok(())
        } else {
            Err(HostError::NotConnected)
        }
    }
}

fn decode_screen(raw: crate::transport::RawScreen) -> Screen {
    let fields = raw.fields.into_iter().map(decode_field).collect();
    Screen::new(
        raw.width,
        raw.height,
        raw.cells,
        raw.cursor_row,
        raw.cursor_col,
        raw.is_formatted,
        fields,
    )
}

fn decode_field(raw: RawField) -> Field {
    Field {
        start: raw.start,
        end: raw.end,
        attrs: FieldAttrs {
            protected: raw.protected,
            numeric: raw.numeric,
            hidden: raw.hidden,
            intensified: raw.intensified,
        },
        value: raw.value,
        changed: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::RawScreen;
    use std::collections::VecDeque;

    #[derive(Default)]
    struct FakeTransport {
        alive: bool,
        fail_next_query: bool,
        screens: VecDeque<RawScreen>,
    }

    impl EmulatorTransport for FakeTransport {
        fn start(&mut self) -> Result<(), HostError> {
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
            if self.fail_next_query {
                return Err(HostError::IoError {
                    reason: "pipe closed".into(),
                });
            }
            self.screens.pop_front().ok_or(HostError::IoError {
                reason: "no screen queued".into(),
            })
        }
        fn submit_screen(&mut self) -> Result<(), HostError> {
            Ok(())
        }
        fn submit_unformatted(&mut self, _text: &str) -> Result<(), HostError> {
            Ok(())
        }
        fn write_string_at(&mut self, _row: u16, _col: u16, _text: &str) -> Result<(), HostError> {
            Ok(())
        }
        fn send_key(&mut self, _aid: &str) -> Result<(), HostError> {
            Ok(())
        }
        fn move_cursor(&mut self, _row: u16, _col: u16) -> Result<(), HostError> {
            Ok(())
        }
    }

    fn blank_raw(width: u16, height: u16) -> RawScreen {
        RawScreen {
            width,
            height,
            cursor_row: 0,
            cursor_col: 0,
            is_formatted: true,
            cells: vec![0u8; width as usize * height as usize],
            fields: vec![],
        }
    }

    #[test]
    fn operations_before_start_are_not_connected() {
        let mut adapter = HostAdapter::new(FakeTransport::default());
        assert!(!adapter.is_connected());
        assert_eq!(adapter.submit_screen(), Err(HostError::NotConnected));
    }

    #[test]
    fn update_screen_populates_snapshot() {
        let mut transport = FakeTransport::default();
        transport.screens.push_back(blank_raw(80, 24));
        let mut adapter = HostAdapter::new(transport);
        adapter.start().unwrap();
        adapter.update_screen().unwrap();
        assert_eq!(adapter.get_screen().unwrap().width, 80);
    }

    #[test]
    fn io_failure_marks_session_disconnected() {
        let mut transport = FakeTransport::default();
        transport.fail_next_query = true;
        let mut adapter = HostAdapter::new(transport);
        adapter.start().unwrap();
        assert!(adapter.update_screen().is_err());
        assert!(!adapter.is_connected());
        assert_eq!(adapter.submit_screen(), Err(HostError::NotConnected));
    }

    #[test]
    fn write_string_at_rejects_out_of_bounds() {
        let mut transport = FakeTransport::default();
        transport.screens.push_back(blank_raw(80, 24));
        let mut adapter = HostAdapter::new(transport);
        adapter.start().unwrap();
        adapter.update_screen().unwrap();
        assert_eq!(
            adapter.write_string_at(24, 0, "x"),
            Err(HostError::WriteOutOfBounds { row: 24, col: 0 })
        );
    }
}
