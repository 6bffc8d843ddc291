//! The line-protocol boundary between the Host Adapter and an emulator
//! subprocess.
//!
//! [`EmulatorTransport`] is deliberately narrow: [`crate::adapter::HostAdapter`]
//! owns all screen/field decoding, AID validation, and retry policy. A
//! transport only has to move lines back and forth. This keeps the
//! subprocess itself swappable — a native library binding or an
//! in-process emulator can implement the same trait without the adapter
//! changing at all.

use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use crate::error::HostError;

/// One decoded field from a `SCREEN` reply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawField {
    /// First cell, inclusive.
    pub start: (u16, u16),
    /// Last cell, inclusive.
    pub end: (u16, u16),
    /// Read-only.
    pub protected: bool,
    /// Digits-only.
    pub numeric: bool,
    /// Not echoed.
    pub hidden: bool,
    /// Displayed bright.
    pub intensified: bool,
    /// Current field contents.
    pub value: String,
}

/// The raw reply to a `SCREEN` query, before [`crate::adapter::HostAdapter`]
/// turns it into a [`tn3270_core::Screen`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawScreen {
    /// Display width in columns.
    pub width: u16,
    /// Display height in rows.
    pub height: u16,
    /// 0-based cursor row.
    pub cursor_row: u16,
    /// 0-based cursor column.
    pub cursor_col: u16,
    /// Whether the buffer is attribute-demarcated.
    pub is_formatted: bool,
    /// Row-major display codes, `width * height` long.
    pub cells: Vec<u8>,
    /// Decoded fields in reading order.
    pub fields: Vec<RawField>,
}

/// The opaque line-protocol peer the Host Adapter drives.
///
/// Every method is one blocking round trip. A reimplementation may swap a
/// subprocess for a native library binding or an in-process emulator as
/// long as it honors this contract — see §4.1's "subprocess as
/// collaborator" note.
pub trait EmulatorTransport: Send {
    /// Spawn the peer and block until it reports ready.
    fn start(&mut self) -> Result<(), HostError>;
    /// Whether the peer is still reachable.
    fn is_alive(&self) -> bool;
    /// Terminate the peer. Idempotent.
    fn shutdown(&mut self);
    /// Ask the peer for its current screen buffer.
    fn query_screen(&mut self) -> Result<RawScreen, HostError>;
    /// Transmit buffered field edits as a screen write.
    fn submit_screen(&mut self) -> Result<(), HostError>;
    /// Submit free text on a non-formatted screen.
    fn submit_unformatted(&mut self, text: &str) -> Result<(), HostError>;
    /// Position and write one field's worth of text (0-based coordinates).
    fn write_string_at(&mut self, row: u16, col: u16, text: &str) -> Result<(), HostError>;
    /// Send one canonical AID key name.
    fn send_key(&mut self, canonical_aid: &str) -> Result<(), HostError>;
    /// Move the cursor without submitting.
    fn move_cursor(&mut self, row: u16, col: u16) -> Result<(), HostError>;
}

/// Spawn arguments for the subprocess emulator.
#[derive(Clone, Debug)]
pub struct ProcessTransportConfig {
    /// Executable to spawn (an emulator binary or wrapper script).
    pub program: String,
    /// Arguments, typically including the target host/port.
    pub args: Vec<String>,
}

/// [`EmulatorTransport`] backed by a `std::process::Child` speaking a
/// NUL-free line protocol over stdin/stdout: one command per line out,
/// one `OK`/`ERR <reason>` (or a `SCREEN`…`END` block) per reply in.
pub struct ProcessTransport {
    config: ProcessTransportConfig,
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stdout: Option<BufReader<ChildStdout>>,
}

impl ProcessTransportConfig {
    /// Build spawn arguments from a [`crate::config::HostConfig`].
    pub fn from_host_config(cfg: &crate::config::HostConfig) -> Self {
        Self {
            program: cfg.program.clone(),
            args: cfg.args(),
        }
    }
}

impl ProcessTransport {
    /// Build a transport for the given subprocess command. Does not spawn
    /// until [`EmulatorTransport::start`] is called.
    pub fn new(config: ProcessTransportConfig) -> Self {
        Self {
            config,
            child: None,
            stdin: None,
            stdout: None,
        }
    }

    fn send_line(&mut self, line: &str) -> Result<(), HostError> {
        let stdin = self.stdin.as_mut().ok_or(HostError::NotConnected)?;
        writeln!(stdin, "{line}").map_err(|e| io_err(&e))?;
        stdin.flush().map_err(|e| io_err(&e))
    }

    fn read_line(&mut self) -> Result<String, HostError> {
        let stdout = self.stdout.as_mut().ok_or(HostError::NotConnected)?;
        let mut line = String::new();
        let n = stdout.read_line(&mut line).map_err(|e| io_err(&e))?;
        if n == 0 {
            return Err(HostError::IoError {
                reason: "emulator closed stdout".into(),
            });
        }
        Ok(line.trim_end_matches(['\n', '\r']).to_string())
    }

    fn expect_ok(&mut self) -> Result<(), HostError> {
        let reply = self.read_line()?;
        if reply == "OK" {
            Ok(())
        } else if let Some(reason) = reply.strip_prefix("ERR ") {
            Err(HostError::IoError {
                reason: reason.to_string(),
            })
        } else {
            Err(HostError::IoError {
                reason: format!("unexpected reply: {reply}"),
            })
        }
    }

    fn command_ok(&mut self, line: &str) -> Result<(), HostError> {
        self.send_line(line)?;
        self.expect_ok()
    }
}

impl EmulatorTransport for ProcessTransport {
    fn start(&mut self) -> Result<(), HostError> {
        let mut child = Command::new(&self.config.program)
            .args(&self.config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| HostError::StartFailed {
                reason: e.to_string(),
            })?;
        let stdin = child.stdin.take().ok_or_else(|| HostError::StartFailed {
            reason: "no stdin pipe".into(),
        })?;
        let stdout = child.stdout.take().ok_or_else(|| HostError::StartFailed {
            reason: "no stdout pipe".into(),
        })?;
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stdout = Some(BufReader::new(stdout));

        let ready = self.read_line().map_err(|e| HostError::StartFailed {
            reason: e.to_string(),
        })?;
        if ready != "READY" {
            return Err(HostError::StartFailed {
                reason: format!("expected READY, got {ready}"),
            });
        }
        Ok(())
    }

    fn is_alive(&self) -> bool {
        self.child.is_some()
    }

    fn shutdown(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = self.send_line("QUIT");
            let _ = child.kill();
            let _ = child.wait();
        }
        self.stdin = None;
        self.stdout = None;
    }

    fn query_screen(&mut self) -> Result<RawScreen, HostError> {
        self.send_line("SCREEN")?;
        let header = self.read_line()?;
        let mut parts = header.split_whitespace();
        let tag = parts.next().unwrap_or_default();
        if tag != "SCREEN" {
            return Err(HostError::IoError {
                reason: format!("expected SCREEN header, got {header}"),
            });
        }
        let (width, height, cursor_row, cursor_col, is_formatted, field_count) =
            parse_screen_header(&mut parts)?;

        let mut cells = Vec::with_capacity(width as usize * height as usize);
        for _ in 0..height {
            let row_hex = self.read_line()?;
            cells.extend(decode_hex(&row_hex)?);
        }

        let mut fields = Vec::with_capacity(field_count);
        for _ in 0..field_count {
            let line = self.read_line()?;
            fields.push(parse_field_line(&line)?);
        }

        let end = self.read_line()?;
        if end != "END" {
            return Err(HostError::IoError {
                reason: format!("expected END, got {end}"),
            });
        }

        Ok(RawScreen {
            width,
            height,
            cursor_row,
            cursor_col,
            is_formatted,
            cells,
            fields,
        })
    }

    fn submit_screen(&mut self) -> Result<(), HostError> {
        self.command_ok("SUBMIT")
    }

    fn submit_unformatted(&mut self, text: &str) -> Result<(), HostError> {
        self.command_ok(&format!("UNFORMATTED {}", encode_hex(text.as_bytes())))
    }

    fn write_string_at(&mut self, row: u16, col: u16, text: &str) -> Result<(), HostError> {
        self.command_ok(&format!(
            "WRITE {row} {col} {}",
            encode_hex(text.as_bytes())
        ))
    }

    fn send_key(&mut self, canonical_aid: &str) -> Result<(), HostError> {
        self.command_ok(&format!("KEY {canonical_aid}"))
    }

    fn move_cursor(&mut self, row: u16, col: u16) -> Result<(), HostError> {
        self.command_ok(&format!("MOVE {row} {col}"))
    }
}

impl Drop for ProcessTransport {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn parse_screen_header(
    parts: &mut std::str::SplitWhitespace<'_>,
) -> Result<(u16, u16, u16, u16, bool, usize), HostError> {
    let bad = || HostError::IoError {
        reason: "malformed SCREEN header".into(),
    };
    let width: u16 = parts.next().ok_or_else(bad)?.parse().map_err(|_| bad())?;
    let height: u16 = parts.next().ok_or_else(bad)?.parse().map_err(|_| bad())?;
    let cursor_row: u16 = parts.next().ok_or_else(bad)?.parse().map_err(|_| bad())?;
    let cursor_col: u16 = parts.next().ok_or_else(bad)?.parse().map_err(|_| bad())?;
    let is_formatted: u8 = parts.next().ok_or_else(bad)?.parse().map_err(|_| bad())?;
    let field_count: usize = parts.next().ok_or_else(bad)?.parse().map_err(|_| bad())?;
    Ok((width, height, cursor_row, cursor_col, is_formatted != 0, field_count))
}

fn parse_field_line(line: &str) -> Result<RawField, HostError> {
    let bad = || HostError::IoError {
        reason: format!("malformed field line: {line}"),
    };
    let mut parts = line.splitn(9, ' ');
    let start_row: u16 = parts.next().ok_or_else(bad)?.parse().map_err(|_| bad())?;
    let start_col: u16 = parts.next().ok_or_else(bad)?.parse().map_err(|_| bad())?;
    let end_row: u16 = parts.next().ok_or_else(bad)?.parse().map_err(|_| bad())?;
    let end_col: u16 = parts.next().ok_or_else(bad)?.parse().map_err(|_| bad())?;
    let protected: u8 = parts.next().ok_or_else(bad)?.parse().map_err(|_| bad())?;
    let numeric: u8 = parts.next().ok_or_else(bad)?.parse().map_err(|_| bad())?;
    let hidden: u8 = parts.next().ok_or_else(bad)?.parse().map_err(|_| bad())?;
    let intensified: u8 = parts.next().ok_or_else(bad)?.parse().map_err(|_| bad())?;
    let value_hex = parts.next().unwrap_or("");
    let value = String::from_utf8(decode_hex(value_hex)?).map_err(|_| bad())?;
    Ok(RawField {
        start: (start_row, start_col),
        end: (end_row, end_col),
        protected: protected != 0,
        numeric: numeric != 0,
        hidden: hidden != 0,
        intensified: intensified != 0,
        value,
    })
}

fn encode_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn decode_hex(s: &str) -> Result<Vec<u8>, HostError> {
    if s.len() % 2 != 0 {
        return Err(HostError::IoError {
            reason: format!("odd-length hex payload: {s}"),
        });
    }
    (0..s.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&s[i..i + 2], 16).map_err(|_| HostError::IoError {
                reason: format!("invalid hex byte at offset {i}: {s}"),
            })
        })
        .collect()
}

fn io_err(e: &std::io::Error) -> HostError {
    HostError::IoError {
        reason: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_round_trips() {
        let bytes = b"Hello, TSO!";
        assert_eq!(decode_hex(&encode_hex(bytes)).unwrap(), bytes);
    }

    #[test]
    fn decode_hex_rejects_odd_length() {
        assert!(decode_hex("abc").is_err());
    }

    #[test]
    fn parse_field_line_round_trips() {
        let line = format!("2 10 2 19 1 0 0 1 {}", encode_hex(b"HELLO"));
        let f = parse_field_line(&line).unwrap();
        assert_eq!(f.start, (2, 10));
        assert_eq!(f.end, (2, 19));
        assert!(f.protected);
        assert!(!f.numeric);
        assert!(f.intensified);
        assert_eq!(f.value, "HELLO");
    }
}
