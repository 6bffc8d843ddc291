//! Canonical Attention Identifier (AID) keys and the normalization grammar.
//!
//! [`Aid::normalize`] is the single security-critical boundary between
//! caller-supplied strings (HTTP form fields, workflow documents, chaos
//! exploration choices) and the Host Adapter: every other component calls
//! it before forwarding a key name, and the adapter only ever accepts
//! already-canonical [`Aid`] values.

use std::fmt;

/// One canonical 3270 Attention Identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Aid {
    /// Transmits the screen (the common case).
    Enter,
    /// Moves the cursor to the next unprotected field.
    Tab,
    /// Moves the cursor to the previous unprotected field.
    BackTab,
    /// Clears the screen.
    Clear,
    /// Resets the keyboard/insert state.
    Reset,
    /// Erases from the cursor to the end of the current field.
    EraseEof,
    /// Erases all unprotected fields.
    EraseInput,
    /// Duplicates the field above into the current field.
    Dup,
    /// Inserts a field-mark character.
    FieldMark,
    /// System request (attention to VTAM).
    SysReq,
    /// Attention key.
    Attn,
    /// Moves to the first unprotected field of the next line.
    Newline,
    /// Deletes the character before the cursor.
    Backspace,
    /// Deletes the character at the cursor.
    Delete,
    /// Toggles insert mode.
    Insert,
    /// Moves the cursor to the first unprotected field.
    Home,
    /// Cursor up.
    Up,
    /// Cursor down.
    Down,
    /// Cursor left.
    Left,
    /// Cursor right.
    Right,
    /// Program Function key, 1 through 24.
    Pf(u8),
    /// Program Attention key, 1 through 3.
    Pa(u8),
}

impl Aid {
    /// Canonical wire name, e.g. `"Enter"`, `"PF12"`, `"PA2"`.
    ///
    /// This is the name recorded in workflow documents (prefixed with
    /// `Press`, see `tn3270-recording`) and the only input form the Host
    /// Adapter accepts.
    pub fn canonical_name(&self) -> String {
        match self {
            Aid::Enter => "Enter".into(),
            Aid::Tab => "Tab".into(),
            Aid::BackTab => "BackTab".into(),
            Aid::Clear => "Clear".into(),
            Aid::Reset => "Reset".into(),
            Aid::EraseEof => "EraseEOF".into(),
            Aid::EraseInput => "EraseInput".into(),
            Aid::Dup => "Dup".into(),
            Aid::FieldMark => "FieldMark".into(),
            Aid::SysReq => "SysReq".into(),
            Aid::Attn => "Attn".into(),
            Aid::Newline => "Newline".into(),
            Aid::Backspace => "BackSpace".into(),
            Aid::Delete => "Delete".into(),
            Aid::Insert => "Insert".into(),
            Aid::Home => "Home".into(),
            Aid::Up => "Up".into(),
            Aid::Down => "Down".into(),
            Aid::Left => "Left".into(),
            Aid::Right => "Right".into(),
            Aid::Pf(n) => format!("PF{n}"),
            Aid::Pa(n) => format!("PA{n}"),
        }
    }

    /// Every canonical AID the chaos engine's key-weighting table may
    /// reference, `Enter` first (the default fallback and the adaptivity
    /// engine's natural starting bias).
    pub fn all() -> Vec<Aid> {
        let mut v = vec![
            Aid::Enter,
            Aid::Tab,
            Aid::BackTab,
            Aid::Clear,
            Aid::Reset,
            Aid::EraseEof,
            Aid::EraseInput,
            Aid::Dup,
            Aid::FieldMark,
            Aid::SysReq,
            Aid::Attn,
            Aid::Newline,
            Aid::Backspace,
            Aid::Delete,
            Aid::Insert,
            Aid::Home,
            Aid::Up,
            Aid::Down,
            Aid::Left,
            Aid::Right,
        ];
        v.extend((1..=24).map(Aid::Pf));
        v.extend((1..=3).map(Aid::Pa));
        v
    }

    /// Normalize a caller-supplied string to a canonical [`Aid`].
    ///
    /// Case-insensitive, whitespace-trimmed. Any input containing `\n`,
    /// `\r`, `\t`, or `;` collapses to [`Aid::Enter`] regardless of what
    /// else it contains (the security fallback from the external
    /// interface grammar) — this must run before any other check so a
    /// crafted string like `"PF5;rm -rf"` cannot smuggle a semicolon
    /// through a keyword match. Anything else unrecognized also falls
    /// back to `Enter`.
    pub fn normalize(input: &str) -> Aid {
        if input.contains(['\n', '\r', '\t', ';']) {
            return Aid::Enter;
        }
        let s = input.trim();
        let lower = s.to_ascii_lowercase();

        match lower.as_str() {
            "enter" => return Aid::Enter,
            "tab" => return Aid::Tab,
            "backtab" | "back_tab" => return Aid::BackTab,
            "clear" => return Aid::Clear,
            "reset" => return Aid::Reset,
            "eraseeof" | "erase_eof" => return Aid::EraseEof,
            "eraseinput" | "erase_input" => return Aid::EraseInput,
            "dup" => return Aid::Dup,
            "fieldmark" | "field_mark" => return Aid::FieldMark,
            "sysreq" | "sys_req" => return Aid::SysReq,
            "attn" => return Aid::Attn,
            "newline" | "new_line" => return Aid::Newline,
            "backspace" => return Aid::Backspace,
            "delete" => return Aid::Delete,
            "insert" => return Aid::Insert,
            "home" => return Aid::Home,
            "up" => return Aid::Up,
            "down" => return Aid::Down,
            "left" => return Aid::Left,
            "right" => return Aid::Right,
            _ => {}
        }

        if let Some(n) = parse_numbered(&lower, &["pf(", "pf", "f"]) {
            if (1..=24).contains(&n) {
                return Aid::Pf(n);
            }
        }
        if let Some(n) = parse_numbered(&lower, &["pa(", "pa"]) {
            if (1..=3).contains(&n) {
                return Aid::Pa(n);
            }
        }

        Aid::Enter
    }
}

/// Try each prefix in order (longest/most-specific first); on a match,
/// parse the remainder (minus a trailing `)` if the prefix opened one)
/// as `u8`.
fn parse_numbered(lower: &str, prefixes: &[&str]) -> Option<u8> {
    for prefix in prefixes {
        if let Some(rest) = lower.strip_prefix(prefix) {
            let digits = rest.strip_suffix(')').unwrap_or(rest);
            if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
                if let Ok(n) = digits.parse::<u8>() {
                    return Some(n);
                }
            }
        }
    }
    None
}

impl fmt::Display for Aid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_names_round_trip_through_normalize() {
        for aid in Aid::all() {
            let name = aid.canonical_name();
            assert_eq!(Aid::normalize(&name), aid, "round trip for {name}");
            assert_eq!(Aid::normalize(&name.to_lowercase()), aid);
            assert_eq!(Aid::normalize(&format!("  {name}  ")), aid);
        }
    }

    #[test]
    fn unrecognized_falls_back_to_enter() {
        assert_eq!(Aid::normalize("not-a-real-key"), Aid::Enter);
        assert_eq!(Aid::normalize(""), Aid::Enter);
        assert_eq!(Aid::normalize("PF99"), Aid::Enter);
        assert_eq!(Aid::normalize("PA7"), Aid::Enter);
    }

    #[test]
    fn injection_suspect_characters_force_enter() {
        assert_eq!(Aid::normalize("PF5\n"), Aid::Enter);
        assert_eq!(Aid::normalize("PF5;rm -rf /"), Aid::Enter);
        assert_eq!(Aid::normalize("Tab\r"), Aid::Enter);
        assert_eq!(Aid::normalize("Clear\t"), Aid::Enter);
    }

    #[test]
    fn underscore_and_alias_forms_accepted() {
        assert_eq!(Aid::normalize("erase_eof"), Aid::EraseEof);
        assert_eq!(Aid::normalize("field_mark"), Aid::FieldMark);
        assert_eq!(Aid::normalize("sys_req"), Aid::SysReq);
        assert_eq!(Aid::normalize("new_line"), Aid::Newline);
        assert_eq!(Aid::normalize("F12"), Aid::Pf(12));
        assert_eq!(Aid::normalize("PF(12)"), Aid::Pf(12));
        assert_eq!(Aid::normalize("PA(2)"), Aid::Pa(2));
    }

    proptest::proptest! {
        #[test]
        fn normalize_is_total(s in ".*") {
            let result = Aid::normalize(&s);
            assert!(Aid::all().contains(&result));
            if s.contains(['\n', '\r', '\t', ';']) {
                assert_eq!(result, Aid::Enter);
            }
        }
    }
}
