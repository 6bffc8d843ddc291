//! The Recording observer (C4): watches submits and key presses and
//! builds a [`WorkflowDocument`].

use tn3270_core::{Aid, Field, Screen};

use crate::types::{WorkflowDocument, WorkflowStep};

/// Observes a session's submits and AID presses while `active`, producing
/// a [`WorkflowDocument`] on [`Self::stop`].
///
/// `Connect` is appended on [`Self::start`] and `Disconnect` on
/// [`Self::stop`], so the emitted document always has both already in
/// place — callers never add them themselves (§4.4).
pub struct Recorder {
    active: bool,
    document: WorkflowDocument,
}

impl Recorder {
    /// Build an inactive recorder targeting `host:port`.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            active: false,
            document: WorkflowDocument::new(host, port),
        }
    }

    /// Whether the recorder is currently observing.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Begin recording; appends a `Connect` step.
    pub fn start(&mut self) {
        if self.active {
            return;
        }
        self.active = true;
        self.document.steps.push(WorkflowStep::connect());
    }

    /// Stop recording, append `Disconnect`, and return the finished
    /// document. Calling `stop` while inactive is a no-op that returns a
    /// clone of the document as it stands.
    pub fn stop(&mut self) -> WorkflowDocument {
        if self.active {
            self.document.steps.push(WorkflowStep::disconnect());
            self.active = false;
        }
        self.document.clone()
    }

    /// After a screen submit, append one `FillString` step per row of
    /// every changed, unprotected field, in reading order. Multi-row
    /// fields replay row-by-row at the declared column (§9 open question
    /// (a)'s resolution).
    pub fn record_submit(&mut self, screen: &Screen) {
        if !self.active {
            return;
        }
        for field in screen.fields() {
            if field.is_protected() || !field.changed {
                continue;
            }
            for (row, col, text) in field_row_chunks(field, screen.width) {
                self.document
                    .steps
                    .push(WorkflowStep::fill_string(row as u32 + 1, col as u32 + 1, text));
            }
        }
    }

    /// After an AID key press, append the corresponding `Press*` step.
    pub fn record_key(&mut self, aid: Aid) {
        if !self.active {
            return;
        }
        self.document
            .steps
            .push(WorkflowStep::press(aid.canonical_name()));
    }
}

/// Split a field's value into `(row, col, text)` chunks, one per display
/// row the field spans (0-based). Stops once the value is exhausted —
/// trailing rows of a partially-filled field emit no step.
fn field_row_chunks(field: &Field, screen_width: u16) -> Vec<(u16, u16, String)> {
    let mut chunks = Vec::new();
    let mut remaining = field.value.as_str();
    let mut row = field.start_row();
    let mut col = field.start_col();
    loop {
        if remaining.is_empty() {
            break;
        }
        let row_capacity = if row == field.end_row() {
            (field.end_col() - col + 1) as usize
        } else {
            (screen_width - col) as usize
        };
        let take = remaining.len().min(row_capacity);
        let (chunk, rest) = remaining.split_at(take);
        chunks.push((row, col, chunk.to_string()));
        remaining = rest;
        if row == field.end_row() {
            break;
        }
        row += 1;
        col = 0;
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use tn3270_core::FieldAttrs;

    fn field(start: (u16, u16), end: (u16, u16), value: &str, changed: bool) -> Field {
        Field {
            start,
            end,
            attrs: FieldAttrs::default(),
            value: value.into(),
            changed,
        }
    }

    fn screen(fields: Vec<Field>) -> Screen {
        Screen::new(80, 24, vec![b' '; 80 * 24], 0, 0, true, fields)
    }

    #[test]
    fn start_and_stop_bracket_the_steps() {
        let mut rec = Recorder::new("mvs.example.com", 23);
        rec.start();
        rec.record_key(Aid::Enter);
        let doc = rec.stop();
        assert_eq!(doc.steps[0].step_type, "Connect");
        assert_eq!(doc.steps[1].step_type, "PressEnter");
        assert_eq!(doc.steps[2].step_type, "Disconnect");
    }

    #[test]
    fn unprotected_changed_field_emits_fill_string_with_1_based_coords() {
        let mut rec = Recorder::new("h", 23);
        rec.start();
        rec.record_submit(&screen(vec![field((2, 10), (2, 19), "HELLO", true)]));
        let doc = rec.stop();
        let fill = &doc.steps[1];
        assert_eq!(fill.step_type, "FillString");
        assert_eq!(fill.coordinates.unwrap().row, 3);
        assert_eq!(fill.coordinates.unwrap().column, 11);
        assert_eq!(fill.text.as_deref(), Some("HELLO"));
    }

    #[test]
    fn protected_or_unchanged_fields_are_skipped() {
        let mut rec = Recorder::new("h", 23);
        rec.start();
        let mut protected = field((0, 0), (0, 9), "LABEL", true);
        protected.attrs.protected = true;
        let unchanged = field((2, 0), (2, 9), "OLD", false);
        rec.record_submit(&screen(vec![protected, unchanged]));
        let doc = rec.stop();
        assert_eq!(doc.steps.len(), 2); // Connect, Disconnect only
    }

    #[test]
    fn multirow_field_replays_row_by_row() {
        // 80-wide screen, field spans row 2 col 75..79 (5 cells), full row 3
        // (80 cells), row 4 col 0..4 (5 cells) — 90 cells total.
        let value: String = ('a'..='z')
            .cycle()
            .take(90)
            .collect();
        let f = field((2, 75), (4, 4), &value, true);
        let mut rec = Recorder::new("h", 23);
        rec.start();
        rec.record_submit(&screen(vec![f]));
        let doc = rec.stop();
        let fills: Vec<_> = doc
            .steps
            .iter()
            .filter(|s| s.step_type == "FillString")
            .collect();
        assert_eq!(fills.len(), 3);
        assert_eq!(fills[0].coordinates.unwrap().row, 3);
        assert_eq!(fills[0].coordinates.unwrap().column, 76);
        assert_eq!(fills[1].coordinates.unwrap().row, 4);
        assert_eq!(fills[1].coordinates.unwrap().column, 1);
        assert_eq!(fills[2].coordinates.unwrap().row, 5);
        assert_eq!(fills[2].coordinates.unwrap().column, 1);
    }

    #[test]
    fn recording_while_inactive_is_a_no_op() {
        let mut rec = Recorder::new("h", 23);
        rec.record_key(Aid::Enter);
        rec.record_submit(&screen(vec![field((0, 0), (0, 9), "X", true)]));
        assert!(rec.stop().steps.is_empty());
    }
}
