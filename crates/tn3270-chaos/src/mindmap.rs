//! The Mind Map (C7): a graph of observed screens, their fields, and
//! which AID keys lead where from each one (§4.7).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use tn3270_core::Screen;

use crate::types::Attempt;

const LABEL_MAX_CHARS: usize = 72;
const MAX_KNOWN_VALUES: usize = 12;

/// Metadata about one field as last observed in an area.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldMeta {
    /// 0-based row.
    pub row: u16,
    /// 0-based column.
    pub col: u16,
    /// Field capacity in cells.
    pub length: u32,
    /// Whether the field accepts digits only.
    pub numeric: bool,
    /// Whether the field is not echoed.
    pub hidden: bool,
    /// Whether the field spans more than one display row.
    pub multiline: bool,
}

/// Per-AID-key press history from one area.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyStats {
    /// Times this key was pressed from this area.
    pub presses: u32,
    /// Times pressing this key led somewhere new.
    pub progressions: u32,
    /// Destination hash -> number of times reached.
    pub destinations: HashMap<String, u32>,
    /// Unix seconds this key was last pressed from this area.
    pub last_used_at: u64,
}

/// Everything observed about one distinct screen.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Area {
    /// This area's screen hash.
    pub hash: String,
    /// First non-blank line of the screen, collapsed and truncated.
    pub label: String,
    /// Times this area has been observed.
    pub visits: u32,
    /// Unix seconds of the first visit.
    pub first_seen: u64,
    /// Unix seconds of the most recent visit.
    pub last_seen: u64,
    /// Field metadata keyed by `"R{row}C{col}L{length}"`.
    pub field_metadata: HashMap<String, FieldMeta>,
    /// Values that were written and led to a transition, keyed the same
    /// way, capped at 12 unique values each, oldest evicted first.
    pub known_working_values: HashMap<String, Vec<String>>,
    /// AID key press history from this area.
    pub key_presses: HashMap<String, KeyStats>,
}

impl Area {
    fn new(hash: String, label: String, seen_at: u64) -> Self {
        Self {
            hash,
            label,
            visits: 0,
            first_seen: seen_at,
            last_seen: seen_at,
            field_metadata: HashMap::new(),
            known_working_values: HashMap::new(),
            key_presses: HashMap::new(),
        }
    }
}

/// The field key convention areas index their per-field state by.
pub fn field_key(row: u16, col: u16, length: u32) -> String {
    format!("R{row}C{col}L{length}")
}

fn make_label(screen: &Screen) -> String {
    let text = screen.text();
    let first_non_blank = text
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("");
    let collapsed: String = first_non_blank.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut chars = collapsed.chars();
    let truncated: String = chars.by_ref().take(LABEL_MAX_CHARS).collect();
    if chars.next().is_some() {
        format!("{truncated}…")
    } else {
        truncated
    }
}

/// A graph of observed screens, keyed by screen hash.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MindMap {
    /// Areas keyed by screen hash.
    pub areas: HashMap<String, Area>,
}

impl MindMap {
    /// An empty mind map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a visit to the screen whose hash is `hash`, creating the
    /// area if this is the first time it's been seen and refreshing its
    /// field metadata either way.
    pub fn observe_screen(&mut self, hash: &str, screen: &Screen, seen_at: u64) {
        let area = self.areas.entry(hash.to_string()).or_insert_with(|| {
            Area::new(hash.to_string(), make_label(screen), seen_at)
        });
        area.visits += 1;
        area.last_seen = seen_at;
        area.field_metadata.clear();
        for field in screen.fields() {
            if field.is_protected() {
                continue;
            }
            let key = field_key(field.start_row(), field.start_col(), field.length(screen.width));
            area.field_metadata.insert(
                key,
                FieldMeta {
                    row: field.start_row(),
                    col: field.start_col(),
                    length: field.length(screen.width),
                    numeric: field.is_numeric(),
                    hidden: field.is_hidden(),
                    multiline: field.is_multiline(),
                },
            );
        }
    }

    /// Record an attempt's outcome against the area it started from:
    /// press stats (and, only on an actual transition, a destination
    /// count) plus any written values that led somewhere new.
    pub fn record_attempt(&mut self, attempt: &Attempt) {
        let Some(area) = self.areas.get_mut(&attempt.from_hash) else {
            return;
        };
        let stats = area.key_presses.entry(attempt.aid_key.clone()).or_default();
        stats.presses += 1;
        stats.last_used_at = attempt.time;
        if attempt.transitioned {
            stats.progressions += 1;
            *stats.destinations.entry(attempt.to_hash.clone()).or_insert(0) += 1;
        }
        if attempt.transitioned {
            for write in &attempt.writes {
                if !write.success || write.value.is_empty() {
                    continue;
                }
                let key = field_key(write.row, write.col, write.length);
                let values = area.known_working_values.entry(key).or_default();
                if !values.contains(&write.value) {
                    if values.len() >= MAX_KNOWN_VALUES {
                        values.remove(0);
                    }
                    values.push(write.value.clone());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tn3270_core::{Field, FieldAttrs};

    fn screen_with_field() -> Screen {
        let field = Field {
            start: (1, 9),
            end: (1, 18),
            attrs: FieldAttrs::default(),
            value: String::new(),
            changed: false,
        };
        let mut cells = vec![0u8; 80 * 24];
        cells[0] = b'H';
        cells[1] = b'I';
        Screen::new(80, 24, cells, 0, 0, true, vec![field])
    }

    #[test]
    fn observe_screen_creates_area_with_label_and_visit() {
        let mut map = MindMap::new();
        map.observe_screen("hash1", &screen_with_field(), 100);
        let area = map.areas.get("hash1").unwrap();
        assert_eq!(area.label, "HI");
        assert_eq!(area.visits, 1);
        assert_eq!(area.field_metadata.len(), 1);
        assert!(area.field_metadata.contains_key(&field_key(1, 9, 10)));
    }

    #[test]
    fn repeated_observation_increments_visits_and_refreshes_last_seen() {
        let mut map = MindMap::new();
        map.observe_screen("hash1", &screen_with_field(), 100);
        map.observe_screen("hash1", &screen_with_field(), 200);
        let area = map.areas.get("hash1").unwrap();
        assert_eq!(area.visits, 2);
        assert_eq!(area.first_seen, 100);
        assert_eq!(area.last_seen, 200);
    }

    #[test]
    fn record_attempt_tracks_presses_and_progressions_only_on_transition() {
        let mut map = MindMap::new();
        map.observe_screen("hash1", &screen_with_field(), 100);
        let attempt = Attempt {
            attempt: 1,
            time: 101,
            from_hash: "hash1".into(),
            to_hash: "hash1".into(),
            aid_key: "Enter".into(),
            fields_targeted: 1,
            fields_written: 1,
            transitioned: false,
            error: None,
            writes: vec![],
        };
        map.record_attempt(&attempt);
        let stats = &map.areas["hash1"].key_presses["Enter"];
        assert_eq!(stats.presses, 1);
        assert_eq!(stats.progressions, 0);
        assert!(stats.destinations.is_empty());
    }

    #[test]
    fn successful_transition_records_destination_and_known_value() {
        let mut map = MindMap::new();
        map.observe_screen("hash1", &screen_with_field(), 100);
        let attempt = Attempt {
            attempt: 1,
            time: 101,
            from_hash: "hash1".into(),
            to_hash: "hash2".into(),
            aid_key: "Enter".into(),
            fields_targeted: 1,
            fields_written: 1,
            transitioned: true,
            error: None,
            writes: vec![crate::types::FieldWrite {
                row: 1,
                col: 9,
                length: 10,
                value: "ABC".into(),
                success: true,
                error: None,
            }],
        };
        map.record_attempt(&attempt);
        let area = &map.areas["hash1"];
        assert_eq!(area.key_presses["Enter"].progressions, 1);
        assert_eq!(area.key_presses["Enter"].destinations["hash2"], 1);
        assert_eq!(area.known_working_values[&field_key(1, 9, 10)], vec!["ABC".to_string()]);
    }

    #[test]
    fn known_working_values_cap_at_twelve_unique_entries() {
        let mut map = MindMap::new();
        map.observe_screen("hash1", &screen_with_field(), 100);
        for i in 0..20 {
            let attempt = Attempt {
                attempt: i,
                time: 100 + i as u64,
                from_hash: "hash1".into(),
                to_hash: "hash2".into(),
                aid_key: "Enter".into(),
                fields_targeted: 1,
                fields_written: 1,
                transitioned: true,
                error: None,
                writes: vec![crate::types::FieldWrite {
                    row: 1,
                    col: 9,
                    length: 10,
                    value: format!("V{i}"),
                    success: true,
                    error: None,
                }],
            };
            map.record_attempt(&attempt);
        }
        let values = &map.areas["hash1"].known_working_values[&field_key(1, 9, 10)];
        assert_eq!(values.len(), 12);
    }
}
