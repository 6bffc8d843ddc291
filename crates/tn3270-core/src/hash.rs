//! Screen hashing: the stable fingerprint the chaos engine and mind map
//! use to recognize "the same screen" across visits.

use sha2::{Digest, Sha256};

use crate::screen::{Field, Screen};

/// `SHA-256(text() + "|" + len(fields) + per-field "|startY,startX,endY,endX,fieldCode")`,
/// truncated to the first 16 hex characters.
///
/// Cursor position never enters the hash: moving the cursor (e.g. via Tab)
/// must not register as a screen transition. Field order matters — two
/// screens with the same fields in different orders hash differently,
/// which is correct, since reading order is part of a screen's identity.
pub fn screen_hash(screen: &Screen) -> String {
    let mut hasher = Sha256::new();
    hasher.update(screen.text().as_bytes());
    hasher.update(b"|");
    hasher.update(screen.fields().len().to_string().as_bytes());
    for field in screen.fields() {
        hasher.update(b"|");
        hasher.update(field_fingerprint(field).as_bytes());
    }
    let digest = hasher.finalize();
    let hex = digest.iter().map(|b| format!("{b:02x}")).collect::<String>();
    hex[..16].to_string()
}

fn field_fingerprint(field: &Field) -> String {
    format!(
        "{},{},{},{},{}",
        field.start_row(),
        field.start_col(),
        field.end_row(),
        field.end_col(),
        field_code(field),
    )
}

/// Pack a field's attribute flags into the single numeric "fieldCode" the
/// hashing rule mixes in, so that a protection/numeric/hidden/intensified
/// change is visible to the hash even when the field's bounds are not.
fn field_code(field: &Field) -> u8 {
    (field.attrs.protected as u8)
        | (field.attrs.numeric as u8) << 1
        | (field.attrs.hidden as u8) << 2
        | (field.attrs.intensified as u8) << 3
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screen::FieldAttrs;

    fn field(start: (u16, u16), end: (u16, u16), attrs: FieldAttrs) -> Field {
        Field {
            start,
            end,
            attrs,
            value: String::new(),
            changed: false,
        }
    }

    fn screen_with_fields(fields: Vec<Field>) -> Screen {
        Screen::new(80, 24, vec![0u8; 80 * 24], 0, 0, true, fields)
    }

    #[test]
    fn hash_is_stable_for_identical_screens() {
        let s = screen_with_fields(vec![field((0, 0), (0, 9), FieldAttrs::default())]);
        assert_eq!(screen_hash(&s), screen_hash(&s));
    }

    #[test]
    fn cursor_movement_does_not_change_hash() {
        let mut s = screen_with_fields(vec![field((0, 0), (0, 9), FieldAttrs::default())]);
        let before = screen_hash(&s);
        s.cursor_row = 5;
        s.cursor_col = 42;
        assert_eq!(screen_hash(&s), before);
    }

    #[test]
    fn adding_a_field_changes_hash() {
        let s1 = screen_with_fields(vec![field((0, 0), (0, 9), FieldAttrs::default())]);
        let s2 = screen_with_fields(vec![
            field((0, 0), (0, 9), FieldAttrs::default()),
            field(
                (2, 10),
                (2, 19),
                FieldAttrs {
                    protected: false,
                    ..Default::default()
                },
            ),
        ]);
        assert_ne!(screen_hash(&s1), screen_hash(&s2));
    }

    #[test]
    fn attribute_change_without_bounds_change_changes_hash() {
        let protected = field(
            (2, 10),
            (2, 19),
            FieldAttrs {
                protected: true,
                ..Default::default()
            },
        );
        let unprotected = field((2, 10), (2, 19), FieldAttrs::default());
        let s1 = screen_with_fields(vec![protected]);
        let s2 = screen_with_fields(vec![unprotected]);
        assert_ne!(screen_hash(&s1), screen_hash(&s2));
    }

    #[test]
    fn hash_is_16_hex_chars() {
        let s = screen_with_fields(vec![]);
        let h = screen_hash(&s);
        assert_eq!(h.len(), 16);
        assert!(h.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
