//! Benchmark fixtures for the tn3270-chaos workspace.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use tn3270_core::{Field, FieldAttrs, Screen};

/// Build a representative 80x24 formatted screen with `field_count` evenly
/// spaced input fields, for hashing and mind-map benchmarks.
pub fn sample_screen(field_count: u16) -> Screen {
    let width = 80u16;
    let height = 24u16;
    let mut cells = vec![b' '; width as usize * height as usize];
    let mut fields = Vec::with_capacity(field_count as usize);
    for i in 0..field_count {
        let row = (i % (height - 1)) + 1;
        let col = (i * 7) % (width - 10);
        let start = (row, col);
        let end = (row, col + 9);
        for c in col..=col + 9 {
            cells[row as usize * width as usize + c as usize] = b'X';
        }
        fields.push(Field {
            start,
            end,
            attrs: FieldAttrs {
                protected: i % 3 == 0,
                numeric: i % 5 == 0,
                hidden: false,
                intensified: false,
            },
            value: "SAMPLE".into(),
            changed: i % 2 == 0,
        });
    }
    Screen::new(width, height, cells, 1, 1, true, fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_screen_has_requested_field_count() {
        assert_eq!(sample_screen(10).fields().len(), 10);
    }
}
