//! Reusable screen fixtures for adapter, playback, and chaos tests.

use tn3270_host::transport::{RawField, RawScreen};

/// A blank formatted `width x height` screen with no fields, cursor at
/// `(0, 0)`.
pub fn blank_screen(width: u16, height: u16) -> RawScreen {
    RawScreen {
        width,
        height,
        cursor_row: 0,
        cursor_col: 0,
        is_formatted: true,
        cells: vec![b' '; width as usize * height as usize],
        fields: Vec::new(),
    }
}

/// A simple logon-style screen: one label row plus two unprotected input
/// fields (`userid` at row 5, `password` hidden at row 6).
pub fn logon_screen() -> RawScreen {
    let mut screen = blank_screen(80, 24);
    write_text(&mut screen, 3, 30, "TSO/E LOGON");
    screen.fields.push(RawField {
        start: (5, 20),
        end: (5, 39),
        protected: false,
        numeric: false,
        hidden: false,
        intensified: false,
        value: String::new(),
    });
    screen.fields.push(RawField {
        start: (6, 20),
        end: (6, 39),
        protected: false,
        numeric: false,
        hidden: true,
        intensified: false,
        value: String::new(),
    });
    screen
}

fn write_text(screen: &mut RawScreen, row: u16, col: u16, text: &str) {
    let start = row as usize * screen.width as usize + col as usize;
    for (i, b) in text.bytes().enumerate() {
        screen.cells[start + i] = b;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logon_screen_has_two_fields() {
        assert_eq!(logon_screen().fields.len(), 2);
    }

    #[test]
    fn blank_screen_is_requested_size() {
        let s = blank_screen(40, 10);
        assert_eq!(s.cells.len(), 400);
    }
}
