//! The 3270 screen buffer and field model.
//!
//! Pure data, no I/O: everything here is derived from a snapshot the Host
//! Adapter already pulled off the emulator. Coordinates are 0-based
//! throughout this module; the wire formats in `tn3270-recording` convert
//! to/from the 1-based coordinates the workflow document uses.

use std::fmt;

/// Attribute-byte flags decoded for one field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FieldAttrs {
    /// Read-only: the host rejects writes to a protected field.
    pub protected: bool,
    /// Numeric-only input is accepted (digits, sign, decimal point).
    pub numeric: bool,
    /// Not echoed to the display (e.g. a password field).
    pub hidden: bool,
    /// Displayed with higher intensity.
    pub intensified: bool,
}

/// One contiguous input or display region of a [`Screen`].
///
/// A field may span multiple display rows; `start`/`end` are inclusive
/// `(row, col)` pairs in reading order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    /// First cell of the field, inclusive.
    pub start: (u16, u16),
    /// Last cell of the field, inclusive.
    pub end: (u16, u16),
    /// Decoded attribute flags.
    pub attrs: FieldAttrs,
    /// Cached current value (trimmed of trailing NULs).
    pub value: String,
    /// Set when the value differs from the last time the recorder looked.
    pub changed: bool,
}

impl Field {
    /// Row of the field's first cell.
    pub fn start_row(&self) -> u16 {
        self.start.0
    }

    /// Column of the field's first cell.
    pub fn start_col(&self) -> u16 {
        self.start.1
    }

    /// Row of the field's last cell.
    pub fn end_row(&self) -> u16 {
        self.end.0
    }

    /// Column of the field's last cell.
    pub fn end_col(&self) -> u16 {
        self.end.1
    }

    /// Whether this field rejects writes.
    pub fn is_protected(&self) -> bool {
        self.attrs.protected
    }

    /// Whether this field accepts digits only.
    pub fn is_numeric(&self) -> bool {
        self.attrs.numeric
    }

    /// Whether this field is not echoed.
    pub fn is_hidden(&self) -> bool {
        self.attrs.hidden
    }

    /// Whether this field spans more than one display row.
    pub fn is_multiline(&self) -> bool {
        self.end_row() != self.start_row()
    }

    /// Field capacity in cells, accounting for row wrap.
    ///
    /// `(W - startX) + (W * (endY - startY - 1)) + (endX + 1)` for a
    /// multi-row field; collapses to `endX - startX + 1` when the field
    /// fits on one row.
    pub fn length(&self, screen_width: u16) -> u32 {
        let w = screen_width as u32;
        let (sy, sx) = (self.start_row() as u32, self.start_col() as u32);
        let (ey, ex) = (self.end_row() as u32, self.end_col() as u32);
        if sy == ey {
            return ex.saturating_sub(sx) + 1;
        }
        (w - sx) + w * (ey - sy - 1) + (ex + 1)
    }
}

/// A decoded snapshot of the 3270 display buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Screen {
    /// Display width in columns.
    pub width: u16,
    /// Display height in rows.
    pub height: u16,
    /// Row-major display codes, `width * height` long.
    cells: Vec<u8>,
    /// 0-based cursor row.
    pub cursor_row: u16,
    /// 0-based cursor column.
    pub cursor_col: u16,
    /// Whether field attributes tile the buffer.
    ///
    /// When `false` the screen is a single free-text region and `fields`
    /// is empty — callers submit via `submitUnformatted`.
    pub is_formatted: bool,
    fields: Vec<Field>,
}

impl Screen {
    /// Build a screen from raw cells and a field list.
    ///
    /// # Panics
    ///
    /// Panics if `cells.len() != width as usize * height as usize` — the
    /// adapter always hands back a rectangular buffer; a mismatch means
    /// the transport decoded the emulator's reply wrong, a programming
    /// error rather than a runtime condition to recover from.
    pub fn new(
        width: u16,
        height: u16,
        cells: Vec<u8>,
        cursor_row: u16,
        cursor_col: u16,
        is_formatted: bool,
        fields: Vec<Field>,
    ) -> Self {
        assert_eq!(
            cells.len(),
            width as usize * height as usize,
            "screen buffer size must equal width * height"
        );
        Self {
            width,
            height,
            cells,
            cursor_row,
            cursor_col,
            is_formatted,
            fields,
        }
    }

    /// All fields in reading order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Row-joined display text, NUL cells rendered as spaces.
    pub fn text(&self) -> String {
        let mut out = String::with_capacity(self.cells.len() + self.height as usize);
        for row in 0..self.height as usize {
            if row > 0 {
                out.push('\n');
            }
            let start = row * self.width as usize;
            let end = start + self.width as usize;
            for &code in &self.cells[start..end] {
                out.push(if code == 0 { ' ' } else { code as char });
            }
        }
        out
    }

    /// The field covering `(row, col)`, if any — reading order, first
    /// match wins (fields never overlap in a well-formed screen).
    pub fn get_input_field_at(&self, col: u16, row: u16) -> Option<&Field> {
        self.fields.iter().find(|f| field_contains(f, row, col))
    }

    /// Clone this screen constrained to `(max_rows, max_cols)`, dropping
    /// any field that falls outside the new bounds entirely and truncating
    /// the cell grid. Used by display surfaces that cap the rendered area;
    /// has no bearing on hashing, which always operates on the full screen.
    pub fn limited(&self, max_rows: u16, max_cols: u16) -> Screen {
        let height = self.height.min(max_rows);
        let width = self.width.min(max_cols);
        let mut cells = Vec::with_capacity(width as usize * height as usize);
        for row in 0..height as usize {
            let src_start = row * self.width as usize;
            cells.extend_from_slice(&self.cells[src_start..src_start + width as usize]);
        }
        let fields = self
            .fields
            .iter()
            .filter(|f| f.start_row() < height && f.start_col() < width)
            .cloned()
            .collect();
        Screen {
            width,
            height,
            cells,
            cursor_row: self.cursor_row.min(height.saturating_sub(1)),
            cursor_col: self.cursor_col.min(width.saturating_sub(1)),
            is_formatted: self.is_formatted,
            fields,
        }
    }
}

fn field_contains(f: &Field, row: u16, col: u16) -> bool {
    if row < f.start_row() || row > f.end_row() {
        return false;
    }
    if row == f.start_row() && col < f.start_col() {
        return false;
    }
    if row == f.end_row() && col > f.end_col() {
        return false;
    }
    true
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank_screen(width: u16, height: u16, fields: Vec<Field>) -> Screen {
        Screen::new(
            width,
            height,
            vec![0u8; width as usize * height as usize],
            0,
            0,
            true,
            fields,
        )
    }

    fn field(start: (u16, u16), end: (u16, u16)) -> Field {
        Field {
            start,
            end,
            attrs: FieldAttrs::default(),
            value: String::new(),
            changed: false,
        }
    }

    #[test]
    fn text_joins_rows_with_newlines_and_maps_nul_to_space() {
        let s = Screen::new(3, 2, b"AB\0\0CD".to_vec(), 0, 0, true, vec![]);
        assert_eq!(s.text(), "AB \n CD");
    }

    #[test]
    fn single_row_field_length_is_span_plus_one() {
        let f = field((2, 10), (2, 19));
        assert_eq!(f.length(80), 10);
    }

    #[test]
    fn multirow_field_length_wraps() {
        // Row 2 cols 70..79 (10 cells), full row 3 (80 cells), row 4 cols 0..9 (10 cells).
        let f = field((2, 70), (4, 9));
        assert_eq!(f.length(80), 10 + 80 + 10);
        assert!(f.is_multiline());
    }

    #[test]
    fn get_input_field_at_matches_reading_order_bounds() {
        let f1 = field((0, 0), (0, 9));
        let f2 = field((2, 10), (2, 19));
        let s = blank_screen(80, 5, vec![f1.clone(), f2.clone()]);
        assert_eq!(s.get_input_field_at(5, 0), Some(&f1));
        assert_eq!(s.get_input_field_at(15, 2), Some(&f2));
        assert_eq!(s.get_input_field_at(0, 1), None);
    }

    #[test]
    fn limited_drops_out_of_bounds_fields_and_clamps_cursor() {
        let f1 = field((0, 0), (0, 9));
        let f2 = field((10, 0), (10, 5));
        let mut s = blank_screen(80, 24, vec![f1.clone(), f2]);
        s.cursor_row = 23;
        s.cursor_col = 79;
        let limited = s.limited(5, 80);
        assert_eq!(limited.fields(), &[f1]);
        assert_eq!(limited.cursor_row, 4);
    }

    #[test]
    fn unformatted_screen_has_no_fields() {
        let s = Screen::new(80, 24, vec![0u8; 80 * 24], 0, 0, false, vec![]);
        assert!(!s.is_formatted);
        assert!(s.fields().is_empty());
    }
}
