use ropey::Rope;

use crate::completion::clamp_cursor;

use tower_lsp::lsp_types::{Position, Range, TextDocumentContentChangeEvent};

/// Open document tracked by the language server
#[derive(Debug, Clone)]
pub struct Document {
    pub text: Rope,
    pub version: i32,
}

/// Converts an LSP position to a char offset in the Rope, clamped to the line and document.
pub fn position_to_char_offset(position: &Position, text: &Rope) -> usize {
    let line = position.line as usize;
    if line >= text.len_lines() {
        return text.len_chars();
    }
    let line_start = text.line_to_char(line);
    let line_len = text.line(line).len_chars();
    line_start + (position.character as usize).min(line_len)
}

/// Converts a char offset in the Rope to an LSP position.
pub fn char_offset_to_position(offset: usize, text: &Rope) -> Position {
    let offset = offset.min(text.len_chars());
    let line = text.char_to_line(offset);
    let character = offset - text.line_to_char(line);
    Position::new(line as u32, character as u32)
}

pub fn char_range_to_lsp(start: usize, end: usize, text: &Rope) -> Range {
    Range::new(
        char_offset_to_position(start, text),
        char_offset_to_position(end, text),
    )
}

/// Text preceding a cursor, cut from a document
///
/// Only the last `window_chars` chars are copied, so building one does not
/// depend on the document size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorWindow {
    pub text: String,
    /// Char offset in the document where `text` starts
    pub start_char: usize,
}

impl CursorWindow {
    pub fn before(text: &Rope, cursor: usize, window_chars: usize) -> Self {
        let cursor = cursor.min(text.len_chars());
        let start_char = cursor.saturating_sub(window_chars);
        Self {
            text: text.slice(start_char..cursor).to_string(),
            start_char,
        }
    }

    /// Document char offset of a byte offset into the window
    pub fn document_char(&self, byte: usize) -> usize {
        let byte = clamp_cursor(&self.text, byte);
        self.start_char + self.text[..byte].chars().count()
    }
}

impl Document {
    pub fn new(text: &str, version: i32) -> Self {
        Self {
            text: Rope::from_str(text),
            version,
        }
    }

    /// Applies content changes in order; changes older than the current version are rejected.
    pub fn apply(
        &mut self,
        changes: Vec<TextDocumentContentChangeEvent>,
        version: i32,
    ) -> Result<(), String> {
        if version <= self.version {
            return Err(format!("Version {} not newer than {}", version, self.version));
        }
        for change in changes {
            match change.range {
                Some(range) => {
                    let start = position_to_char_offset(&range.start, &self.text);
                    let end = position_to_char_offset(&range.end, &self.text).max(start);
                    self.text.remove(start..end);
                    self.text.insert(start, &change.text);
                }
                None => self.text = Rope::from_str(&change.text),
            }
        }
        self.version = version;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_round_trip_and_clamping() {
        let text = Rope::from_str("var p = app.project;\np.na");

        let offset = position_to_char_offset(&Position::new(1, 4), &text);
        assert_eq!(offset, 25);
        assert_eq!(char_offset_to_position(offset, &text), Position::new(1, 4));

        assert_eq!(position_to_char_offset(&Position::new(1, 99), &text), 25);
        assert_eq!(position_to_char_offset(&Position::new(9, 0), &text), 25);
    }

    #[test]
    fn test_cursor_window_maps_back_to_document() {
        let text = Rope::from_str("// é\nvar 日本 = app.project.na;");
        let cursor = position_to_char_offset(&Position::new(1, 24), &text);

        let window = CursorWindow::before(&text, cursor, 14);
        assert_eq!(window.text, "app.project.na");
        assert_eq!(window.document_char(window.text.len()), cursor);
        assert_eq!(
            char_offset_to_position(window.document_char(12), &text),
            Position::new(1, 22)
        );

        let wide = CursorWindow::before(&text, cursor, 300);
        assert_eq!(wide.start_char, 0);
        assert_eq!(wide.document_char(wide.text.len()), cursor);
    }

    #[test]
    fn test_incremental_changes() {
        let mut document = Document::new("app.pro", 1);
        document
            .apply(
                vec![TextDocumentContentChangeEvent {
                    range: Some(Range::new(Position::new(0, 4), Position::new(0, 7))),
                    range_length: None,
                    text: "project.na".to_string(),
                }],
                2,
            )
            .unwrap();
        assert_eq!(document.text.to_string(), "app.project.na");

        assert!(document.apply(Vec::new(), 2).is_err());
    }
}
