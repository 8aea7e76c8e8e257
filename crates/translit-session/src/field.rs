//! The narrow field contracts the session talks through, plus an
//! in-memory reference host.
//!
//! The session never touches a widget directly: it reads selection and
//! lookback text through [`TextField`] and emits [`EditInstruction`]s for
//! the host to apply through [`FieldMutator`]. [`EditBuffer`] implements
//! both over a plain string and stands in for the real widget in tests
//! and the CLI.

use translit_core::diff::last_n_chars;

use crate::types::{EditInstruction, KeyEvent, KeyResponse};

/// Read-only view of an editable field. All offsets are character
/// offsets over the field's logical text content.
pub trait TextField {
    /// Current selection `[start, end)`; `start == end` for a bare caret.
    fn selection(&self) -> (usize, usize);

    /// The up-to-`n` characters immediately preceding char-offset `pos`.
    fn chars_before(&self, pos: usize, n: usize) -> String;
}

/// Mutation side of a field. `replace_range` must leave the caret at
/// `start + text.chars().count()` unless a subsequent `set_caret` says
/// otherwise.
pub trait FieldMutator {
    fn replace_range(&mut self, start: usize, end: usize, text: &str);
    fn set_caret(&mut self, pos: usize);
}

/// In-memory editable field: reference implementation of both field
/// traits, with host-default handling of pass-through keystrokes.
#[derive(Debug, Default)]
pub struct EditBuffer {
    text: String,
    sel_start: usize,
    sel_end: usize,
}

impl EditBuffer {
    pub fn new() -> EditBuffer {
        EditBuffer::default()
    }

    pub fn with_text(text: &str) -> EditBuffer {
        let len = text.chars().count();
        EditBuffer {
            text: text.to_string(),
            sel_start: len,
            sel_end: len,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Select `[start, end)`; pass `start == end` to place a bare caret.
    pub fn select(&mut self, start: usize, end: usize) {
        let len = self.char_len();
        self.sel_start = start.min(len);
        self.sel_end = end.min(len).max(self.sel_start);
    }

    /// Apply a session edit instruction: splice the range, then honor the
    /// instruction's caret.
    pub fn apply(&mut self, edit: &EditInstruction) {
        self.replace_range(edit.start, edit.end, &edit.text);
        self.set_caret(edit.caret);
    }

    /// Host-default handling for a keystroke the session did not consume:
    /// a character replaces the selection, backspace deletes backwards,
    /// everything else leaves the text alone.
    pub fn apply_default(&mut self, event: KeyEvent) {
        match event {
            KeyEvent::Char { ch, .. } => {
                let (start, end) = (self.sel_start, self.sel_end);
                self.replace_range(start, end, &ch.to_string());
            }
            KeyEvent::Backspace => {
                let (start, end) = (self.sel_start, self.sel_end);
                if start < end {
                    self.replace_range(start, end, "");
                } else if start > 0 {
                    self.replace_range(start - 1, start, "");
                }
            }
            _ => {}
        }
    }

    /// Feed one keystroke response: apply the edit when present, else the
    /// host default.
    pub fn apply_response(&mut self, event: KeyEvent, response: &KeyResponse) {
        match &response.edit {
            Some(edit) => self.apply(edit),
            None if !response.consumed => self.apply_default(event),
            None => {}
        }
    }

    fn byte_offset(&self, char_offset: usize) -> usize {
        self.text
            .char_indices()
            .map(|(i, _)| i)
            .nth(char_offset)
            .unwrap_or(self.text.len())
    }
}

impl TextField for EditBuffer {
    fn selection(&self) -> (usize, usize) {
        (self.sel_start, self.sel_end)
    }

    fn chars_before(&self, pos: usize, n: usize) -> String {
        last_n_chars(&self.text, pos, n).to_string()
    }
}

impl FieldMutator for EditBuffer {
    fn replace_range(&mut self, start: usize, end: usize, text: &str) {
        let lo = self.byte_offset(start);
        let hi = self.byte_offset(end.max(start));
        self.text.replace_range(lo..hi, text);
        let caret = start + text.chars().count();
        self.sel_start = caret;
        self.sel_end = caret;
    }

    fn set_caret(&mut self, pos: usize) {
        let pos = pos.min(self.char_len());
        self.sel_start = pos;
        self.sel_end = pos;
    }
}
