//! Key-event classification and the responses handed back to the host.

/// A keyboard event as the host integration reports it.
///
/// Every variant except `Char` and `ExtendedModifier` is a *breaking*
/// event: it invalidates the accumulated raw-keystroke context and passes
/// through to the field untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    /// A character-producing keystroke. `extended` is set when the
    /// alternate-input (AltGr-class) modifier is held.
    Char { ch: char, extended: bool },
    Backspace,
    /// Forward delete.
    Delete,
    /// Arrow/home/end-class navigation.
    Navigation,
    /// A key chorded with Ctrl/Meta, or an ASCII control character.
    Control,
    /// A modifier pressed on its own (Shift, Ctrl, ...).
    Modifier,
    /// The alternate-input modifier on its own: neither breaking nor
    /// transforming.
    ExtendedModifier,
}

impl KeyEvent {
    pub fn char(ch: char) -> KeyEvent {
        KeyEvent::Char {
            ch,
            extended: false,
        }
    }

    pub fn extended_char(ch: char) -> KeyEvent {
        KeyEvent::Char { ch, extended: true }
    }

    /// Whether this event resets the context buffer.
    pub fn is_breaking(&self) -> bool {
        !matches!(self, KeyEvent::Char { .. } | KeyEvent::ExtendedModifier)
    }
}

/// A caret-relative replacement of field content. Offsets are character
/// offsets; the range end is exclusive. After applying, the caret goes to
/// `caret` (which is always `start + text.chars().count()`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditInstruction {
    pub start: usize,
    pub end: usize,
    pub text: String,
    pub caret: usize,
}

/// What the host should do with the keystroke it just reported.
///
/// `consumed == false` means the raw keystroke proceeds untouched (the
/// default insert happens). `consumed == true` always carries an edit
/// that fully replaces the affected range, typed character included;
/// the host must suppress its default insert.
#[derive(Debug)]
pub struct KeyResponse {
    pub consumed: bool,
    pub edit: Option<EditInstruction>,
}

impl KeyResponse {
    pub(crate) fn pass_through() -> KeyResponse {
        KeyResponse {
            consumed: false,
            edit: None,
        }
    }

    pub(crate) fn replace(edit: EditInstruction) -> KeyResponse {
        KeyResponse {
            consumed: true,
            edit: Some(edit),
        }
    }
}
