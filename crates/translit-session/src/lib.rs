//! Stateful per-field transliteration session.
//!
//! An [`InputSession`] is bound to one editable element. It owns the
//! bounded raw-keystroke context buffer and the selected input method,
//! classifies key events, and turns each character-producing keystroke
//! into at most one caret-relative edit instruction. The host applies the
//! instruction through its field mutator; the session never mutates text
//! itself.

pub mod field;
pub mod types;

#[cfg(test)]
mod tests;

use std::sync::{Arc, RwLock};

use tracing::{debug, debug_span};

use translit_core::diff::{first_divergence, Divergence};
use translit_core::method::InputMethod;
use translit_core::registry::MethodRegistry;

pub use field::{EditBuffer, FieldMutator, TextField};
pub use types::{EditInstruction, KeyEvent, KeyResponse};

/// `select_method` was asked for an id the registry does not know. The
/// session state is unchanged; the host decides what feedback to show.
#[derive(Debug, thiserror::Error)]
#[error("unknown input method {0:?}")]
pub struct UnknownMethod(pub String);

/// Per-element state machine: disabled, enabled without a method, or
/// enabled with one. Sessions are independent of each other and share
/// only the (append-only) method registry.
pub struct InputSession {
    registry: Arc<RwLock<MethodRegistry>>,
    active: bool,
    method: Option<Arc<InputMethod>>,
    /// Trailing raw keystrokes, at most `method.context_length()` chars.
    context: String,
}

impl InputSession {
    /// A fresh session starts disabled with no method, matching a newly
    /// bound element before the user picks anything.
    pub fn new(registry: Arc<RwLock<MethodRegistry>>) -> InputSession {
        InputSession {
            registry,
            active: false,
            method: None,
            context: String::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn method(&self) -> Option<Arc<InputMethod>> {
        self.method.clone()
    }

    pub fn method_id(&self) -> Option<&str> {
        self.method.as_deref().map(InputMethod::id)
    }

    /// Current context buffer contents (raw keystrokes, never output).
    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn enable(&mut self) {
        self.active = true;
    }

    /// Disable transliteration; the selected method is kept so `enable`
    /// returns to it.
    pub fn disable(&mut self) {
        self.active = false;
        self.context.clear();
    }

    pub fn toggle(&mut self) {
        if self.active {
            self.disable();
        } else {
            self.enable();
        }
    }

    /// Select a registered method and enable the session. An unknown id
    /// changes nothing.
    pub fn select_method(&mut self, id: &str) -> Result<(), UnknownMethod> {
        let method = self
            .registry
            .read()
            .ok()
            .and_then(|r| r.get(id))
            .ok_or_else(|| UnknownMethod(id.to_string()))?;
        debug!(id, "method selected");
        self.method = Some(method);
        self.active = true;
        self.context.clear();
        Ok(())
    }

    /// Drop the selected method (e.g. after its load failed), leaving the
    /// session enabled-without-method: keystrokes pass through untouched.
    pub fn clear_method(&mut self) {
        self.method = None;
        self.context.clear();
    }

    /// Process one key event against the field's current content and
    /// selection. At most one edit instruction is produced; the event is
    /// fully handled before the next one is accepted.
    pub fn handle_key(&mut self, event: KeyEvent, field: &dyn TextField) -> KeyResponse {
        let _span = debug_span!("handle_key", ?event).entered();

        if !self.active {
            return KeyResponse::pass_through();
        }
        let Some(method) = self.method.clone() else {
            return KeyResponse::pass_through();
        };

        match event {
            KeyEvent::Char { ch, extended } => self.transliterate(&method, ch, extended, field),
            KeyEvent::ExtendedModifier => KeyResponse::pass_through(),
            _ => {
                // Breaking event: the keystroke proceeds untouched and
                // whatever context had accumulated is no longer valid.
                self.context.clear();
                KeyResponse::pass_through()
            }
        }
    }

    fn transliterate(
        &mut self,
        method: &InputMethod,
        ch: char,
        extended: bool,
        field: &dyn TextField,
    ) -> KeyResponse {
        let (start, end) = field.selection();

        // The typed character is part of the window but not yet in the
        // field content.
        let mut window = field.chars_before(start, method.max_key_length());
        window.push(ch);

        let replacement = method.evaluate(&window, &self.context, extended);

        // Context tracks raw keystrokes, never transliterated output, and
        // is updated after evaluation whether or not a rule fired.
        self.context.push(ch);
        let over = self
            .context
            .chars()
            .count()
            .saturating_sub(method.context_length());
        if over > 0 {
            self.context = self.context.chars().skip(over).collect();
        }

        if replacement == window {
            return KeyResponse::pass_through();
        }

        let window_len = window.chars().count();
        let diverge = match first_divergence(&window, &replacement) {
            // Excluded by the equality check above; kept total.
            Divergence::Identical => return KeyResponse::pass_through(),
            // Clamped so the emitted range always covers the just-typed
            // character: the range math below assumes it, and d can reach
            // window_len only when the replacement strictly extends the
            // window.
            Divergence::At(d) => d.min(window_len - 1),
        };

        let window_tail = window_len - diverge;
        let text: String = replacement.chars().skip(diverge).collect();

        // `+ 1` because the just-typed character counts in the window but
        // occupies no field range yet.
        let edit_start = (start + 1).saturating_sub(window_tail);
        let caret = edit_start + text.chars().count();
        debug!(%window, %replacement, diverge, "emitting replacement");
        KeyResponse::replace(EditInstruction {
            start: edit_start,
            end,
            text,
            caret,
        })
    }
}
