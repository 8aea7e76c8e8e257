//! User preferences: current language and last-used method per language.
//!
//! The trait is the narrow seam the host persists through (cookies,
//! localStorage, a config file); the engine only ever sees these five
//! operations. `MemoryPreferences` is the in-process implementation used
//! by the CLI and tests.

use std::collections::HashMap;

use crate::registry::MethodRegistry;

pub trait PreferenceStore {
    fn language(&self) -> &str;

    /// Switch language. Distinct previous languages are remembered in
    /// first-seen order.
    fn set_language(&mut self, code: &str);

    /// The last method explicitly chosen for `language`, if any.
    fn last_method(&self, language: &str) -> Option<&str>;

    fn set_last_method(&mut self, language: &str, method_id: &str);

    /// Whether anything changed since the store was last persisted.
    fn is_dirty(&self) -> bool;

    /// Mark the store persisted.
    fn mark_clean(&mut self);

    /// Resolve the method to activate for `language`: the last-used one,
    /// falling back to the language's default (first listed) method.
    fn method_for(&self, registry: &MethodRegistry, language: &str) -> Option<String> {
        self.last_method(language)
            .map(String::from)
            .or_else(|| registry.default_method(language))
    }
}

#[derive(Debug, Default)]
pub struct MemoryPreferences {
    language: String,
    previous_languages: Vec<String>,
    last_methods: HashMap<String, String>,
    dirty: bool,
}

impl MemoryPreferences {
    pub fn new(language: &str) -> MemoryPreferences {
        MemoryPreferences {
            language: language.to_string(),
            ..MemoryPreferences::default()
        }
    }

    pub fn previous_languages(&self) -> &[String] {
        &self.previous_languages
    }
}

impl PreferenceStore for MemoryPreferences {
    fn language(&self) -> &str {
        &self.language
    }

    fn set_language(&mut self, code: &str) {
        if code == self.language {
            return;
        }
        if !self.previous_languages.iter().any(|l| l == code) {
            self.previous_languages.push(code.to_string());
        }
        self.language = code.to_string();
        self.dirty = true;
    }

    fn last_method(&self, language: &str) -> Option<&str> {
        self.last_methods.get(language).map(String::as_str)
    }

    fn set_last_method(&mut self, language: &str, method_id: &str) {
        if self.last_methods.get(language).map(String::as_str) == Some(method_id) {
            return;
        }
        self.last_methods
            .insert(language.to_string(), method_id.to_string());
        self.dirty = true;
    }

    fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn mark_clean(&mut self) {
        self.dirty = false;
    }
}
