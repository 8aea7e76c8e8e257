//! Method registry and language catalog.
//!
//! Explicitly constructed values, shared behind `Arc<RwLock<_>>` by the
//! host; there is no ambient global registry. Methods are configuration:
//! registered once, immutable afterwards. Re-registering an id replaces
//! the previous entry.

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::MethodDefinition;
use crate::method::{InputMethod, MethodError};

/// A language known to the selector UI: autonym plus its input methods in
/// preference order (the first is the default).
#[derive(Debug, Clone)]
pub struct Language {
    pub code: String,
    pub autonym: String,
    pub input_methods: Vec<String>,
}

impl Language {
    pub fn new(code: &str, autonym: &str, input_methods: Vec<&str>) -> Language {
        Language {
            code: code.to_string(),
            autonym: autonym.to_string(),
            input_methods: input_methods.into_iter().map(String::from).collect(),
        }
    }
}

#[derive(Default)]
pub struct MethodRegistry {
    methods: HashMap<String, Arc<InputMethod>>,
    languages: HashMap<String, Language>,
}

impl MethodRegistry {
    pub fn new() -> MethodRegistry {
        MethodRegistry::default()
    }

    /// Compile and register a method definition. Pattern errors fail here,
    /// at registration time.
    pub fn register(&mut self, def: &MethodDefinition) -> Result<Arc<InputMethod>, MethodError> {
        let method = Arc::new(def.compile()?);
        self.methods.insert(method.id().to_string(), method.clone());
        Ok(method)
    }

    /// Register an already-built method (e.g. one wrapping a custom
    /// transformation function).
    pub fn register_method(&mut self, method: InputMethod) -> Arc<InputMethod> {
        let method = Arc::new(method);
        self.methods.insert(method.id().to_string(), method.clone());
        method
    }

    pub fn get(&self, id: &str) -> Option<Arc<InputMethod>> {
        self.methods.get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.methods.contains_key(id)
    }

    /// Registered method ids, sorted for stable listing.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.methods.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn register_language(&mut self, language: Language) {
        self.languages.insert(language.code.clone(), language);
    }

    pub fn language(&self, code: &str) -> Option<&Language> {
        self.languages.get(code)
    }

    /// The default method for a language: the first one it lists.
    pub fn default_method(&self, code: &str) -> Option<String> {
        self.languages
            .get(code)?
            .input_methods
            .first()
            .cloned()
    }
}
