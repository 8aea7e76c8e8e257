//! Bundled input methods, embedded the same way the default settings and
//! romaji tables are: TOML compiled at first use, validated by tests.

use crate::config::{parse_method_toml, MethodDefinition};
use crate::registry::{Language, MethodRegistry};

pub const BN_AVRO_TOML: &str = include_str!("methods/bn_avro.toml");

/// Definitions of every bundled method, in registration order.
pub fn bundled_definitions() -> Vec<MethodDefinition> {
    [BN_AVRO_TOML]
        .iter()
        .map(|toml| parse_method_toml(toml).expect("bundled method TOML must be valid"))
        .collect()
}

/// A registry pre-populated with the bundled methods and their languages.
pub fn bundled_registry() -> MethodRegistry {
    let mut registry = MethodRegistry::new();
    for def in bundled_definitions() {
        registry
            .register(&def)
            .expect("bundled method must compile");
    }
    registry.register_language(Language::new("bn", "বাংলা", vec!["bn-avro"]));
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_methods_compile() {
        let registry = bundled_registry();
        let avro = registry.get("bn-avro").unwrap();
        assert_eq!(avro.name(), "অভ্র");
        assert_eq!(avro.context_length(), 4);
        assert_eq!(avro.max_key_length(), 5);
        assert!(avro.rule_count() > 100);
    }

    #[test]
    fn avro_base_mappings() {
        let registry = bundled_registry();
        let avro = registry.get("bn-avro").unwrap();
        assert_eq!(avro.evaluate("a", "", false), "আ");
        assert_eq!(avro.evaluate("k", "", false), "ক");
        assert_eq!(avro.evaluate("7", "", false), "৭");
    }

    #[test]
    fn avro_vowel_sign_after_consonant() {
        let registry = bundled_registry();
        let avro = registry.get("bn-avro").unwrap();
        // Consonant + a takes the dependent vowel sign, not the full vowel.
        assert_eq!(avro.evaluate("কa", "k", false), "কা");
        // After a raw "o" keystroke the consonant rule is context-blocked.
        assert_eq!(avro.evaluate("কo", "k", false), "ক");
    }

    #[test]
    fn avro_conjunct_and_aspirate() {
        let registry = bundled_registry();
        let avro = registry.get("bn-avro").unwrap();
        assert_eq!(avro.evaluate("কk", "k", false), "ক্ক");
        assert_eq!(avro.evaluate("তh", "kot", false), "থ");
    }

    #[test]
    fn avro_backtick_escapes() {
        let registry = bundled_registry();
        let avro = registry.get("bn-avro").unwrap();
        // \. yields an ASCII dot instead of the danda.
        assert_eq!(avro.evaluate("\\.", "", false), ".");
        assert_eq!(avro.evaluate(".", "", false), "।");
        // Bare backtick is swallowed.
        assert_eq!(avro.evaluate("`", "", false), "");
    }

    #[test]
    fn bn_language_registered() {
        let registry = bundled_registry();
        assert_eq!(registry.default_method("bn"), Some("bn-avro".to_string()));
    }
}
