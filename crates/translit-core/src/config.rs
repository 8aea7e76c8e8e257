//! Method definitions: the serializable shape of an input method.
//!
//! Definitions use a compact rule-array layout: each rule is
//! `[trigger, replacement]` or `[trigger, context, replacement]`. TOML is
//! the native on-disk format; JSON is accepted for data interchanged with
//! hosts that keep definitions as object literals.

use serde::{Deserialize, Serialize};

use crate::method::{InputMethod, MethodError, Rule, RuleSet};

#[derive(Debug, thiserror::Error)]
pub enum MethodConfigError {
    #[error("TOML parse error: {0}")]
    ParseToml(String),
    #[error("JSON parse error: {0}")]
    ParseJson(String),
    #[error("method id must not be empty")]
    EmptyId,
    #[error("method {id:?} has no rules")]
    NoRules { id: String },
    #[error("rule {index} of method {id:?} has {len} elements, expected 2 or 3")]
    RuleShape { id: String, index: usize, len: usize },
}

fn default_max_key_length() -> usize {
    1
}

/// On-disk shape of an input method. A method that never looks at
/// context or past output can omit both lengths: `context_length`
/// defaults to 0 and `max_key_length` to 1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodDefinition {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub context_length: usize,
    #[serde(default = "default_max_key_length")]
    pub max_key_length: usize,
    pub rules: Vec<Vec<String>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extended_rules: Vec<Vec<String>>,
    /// Method id that must be loaded before this one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depends: Option<String>,
}

/// Parse and shape-validate a TOML method definition.
pub fn parse_method_toml(toml_str: &str) -> Result<MethodDefinition, MethodConfigError> {
    let def: MethodDefinition =
        toml::from_str(toml_str).map_err(|e| MethodConfigError::ParseToml(e.to_string()))?;
    validate(&def)?;
    Ok(def)
}

/// Parse and shape-validate a JSON method definition.
pub fn parse_method_json(json_str: &str) -> Result<MethodDefinition, MethodConfigError> {
    let def: MethodDefinition =
        serde_json::from_str(json_str).map_err(|e| MethodConfigError::ParseJson(e.to_string()))?;
    validate(&def)?;
    Ok(def)
}

fn validate(def: &MethodDefinition) -> Result<(), MethodConfigError> {
    if def.id.is_empty() {
        return Err(MethodConfigError::EmptyId);
    }
    if def.rules.is_empty() {
        return Err(MethodConfigError::NoRules {
            id: def.id.clone(),
        });
    }
    for (index, rule) in def.rules.iter().chain(def.extended_rules.iter()).enumerate() {
        let len = rule.len();
        if len != 2 && len != 3 {
            return Err(MethodConfigError::RuleShape {
                id: def.id.clone(),
                index,
                len,
            });
        }
    }
    Ok(())
}

impl MethodDefinition {
    /// Compile into an immutable [`InputMethod`]. Pattern errors surface
    /// here, before the method can ever see a keystroke.
    pub fn compile(&self) -> Result<InputMethod, MethodError> {
        if self.id.is_empty() {
            return Err(MethodError::EmptyId);
        }
        if self.rules.is_empty() {
            return Err(MethodError::NoRules {
                id: self.id.clone(),
            });
        }
        let rules = compile_rules(&self.id, &self.rules)?;
        let extended = if self.extended_rules.is_empty() {
            None
        } else {
            Some(compile_rules(&self.id, &self.extended_rules)?)
        };
        Ok(InputMethod::new(
            self.id.clone(),
            self.name.clone(),
            self.context_length,
            self.max_key_length,
            rules,
            extended,
        ))
    }
}

fn compile_rules(id: &str, raw: &[Vec<String>]) -> Result<RuleSet, MethodError> {
    let mut rules = Vec::with_capacity(raw.len());
    for parts in raw {
        // Shape is validated at parse time; a stray arity here would come
        // from a hand-built definition, so keep the split total.
        let (trigger, context, template) = match parts.len() {
            3 => (&parts[0], Some(parts[1].as_str()), &parts[2]),
            _ => (&parts[0], None, parts.last().unwrap_or(&parts[0])),
        };
        rules.push(Rule::compile(id, trigger, context, template)?);
    }
    Ok(RuleSet::Ordered(rules))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_toml() {
        let def = parse_method_toml(
            r#"
id = "bn-avro"
name = "অভ্র"
context_length = 4
max_key_length = 5
rules = [
    ["([ক-হ])a", "[^o`]", '$1া'],
    ["a", "আ"],
]
"#,
        )
        .unwrap();
        assert_eq!(def.id, "bn-avro");
        assert_eq!(def.name, "অভ্র");
        assert_eq!(def.context_length, 4);
        assert_eq!(def.max_key_length, 5);
        assert_eq!(def.rules.len(), 2);
        assert!(def.extended_rules.is_empty());
        assert!(def.depends.is_none());
    }

    #[test]
    fn length_defaults() {
        let def = parse_method_toml(
            r#"
id = "minimal"
rules = [["a", "b"]]
"#,
        )
        .unwrap();
        assert_eq!(def.context_length, 0);
        assert_eq!(def.max_key_length, 1);
    }

    #[test]
    fn parse_valid_json() {
        let def = parse_method_json(
            r#"{
                "id": "x",
                "max_key_length": 2,
                "rules": [["a", "b"], ["c", "d", "e"]],
                "depends": "base"
            }"#,
        )
        .unwrap();
        assert_eq!(def.max_key_length, 2);
        assert_eq!(def.depends.as_deref(), Some("base"));
    }

    #[test]
    fn error_empty_id() {
        let err = parse_method_toml(
            r#"
id = ""
rules = [["a", "b"]]
"#,
        )
        .unwrap_err();
        assert!(matches!(err, MethodConfigError::EmptyId));
    }

    #[test]
    fn error_no_rules() {
        let err = parse_method_toml(
            r#"
id = "x"
rules = []
"#,
        )
        .unwrap_err();
        assert!(matches!(err, MethodConfigError::NoRules { .. }));
    }

    #[test]
    fn error_rule_shape() {
        let err = parse_method_toml(
            r#"
id = "x"
rules = [["only-trigger"]]
"#,
        )
        .unwrap_err();
        assert!(matches!(err, MethodConfigError::RuleShape { len: 1, .. }));

        let err = parse_method_toml(
            r#"
id = "x"
rules = [["a", "b", "c", "d"]]
"#,
        )
        .unwrap_err();
        assert!(matches!(err, MethodConfigError::RuleShape { len: 4, .. }));
    }

    #[test]
    fn extended_rules_shape_checked() {
        let err = parse_method_toml(
            r#"
id = "x"
rules = [["a", "b"]]
extended_rules = [["z"]]
"#,
        )
        .unwrap_err();
        assert!(matches!(err, MethodConfigError::RuleShape { .. }));
    }

    #[test]
    fn error_invalid_toml() {
        let err = parse_method_toml("not valid toml {{{").unwrap_err();
        assert!(matches!(err, MethodConfigError::ParseToml(_)));
    }

    #[test]
    fn compiled_method_carries_parameters() {
        let m = parse_method_toml(
            r#"
id = "x"
context_length = 3
max_key_length = 4
rules = [["a", "b"]]
extended_rules = [["a", "c"]]
"#,
        )
        .unwrap()
        .compile()
        .unwrap();
        assert_eq!(m.id(), "x");
        assert_eq!(m.context_length(), 3);
        assert_eq!(m.max_key_length(), 4);
        assert_eq!(m.rule_count(), 1);
        assert_eq!(m.extended_rule_count(), 1);
    }
}
