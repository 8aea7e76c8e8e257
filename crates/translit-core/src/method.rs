//! Compiled input methods and the rule-evaluation algorithm.
//!
//! An [`InputMethod`] is immutable once compiled. Evaluation is a pure
//! function of `(window, context, extended)`: the same inputs always
//! produce the same output, and no rule is tried after the first match.

use std::fmt;
use std::sync::Arc;

use regex::Regex;

/// Errors raised while compiling a method. Pattern problems surface here,
/// at registration time, never during keystroke processing.
#[derive(Debug, thiserror::Error)]
pub enum MethodError {
    #[error("method id must not be empty")]
    EmptyId,
    #[error("method {id:?} has no rules")]
    NoRules { id: String },
    #[error("invalid trigger pattern {pattern:?} in method {id:?}: {source}")]
    BadTrigger {
        id: String,
        pattern: String,
        source: regex::Error,
    },
    #[error("invalid context pattern {pattern:?} in method {id:?}: {source}")]
    BadContext {
        id: String,
        pattern: String,
        source: regex::Error,
    },
}

/// A custom transformation function: the escape hatch for methods whose
/// mapping is not expressible as an ordered rule list.
pub type TransformFn = dyn Fn(&str, &str) -> String + Send + Sync;

/// An ordered rule list, or an opaque transformation taking
/// `(window, context)`. `Custom` takes precedence over rule iteration.
#[derive(Clone)]
pub enum RuleSet {
    Ordered(Vec<Rule>),
    Custom(Arc<TransformFn>),
}

impl fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleSet::Ordered(rules) => f.debug_tuple("Ordered").field(&rules.len()).finish(),
            RuleSet::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// One rewrite rule. The trigger is matched against the end of the
/// pending-input window, the context (when present) against the end of the
/// raw-keystroke context buffer.
///
/// A trigger that can match the empty string is a configuration error;
/// rule sets are static configuration and the engine does not guard
/// against it.
#[derive(Debug, Clone)]
pub struct Rule {
    trigger: Regex,
    context: Option<Regex>,
    template: String,
}

impl Rule {
    pub(crate) fn compile(
        id: &str,
        trigger: &str,
        context: Option<&str>,
        template: &str,
    ) -> Result<Rule, MethodError> {
        let trigger_re = anchored(trigger).map_err(|source| MethodError::BadTrigger {
            id: id.to_string(),
            pattern: trigger.to_string(),
            source,
        })?;
        let context_re = match context {
            Some(pat) => Some(anchored(pat).map_err(|source| MethodError::BadContext {
                id: id.to_string(),
                pattern: pat.to_string(),
                source,
            })?),
            None => None,
        };
        Ok(Rule {
            trigger: trigger_re,
            context: context_re,
            template: template.to_string(),
        })
    }
}

/// Compile a pattern so that its match must end at the last character of
/// the haystack. The non-capturing wrapper keeps that semantic for
/// top-level alternations without shifting capture-group indices.
fn anchored(pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("(?:{pattern})$"))
}

/// A compiled, immutable input method.
pub struct InputMethod {
    id: String,
    name: String,
    context_length: usize,
    max_key_length: usize,
    rules: RuleSet,
    extended: Option<RuleSet>,
}

impl fmt::Debug for InputMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputMethod")
            .field("id", &self.id)
            .field("context_length", &self.context_length)
            .field("max_key_length", &self.max_key_length)
            .field("rules", &self.rules)
            .finish_non_exhaustive()
    }
}

impl InputMethod {
    pub(crate) fn new(
        id: String,
        name: String,
        context_length: usize,
        max_key_length: usize,
        rules: RuleSet,
        extended: Option<RuleSet>,
    ) -> InputMethod {
        InputMethod {
            id,
            name,
            context_length,
            max_key_length,
            rules,
            extended,
        }
    }

    /// Build a method around a custom transformation function.
    pub fn from_fn<F>(id: &str, context_length: usize, max_key_length: usize, f: F) -> InputMethod
    where
        F: Fn(&str, &str) -> String + Send + Sync + 'static,
    {
        InputMethod {
            id: id.to_string(),
            name: String::new(),
            context_length,
            max_key_length,
            rules: RuleSet::Custom(Arc::new(f)),
            extended: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display name (autonym); may be empty.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of trailing raw keystrokes retained as context.
    pub fn context_length(&self) -> usize {
        self.context_length
    }

    /// Upper bound on the lookback window fed to evaluation, excluding the
    /// just-typed character.
    pub fn max_key_length(&self) -> usize {
        self.max_key_length
    }

    pub fn rule_count(&self) -> usize {
        match &self.rules {
            RuleSet::Ordered(rules) => rules.len(),
            RuleSet::Custom(_) => 0,
        }
    }

    pub fn extended_rule_count(&self) -> usize {
        match &self.extended {
            Some(RuleSet::Ordered(rules)) => rules.len(),
            _ => 0,
        }
    }

    /// Transliterate `window` against this method's rules.
    ///
    /// Picks the extended rule set when `extended` is set and the method
    /// has one, else the primary set. Rules are tried in declaration
    /// order; the trigger must match a suffix ending at the last character
    /// of `window`, and a present context pattern must likewise match the
    /// end of `context` (a failed context check moves on to the next
    /// rule). The first rule satisfying both wins; no match returns
    /// `window` unchanged.
    pub fn evaluate(&self, window: &str, context: &str, extended: bool) -> String {
        let set = match (&self.extended, extended) {
            (Some(set), true) => set,
            _ => &self.rules,
        };
        let rules = match set {
            RuleSet::Custom(f) => return f(window, context),
            RuleSet::Ordered(rules) => rules,
        };
        for rule in rules {
            let Some(caps) = rule.trigger.captures(window) else {
                continue;
            };
            if let Some(ctx) = &rule.context {
                if !ctx.is_match(context) {
                    continue;
                }
            }
            let m = caps.get(0).expect("group 0 always present");
            let mut out = String::with_capacity(window.len());
            out.push_str(&window[..m.start()]);
            expand_template(&rule.template, &caps, &mut out);
            return out;
        }
        window.to_string()
    }
}

/// Expand `$1`..`$99` capture references with JavaScript `String.replace`
/// semantics: `$$` is a literal `$`, an unmatched group expands to the
/// empty string, and a reference past the last group stays literal.
///
/// `regex::Captures::expand` is deliberately not used here: its `$name`
/// syntax swallows any trailing word characters, so a template like
/// `$1া` would be read as a (nonexistent) group named `1া`, Bengali
/// letters being word characters.
fn expand_template(template: &str, caps: &regex::Captures<'_>, out: &mut String) {
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some('$') => {
                chars.next();
                out.push('$');
            }
            Some(d) if d.is_ascii_digit() => {
                let mut index = d.to_digit(10).unwrap() as usize;
                chars.next();
                // Prefer a two-digit reference when that group exists.
                if let Some(d2) = chars.peek().copied().filter(|c| c.is_ascii_digit()) {
                    let two = index * 10 + d2.to_digit(10).unwrap() as usize;
                    if two < caps.len() {
                        index = two;
                        chars.next();
                    }
                }
                if index < caps.len() {
                    if let Some(m) = caps.get(index) {
                        out.push_str(m.as_str());
                    }
                } else {
                    out.push('$');
                    out.push_str(&index.to_string());
                }
            }
            _ => out.push('$'),
        }
    }
}
