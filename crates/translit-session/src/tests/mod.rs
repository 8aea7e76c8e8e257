mod avro;

use std::sync::{Arc, RwLock};

use translit_core::config::parse_method_toml;
use translit_core::methods::bundled_registry;
use translit_core::registry::MethodRegistry;

use super::field::EditBuffer;
use super::types::{KeyEvent, KeyResponse};
use super::InputSession;

/// Registry with a deliberately small method for protocol tests.
///
/// `mini-bn`: consonant + `a` takes the dependent vowel sign; `b` after a
/// raw `a` keystroke maps differently from a cold `b`, which makes
/// context resets observable.
pub(super) fn test_registry() -> Arc<RwLock<MethodRegistry>> {
    let mut registry = MethodRegistry::new();
    let def = parse_method_toml(
        r#"
id = "mini-bn"
context_length = 4
max_key_length = 2
rules = [
    ["([ক-হ])a", '$1া'],
    ["b", "a", "B"],
    ["b", "ব"],
    ["k", "ক"],
    ["a", "আ"],
]
"#,
    )
    .unwrap();
    registry.register(&def).unwrap();
    Arc::new(RwLock::new(registry))
}

pub(super) fn avro_registry() -> Arc<RwLock<MethodRegistry>> {
    Arc::new(RwLock::new(bundled_registry()))
}

pub(super) fn session_with(registry: &Arc<RwLock<MethodRegistry>>, id: &str) -> InputSession {
    let mut session = InputSession::new(registry.clone());
    session.select_method(id).unwrap();
    session
}

/// Simulate typing: run each character through the session and apply the
/// responses to the buffer the way a host would.
pub(super) fn type_text(
    session: &mut InputSession,
    buf: &mut EditBuffer,
    s: &str,
) -> Vec<KeyResponse> {
    let mut responses = Vec::new();
    for ch in s.chars() {
        let event = KeyEvent::char(ch);
        let resp = session.handle_key(event, buf);
        buf.apply_response(event, &resp);
        responses.push(resp);
    }
    responses
}
