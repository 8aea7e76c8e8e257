//! Simulated typing: feed text through a session keystroke by keystroke.

use std::path::Path;
use std::sync::{Arc, RwLock};

use translit_core::methods::bundled_registry;
use translit_core::registry::MethodRegistry;
use translit_session::{EditBuffer, InputSession, KeyEvent};

use super::method_ops::load_definition;
use super::CliError;

/// Resolve `method` to a registered id: a path to a definition file is
/// parsed and registered, anything else is taken as a bundled id.
fn resolve_method(
    registry: &Arc<RwLock<MethodRegistry>>,
    method: &str,
) -> Result<String, CliError> {
    let path = Path::new(method);
    if path.is_file() {
        let def = load_definition(path)?;
        registry.write().unwrap().register(&def)?;
        return Ok(def.id);
    }
    if registry.read().unwrap().contains(method) {
        Ok(method.to_string())
    } else {
        Err(CliError::UnknownMethod(method.to_string()))
    }
}

/// Type `text` through `id`, applying each response to an in-memory
/// buffer the way a host field would. Returns the per-keystroke trace
/// and the final buffer content.
pub(crate) fn transliterate_text(
    registry: Arc<RwLock<MethodRegistry>>,
    id: &str,
    text: &str,
) -> Result<(Vec<String>, String), CliError> {
    let mut session = InputSession::new(registry);
    session
        .select_method(id)
        .map_err(|e| CliError::UnknownMethod(e.0))?;

    let mut buf = EditBuffer::new();
    let mut trace = Vec::new();
    for ch in text.chars() {
        let event = KeyEvent::char(ch);
        let resp = session.handle_key(event, &buf);
        trace.push(match &resp.edit {
            Some(edit) => format!(
                "{ch:?} -> replace [{}..{}) with {:?}",
                edit.start, edit.end, edit.text
            ),
            None => format!("{ch:?} -> pass through"),
        });
        buf.apply_response(event, &resp);
    }
    Ok((trace, buf.text().to_string()))
}

pub fn run(method: &str, text: &str, each: bool) -> Result<(), CliError> {
    let registry = Arc::new(RwLock::new(bundled_registry()));
    let id = resolve_method(&registry, method)?;
    let (trace, result) = transliterate_text(registry, &id, text)?;
    if each {
        for line in &trace {
            println!("{line}");
        }
    }
    println!("{result}");
    Ok(())
}
