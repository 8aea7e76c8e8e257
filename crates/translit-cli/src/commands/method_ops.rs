//! Method listing and validation.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fs;
use std::path::Path;
use std::rc::Rc;
use std::sync::{Arc, RwLock};

use translit_core::config::{parse_method_json, parse_method_toml, MethodDefinition};
use translit_core::loader::{MethodLoader, MethodSource};
use translit_core::methods::bundled_registry;
use translit_core::registry::MethodRegistry;

use super::CliError;

/// Read and parse a definition file, picking the parser by extension
/// (`.json` is JSON, everything else TOML).
pub(crate) fn load_definition(path: &Path) -> Result<MethodDefinition, CliError> {
    let text = fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let parsed = if path.extension().is_some_and(|e| e == "json") {
        parse_method_json(&text)
    } else {
        parse_method_toml(&text)
    };
    parsed.map_err(|source| CliError::Config {
        path: path.display().to_string(),
        source,
    })
}

/// Source that resolves ids against `<dir>/<id>.toml` / `<dir>/<id>.json`.
/// Requests queue into an outbox the caller drains with [`pump`], playing
/// the event loop the loader is written for.
struct DirectorySource {
    outbox: Rc<RefCell<VecDeque<String>>>,
}

impl MethodSource for DirectorySource {
    fn request(&mut self, id: &str) {
        self.outbox.borrow_mut().push_back(id.to_string());
    }
}

fn fetch_from_dir(dir: &Path, id: &str) -> Result<MethodDefinition, String> {
    for ext in ["toml", "json"] {
        let path = dir.join(format!("{id}.{ext}"));
        if path.is_file() {
            return load_definition(&path).map_err(|e| e.to_string());
        }
    }
    Err(format!("no definition file for {id:?} in {}", dir.display()))
}

/// Drain the outbox until no fetch is outstanding. Completing one load
/// may queue further requests (dependencies), so this loops rather than
/// iterating a snapshot.
fn pump(
    loader: &mut MethodLoader<DirectorySource>,
    outbox: &Rc<RefCell<VecDeque<String>>>,
    dir: &Path,
) {
    loop {
        let next = outbox.borrow_mut().pop_front();
        let Some(id) = next else { break };
        let fetched = fetch_from_dir(dir, &id);
        loader.complete(&id, fetched);
    }
}

fn ids_in_dir(dir: &Path) -> Result<Vec<String>, CliError> {
    let entries = fs::read_dir(dir).map_err(|source| CliError::Io {
        path: dir.display().to_string(),
        source,
    })?;
    let mut ids = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        let is_def = path
            .extension()
            .is_some_and(|e| e == "toml" || e == "json");
        if let (true, Some(stem)) = (is_def, path.file_stem()) {
            ids.push(stem.to_string_lossy().into_owned());
        }
    }
    ids.sort();
    ids.dedup();
    Ok(ids)
}

/// Load every definition in `dir` into `registry` through the loader.
/// Returns the failure messages (the surviving methods are registered
/// regardless).
pub(crate) fn load_directory(
    registry: Arc<RwLock<MethodRegistry>>,
    dir: &Path,
) -> Result<Vec<String>, CliError> {
    let outbox = Rc::new(RefCell::new(VecDeque::new()));
    let source = DirectorySource {
        outbox: outbox.clone(),
    };
    let mut loader = MethodLoader::new(registry, source);

    let failures = Rc::new(RefCell::new(Vec::new()));
    for id in ids_in_dir(dir)? {
        let f = failures.clone();
        loader.load(&id, move |result| {
            if let Err(e) = result {
                f.borrow_mut().push(e.to_string());
            }
        });
        pump(&mut loader, &outbox, dir);
    }
    // Continuations still parked in the loader (e.g. a dependency cycle)
    // hold clones of `failures`; drop them before unwrapping.
    drop(loader);
    Ok(Rc::try_unwrap(failures)
        .map(RefCell::into_inner)
        .unwrap_or_default())
}

pub fn list(dir: Option<&Path>) -> Result<(), CliError> {
    let registry = Arc::new(RwLock::new(bundled_registry()));
    if let Some(dir) = dir {
        for failure in load_directory(registry.clone(), dir)? {
            eprintln!("warning: {failure}");
        }
    }

    let registry = registry.read().unwrap();
    for id in registry.ids() {
        let Some(method) = registry.get(&id) else {
            continue;
        };
        let mut line = format!("{id}  rules={}", method.rule_count());
        if method.extended_rule_count() > 0 {
            line.push_str(&format!(" extended={}", method.extended_rule_count()));
        }
        if !method.name().is_empty() {
            line.push_str(&format!("  ({})", method.name()));
        }
        println!("{line}");
    }
    Ok(())
}

pub fn check(file: &Path) -> Result<(), CliError> {
    let def = load_definition(file)?;
    let method = def.compile()?;
    println!(
        "{}: ok (id {:?}, {} rules, context {}, lookback {})",
        file.display(),
        method.id(),
        method.rule_count(),
        method.context_length(),
        method.max_key_length(),
    );
    Ok(())
}
