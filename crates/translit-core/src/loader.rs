//! Completion-based method loading.
//!
//! Fetching a method definition is the one asynchronous operation in the
//! system, modelled for a single-threaded event loop: `load` either
//! answers immediately (already registered), queues the continuation
//! behind an in-flight fetch (concurrent requests for one id collapse
//! into a single fetch), or asks the [`MethodSource`] to begin fetching.
//! The host delivers the fetched definition through [`MethodLoader::complete`],
//! which registers the compiled method and drains every queued
//! continuation. A failed load registers nothing and is not retried.
//!
//! A definition may declare a dependency on another method id; the
//! dependency is fetched and registered before the dependent method.
//! Dependency cycles are a configuration error: the affected loads stay
//! pending forever rather than being detected.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::config::MethodDefinition;
use crate::method::InputMethod;
use crate::registry::MethodRegistry;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to fetch method {id:?}: {reason}")]
    Fetch { id: String, reason: String },
    #[error("invalid definition for method {id:?}: {reason}")]
    Invalid { id: String, reason: String },
    #[error("method {id:?} depends on {dependency:?}, which failed to load")]
    Dependency { id: String, dependency: String },
}

pub type LoadResult = Result<Arc<InputMethod>, LoadError>;

type Continuation = Box<dyn FnOnce(&LoadResult)>;

/// Where definitions come from. `request` is fire-and-forget: the host
/// resolves it later by calling `MethodLoader::complete` with the fetched
/// definition (or the failure reason).
pub trait MethodSource {
    fn request(&mut self, id: &str);
}

pub struct MethodLoader<S: MethodSource> {
    registry: Arc<RwLock<MethodRegistry>>,
    source: S,
    /// Continuations waiting on an in-flight fetch, keyed by method id.
    pending: HashMap<String, Vec<Continuation>>,
    /// Fetched definitions parked until their dependency registers,
    /// keyed by the dependency id.
    parked: HashMap<String, Vec<MethodDefinition>>,
}

impl<S: MethodSource> MethodLoader<S> {
    pub fn new(registry: Arc<RwLock<MethodRegistry>>, source: S) -> MethodLoader<S> {
        MethodLoader {
            registry,
            source,
            pending: HashMap::new(),
            parked: HashMap::new(),
        }
    }

    pub fn registry(&self) -> &Arc<RwLock<MethodRegistry>> {
        &self.registry
    }

    /// Whether a fetch for `id` is currently in flight.
    pub fn is_pending(&self, id: &str) -> bool {
        self.pending.contains_key(id)
    }

    /// Request `id`, invoking `k` once the method is available (possibly
    /// immediately) or once the load fails.
    pub fn load(&mut self, id: &str, k: impl FnOnce(&LoadResult) + 'static) {
        if let Some(method) = self.lookup(id) {
            k(&Ok(method));
            return;
        }
        match self.pending.get_mut(id) {
            Some(waiters) => {
                debug!(id, "load collapsed onto in-flight fetch");
                waiters.push(Box::new(k));
            }
            None => {
                debug!(id, "requesting method definition");
                self.pending.insert(id.to_string(), vec![Box::new(k)]);
                self.source.request(id);
            }
        }
    }

    /// Deliver the outcome of a fetch started via [`MethodSource::request`].
    pub fn complete(&mut self, id: &str, fetched: Result<MethodDefinition, String>) {
        match fetched {
            Ok(def) if def.id != id => {
                let reason = format!("definition carries id {:?}", def.id);
                self.finish(
                    id,
                    Err(LoadError::Invalid {
                        id: id.to_string(),
                        reason,
                    }),
                );
            }
            Ok(def) => self.try_register(def),
            Err(reason) => {
                self.finish(
                    id,
                    Err(LoadError::Fetch {
                        id: id.to_string(),
                        reason,
                    }),
                );
            }
        }
    }

    fn lookup(&self, id: &str) -> Option<Arc<InputMethod>> {
        self.registry.read().ok().and_then(|r| r.get(id))
    }

    /// Register a fetched definition, first parking it if its dependency
    /// has not loaded yet.
    fn try_register(&mut self, def: MethodDefinition) {
        if let Some(dep) = def.depends.clone() {
            if self.lookup(&dep).is_none() {
                debug!(id = %def.id, dependency = %dep, "parking until dependency loads");
                self.parked.entry(dep.clone()).or_default().push(def);
                // One fetch per dependency id, no matter how many park on it.
                if !self.pending.contains_key(&dep) {
                    self.pending.insert(dep.clone(), Vec::new());
                    self.source.request(&dep);
                }
                return;
            }
        }
        let id = def.id.clone();
        let registered = self.registry.write().unwrap().register(&def);
        let result = registered.map_err(|e| LoadError::Invalid {
            id: id.clone(),
            reason: e.to_string(),
        });
        self.finish(&id, result);
    }

    /// Drain continuations for `id` and wake anything parked on it.
    fn finish(&mut self, id: &str, result: LoadResult) {
        debug!(id, ok = result.is_ok(), "load finished");
        if let Some(waiters) = self.pending.remove(id) {
            for k in waiters {
                k(&result);
            }
        }
        if let Some(parked) = self.parked.remove(id) {
            for def in parked {
                if result.is_ok() {
                    self.try_register(def);
                } else {
                    let dependent = def.id.clone();
                    self.finish(
                        &dependent,
                        Err(LoadError::Dependency {
                            id: dependent.clone(),
                            dependency: id.to_string(),
                        }),
                    );
                }
            }
        }
    }
}
