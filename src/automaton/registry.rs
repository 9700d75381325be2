//! Registry of static predicates and fire hooks
//!
//! Exchange documents and snapshots refer to callables by `name;scope` keys.
//! The embedding application registers the functions it wants to be resolvable
//! at startup; codecs then look keys up here instead of inspecting code at
//! runtime.

use crate::automaton::predicate::{decode_key, encode_key};
use crate::automaton::{FireHook, Predicate};
use crate::{Error, Result};
use std::collections::HashMap;
use std::fmt;

/// Why a key could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unresolved {
    /// Not of the form `name;scope`
    BadEncoding(String),
    /// Nothing is registered under the scope
    UnknownScope(String),
    /// The scope exists but holds no callable with that name
    UnknownName { name: String, scope: String },
}

impl fmt::Display for Unresolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unresolved::BadEncoding(raw) => write!(f, "'{}' is not of the form name;scope", raw),
            Unresolved::UnknownScope(scope) => write!(f, "no callables registered in {}", scope),
            Unresolved::UnknownName { name, scope } => {
                write!(f, "no callable named {} in {}", name, scope)
            }
        }
    }
}

/// Something that can be stored in a [`Catalog`].
pub trait Callable: Clone {
    fn name(&self) -> &str;
    fn scope(&self) -> Option<&str>;
}

impl<S> Callable for Predicate<S> {
    fn name(&self) -> &str {
        Predicate::name(self)
    }

    fn scope(&self) -> Option<&str> {
        Predicate::scope(self)
    }
}

impl<S> Callable for FireHook<S> {
    fn name(&self) -> &str {
        FireHook::name(self)
    }

    fn scope(&self) -> Option<&str> {
        FireHook::scope(self)
    }
}

/// Callables grouped by scope, then by name.
#[derive(Debug)]
pub struct Catalog<T> {
    scopes: HashMap<String, HashMap<String, T>>,
}

impl<T: Callable> Catalog<T> {
    fn new() -> Self {
        Self {
            scopes: HashMap::new(),
        }
    }

    fn insert(&mut self, kind: &str, callable: T) -> Result<()> {
        let scope = callable.scope().ok_or_else(|| {
            Error::Registry(format!(
                "{} '{}' is a closure and cannot be registered",
                kind,
                callable.name()
            ))
        })?;
        let names = self.scopes.entry(scope.to_string()).or_default();
        if names.contains_key(callable.name()) {
            return Err(Error::Registry(format!(
                "{} '{}' is already registered",
                kind,
                encode_key(callable.name(), scope)
            )));
        }
        names.insert(callable.name().to_string(), callable);
        Ok(())
    }

    pub fn resolve(&self, encoded: &str) -> std::result::Result<T, Unresolved> {
        let (name, scope) =
            decode_key(encoded).ok_or_else(|| Unresolved::BadEncoding(encoded.to_string()))?;
        let names = self
            .scopes
            .get(scope)
            .ok_or_else(|| Unresolved::UnknownScope(scope.to_string()))?;
        names
            .get(name)
            .cloned()
            .ok_or_else(|| Unresolved::UnknownName {
                name: name.to_string(),
                scope: scope.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.scopes.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Predicates and hooks resolvable by key for alphabet `S`.
#[derive(Debug)]
pub struct Registry<S> {
    predicates: Catalog<Predicate<S>>,
    hooks: Catalog<FireHook<S>>,
}

impl<S> Registry<S> {
    pub fn new() -> Self {
        Self {
            predicates: Catalog::new(),
            hooks: Catalog::new(),
        }
    }

    /// Register a static predicate. Closures and duplicate keys are rejected.
    pub fn register_predicate(&mut self, predicate: Predicate<S>) -> Result<()> {
        self.predicates.insert("predicate", predicate)
    }

    /// Register a static fire hook. Closures and duplicate keys are rejected.
    pub fn register_hook(&mut self, hook: FireHook<S>) -> Result<()> {
        self.hooks.insert("hook", hook)
    }

    pub fn with_predicate(mut self, predicate: Predicate<S>) -> Result<Self> {
        self.register_predicate(predicate)?;
        Ok(self)
    }

    pub fn with_hook(mut self, hook: FireHook<S>) -> Result<Self> {
        self.register_hook(hook)?;
        Ok(self)
    }

    pub fn resolve_predicate(&self, encoded: &str) -> std::result::Result<Predicate<S>, Unresolved> {
        self.predicates.resolve(encoded)
    }

    pub fn resolve_hook(&self, encoded: &str) -> std::result::Result<FireHook<S>, Unresolved> {
        self.hooks.resolve(encoded)
    }

    pub fn predicates(&self) -> &Catalog<Predicate<S>> {
        &self.predicates
    }

    pub fn hooks(&self) -> &Catalog<FireHook<S>> {
        &self.hooks
    }
}

impl<S> Default for Registry<S> {
    fn default() -> Self {
        Self::new()
    }
}
