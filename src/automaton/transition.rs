//! Transition representation

use super::{FireHook, Predicate};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A directed, predicate-guarded edge between two states
pub struct Transition<S> {
    source: String,
    target: String,
    predicate: Predicate<S>,
    description: String,
    hooks: Vec<FireHook<S>>,
}

impl<S> Transition<S> {
    /// Create a transition whose description is the predicate name.
    pub fn new(source: impl Into<String>, target: impl Into<String>, predicate: Predicate<S>) -> Self {
        let description = predicate.name().to_string();
        Self {
            source: source.into(),
            target: target.into(),
            predicate,
            description,
            hooks: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Append a fire hook; hooks run in the order they were added.
    pub fn on_fire(mut self, hook: FireHook<S>) -> Self {
        self.hooks.push(hook);
        self
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn predicate(&self) -> &Predicate<S> {
        &self.predicate
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn hooks(&self) -> &[FireHook<S>] {
        &self.hooks
    }

    /// Whether the predicate accepts the symbol.
    pub fn fires_on(&self, symbol: &S) -> bool {
        self.predicate.test(symbol)
    }

    /// Equality on everything except the attached hooks.
    pub fn eq_ignoring_hooks(&self, other: &Self) -> bool {
        self.source == other.source
            && self.target == other.target
            && self.predicate == other.predicate
            && self.description == other.description
    }
}

impl<S> Clone for Transition<S> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            target: self.target.clone(),
            predicate: self.predicate.clone(),
            description: self.description.clone(),
            hooks: self.hooks.clone(),
        }
    }
}

impl<S> PartialEq for Transition<S> {
    fn eq(&self, other: &Self) -> bool {
        self.eq_ignoring_hooks(other) && self.hooks == other.hooks
    }
}

impl<S> Eq for Transition<S> {}

impl<S> Hash for Transition<S> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.source.hash(state);
        self.target.hash(state);
        self.predicate.hash(state);
        self.description.hash(state);
        self.hooks.hash(state);
    }
}

impl<S> fmt::Debug for Transition<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition")
            .field("source", &self.source)
            .field("target", &self.target)
            .field("predicate", &self.predicate)
            .field("description", &self.description)
            .field("hooks", &self.hooks)
            .finish()
    }
}

impl<S> fmt::Display for Transition<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} [{}]", self.source, self.target, self.description)
    }
}
