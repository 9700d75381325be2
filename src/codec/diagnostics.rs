//! Recoverable codec warnings
//!
//! Codecs report data they had to drop or substitute through a [`Diagnostics`]
//! collector passed by the caller. Every warning is also logged.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// A bound predicate was left out of an exported edge.
    PredicateNotEncodable {
        edge: String,
        transition: String,
        predicate: String,
    },
    /// An imported edge got the always-false predicate.
    PredicateUnresolved {
        edge: String,
        encoded: Option<String>,
        reason: String,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::PredicateNotEncodable {
                edge,
                transition,
                predicate,
            } => write!(
                f,
                "edge {} ({}): predicate '{}' captures state and was not exported",
                edge, transition, predicate
            ),
            Warning::PredicateUnresolved {
                edge,
                encoded: Some(encoded),
                reason,
            } => write!(
                f,
                "edge {}: predicate '{}' could not be resolved ({}), using never",
                edge, encoded, reason
            ),
            Warning::PredicateUnresolved {
                edge,
                encoded: None,
                reason,
            } => write!(f, "edge {}: {}, using never", edge, reason),
        }
    }
}

/// Collector for warnings raised during one or more codec calls.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!("{}", warning);
        self.warnings.push(warning);
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    pub fn into_warnings(self) -> Vec<Warning> {
        self.warnings
    }
}
