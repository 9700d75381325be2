//! Transition predicates
//!
//! A predicate decides whether a transition fires for a given symbol. Static
//! predicates are plain functions identified by a name and the module that
//! defines them, so they can be written to an exchange document and located
//! again through a [`Registry`](super::Registry). Bound predicates are closures
//! over captured values and only live in memory.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Signature of a static predicate.
pub type PredicateFn<S> = fn(&S) -> bool;

/// Shared closure behind a bound predicate.
pub type BoundPredicateFn<S> = Arc<dyn Fn(&S) -> bool + Send + Sync>;

/// Pure boolean function of one alphabet symbol.
///
/// A static predicate is identified by its (name, scope) key alone, the same
/// key the codecs write out; two functions registered under one key are the
/// same predicate. Bound predicates are equal only to clones of themselves.
pub struct Predicate<S> {
    name: String,
    kind: PredicateKind<S>,
}

enum PredicateKind<S> {
    Static { scope: String, func: PredicateFn<S> },
    Bound(BoundPredicateFn<S>),
}

/// Build a static predicate from a function in scope, using the function
/// name and the calling module path as its identity.
///
/// ```
/// use automata_engine::predicate;
///
/// fn is_zero(c: &char) -> bool {
///     *c == '0'
/// }
///
/// let p = predicate!(is_zero);
/// assert_eq!(p.name(), "is_zero");
/// assert!(p.test(&'0'));
/// ```
#[macro_export]
macro_rules! predicate {
    ($func:ident) => {
        $crate::automaton::Predicate::new(stringify!($func), module_path!(), $func)
    };
}

fn never<S>(_: &S) -> bool {
    false
}

impl<S> Predicate<S> {
    /// Create a static predicate.
    pub fn new(name: impl Into<String>, scope: impl Into<String>, func: PredicateFn<S>) -> Self {
        Self {
            name: name.into(),
            kind: PredicateKind::Static {
                scope: scope.into(),
                func,
            },
        }
    }

    /// Create a bound predicate from a closure.
    pub fn from_fn<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&S) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            kind: PredicateKind::Bound(Arc::new(func)),
        }
    }

    /// The always-false predicate substituted for unresolvable references.
    pub fn never() -> Self {
        Self::new("never", module_path!(), never::<S>)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Defining module of a static predicate.
    pub fn scope(&self) -> Option<&str> {
        match &self.kind {
            PredicateKind::Static { scope, .. } => Some(scope),
            PredicateKind::Bound(_) => None,
        }
    }

    pub fn is_static(&self) -> bool {
        matches!(self.kind, PredicateKind::Static { .. })
    }

    /// `name;scope` for static predicates, `None` for closures.
    pub fn encoded(&self) -> Option<String> {
        self.scope().map(|scope| encode_key(&self.name, scope))
    }

    /// Evaluate the predicate against a symbol.
    pub fn test(&self, symbol: &S) -> bool {
        match &self.kind {
            PredicateKind::Static { func, .. } => func(symbol),
            PredicateKind::Bound(func) => func(symbol),
        }
    }
}

/// Join a callable name and scope into a registry key.
pub fn encode_key(name: &str, scope: &str) -> String {
    format!("{};{}", name, scope)
}

/// Split a registry key into name and scope.
pub fn decode_key(encoded: &str) -> Option<(&str, &str)> {
    let (name, scope) = encoded.split_once(';')?;
    if name.is_empty() || scope.is_empty() {
        return None;
    }
    Some((name, scope))
}

impl<S> Clone for Predicate<S> {
    fn clone(&self) -> Self {
        let kind = match &self.kind {
            PredicateKind::Static { scope, func } => PredicateKind::Static {
                scope: scope.clone(),
                func: *func,
            },
            PredicateKind::Bound(func) => PredicateKind::Bound(Arc::clone(func)),
        };
        Self {
            name: self.name.clone(),
            kind,
        }
    }
}

// The fn pointer is left out: the key is the identity.
impl<S> PartialEq for Predicate<S> {
    fn eq(&self, other: &Self) -> bool {
        match (&self.kind, &other.kind) {
            (PredicateKind::Static { scope: a, .. }, PredicateKind::Static { scope: b, .. }) => {
                self.name == other.name && a == b
            }
            (PredicateKind::Bound(a), PredicateKind::Bound(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl<S> Eq for Predicate<S> {}

impl<S> Hash for Predicate<S> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match &self.kind {
            PredicateKind::Static { scope, .. } => {
                self.name.hash(state);
                scope.hash(state);
            }
            PredicateKind::Bound(func) => {
                (Arc::as_ptr(func) as *const () as usize).hash(state);
            }
        }
    }
}

impl<S> fmt::Debug for Predicate<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            PredicateKind::Static { scope, .. } => f
                .debug_struct("Predicate")
                .field("name", &self.name)
                .field("scope", scope)
                .finish(),
            PredicateKind::Bound(_) => f
                .debug_struct("Predicate")
                .field("name", &self.name)
                .field("bound", &true)
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_zero(c: &char) -> bool {
        *c == '0'
    }

    #[test]
    fn test_static_predicate_identity() {
        let p = crate::predicate!(is_zero);
        assert_eq!(p.name(), "is_zero");
        assert_eq!(p.scope(), Some(module_path!()));
        assert!(p.is_static());
        assert!(p.test(&'0'));
        assert!(!p.test(&'1'));

        let again = Predicate::new("is_zero", module_path!(), is_zero);
        assert_eq!(p, again);
        assert_eq!(
            p.encoded().unwrap(),
            format!("is_zero;{}", module_path!())
        );
    }

    #[test]
    fn test_bound_predicate_compares_by_identity() {
        let limit = 3;
        let p: Predicate<u32> = Predicate::from_fn("below_limit", move |n| *n < limit);
        let q: Predicate<u32> = Predicate::from_fn("below_limit", move |n| *n < limit);

        assert!(!p.is_static());
        assert!(p.encoded().is_none());
        assert_eq!(p, p.clone());
        assert_ne!(p, q);
        assert!(p.test(&2));
    }

    #[test]
    fn test_never() {
        let p: Predicate<char> = Predicate::never();
        assert!(!p.test(&'a'));
        assert_eq!(p.name(), "never");
        assert_eq!(p, Predicate::<char>::never());
    }

    #[test]
    fn test_decode_key() {
        assert_eq!(decode_key("is_zero;lib::preds"), Some(("is_zero", "lib::preds")));
        assert_eq!(decode_key("is_zero"), None);
        assert_eq!(decode_key(";lib"), None);
        assert_eq!(decode_key("name;"), None);
    }

    #[test]
    fn test_static_identity_is_the_key() {
        fn is_one(c: &char) -> bool {
            *c == '1'
        }

        let p = Predicate::new("digit", "lib::preds", is_zero);
        let q = Predicate::new("digit", "lib::preds", is_one);
        assert_eq!(p, q);
        assert_eq!(p.encoded(), q.encoded());
        assert_ne!(p, Predicate::new("digit", "other::preds", is_zero));
        assert_ne!(p, Predicate::new("is_zero", "lib::preds", is_zero));

        let mut seen = std::collections::HashSet::new();
        seen.insert(p);
        assert!(!seen.insert(q));
    }
}
