//! Fire hooks invoked when a transition is taken

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Outcome of a fire hook; errors propagate out of `Cursor::next_state`.
pub type HookResult = anyhow::Result<()>;

/// Signature of a static hook: (pre-transition source state, consumed symbol).
pub type HookFn<S> = fn(&str, &S) -> HookResult;

/// Shared closure behind a bound hook.
pub type BoundHookFn<S> = Arc<dyn Fn(&str, &S) -> HookResult + Send + Sync>;

/// Callback attached to a transition.
///
/// Identity follows [`Predicate`](super::Predicate): a static hook is its
/// (name, scope) key, a bound hook is its shared closure.
pub struct FireHook<S> {
    name: String,
    kind: HookKind<S>,
}

enum HookKind<S> {
    Static { scope: String, func: HookFn<S> },
    Bound(BoundHookFn<S>),
}

/// Build a static hook from a function in scope, named after the function and
/// scoped to the calling module.
#[macro_export]
macro_rules! hook {
    ($func:ident) => {
        $crate::automaton::FireHook::new(stringify!($func), module_path!(), $func)
    };
}

impl<S> FireHook<S> {
    pub fn new(name: impl Into<String>, scope: impl Into<String>, func: HookFn<S>) -> Self {
        Self {
            name: name.into(),
            kind: HookKind::Static {
                scope: scope.into(),
                func,
            },
        }
    }

    /// Create a bound hook from a closure. Bound hooks cannot be snapshotted.
    pub fn from_fn<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&str, &S) -> HookResult + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            kind: HookKind::Bound(Arc::new(func)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn scope(&self) -> Option<&str> {
        match &self.kind {
            HookKind::Static { scope, .. } => Some(scope),
            HookKind::Bound(_) => None,
        }
    }

    pub fn is_static(&self) -> bool {
        matches!(self.kind, HookKind::Static { .. })
    }

    pub fn fire(&self, source: &str, symbol: &S) -> HookResult {
        match &self.kind {
            HookKind::Static { func, .. } => func(source, symbol),
            HookKind::Bound(func) => func(source, symbol),
        }
    }
}

impl<S> Clone for FireHook<S> {
    fn clone(&self) -> Self {
        let kind = match &self.kind {
            HookKind::Static { scope, func } => HookKind::Static {
                scope: scope.clone(),
                func: *func,
            },
            HookKind::Bound(func) => HookKind::Bound(Arc::clone(func)),
        };
        Self {
            name: self.name.clone(),
            kind,
        }
    }
}

impl<S> PartialEq for FireHook<S> {
    fn eq(&self, other: &Self) -> bool {
        match (&self.kind, &other.kind) {
            (HookKind::Static { scope: a, .. }, HookKind::Static { scope: b, .. }) => {
                self.name == other.name && a == b
            }
            (HookKind::Bound(a), HookKind::Bound(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl<S> Eq for FireHook<S> {}

impl<S> Hash for FireHook<S> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match &self.kind {
            HookKind::Static { scope, .. } => {
                self.name.hash(state);
                scope.hash(state);
            }
            HookKind::Bound(func) => {
                (Arc::as_ptr(func) as *const () as usize).hash(state);
            }
        }
    }
}

impl<S> fmt::Debug for FireHook<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FireHook")
            .field("name", &self.name)
            .field("scope", &self.scope())
            .finish()
    }
}
