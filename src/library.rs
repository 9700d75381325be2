//! Builtin predicates and hooks over `char`
//!
//! These are what the `automata` binary can resolve when it loads GraphML
//! documents or snapshots. Their encoded keys look like
//! `is_zero;automata_engine::library`.

use crate::automaton::{HookResult, Registry};
use crate::{hook, predicate, Result};

pub fn always(_: &char) -> bool {
    true
}

pub fn is_zero(c: &char) -> bool {
    *c == '0'
}

pub fn is_one(c: &char) -> bool {
    *c == '1'
}

pub fn is_binary_digit(c: &char) -> bool {
    matches!(c, '0' | '1')
}

pub fn is_digit(c: &char) -> bool {
    c.is_ascii_digit()
}

pub fn is_alphabetic(c: &char) -> bool {
    c.is_alphabetic()
}

pub fn is_whitespace(c: &char) -> bool {
    c.is_whitespace()
}

/// Logs every transition it is attached to.
pub fn trace(source: &str, symbol: &char) -> HookResult {
    tracing::info!("Leaving {} on {:?}", source, symbol);
    Ok(())
}

/// Registry holding every builtin predicate and hook.
pub fn builtin_registry() -> Result<Registry<char>> {
    Registry::new()
        .with_predicate(predicate!(always))?
        .with_predicate(predicate!(is_zero))?
        .with_predicate(predicate!(is_one))?
        .with_predicate(predicate!(is_binary_digit))?
        .with_predicate(predicate!(is_digit))?
        .with_predicate(predicate!(is_alphabetic))?
        .with_predicate(predicate!(is_whitespace))?
        .with_hook(hook!(trace))
}
