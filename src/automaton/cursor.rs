//! Execution cursor
//!
//! A cursor borrows one automaton and consumes symbols one at a time. Reaching
//! a state with no matching transition parks the cursor in the absorbing
//! [`CursorState::Errored`] state; more than one matching transition is a
//! nondeterminism fault and is reported as an error instead.

use crate::automaton::{Automaton, Transition};
use crate::{Error, Result};

/// Reserved name reported by [`Cursor::current_state`] once the cursor errored.
pub const ERROR_STATE: &str = "ErrorState";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState<'a> {
    Running(&'a str),
    Errored,
}

/// Position of one run over an [`Automaton`].
#[derive(Debug)]
pub struct Cursor<'a, S> {
    automaton: &'a Automaton<S>,
    state: CursorState<'a>,
}

impl<'a, S> Cursor<'a, S> {
    pub(crate) fn new(automaton: &'a Automaton<S>, state: &'a str) -> Self {
        Self {
            automaton,
            state: CursorState::Running(state),
        }
    }

    pub fn state(&self) -> CursorState<'a> {
        self.state
    }

    /// Name of the current state, or [`ERROR_STATE`].
    pub fn current_state(&self) -> &'a str {
        match self.state {
            CursorState::Running(name) => name,
            CursorState::Errored => ERROR_STATE,
        }
    }

    pub fn is_errored(&self) -> bool {
        self.state == CursorState::Errored
    }

    /// Whether the cursor currently sits on a final state.
    pub fn is_accepting(&self) -> bool {
        match self.state {
            CursorState::Running(name) => self.automaton.is_final_state(name),
            CursorState::Errored => false,
        }
    }

    /// Consume one symbol.
    ///
    /// Returns `Ok(true)` when exactly one transition fired and `Ok(false)` when
    /// none did (or the cursor had already errored). Ambiguity is reported as
    /// [`Error::Nondeterminism`] and leaves the cursor where it was. Errors from
    /// fire hooks are returned after the state change took effect.
    pub fn next_state(&mut self, symbol: &S) -> Result<bool> {
        let CursorState::Running(current) = self.state else {
            return Ok(false);
        };

        let firing: Vec<&'a Transition<S>> = self
            .automaton
            .outgoing(current)
            .into_iter()
            .filter(|transition| transition.fires_on(symbol))
            .collect();

        match firing.as_slice() {
            [] => {
                tracing::trace!("No transition from {} accepts the symbol", current);
                self.state = CursorState::Errored;
                Ok(false)
            }
            [transition] => {
                tracing::trace!("Taking {}", transition);
                self.state = CursorState::Running(transition.target());
                for hook in transition.hooks() {
                    hook.fire(current, symbol).map_err(|source| Error::FireHook {
                        transition: transition.to_string(),
                        source,
                    })?;
                }
                Ok(true)
            }
            many => {
                let mut candidates: Vec<String> = many.iter().map(|t| t.to_string()).collect();
                candidates.sort();
                Err(Error::Nondeterminism {
                    state: current.to_string(),
                    candidates,
                })
            }
        }
    }

    /// Consume symbols until one is rejected. Returns the result of every
    /// attempted step; a trailing `false` marks the rejecting symbol.
    pub fn feed<'s, I>(&mut self, symbols: I) -> Result<Vec<bool>>
    where
        I: IntoIterator<Item = &'s S>,
        S: 's,
    {
        let mut results = Vec::new();
        for symbol in symbols {
            let accepted = self.next_state(symbol)?;
            results.push(accepted);
            if !accepted {
                break;
            }
        }
        Ok(results)
    }
}
