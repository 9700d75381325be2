//! Automaton model: states, transitions and start/final bookkeeping

use crate::automaton::cursor::{Cursor, ERROR_STATE};
use crate::automaton::graph::{GraphEvent, StateGraph};
use crate::automaton::Transition;
use crate::{Error, Result};
use petgraph::Direction;
use petgraph::visit::Bfs;
use serde::Serialize;
use std::collections::HashSet;

/// A finite automaton over the alphabet `S`.
///
/// States and transitions live in a [`StateGraph`]; start and final roles are
/// tracked here rather than on the graph nodes. The model stays mutable for its
/// whole lifetime, but cursors borrow it, so it cannot change mid-run.
#[derive(Debug)]
pub struct Automaton<S> {
    graph: StateGraph<S>,
    start_state: Option<String>,
    final_states: HashSet<String>,
}

impl<S> Automaton<S> {
    pub fn new() -> Self {
        Self {
            graph: StateGraph::new(),
            start_state: None,
            final_states: HashSet::new(),
        }
    }

    /// Adds a state. Fails if the name exists or is the error sentinel's.
    pub fn add_state(&mut self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        if name == ERROR_STATE {
            return Err(Error::ReservedStateName(name));
        }
        if self.graph.contains_vertex(&name) {
            return Err(Error::DuplicateState(name));
        }
        tracing::debug!("Adding state {}", name);
        self.graph.add_vertex(name);
        Ok(())
    }

    /// Adds several states, stopping at the first failure.
    pub fn add_states<I, N>(&mut self, names: I) -> Result<()>
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        names.into_iter().try_for_each(|name| self.add_state(name))
    }

    /// Marks an existing state as final.
    pub fn set_final_state(&mut self, name: &str) -> Result<()> {
        self.require_state(name)?;
        self.final_states.insert(name.to_string());
        Ok(())
    }

    /// Removes the final mark; returns whether the state was final.
    pub fn clear_final_state(&mut self, name: &str) -> Result<bool> {
        self.require_state(name)?;
        Ok(self.final_states.remove(name))
    }

    pub fn start_state(&self) -> Option<&str> {
        self.start_state.as_deref()
    }

    /// Sets (or reassigns) the start state.
    pub fn set_start_state(&mut self, name: &str) -> Result<()> {
        self.require_state(name)?;
        self.start_state = Some(name.to_string());
        Ok(())
    }

    pub fn clear_start_state(&mut self) {
        self.start_state = None;
    }

    /// Adds a transition between two existing states.
    pub fn add_transition(&mut self, transition: Transition<S>) -> Result<()> {
        self.require_state(transition.source())?;
        self.require_state(transition.target())?;
        tracing::debug!("Adding transition {}", transition);
        self.graph.add_edge(transition);
        Ok(())
    }

    pub fn is_final_state(&self, name: &str) -> bool {
        self.final_states.contains(name)
    }

    /// Final states in state insertion order. The iterator is lazy and can be
    /// cloned to restart it.
    pub fn final_states(&self) -> impl Iterator<Item = &str> + Clone + '_ {
        self.graph
            .vertices()
            .filter(move |name| self.final_states.contains(*name))
    }

    pub fn contains_state(&self, name: &str) -> bool {
        self.graph.contains_vertex(name)
    }

    pub fn states(&self) -> impl Iterator<Item = &str> + Clone + '_ {
        self.graph.vertices()
    }

    pub fn transitions(&self) -> impl Iterator<Item = &Transition<S>> + '_ {
        self.graph.edges()
    }

    /// Outgoing transitions of a state in insertion order.
    pub fn outgoing(&self, name: &str) -> Vec<&Transition<S>> {
        self.graph.outgoing(name)
    }

    pub fn state_count(&self) -> usize {
        self.graph.vertex_count()
    }

    pub fn transition_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Read access to the underlying graph store.
    pub fn as_graph(&self) -> &StateGraph<S> {
        &self.graph
    }

    /// Subscribe to vertex/edge add-notifications of the graph store.
    pub fn observe<F>(&mut self, listener: F)
    where
        F: Fn(&GraphEvent<'_, S>) + Send + Sync + 'static,
    {
        self.graph.subscribe(listener);
    }

    pub(crate) fn graph_mut(&mut self) -> &mut StateGraph<S> {
        &mut self.graph
    }

    /// Cursor positioned at the start state.
    pub fn cursor(&self) -> Result<Cursor<'_, S>> {
        let start = self.start_state.as_deref().ok_or(Error::NoStartState)?;
        self.cursor_at(start)
    }

    /// Cursor positioned at an arbitrary state.
    pub fn cursor_at(&self, state: &str) -> Result<Cursor<'_, S>> {
        let name = self
            .graph
            .vertices()
            .find(|name| *name == state)
            .ok_or_else(|| Error::UnknownState(state.to_string()))?;
        Ok(Cursor::new(self, name))
    }

    /// Runs the symbols from the start state and reports whether the run ends
    /// in a final state. A rejected symbol makes the whole word rejected.
    pub fn accepts<'s, I>(&self, symbols: I) -> Result<bool>
    where
        I: IntoIterator<Item = &'s S>,
        S: 's,
    {
        let mut cursor = self.cursor()?;
        for symbol in symbols {
            if !cursor.next_state(symbol)? {
                return Ok(false);
            }
        }
        Ok(cursor.is_accepting())
    }

    /// Structural statistics of the automaton.
    pub fn stats(&self) -> AutomatonStats {
        let graph = self.graph.inner();

        let terminal_states = graph
            .node_indices()
            .filter(|&idx| graph.edges_directed(idx, Direction::Outgoing).count() == 0)
            .count();

        let reachable = match self.start_state.as_deref().and_then(|s| self.graph.node_index(s)) {
            Some(start_idx) => {
                let mut bfs = Bfs::new(graph, start_idx);
                let mut visited = 0;
                while bfs.next(graph).is_some() {
                    visited += 1;
                }
                visited
            }
            None => 0,
        };

        AutomatonStats {
            total_states: self.state_count(),
            total_transitions: self.transition_count(),
            final_states: self.final_states.len(),
            start_state: self.start_state.clone(),
            terminal_states,
            unreachable_states: self.state_count() - reachable,
            has_cycles: petgraph::algo::is_cyclic_directed(graph),
        }
    }

    fn require_state(&self, name: &str) -> Result<()> {
        if self.graph.contains_vertex(name) {
            Ok(())
        } else {
            Err(Error::UnknownState(name.to_string()))
        }
    }
}

impl<S> Default for Automaton<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// Summary produced by [`Automaton::stats`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AutomatonStats {
    pub total_states: usize,
    pub total_transitions: usize,
    pub final_states: usize,
    pub start_state: Option<String>,
    /// States without outgoing transitions
    pub terminal_states: usize,
    /// States not reachable from the start state (all of them when unset)
    pub unreachable_states: usize,
    pub has_cycles: bool,
}
