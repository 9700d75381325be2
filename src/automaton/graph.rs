use crate::automaton::Transition;
use petgraph::Direction;
use petgraph::prelude::EdgeRef;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableGraph};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Notification emitted synchronously when the graph grows.
#[derive(Debug)]
pub enum GraphEvent<'a, S> {
    VertexAdded(&'a str),
    EdgeAdded(&'a Transition<S>),
}

/// Listener subscribed to [`GraphEvent`]s.
pub type GraphListener<S> = Arc<dyn Fn(&GraphEvent<'_, S>) + Send + Sync>;

/// Directed graph store backing an automaton.
///
/// Vertices are state names and edges are transitions, both enumerated in
/// insertion order. Nothing is ever removed, so petgraph's stable indices follow
/// insertion order too.
pub struct StateGraph<S> {
    /// The underlying graph structure.
    graph: StableGraph<String, Transition<S>>,

    /// A lookup table mapping state names to their internal graph indices.
    ///
    /// Keeps name lookups O(1) and guarantees each state is represented by
    /// exactly one node.
    state_index: HashMap<String, NodeIndex>,

    listeners: Vec<GraphListener<S>>,
}

impl<S> StateGraph<S> {
    pub fn new() -> Self {
        Self {
            graph: StableGraph::new(),
            state_index: HashMap::new(),
            listeners: Vec::new(),
        }
    }

    /// Register a listener for add-notifications.
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: Fn(&GraphEvent<'_, S>) + Send + Sync + 'static,
    {
        self.listeners.push(Arc::new(listener));
    }

    /// Register a listener that is shared with other graphs.
    pub fn subscribe_shared(&mut self, listener: GraphListener<S>) {
        self.listeners.push(listener);
    }

    /// Adds a vertex; returns `None` if the name is already present.
    pub fn add_vertex(&mut self, name: String) -> Option<NodeIndex> {
        if self.state_index.contains_key(&name) {
            return None;
        }
        let node_index = self.graph.add_node(name.clone());
        self.state_index.insert(name, node_index);
        self.notify(&GraphEvent::VertexAdded(&self.graph[node_index]));
        Some(node_index)
    }

    /// Adds an edge linking two existing vertices; `None` if either is missing.
    pub fn add_edge(&mut self, transition: Transition<S>) -> Option<EdgeIndex> {
        let (&from_idx, &to_idx) = (
            self.state_index.get(transition.source())?,
            self.state_index.get(transition.target())?,
        );
        let edge_index = self.graph.add_edge(from_idx, to_idx, transition);
        self.notify(&GraphEvent::EdgeAdded(&self.graph[edge_index]));
        Some(edge_index)
    }

    fn notify(&self, event: &GraphEvent<'_, S>) {
        for listener in &self.listeners {
            listener(event);
        }
    }

    pub fn contains_vertex(&self, name: &str) -> bool {
        self.state_index.contains_key(name)
    }

    pub fn node_index(&self, name: &str) -> Option<NodeIndex> {
        self.state_index.get(name).copied()
    }

    /// Vertices in insertion order. Indices stay dense because vertices are
    /// never removed.
    pub fn vertices(&self) -> impl Iterator<Item = &str> + Clone + '_ {
        (0..self.graph.node_count())
            .filter_map(move |i| self.graph.node_weight(NodeIndex::new(i)))
            .map(String::as_str)
    }

    /// Edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = &Transition<S>> + '_ {
        self.graph
            .edge_indices()
            .filter_map(|idx| self.graph.edge_weight(idx))
    }

    /// Outgoing edges of a vertex in insertion order.
    pub fn outgoing(&self, name: &str) -> Vec<&Transition<S>> {
        let Some(&node_idx) = self.state_index.get(name) else {
            return Vec::new();
        };
        let mut edges: Vec<_> = self
            .graph
            .edges_directed(node_idx, Direction::Outgoing)
            .map(|edge| (edge.id(), edge.weight()))
            .collect();
        edges.sort_by_key(|(id, _)| *id);
        edges.into_iter().map(|(_, transition)| transition).collect()
    }

    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Raw petgraph view for graph algorithms.
    pub fn inner(&self) -> &StableGraph<String, Transition<S>> {
        &self.graph
    }
}

impl<S> Default for StateGraph<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> fmt::Debug for StateGraph<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateGraph")
            .field("vertices", &self.vertices().collect::<Vec<_>>())
            .field("edges", &self.edges().collect::<Vec<_>>())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::Predicate;
    use std::sync::Mutex;

    fn always(_: &char) -> bool {
        true
    }

    fn edge(from: &str, to: &str) -> Transition<char> {
        Transition::new(from, to, Predicate::new("always", "tests", always))
    }

    #[test]
    fn test_empty_graph() {
        let graph: StateGraph<char> = StateGraph::new();
        assert_eq!(graph.vertex_count(), 0);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_insertion_order() {
        let mut graph = StateGraph::new();
        for name in ["c", "a", "b"] {
            graph.add_vertex(name.to_string()).unwrap();
        }
        assert!(graph.add_vertex("a".to_string()).is_none());
        assert_eq!(graph.vertices().collect::<Vec<_>>(), vec!["c", "a", "b"]);

        graph.add_edge(edge("a", "b")).unwrap();
        graph.add_edge(edge("a", "c")).unwrap();
        graph.add_edge(edge("b", "a")).unwrap();
        graph.add_edge(edge("a", "a")).unwrap();
        assert!(graph.add_edge(edge("a", "zzz")).is_none());

        let targets: Vec<_> = graph.outgoing("a").iter().map(|t| t.target()).collect();
        assert_eq!(targets, vec!["b", "c", "a"]);
        assert_eq!(graph.edges().count(), 4);
        assert!(graph.outgoing("missing").is_empty());
    }

    #[test]
    fn test_listeners_fire_synchronously() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);

        let mut graph: StateGraph<char> = StateGraph::new();
        graph.subscribe(move |event: &GraphEvent<'_, char>| {
            let line = match event {
                GraphEvent::VertexAdded(name) => format!("vertex {}", name),
                GraphEvent::EdgeAdded(t) => format!("edge {}", t),
            };
            sink.lock().unwrap().push(line);
        });

        graph.add_vertex("a".to_string());
        graph.add_vertex("b".to_string());
        graph.add_edge(edge("a", "b"));

        assert_eq!(
            *events.lock().unwrap(),
            vec!["vertex a", "vertex b", "edge a -> b [always]"]
        );
    }
}
