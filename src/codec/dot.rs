//! Graphviz DOT projection
//!
//! Export only. States are numbered by insertion order; final states are drawn
//! as double circles and the start state in bold.

use crate::automaton::Automaton;
use crate::Result;
use std::collections::HashMap;
use std::io::Write;

#[derive(Debug, Clone)]
pub struct DotExporter {
    graph_name: String,
    rankdir: Option<String>,
}

impl DotExporter {
    pub fn new(graph_name: impl Into<String>) -> Self {
        Self {
            graph_name: graph_name.into(),
            rankdir: None,
        }
    }

    /// Layout direction (`LR`, `TB`, ...). Omitted from the output when unset.
    pub fn with_rankdir(mut self, rankdir: impl Into<String>) -> Self {
        self.rankdir = Some(rankdir.into());
        self
    }

    pub fn write<S, W: Write>(&self, automaton: &Automaton<S>, mut sink: W) -> Result<()> {
        writeln!(sink, "digraph {} {{", graph_id(&self.graph_name))?;
        if let Some(rankdir) = &self.rankdir {
            writeln!(sink, "  rankdir={};", rankdir)?;
        }

        let mut ids: HashMap<&str, usize> = HashMap::new();
        for (i, state) in automaton.states().enumerate() {
            let shape = if automaton.is_final_state(state) {
                "doublecircle"
            } else {
                "circle"
            };
            let style = if automaton.start_state() == Some(state) {
                "bold"
            } else {
                "solid"
            };
            writeln!(
                sink,
                "  {} [label=\"{}\", shape={}, style={}];",
                i,
                escape(state),
                shape,
                style
            )?;
            ids.insert(state, i);
        }

        for transition in automaton.transitions() {
            writeln!(
                sink,
                "  {} -> {} [label=\"{}\"];",
                ids[transition.source()],
                ids[transition.target()],
                escape(transition.description())
            )?;
        }

        writeln!(sink, "}}")?;
        sink.flush()?;
        Ok(())
    }

    pub fn to_dot_string<S>(&self, automaton: &Automaton<S>) -> Result<String> {
        let mut buffer = Vec::new();
        self.write(automaton, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

impl Default for DotExporter {
    fn default() -> Self {
        Self::new("Automaton")
    }
}

fn escape(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}

const KEYWORDS: [&str; 6] = ["graph", "digraph", "subgraph", "node", "edge", "strict"];

/// Graph name as a DOT ID: bare when it is a plain identifier, quoted otherwise.
fn graph_id(name: &str) -> String {
    let mut chars = name.chars();
    let plain = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !KEYWORDS.iter().any(|k| k.eq_ignore_ascii_case(name));
    if plain {
        name.to_string()
    } else {
        format!("\"{}\"", escape(name))
    }
}
