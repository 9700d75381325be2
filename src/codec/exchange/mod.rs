//! GraphML exchange codec
//!
//! Converts automata to and from GraphML documents. Node ids are derived from
//! a digest of the state name so they survive reordering; edges are numbered
//! in insertion order. Start/final flags and predicate references travel as
//! `<data>` elements:
//!
//! ```xml
//! <node id="n1f3b..."><data key="stateName">mod=0</data><data key="isStartState">true</data></node>
//! <edge id="e0" source="n1f3b..." target="n9a0c..."><data key="description">any</data>
//!   <data key="transitionPredicate">always;automata_engine::library</data></edge>
//! ```
//!
//! Export drops closure predicates with a warning; import substitutes the
//! always-false predicate for references the registry cannot resolve. Only a
//! structurally broken document is a hard error.

mod reader;
mod writer;
pub(crate) mod xml;

pub use reader::GraphMlReader;
pub use writer::GraphMlWriter;

use crate::automaton::{Automaton, Registry};
use crate::codec::Diagnostics;
use crate::Result;

pub const GRAPHML_NAMESPACE: &str = "http://graphml.graphdrawing.org/xmlns";

pub const STATE_NAME: &str = "stateName";
pub const IS_START_STATE: &str = "isStartState";
pub const IS_FINAL_STATE: &str = "isFinalState";
pub const DESCRIPTION: &str = "description";
pub const TRANSITION_PREDICATE: &str = "transitionPredicate";

/// Stable node id for a state name: `n` followed by the first 8 bytes of its
/// BLAKE2b-256 digest in hex.
pub fn node_id(state: &str) -> String {
    use blake2::digest::consts::U32;
    use blake2::{Blake2b, Digest};

    let mut hasher = Blake2b::<U32>::new();
    hasher.update(state.as_bytes());
    let digest = hasher.finalize();
    format!("n{}", hex::encode(&digest[..8]))
}

/// Export with default settings.
pub fn to_graphml<S>(automaton: &Automaton<S>, diagnostics: &mut Diagnostics) -> Result<String> {
    GraphMlWriter::new().write_to_string(automaton, diagnostics)
}

/// Import with default settings.
pub fn from_graphml<S>(
    text: &str,
    registry: &Registry<S>,
    diagnostics: &mut Diagnostics,
) -> Result<Automaton<S>> {
    GraphMlReader::new(registry).read_str(text, diagnostics)
}
