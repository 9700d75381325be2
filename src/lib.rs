//! Finite-automaton engine
//!
//! Models states and symbol-triggered transitions over an arbitrary alphabet,
//! runs symbol sequences through them deterministically and converts them to
//! and from external formats.
//!
//! This library provides functionality for:
//! - Building automata whose transitions are guarded by named predicates
//! - Stepping through input with a cursor that detects nondeterminism
//! - Exchanging automata as GraphML documents
//! - Storing exact binary snapshots
//! - Exporting Graphviz DOT for visualization
//!
//! ```
//! use automata_engine::automaton::{Automaton, Transition};
//! use automata_engine::library::{is_one, is_zero};
//! use automata_engine::predicate;
//!
//! let mut parity = Automaton::new();
//! parity.add_states(["evenState", "oddState"]).unwrap();
//! parity.set_start_state("evenState").unwrap();
//! parity.set_final_state("evenState").unwrap();
//! parity.add_transition(Transition::new("evenState", "oddState", predicate!(is_zero))).unwrap();
//! parity.add_transition(Transition::new("oddState", "evenState", predicate!(is_zero))).unwrap();
//! parity.add_transition(Transition::new("evenState", "evenState", predicate!(is_one))).unwrap();
//! parity.add_transition(Transition::new("oddState", "oddState", predicate!(is_one))).unwrap();
//!
//! assert!(parity.accepts(&['0', '1', '0']).unwrap());
//! assert!(!parity.accepts(&['0', '2']).unwrap());
//! ```

pub mod automaton;
pub mod cli;
pub mod codec;
pub mod config;
pub mod error;
pub mod library;

pub use config::Config;
pub use error::{Error, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Initialize logging with the given log level
pub fn init_logging(level: &str) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
