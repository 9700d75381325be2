//! Automaton module - states, transitions and their execution

pub mod cursor;
pub mod graph;
pub mod hook;
pub mod model;
pub mod predicate;
pub mod registry;
pub mod transition;

// Re-export key types
pub use cursor::{Cursor, CursorState, ERROR_STATE};
pub use graph::{GraphEvent, GraphListener, StateGraph};
pub use hook::{FireHook, HookResult};
pub use model::{Automaton, AutomatonStats};
pub use predicate::Predicate;
pub use registry::{Registry, Unresolved};
pub use transition::Transition;
