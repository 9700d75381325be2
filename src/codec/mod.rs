//! External representations of an automaton
//!
//! - [`exchange`]: GraphML import/export
//! - [`snapshot`]: binary snapshot with exact callable resolution
//! - [`dot`]: one-way Graphviz projection

pub mod diagnostics;
pub mod dot;
pub mod exchange;
pub mod snapshot;

pub use diagnostics::{Diagnostics, Warning};
pub use dot::DotExporter;
pub use exchange::{from_graphml, to_graphml, GraphMlReader, GraphMlWriter};
pub use snapshot::{
    export_snapshot, import_snapshot, inspect_snapshot, read_snapshot, write_snapshot,
    SnapshotInfo, SNAPSHOT_VERSION,
};
