//! This module defines all error types used throughout the crate.

use std::io;
use thiserror::Error;

/// Main error type for the crate
#[derive(Error, Debug)]
pub enum Error {
    /// IO errors (file not found, permission denied, unwritable sink, etc.)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A state with this name is already part of the automaton
    #[error("State already exists: {0}")]
    DuplicateState(String),

    /// A state was referenced before being added
    #[error("Unknown state: {0}")]
    UnknownState(String),

    /// The name is reserved for the execution sentinel
    #[error("State name is reserved: {0}")]
    ReservedStateName(String),

    /// A cursor was requested from an automaton without a start state
    #[error("Automaton has no start state")]
    NoStartState,

    /// More than one outgoing transition accepted the consumed symbol
    #[error(
        "Nondeterministic transition from state '{state}': {} transitions accept the symbol ({})",
        .candidates.len(),
        .candidates.join(", ")
    )]
    Nondeterminism {
        state: String,
        candidates: Vec<String>,
    },

    /// A fire hook returned an error while a transition was taken
    #[error("Fire hook failed on transition {transition}: {source}")]
    FireHook {
        transition: String,
        #[source]
        source: anyhow::Error,
    },

    /// Registry misuse (bound callables, duplicate keys)
    #[error("Registry error: {0}")]
    Registry(String),

    /// Structurally invalid exchange document
    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    /// XML reader/writer errors
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// A predicate or hook cannot be stored in (or restored from) a snapshot
    #[error("Not representable in snapshot: {member} on transition {transition}")]
    NotRepresentable { transition: String, member: String },

    /// Snapshot framing or decoding errors
    #[error("Snapshot error: {0}")]
    Snapshot(String),

    /// Snapshot produced by another format version
    #[error("Unsupported snapshot version {found}, supported: {supported}")]
    UnsupportedSnapshotVersion { found: u32, supported: u32 },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with custom message
    #[error("{0}")]
    Custom(String),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a custom error with a message
    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom(msg.into())
    }

    /// Create a malformed document error
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedDocument(msg.into())
    }

    /// Create a snapshot error
    pub fn snapshot(msg: impl Into<String>) -> Self {
        Self::Snapshot(msg.into())
    }

    /// Check if error is a nondeterminism fault raised during execution
    pub fn is_nondeterminism(&self) -> bool {
        matches!(self, Error::Nondeterminism { .. })
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::MalformedDocument(format!("invalid attribute: {}", err))
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Custom(format!("JSON error: {}", err))
    }
}

// Helper macros for creating errors

/// Create a custom error with formatting
#[macro_export]
macro_rules! custom_error {
    ($($arg:tt)*) => {
        $crate::error::Error::Custom(format!($($arg)*))
    };
}

/// Bail with a custom error message
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::custom_error!($($arg)*))
    };
}

/// Ensure a condition is true or return error
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($arg:tt)*) => {
        if !($cond) {
            $crate::bail!($($arg)*);
        }
    };
}
