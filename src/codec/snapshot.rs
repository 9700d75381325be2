//! Binary snapshot codec
//!
//! A snapshot is the 4-byte magic `FSAS` followed by one CBOR record. Unlike
//! GraphML, snapshots are exact: every predicate and hook is stored by name and
//! scope and must resolve through the registry on import, so closures cannot be
//! snapshotted at all.

use crate::automaton::predicate::encode_key;
use crate::automaton::{Automaton, Registry, Transition};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use minicbor::{Decode, Encode};
use std::io::{Read, Write};

pub const SNAPSHOT_VERSION: u32 = 1;

const MAGIC: &[u8; 4] = b"FSAS";

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
struct CallableRef {
    #[n(0)]
    name: String,
    #[n(1)]
    scope: String,
}

impl CallableRef {
    fn key(&self) -> String {
        encode_key(&self.name, &self.scope)
    }
}

#[derive(Debug, Clone, Encode, Decode)]
struct TransitionRecord {
    #[n(0)]
    source: String,
    #[n(1)]
    target: String,
    #[n(2)]
    description: String,
    #[n(3)]
    predicate: CallableRef,
    #[n(4)]
    hooks: Vec<CallableRef>,
}

impl TransitionRecord {
    fn label(&self) -> String {
        format!("{} -> {} [{}]", self.source, self.target, self.description)
    }
}

#[derive(Debug, Clone, Encode, Decode)]
struct SnapshotRecord {
    #[n(0)]
    version: u32,
    #[n(1)]
    alphabet: String,
    #[n(2)]
    created_at: i64,
    #[n(3)]
    states: Vec<String>,
    #[n(4)]
    start_state: Option<String>,
    #[n(5)]
    final_states: Vec<String>,
    #[n(6)]
    transitions: Vec<TransitionRecord>,
}

/// Leading fields of every snapshot version.
#[derive(Debug, Decode)]
struct SnapshotHeader {
    #[n(0)]
    version: u32,
}

/// Header metadata of a snapshot, readable without a registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotInfo {
    pub version: u32,
    pub alphabet: String,
    pub created_at: DateTime<Utc>,
    pub state_count: usize,
    pub transition_count: usize,
    pub start_state: Option<String>,
}

fn alphabet_name<S>() -> &'static str {
    std::any::type_name::<S>()
}

fn record_transition<S>(transition: &Transition<S>) -> Result<TransitionRecord> {
    let predicate = transition.predicate();
    let predicate = match predicate.scope() {
        Some(scope) => CallableRef {
            name: predicate.name().to_string(),
            scope: scope.to_string(),
        },
        None => {
            return Err(Error::NotRepresentable {
                transition: transition.to_string(),
                member: format!("bound predicate '{}'", predicate.name()),
            });
        }
    };

    let hooks = transition
        .hooks()
        .iter()
        .map(|hook| match hook.scope() {
            Some(scope) => Ok(CallableRef {
                name: hook.name().to_string(),
                scope: scope.to_string(),
            }),
            None => Err(Error::NotRepresentable {
                transition: transition.to_string(),
                member: format!("bound hook '{}'", hook.name()),
            }),
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(TransitionRecord {
        source: transition.source().to_string(),
        target: transition.target().to_string(),
        description: transition.description().to_string(),
        predicate,
        hooks,
    })
}

/// Serialize an automaton to snapshot bytes. Fails without output if any
/// predicate or hook is bound.
pub fn export_snapshot<S>(automaton: &Automaton<S>) -> Result<Vec<u8>> {
    let transitions = automaton
        .transitions()
        .map(record_transition)
        .collect::<Result<Vec<_>>>()?;

    let record = SnapshotRecord {
        version: SNAPSHOT_VERSION,
        alphabet: alphabet_name::<S>().to_string(),
        created_at: Utc::now().timestamp_millis(),
        states: automaton.states().map(str::to_string).collect(),
        start_state: automaton.start_state().map(str::to_string),
        final_states: automaton.final_states().map(str::to_string).collect(),
        transitions,
    };

    let body = minicbor::to_vec(&record)
        .map_err(|e| Error::snapshot(format!("failed to encode snapshot: {}", e)))?;

    let mut bytes = Vec::with_capacity(MAGIC.len() + body.len());
    bytes.extend_from_slice(MAGIC);
    bytes.extend_from_slice(&body);

    tracing::debug!(
        "Exported snapshot of {} states and {} transitions ({} bytes)",
        record.states.len(),
        record.transitions.len(),
        bytes.len()
    );
    Ok(bytes)
}

/// Write snapshot bytes to a sink. Nothing is written if encoding fails.
pub fn write_snapshot<S, W: Write>(automaton: &Automaton<S>, mut sink: W) -> Result<()> {
    let bytes = export_snapshot(automaton)?;
    sink.write_all(&bytes)?;
    sink.flush()?;
    Ok(())
}

fn decode_record(bytes: &[u8]) -> Result<SnapshotRecord> {
    let body = bytes
        .strip_prefix(MAGIC.as_slice())
        .ok_or_else(|| Error::snapshot("missing FSAS magic header"))?;

    let header: SnapshotHeader = minicbor::decode(body)
        .map_err(|e| Error::snapshot(format!("unreadable snapshot header: {}", e)))?;
    if header.version != SNAPSHOT_VERSION {
        return Err(Error::UnsupportedSnapshotVersion {
            found: header.version,
            supported: SNAPSHOT_VERSION,
        });
    }

    minicbor::decode(body).map_err(|e| Error::snapshot(format!("corrupt snapshot body: {}", e)))
}

/// Restore an automaton from snapshot bytes, resolving every predicate and
/// hook exactly through `registry`.
pub fn import_snapshot<S>(bytes: &[u8], registry: &Registry<S>) -> Result<Automaton<S>> {
    let record = decode_record(bytes)?;
    if record.alphabet != alphabet_name::<S>() {
        return Err(Error::snapshot(format!(
            "snapshot alphabet is {}, expected {}",
            record.alphabet,
            alphabet_name::<S>()
        )));
    }

    let mut automaton = Automaton::new();
    automaton.add_states(record.states.iter().cloned())?;
    if let Some(start) = &record.start_state {
        automaton.set_start_state(start)?;
    }
    for name in &record.final_states {
        automaton.set_final_state(name)?;
    }

    for entry in &record.transitions {
        let predicate = registry
            .resolve_predicate(&entry.predicate.key())
            .map_err(|reason| Error::NotRepresentable {
                transition: entry.label(),
                member: format!("predicate '{}' ({})", entry.predicate.key(), reason),
            })?;

        let mut transition = Transition::new(entry.source.clone(), entry.target.clone(), predicate)
            .with_description(entry.description.clone());
        for hook in &entry.hooks {
            let resolved = registry
                .resolve_hook(&hook.key())
                .map_err(|reason| Error::NotRepresentable {
                    transition: entry.label(),
                    member: format!("hook '{}' ({})", hook.key(), reason),
                })?;
            transition = transition.on_fire(resolved);
        }
        automaton.add_transition(transition)?;
    }

    tracing::debug!(
        "Imported snapshot of {} states and {} transitions",
        automaton.state_count(),
        automaton.transition_count()
    );
    Ok(automaton)
}

pub fn read_snapshot<S, R: Read>(mut source: R, registry: &Registry<S>) -> Result<Automaton<S>> {
    let mut bytes = Vec::new();
    source.read_to_end(&mut bytes)?;
    import_snapshot(&bytes, registry)
}

/// Read the metadata of a snapshot without resolving anything.
pub fn inspect_snapshot(bytes: &[u8]) -> Result<SnapshotInfo> {
    let record = decode_record(bytes)?;
    let created_at = DateTime::<Utc>::from_timestamp_millis(record.created_at)
        .ok_or_else(|| Error::snapshot(format!("invalid timestamp {}", record.created_at)))?;

    Ok(SnapshotInfo {
        version: record.version,
        alphabet: record.alphabet,
        created_at,
        state_count: record.states.len(),
        transition_count: record.transitions.len(),
        start_state: record.start_state,
    })
}
