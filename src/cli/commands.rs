//! CLI command implementations
//!
//! This module contains the implementation for each CLI command.

use crate::automaton::Automaton;
use crate::cli::InputFormat;
use crate::codec::{self, Diagnostics, SnapshotInfo, Warning};
use crate::library::builtin_registry;
use crate::Result;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// An automaton read from disk together with what the codec reported
struct Loaded {
    automaton: Automaton<char>,
    snapshot: Option<SnapshotInfo>,
    warnings: Vec<Warning>,
}

/// Read a GraphML document or snapshot, resolving callables through the
/// builtin registry
fn load(path: &Path, format: InputFormat) -> Result<Loaded> {
    let registry = builtin_registry()?;
    let format = format.resolve(path);
    tracing::info!("Loading {:?} as {:?}", path, format);

    match format {
        InputFormat::Snapshot => {
            let bytes = std::fs::read(path)?;
            let info = codec::inspect_snapshot(&bytes)?;
            let automaton = codec::import_snapshot(&bytes, &registry)?;
            Ok(Loaded {
                automaton,
                snapshot: Some(info),
                warnings: Vec::new(),
            })
        }
        InputFormat::Graphml | InputFormat::Auto => {
            let text = std::fs::read_to_string(path)?;
            let mut diagnostics = Diagnostics::new();
            let automaton = codec::from_graphml(&text, &registry, &mut diagnostics)?;
            Ok(Loaded {
                automaton,
                snapshot: None,
                warnings: diagnostics.into_warnings(),
            })
        }
    }
}

/// Inspect command implementation
pub mod inspect {
    use super::*;
    use crate::cli::output;

    pub fn execute(input: &Path, format: InputFormat, json: bool) -> Result<()> {
        let loaded = load(input, format)?;
        let stats = loaded.automaton.stats();
        tracing::debug!("Computed statistics: {:?}", stats);

        let mut stdout = std::io::stdout();
        if json {
            output::output_json(
                &mut stdout,
                &stats,
                loaded.snapshot.as_ref(),
                &loaded.warnings,
            )
        } else {
            output::output_table(
                &mut stdout,
                &stats,
                loaded.snapshot.as_ref(),
                &loaded.warnings,
            )
        }
    }
}

/// Run command implementation
pub mod run {
    use super::*;
    use crate::cli::output::{self, RunStep};

    pub fn execute(input: &Path, symbols: &str, format: InputFormat) -> Result<()> {
        let loaded = load(input, format)?;
        let steps = trace(&loaded.automaton, symbols)?;
        let accepted = steps.last().map_or_else(
            || {
                loaded
                    .automaton
                    .start_state()
                    .is_some_and(|s| loaded.automaton.is_final_state(s))
            },
            |last| last.accepted && loaded.automaton.is_final_state(&last.state),
        );

        output::output_run(&mut std::io::stdout(), &steps, accepted)
    }

    /// Consume every symbol from the start state, recording where each step
    /// lands. Rejections do not stop the run; the cursor stays errored.
    pub fn trace(automaton: &Automaton<char>, symbols: &str) -> Result<Vec<RunStep>> {
        let mut cursor = automaton.cursor()?;
        let mut steps = Vec::with_capacity(symbols.len());
        for symbol in symbols.chars() {
            let accepted = cursor.next_state(&symbol)?;
            steps.push(RunStep {
                symbol,
                state: cursor.current_state().to_string(),
                accepted,
            });
        }
        Ok(steps)
    }
}

/// Convert command implementation
pub mod convert {
    use super::*;
    use crate::cli::TargetFormat;
    use crate::Config;

    pub fn execute(
        input: &Path,
        output: &Path,
        to: TargetFormat,
        format: InputFormat,
        config: &Config,
    ) -> Result<()> {
        crate::ensure!(input != output, "refusing to overwrite the input file {:?}", input);
        let loaded = load(input, format)?;
        let automaton = &loaded.automaton;

        match to {
            TargetFormat::Graphml => {
                let mut diagnostics = Diagnostics::new();
                let sink = BufWriter::new(File::create(output)?);
                config
                    .graphml_writer()
                    .write(automaton, sink, &mut diagnostics)?;
                if !diagnostics.is_empty() {
                    tracing::warn!(
                        "{} predicates were left out of {:?}",
                        diagnostics.len(),
                        output
                    );
                }
            }
            TargetFormat::Snapshot => {
                // Encode before touching the destination so a failed export
                // leaves no file behind.
                let bytes = codec::export_snapshot(automaton)?;
                std::fs::write(output, bytes)?;
            }
            TargetFormat::Dot => {
                let sink = BufWriter::new(File::create(output)?);
                config.dot_exporter().write(automaton, sink)?;
            }
        }

        tracing::info!("Wrote {:?} as {:?}", output, to);
        Ok(())
    }
}

/// Render command implementation
pub mod render {
    use super::*;
    use crate::Config;

    pub fn execute(
        input: &Path,
        output: Option<&Path>,
        format: InputFormat,
        config: &Config,
    ) -> Result<()> {
        let loaded = load(input, format)?;
        let exporter = config.dot_exporter();

        match output {
            Some(path) => {
                exporter.write(&loaded.automaton, BufWriter::new(File::create(path)?))?;
                tracing::info!("Graph exported to {:?}", path);
            }
            None => exporter.write(&loaded.automaton, std::io::stdout().lock())?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::{Transition, ERROR_STATE};

    fn parity() -> Automaton<char> {
        let registry = builtin_registry().unwrap();
        let mut automaton = Automaton::new();
        automaton.add_states(["evenState", "oddState"]).unwrap();
        automaton.set_start_state("evenState").unwrap();
        automaton.set_final_state("evenState").unwrap();
        for (from, to, zero) in [
            ("evenState", "oddState", true),
            ("oddState", "evenState", true),
            ("evenState", "evenState", false),
            ("oddState", "oddState", false),
        ] {
            let key = if zero { "is_zero" } else { "is_one" };
            let predicate = registry
                .resolve_predicate(&format!("{};automata_engine::library", key))
                .unwrap();
            automaton
                .add_transition(Transition::new(from, to, predicate))
                .unwrap();
        }
        automaton
    }

    #[test]
    fn test_trace_keeps_going_after_rejection() {
        let steps = run::trace(&parity(), "0120").unwrap();
        let states: Vec<_> = steps.iter().map(|s| s.state.as_str()).collect();
        assert_eq!(states, vec!["oddState", "oddState", ERROR_STATE, ERROR_STATE]);
        let results: Vec<_> = steps.iter().map(|s| s.accepted).collect();
        assert_eq!(results, vec![true, true, false, false]);
    }

    #[test]
    fn test_load_and_convert_round_trip() {
        let dir = std::env::temp_dir().join(format!("automata-cli-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let graphml = dir.join("parity.graphml");
        let snapshot = dir.join("parity.snap");
        let dot = dir.join("parity.dot");

        let mut diagnostics = Diagnostics::new();
        std::fs::write(&graphml, codec::to_graphml(&parity(), &mut diagnostics).unwrap()).unwrap();

        let config = crate::Config::default();
        convert::execute(
            &graphml,
            &snapshot,
            crate::cli::TargetFormat::Snapshot,
            InputFormat::Auto,
            &config,
        )
        .unwrap();
        let loaded = load(&snapshot, InputFormat::Auto).unwrap();
        assert_eq!(loaded.automaton.transition_count(), 4);
        assert_eq!(loaded.snapshot.unwrap().alphabet, "char");
        assert!(loaded.warnings.is_empty());

        render::execute(&snapshot, Some(&dot), InputFormat::Auto, &config).unwrap();
        let text = std::fs::read_to_string(&dot).unwrap();
        assert!(text.starts_with("digraph Automaton {\n  rankdir=LR;\n"));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_convert_refuses_in_place() {
        let dir = std::env::temp_dir().join(format!("automata-cli-inplace-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let graphml = dir.join("parity.graphml");
        let mut diagnostics = Diagnostics::new();
        let xml = codec::to_graphml(&parity(), &mut diagnostics).unwrap();
        std::fs::write(&graphml, &xml).unwrap();

        let err = convert::execute(
            &graphml,
            &graphml,
            crate::cli::TargetFormat::Dot,
            InputFormat::Auto,
            &crate::Config::default(),
        )
        .unwrap_err();
        assert!(matches!(err, crate::Error::Custom(ref msg) if msg.starts_with("refusing to overwrite")));
        assert_eq!(std::fs::read_to_string(&graphml).unwrap(), xml);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_load_missing_file() {
        assert!(load(Path::new("/nonexistent/a.graphml"), InputFormat::Auto).is_err());
    }
}
