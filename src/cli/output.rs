//! Output formatting module
//!
//! This module handles formatting automaton statistics and runs for the terminal.

use crate::automaton::AutomatonStats;
use crate::codec::{SnapshotInfo, Warning};
use crate::Result;
use serde_json::json;

/// One consumed symbol of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunStep {
    pub symbol: char,
    pub state: String,
    pub accepted: bool,
}

/// Output statistics as JSON
pub fn output_json(
    w: &mut impl std::io::Write,
    stats: &AutomatonStats,
    snapshot: Option<&SnapshotInfo>,
    warnings: &[Warning],
) -> Result<()> {
    let output = json!({
        "stats": stats,
        "snapshot": snapshot.map(|info| json!({
            "version": info.version,
            "alphabet": info.alphabet,
            "created_at": info.created_at.to_rfc3339(),
        })),
        "warnings": warnings.iter().map(|w| w.to_string()).collect::<Vec<_>>(),
    });

    serde_json::to_writer_pretty(&mut *w, &output)?;
    writeln!(w)?; // Add trailing newline
    Ok(())
}

/// Output statistics as text table
pub fn output_table(
    w: &mut impl std::io::Write,
    stats: &AutomatonStats,
    snapshot: Option<&SnapshotInfo>,
    warnings: &[Warning],
) -> Result<()> {
    writeln!(w, "Automaton Summary")?;
    writeln!(w, "{}", "=".repeat(60))?;
    writeln!(w)?;

    writeln!(w, "  States:             {}", stats.total_states)?;
    writeln!(w, "  Transitions:        {}", stats.total_transitions)?;
    writeln!(
        w,
        "  Start state:        {}",
        stats.start_state.as_deref().unwrap_or("(none)")
    )?;
    writeln!(w, "  Final states:       {}", stats.final_states)?;
    writeln!(w, "  Terminal states:    {}", stats.terminal_states)?;
    writeln!(w, "  Unreachable states: {}", stats.unreachable_states)?;
    writeln!(
        w,
        "  Cycles:             {}",
        if stats.has_cycles { "yes" } else { "no" }
    )?;
    writeln!(w)?;

    if let Some(info) = snapshot {
        writeln!(w, "Snapshot:")?;
        writeln!(w, "  Format version:     {}", info.version)?;
        writeln!(w, "  Alphabet:           {}", info.alphabet)?;
        writeln!(w, "  Created:            {}", info.created_at.to_rfc3339())?;
        writeln!(w)?;
    }

    if !warnings.is_empty() {
        writeln!(w, "Warnings:")?;
        writeln!(w, "{:-<60}", "")?;
        for warning in warnings {
            writeln!(w, "  {}", warning)?;
        }
        writeln!(w)?;
    }

    Ok(())
}

/// Output the states visited by a run
pub fn output_run(w: &mut impl std::io::Write, steps: &[RunStep], accepted: bool) -> Result<()> {
    writeln!(w, "{:>5}  {:<8} {:<24} {}", "Step", "Symbol", "State", "Result")?;
    writeln!(w, "{:-<50}", "")?;
    for (i, step) in steps.iter().enumerate() {
        writeln!(
            w,
            "{:>5}  {:<8} {:<24} {}",
            i + 1,
            format!("{:?}", step.symbol),
            step.state,
            if step.accepted { "ok" } else { "rejected" }
        )?;
    }
    writeln!(w)?;
    writeln!(w, "{}", if accepted { "ACCEPTED" } else { "REJECTED" })?;
    Ok(())
}
