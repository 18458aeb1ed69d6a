//! Run report artefacts: pretty JSON and a Markdown transcript.

use anyhow::{Context, Result};
use std::path::Path;

use crate::sequencer::{RunOutcome, RunReport};

/// Write the full run report in pretty JSON format.
pub fn write_report_json(path: &Path, report: &RunReport) -> Result<()> {
    let content = serde_json::to_string_pretty(report).context("serialize run report")?;
    std::fs::write(path, content).with_context(|| format!("write {:?}", path))?;
    Ok(())
}

/// Load a report previously written by [`write_report_json`].
pub fn read_report_json(path: &Path) -> Result<RunReport> {
    let content = std::fs::read_to_string(path).with_context(|| format!("read {:?}", path))?;
    serde_json::from_str(&content).with_context(|| format!("parse run report {:?}", path))
}

/// Render the transcript as Markdown, one section per message.
pub fn render_transcript_md(report: &RunReport) -> String {
    let mut out = String::new();
    out.push_str("# Run Transcript\n\n");
    out.push_str(&format!(
        "- run: `{}`\n- turns: {} of {}\n- duration: {} ms\n",
        report.run_id, report.turns_taken, report.max_turns, report.duration_ms
    ));
    match &report.outcome {
        RunOutcome::Completed => out.push_str("- outcome: completed\n\n"),
        RunOutcome::Failed(failure) => out.push_str(&format!(
            "- outcome: failed on turn {} ({}): {}\n\n",
            failure.turn, failure.participant, failure.cause
        )),
    }

    for message in &report.transcript {
        out.push_str(&format!(
            "## {}. {}\n\n{}\n\n",
            message.seq(),
            message.source(),
            message.content().trim_end()
        ));
    }

    out
}

/// Write [`render_transcript_md`] output to `path`.
pub fn write_transcript_md(path: &Path, report: &RunReport) -> Result<()> {
    std::fs::write(path, render_transcript_md(report))
        .with_context(|| format!("write {:?}", path))?;
    Ok(())
}
