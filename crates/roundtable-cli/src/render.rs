//! Console rendering of runs.

use roundtable_core::{Message, RunOutcome, RunReport};

const RULE: &str = "--------------------------------------------------";

pub fn render_banner(task: &str, roster: &[&str], max_turns: u32, rounds: Option<u32>) -> String {
    let budget = match rounds {
        Some(rounds) => format!("{rounds} rounds ({max_turns} turns)"),
        None => format!("{max_turns} turns"),
    };
    format!(
        "{RULE}\nTask: {task}\nRoster: {}\nBudget: {budget}\n{RULE}",
        roster.join(" -> ")
    )
}

pub fn render_message(message: &Message) -> String {
    format!("{}\n{RULE}\n{}\n{RULE}", message.source(), message.content())
}

pub fn render_outcome(report: &RunReport) -> String {
    match &report.outcome {
        RunOutcome::Completed => format!(
            "Run completed: {}/{} turns in {} ms",
            report.turns_taken, report.max_turns, report.duration_ms
        ),
        RunOutcome::Failed(failure) => format!(
            "Run failed after {}/{} turns: {failure}",
            report.turns_taken, report.max_turns
        ),
    }
}

/// Every message of the run followed by the closing line.
pub fn render_report(report: &RunReport) -> String {
    let mut out = String::new();
    for message in &report.transcript {
        out.push_str(&render_message(message));
        out.push('\n');
    }
    out.push_str(&render_outcome(report));
    out
}
