//! Task execution: one-shot runs and the interactive loop.
//!
//! Every task is a fresh call into the sequencer, so nothing carries over
//! from one task to the next.

use std::time::Duration;

use anyhow::Result;
use roundtable_core::{RunReport, Seed, TurnSequencer};
use tracing::{error, info, warn};

use crate::console::{prompt_line, SharedLines};
use crate::render::{render_banner, render_report};

pub const TASK_PREAMBLE: &str = "Develop Python code for the following task:";

pub const SAMPLE_TASK: &str = "Write a function that computes the n-th Fibonacci number.
Requirements:
1. Support large numbers without overflow
2. Validate the input
3. Provide both a recursive and an iterative implementation
4. Add a timing harness that compares the two";

const EXIT_WORDS: [&str; 3] = ["quit", "exit", "退出"];

/// The user-role seed for `task`.
pub fn task_seed(task: &str) -> Seed {
    Seed::user(format!("{TASK_PREAMBLE}\n\n{task}"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSettings {
    pub max_turns: u32,
    /// Full passes through the roster, when the budget was given in rounds.
    pub rounds: Option<u32>,
    pub timeout: Option<Duration>,
}

impl RunSettings {
    /// `rounds` full passes through a roster of `roster_len` participants.
    pub fn rounds(rounds: u32, roster_len: usize) -> Self {
        let roster_len = u32::try_from(roster_len).unwrap_or(u32::MAX);
        Self {
            max_turns: rounds.saturating_mul(roster_len),
            rounds: Some(rounds),
            timeout: None,
        }
    }

    /// An explicit turn count, independent of the roster size.
    pub fn turns(max_turns: u32) -> Self {
        Self {
            max_turns,
            rounds: None,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Run one task and print its transcript.
///
/// A failed reply is part of the report, not an error; errors here mean the
/// run could not start.
pub async fn execute_task(
    sequencer: &TurnSequencer,
    task: &str,
    settings: RunSettings,
) -> Result<RunReport> {
    println!(
        "{}",
        render_banner(
            task,
            &sequencer.roster_names(),
            settings.max_turns,
            settings.rounds
        )
    );

    let seed = task_seed(task);
    let report = match settings.timeout {
        Some(budget) => {
            sequencer
                .run_with_timeout(seed, settings.max_turns, budget)
                .await?
        }
        None => sequencer.run(seed, settings.max_turns).await?,
    };

    println!("{}", render_report(&report));
    Ok(report)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionInput {
    Quit,
    Blank,
    Task(String),
}

pub fn classify_input(line: &str) -> SessionInput {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        SessionInput::Blank
    } else if EXIT_WORDS.iter().any(|w| trimmed.eq_ignore_ascii_case(w)) {
        SessionInput::Quit
    } else {
        SessionInput::Task(trimmed.to_string())
    }
}

#[derive(Debug, Default)]
pub struct SessionSummary {
    pub reports: Vec<RunReport>,
    /// Tasks that could not be run at all.
    pub errors: usize,
}

impl SessionSummary {
    pub fn failed(&self) -> usize {
        self.errors + self.reports.iter().filter(|r| !r.is_completed()).count()
    }
}

/// Read tasks from `input` until a quit word or EOF.
pub async fn interactive_session(
    sequencer: &TurnSequencer,
    settings: RunSettings,
    input: &SharedLines,
) -> Result<SessionSummary> {
    println!("Roundtable interactive session");
    println!("Enter a programming task, or 'quit' to leave.");

    let mut summary = SessionSummary::default();
    loop {
        let Some(line) = prompt_line(input, "\ntask> ").await? else {
            info!("input closed, ending session");
            break;
        };

        match classify_input(&line) {
            SessionInput::Quit => break,
            SessionInput::Blank => {
                warn!("blank task ignored");
                println!("Please enter a non-empty task.");
            }
            SessionInput::Task(task) => match execute_task(sequencer, &task, settings).await {
                Ok(report) => summary.reports.push(report),
                Err(e) => {
                    error!(error = %e, "task could not be run");
                    eprintln!("Error: {e:#}");
                    summary.errors += 1;
                }
            },
        }
    }

    println!(
        "Session finished: {} task(s), {} failed",
        summary.reports.len() + summary.errors,
        summary.failed()
    );
    Ok(summary)
}
