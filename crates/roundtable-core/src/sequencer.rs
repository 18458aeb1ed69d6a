//! Round-robin turn sequencing over a fixed roster.
//!
//! Turns are strictly sequential: turn k+1 starts only after turn k's reply
//! has been appended, because every reply is generated from the complete
//! transcript. The termination predicate (`turns_taken >= max_turns`) is
//! checked once per completed turn, after the append.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, Instrument};
use uuid::Uuid;

use crate::error::{ReplyError, ReplyFailure, Result, SequencerError};
use crate::message::{Seed, Transcript};
use crate::metrics::METRICS;
use crate::obs::{emit_run_finished, emit_run_started, emit_turn_completed, emit_turn_failed, run_span};
use crate::participant::Participant;

/// Cursor and turn counter for a single run.
///
/// Created fresh by every run; never shared between runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequencerState {
    roster_len: usize,
    cursor: usize,
    turns_taken: u32,
}

impl SequencerState {
    /// `roster_len` must be non-zero.
    pub fn new(roster_len: usize) -> Self {
        debug_assert!(roster_len > 0, "roster must not be empty");
        Self {
            roster_len,
            cursor: 0,
            turns_taken: 0,
        }
    }

    /// Roster index of the participant whose turn is next.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn turns_taken(&self) -> u32 {
        self.turns_taken
    }

    /// Record a completed turn and move to the next participant.
    pub fn advance(&mut self) {
        self.turns_taken += 1;
        self.cursor = (self.cursor + 1) % self.roster_len;
    }

    pub fn is_done(&self, max_turns: u32) -> bool {
        self.turns_taken >= max_turns
    }
}

/// Roster indices visited by a full run of `max_turns` turns.
pub fn turn_order(roster_len: usize, max_turns: u32) -> Vec<usize> {
    if roster_len == 0 {
        return Vec::new();
    }
    let mut state = SequencerState::new(roster_len);
    let mut order = Vec::with_capacity(max_turns as usize);
    while !state.is_done(max_turns) {
        order.push(state.cursor());
        state.advance();
    }
    order
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    /// The turn budget was used up.
    Completed,
    /// A reply failed; the run stopped at that turn.
    Failed(ReplyFailure),
}

/// Everything a caller needs after a run: the transcript and how it ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub transcript: Transcript,
    pub outcome: RunOutcome,
    pub turns_taken: u32,
    pub max_turns: u32,
    pub duration_ms: u64,
}

impl RunReport {
    pub fn is_completed(&self) -> bool {
        matches!(self.outcome, RunOutcome::Completed)
    }

    pub fn failure(&self) -> Option<&ReplyFailure> {
        match &self.outcome {
            RunOutcome::Completed => None,
            RunOutcome::Failed(failure) => Some(failure),
        }
    }

    /// The transcript of a completed run, or the failure as an error.
    pub fn into_result(self) -> Result<Transcript> {
        match self.outcome {
            RunOutcome::Completed => Ok(self.transcript),
            RunOutcome::Failed(failure) => Err(SequencerError::ReplyFailed(failure)),
        }
    }
}

/// Drives a fixed roster through a round-robin conversation.
pub struct TurnSequencer {
    roster: Vec<Arc<dyn Participant>>,
}

impl std::fmt::Debug for TurnSequencer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TurnSequencer")
            .field("roster", &self.roster_names())
            .finish()
    }
}

impl TurnSequencer {
    /// Register a roster. It must be non-empty and names must be non-blank
    /// and unique.
    pub fn new(roster: Vec<Arc<dyn Participant>>) -> Result<Self> {
        if roster.is_empty() {
            return Err(SequencerError::InvalidConfiguration(
                "roster must contain at least one participant".to_string(),
            ));
        }

        let mut seen = BTreeSet::new();
        for participant in &roster {
            let name = participant.name();
            if name.trim().is_empty() {
                return Err(SequencerError::InvalidConfiguration(
                    "participant names must not be blank".to_string(),
                ));
            }
            if !seen.insert(name) {
                return Err(SequencerError::InvalidConfiguration(format!(
                    "duplicate participant name: {name}"
                )));
            }
        }

        Ok(Self { roster })
    }

    pub fn roster_names(&self) -> Vec<&str> {
        self.roster.iter().map(|p| p.name()).collect()
    }

    pub fn roster_len(&self) -> usize {
        self.roster.len()
    }

    /// Run until `max_turns` turns have completed or a reply fails.
    ///
    /// Returns `Err` only for invalid input, before any participant is
    /// called. Reply failures are reported through [`RunReport::outcome`]
    /// with the partial transcript preserved.
    pub async fn run(&self, seed: Seed, max_turns: u32) -> Result<RunReport> {
        self.drive(seed, max_turns, None).await
    }

    /// Like [`run`](Self::run), with one wall-clock budget for the whole run.
    ///
    /// A turn still in flight when the budget elapses fails with
    /// [`ReplyError::TimedOut`].
    pub async fn run_with_timeout(
        &self,
        seed: Seed,
        max_turns: u32,
        budget: Duration,
    ) -> Result<RunReport> {
        if budget.is_zero() {
            return Err(SequencerError::InvalidConfiguration(
                "timeout budget must be non-zero".to_string(),
            ));
        }
        self.drive(seed, max_turns, Some(budget)).await
    }

    async fn drive(&self, seed: Seed, max_turns: u32, budget: Option<Duration>) -> Result<RunReport> {
        validate_run(&seed, max_turns)?;

        let run_id = Uuid::new_v4();
        let span = run_span(&run_id.to_string());
        self.turns(run_id, seed, max_turns, budget)
            .instrument(span)
            .await
    }

    async fn turns(
        &self,
        run_id: Uuid,
        seed: Seed,
        max_turns: u32,
        budget: Option<Duration>,
    ) -> Result<RunReport> {
        let run_id_str = run_id.to_string();
        let started = Instant::now();
        let deadline = budget.map(|b| started + b);

        emit_run_started(&run_id_str, &self.roster_names(), max_turns);
        METRICS.inc_runs_started();

        let mut transcript = Transcript::seeded(seed);
        let mut state = SequencerState::new(self.roster.len());

        let outcome = loop {
            let participant = &self.roster[state.cursor()];
            let turn = state.turns_taken() + 1;
            debug!(turn, participant = participant.name(), "requesting reply");

            let reply = match deadline {
                Some(deadline) if Instant::now() >= deadline => Err(timed_out(started)),
                Some(deadline) => {
                    match tokio::time::timeout_at(deadline, participant.generate(&transcript)).await {
                        Ok(reply) => reply,
                        Err(_) => Err(timed_out(started)),
                    }
                }
                None => participant.generate(&transcript).await,
            };

            match reply {
                Ok(content) => {
                    let message = transcript.append(participant.name(), content);
                    emit_turn_completed(
                        &run_id_str,
                        turn,
                        message.source(),
                        message.content().chars().count(),
                    );
                    METRICS.inc_turns_completed();
                    state.advance();
                    if state.is_done(max_turns) {
                        break RunOutcome::Completed;
                    }
                }
                Err(cause) => {
                    emit_turn_failed(&run_id_str, turn, participant.name(), &cause);
                    METRICS.inc_reply_failures();
                    break RunOutcome::Failed(ReplyFailure {
                        participant: participant.name().to_string(),
                        turn,
                        cause,
                    });
                }
            }
        };

        let duration_ms = started.elapsed().as_millis() as u64;
        let success = matches!(outcome, RunOutcome::Completed);
        emit_run_finished(&run_id_str, duration_ms, state.turns_taken(), success);

        Ok(RunReport {
            run_id,
            transcript,
            outcome,
            turns_taken: state.turns_taken(),
            max_turns,
            duration_ms,
        })
    }
}

fn validate_run(seed: &Seed, max_turns: u32) -> Result<()> {
    if max_turns == 0 {
        return Err(SequencerError::InvalidConfiguration(
            "max_turns must be at least 1".to_string(),
        ));
    }
    if seed.content.trim().is_empty() {
        return Err(SequencerError::InvalidConfiguration(
            "initial message must not be empty".to_string(),
        ));
    }
    if seed.source.trim().is_empty() {
        return Err(SequencerError::InvalidConfiguration(
            "initial message must name its source".to_string(),
        ));
    }
    Ok(())
}

fn timed_out(started: Instant) -> ReplyError {
    ReplyError::TimedOut {
        elapsed_ms: started.elapsed().as_millis() as u64,
    }
}
