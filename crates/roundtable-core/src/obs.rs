//! Run lifecycle events.
//!
//! The sequencer calls these at fixed points of a run, inside the span from
//! [`run_span`]. Each event carries an `event` field (`run.started`,
//! `turn.completed`, `turn.failed`, `run.finished`) so log pipelines can key
//! on it; failures are logged at `warn!`, the rest at `info!`.

use tracing::{info, warn};

/// Span tagged with the run id. Every event emitted while a run is being
/// driven is recorded inside it.
pub fn run_span(run_id: &str) -> tracing::Span {
    tracing::info_span!("roundtable.run", run_id = %run_id)
}

/// Emit event: run started with its roster and turn budget.
///
/// # Example
///
/// ```ignore
/// emit_run_started("run-123", &["CodeWriter", "CodeReviewer"], 3);
/// // logs: event=run.started run_id=run-123 roster="CodeWriter,CodeReviewer" max_turns=3
/// ```
pub fn emit_run_started(run_id: &str, roster: &[&str], max_turns: u32) {
    info!(
        event = "run.started",
        run_id = %run_id,
        roster = %roster.join(","),
        max_turns = max_turns,
    );
}

/// Emit event: a reply was appended to the transcript.
pub fn emit_turn_completed(run_id: &str, turn: u32, participant: &str, chars: usize) {
    info!(
        event = "turn.completed",
        run_id = %run_id,
        turn = turn,
        participant = %participant,
        chars = chars,
    );
}

/// Emit event: a participant failed to reply (warning level).
pub fn emit_turn_failed(run_id: &str, turn: u32, participant: &str, error: &dyn std::fmt::Display) {
    warn!(
        event = "turn.failed",
        run_id = %run_id,
        turn = turn,
        participant = %participant,
        error = %error,
    );
}

/// Emit event: run finished with duration, turns taken, and success status.
pub fn emit_run_finished(run_id: &str, duration_ms: u64, turns_taken: u32, success: bool) {
    info!(
        event = "run.finished",
        run_id = %run_id,
        duration_ms = duration_ms,
        turns_taken = turns_taken,
        success = success,
    );
}
