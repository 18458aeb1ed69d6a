//! Roundtable Core Library
//!
//! Round-robin turn sequencing for a fixed roster of conversation
//! participants, plus the model-backed participant, scripted doubles and
//! the observability/reporting helpers shared by roundtable binaries.

pub mod error;
pub mod fakes;
pub mod message;
pub mod metrics;
pub mod model;
pub mod obs;
pub mod participant;
pub mod reporting;
pub mod sequencer;
pub mod telemetry;

pub use error::{ReplyError, ReplyFailure, Result, SequencerError};
pub use message::{Message, Seed, Transcript, USER_SOURCE};
pub use model::{ChatClient, ChatRequest, ChatRole, ChatTurn, ModelParticipant};
pub use participant::Participant;
pub use sequencer::{turn_order, RunOutcome, RunReport, SequencerState, TurnSequencer};

pub use metrics::{MetricsSnapshot, METRICS};
pub use obs::{emit_run_finished, emit_run_started, emit_turn_completed, emit_turn_failed, run_span};
pub use reporting::{read_report_json, render_transcript_md, write_report_json, write_transcript_md};
pub use telemetry::init_tracing;

/// Roundtable version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
