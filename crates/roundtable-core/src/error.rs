//! Error taxonomy for turn sequencing and reply generation.

use serde::{Deserialize, Serialize};

/// Why a participant could not produce a reply.
///
/// Carried as the cause of a [`ReplyFailure`]. Implementations of the reply
/// capability map their own failures (network, auth, quota, ...) onto these
/// variants; retry policy, if any, lives in those implementations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReplyError {
    #[error("transport error: {message}")]
    Transport { message: String },

    #[error("authentication rejected: {message}")]
    Auth { message: String },

    #[error("rate limited: {message}")]
    RateLimited { message: String },

    #[error("api error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("reply was empty")]
    EmptyReply,

    #[error("reply blocked: {reason}")]
    Blocked { reason: String },

    #[error("reply timed out after {elapsed_ms}ms")]
    TimedOut { elapsed_ms: u64 },

    #[error("input error: {message}")]
    Input { message: String },
}

/// A failed turn: which participant, which turn (1-based), and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("participant {participant} failed on turn {turn}: {cause}")]
pub struct ReplyFailure {
    pub participant: String,
    pub turn: u32,
    pub cause: ReplyError,
}

/// Errors produced by the sequencing layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SequencerError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error(transparent)]
    ReplyFailed(#[from] ReplyFailure),
}

/// Result type for sequencing operations.
pub type Result<T> = std::result::Result<T, SequencerError>;
