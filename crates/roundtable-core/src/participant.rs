//! The reply capability every roster member implements.

use async_trait::async_trait;

use crate::error::ReplyError;
use crate::message::Transcript;

/// A named entity that produces one reply given the conversation so far.
///
/// Implementations receive a shared borrow of the transcript and return the
/// reply text; the sequencer stamps source and sequence number onto it.
/// Variants in this workspace: [`crate::model::ModelParticipant`] (remote
/// chat model), the scripted doubles in [`crate::fakes`], and the console
/// participant in the CLI.
#[async_trait]
pub trait Participant: Send + Sync {
    /// Identity used as the `source` of every message this participant adds.
    fn name(&self) -> &str;

    /// Produce the next reply.
    async fn generate(&self, transcript: &Transcript) -> Result<String, ReplyError>;
}
