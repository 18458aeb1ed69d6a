//! Participants backed by a remote chat-completion model.
//!
//! [`ChatClient`] is the seam to the external model API. A
//! [`ModelParticipant`] pairs a persona (name + system prompt) with a client
//! and turns the shared transcript into a role-alternating chat request from
//! its own point of view.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ReplyError;
use crate::message::{Transcript, USER_SOURCE};
use crate::participant::Participant;

/// Speaker of a chat turn, from the model's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
}

/// A provider-neutral completion request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub system_prompt: Option<String>,
    pub turns: Vec<ChatTurn>,
}

/// The external chat-completion collaborator.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Generate the next assistant message for `request`.
    async fn complete(&self, request: &ChatRequest) -> Result<String, ReplyError>;
}

/// A persona that answers through a [`ChatClient`].
#[derive(Clone)]
pub struct ModelParticipant {
    name: String,
    system_prompt: Option<String>,
    client: Arc<dyn ChatClient>,
}

impl std::fmt::Debug for ModelParticipant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelParticipant")
            .field("name", &self.name)
            .field("has_system_prompt", &self.system_prompt.is_some())
            .finish()
    }
}

impl ModelParticipant {
    pub fn new(name: impl Into<String>, client: Arc<dyn ChatClient>) -> Self {
        Self {
            name: name.into(),
            system_prompt: None,
            client,
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Build the request this participant would send for `transcript`.
    ///
    /// Own messages become assistant turns; everything else becomes a user
    /// turn prefixed with its author. Adjacent turns with the same role are
    /// merged so roles alternate. The request always ends on a user turn: when
    /// this participant spoke last (a solo roster), a `continue` turn is added.
    pub fn build_request(&self, transcript: &Transcript) -> ChatRequest {
        let mut turns: Vec<ChatTurn> = Vec::with_capacity(transcript.len());

        for message in transcript {
            let (role, text) = if message.source() == self.name {
                (ChatRole::Assistant, message.content().to_string())
            } else {
                (
                    ChatRole::User,
                    format!("[{}]: {}", message.source(), message.content()),
                )
            };

            match turns.last_mut() {
                Some(last) if last.role == role => {
                    last.text.push_str("\n\n");
                    last.text.push_str(&text);
                }
                _ => turns.push(ChatTurn { role, text }),
            }
        }

        if turns.last().map(|t| t.role) == Some(ChatRole::Assistant) {
            turns.push(ChatTurn {
                role: ChatRole::User,
                text: format!("[{USER_SOURCE}]: continue"),
            });
        }

        ChatRequest {
            system_prompt: self.system_prompt.clone(),
            turns,
        }
    }
}

#[async_trait]
impl Participant for ModelParticipant {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, transcript: &Transcript) -> Result<String, ReplyError> {
        let request = self.build_request(transcript);
        debug!(
            participant = %self.name,
            turns = request.turns.len(),
            "sending chat request"
        );

        let reply = self.client.complete(&request).await?;
        if reply.trim().is_empty() {
            return Err(ReplyError::EmptyReply);
        }
        Ok(reply)
    }
}
