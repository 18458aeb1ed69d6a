//! Scripted participants (testing and offline demos)
//!
//! Provides `ScriptedParticipant`, `FailingParticipant`, `EchoParticipant`
//! and `SlowParticipant`, which satisfy the [`Participant`] contract without
//! any external service.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::ReplyError;
use crate::message::Transcript;
use crate::participant::Participant;

// ---------------------------------------------------------------------------
// ScriptedParticipant
// ---------------------------------------------------------------------------

/// Replies from a queue, then repeats a fallback once the queue is drained.
///
/// Records the transcript length it observed on every call.
#[derive(Debug)]
pub struct ScriptedParticipant {
    name: String,
    replies: Mutex<VecDeque<String>>,
    fallback: String,
    observed_lengths: Mutex<Vec<usize>>,
}

impl ScriptedParticipant {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            fallback: format!("{name} has nothing to add"),
            name,
            replies: Mutex::new(VecDeque::new()),
            observed_lengths: Mutex::new(Vec::new()),
        }
    }

    pub fn with_replies<I, S>(self, replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.replies
            .lock()
            .unwrap()
            .extend(replies.into_iter().map(Into::into));
        self
    }

    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = fallback.into();
        self
    }

    /// Transcript lengths seen by each call, in call order.
    pub fn observed_lengths(&self) -> Vec<usize> {
        self.observed_lengths.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.observed_lengths.lock().unwrap().len()
    }
}

#[async_trait]
impl Participant for ScriptedParticipant {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, transcript: &Transcript) -> Result<String, ReplyError> {
        self.observed_lengths.lock().unwrap().push(transcript.len());
        let next = self.replies.lock().unwrap().pop_front();
        Ok(next.unwrap_or_else(|| self.fallback.clone()))
    }
}

// ---------------------------------------------------------------------------
// FailingParticipant
// ---------------------------------------------------------------------------

/// Succeeds `succeed_first` times, then fails every call with `error`.
#[derive(Debug)]
pub struct FailingParticipant {
    name: String,
    error: ReplyError,
    succeed_first: u32,
    calls: AtomicU32,
}

impl FailingParticipant {
    pub fn new(name: impl Into<String>, error: ReplyError) -> Self {
        Self {
            name: name.into(),
            error,
            succeed_first: 0,
            calls: AtomicU32::new(0),
        }
    }

    pub fn after_successes(mut self, count: u32) -> Self {
        self.succeed_first = count;
        self
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Participant for FailingParticipant {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, _transcript: &Transcript) -> Result<String, ReplyError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.succeed_first {
            Ok(format!("{} reply {}", self.name, call + 1))
        } else {
            Err(self.error.clone())
        }
    }
}

// ---------------------------------------------------------------------------
// EchoParticipant
// ---------------------------------------------------------------------------

/// Replies `"<name> saw <n> messages"`.
#[derive(Debug)]
pub struct EchoParticipant {
    name: String,
}

impl EchoParticipant {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl Participant for EchoParticipant {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, transcript: &Transcript) -> Result<String, ReplyError> {
        Ok(format!("{} saw {} messages", self.name, transcript.len()))
    }
}

// ---------------------------------------------------------------------------
// SlowParticipant
// ---------------------------------------------------------------------------

/// Sleeps for `delay` before replying. Pair with a paused tokio clock.
#[derive(Debug)]
pub struct SlowParticipant {
    name: String,
    delay: Duration,
}

impl SlowParticipant {
    pub fn new(name: impl Into<String>, delay: Duration) -> Self {
        Self {
            name: name.into(),
            delay,
        }
    }
}

#[async_trait]
impl Participant for SlowParticipant {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, _transcript: &Transcript) -> Result<String, ReplyError> {
        tokio::time::sleep(self.delay).await;
        Ok(format!("{} finally replied", self.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Seed;

    #[tokio::test]
    async fn test_scripted_drains_queue_then_falls_back() {
        let p = ScriptedParticipant::new("W")
            .with_replies(["one", "two"])
            .with_fallback("done");
        let transcript = Transcript::seeded(Seed::user("task"));

        assert_eq!(p.generate(&transcript).await.unwrap(), "one");
        assert_eq!(p.generate(&transcript).await.unwrap(), "two");
        assert_eq!(p.generate(&transcript).await.unwrap(), "done");
        assert_eq!(p.observed_lengths(), vec![1, 1, 1]);
    }

    #[tokio::test]
    async fn test_failing_after_successes() {
        let p = FailingParticipant::new("R", ReplyError::EmptyReply).after_successes(1);
        let transcript = Transcript::seeded(Seed::user("task"));

        assert_eq!(p.generate(&transcript).await.unwrap(), "R reply 1");
        assert_eq!(
            p.generate(&transcript).await.unwrap_err(),
            ReplyError::EmptyReply
        );
        assert_eq!(p.calls(), 2);
    }

    #[tokio::test]
    async fn test_echo_reports_transcript_length() {
        let p = EchoParticipant::new("O");
        let transcript = Transcript::seeded(Seed::user("task"));
        assert_eq!(p.generate(&transcript).await.unwrap(), "O saw 1 messages");
    }
}
