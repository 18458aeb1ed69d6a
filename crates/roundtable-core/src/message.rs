//! Conversation vocabulary: `Message`, `Seed`, `Transcript`.
//!
//! A [`Transcript`] is append-only. Only the sequencer can append to it, so
//! anything holding a `&Transcript` (participants included) sees a stable,
//! ordered record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Source label used for the seed message when a human supplies the task.
pub const USER_SOURCE: &str = "user";

/// A single immutable conversation entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    seq: u32,
    source: String,
    content: String,
    created_at: DateTime<Utc>,
}

impl Message {
    pub(crate) fn new(seq: u32, source: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            seq,
            source: source.into(),
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    /// Position of this message in its transcript (the seed is 0).
    pub fn seq(&self) -> u32 {
        self.seq
    }

    /// Identity of the author.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// The message that opens a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seed {
    pub source: String,
    pub content: String,
}

impl Seed {
    pub fn new(source: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            content: content.into(),
        }
    }

    /// A seed authored by [`USER_SOURCE`].
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(USER_SOURCE, content)
    }
}

/// Ordered, append-only record of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub(crate) fn seeded(seed: Seed) -> Self {
        Self {
            messages: vec![Message::new(0, seed.source, seed.content)],
        }
    }

    /// Append a reply; its sequence number is the current length.
    pub(crate) fn append(&mut self, source: &str, content: String) -> &Message {
        let seq = self.messages.len() as u32;
        self.messages.push(Message::new(seq, source, content));
        &self.messages[self.messages.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    pub fn get(&self, seq: usize) -> Option<&Message> {
        self.messages.get(seq)
    }

    pub fn first(&self) -> Option<&Message> {
        self.messages.first()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Authors of every reply after the seed, in order.
    pub fn speakers(&self) -> Vec<&str> {
        self.messages.iter().skip(1).map(Message::source).collect()
    }
}

impl<'a> IntoIterator for &'a Transcript {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_transcript_starts_at_seq_zero() {
        let transcript = Transcript::seeded(Seed::user("write fizzbuzz"));
        assert_eq!(transcript.len(), 1);
        let seed = transcript.first().unwrap();
        assert_eq!(seed.seq(), 0);
        assert_eq!(seed.source(), USER_SOURCE);
        assert_eq!(seed.content(), "write fizzbuzz");
        assert!(transcript.speakers().is_empty());
    }

    #[test]
    fn test_append_assigns_sequential_seq() {
        let mut transcript = Transcript::seeded(Seed::user("task"));
        transcript.append("CodeWriter", "draft".to_string());
        transcript.append("CodeReviewer", "notes".to_string());

        let seqs: Vec<u32> = transcript.iter().map(Message::seq).collect();
        assert_eq!(seqs, vec![0, 1, 2]);
        assert_eq!(transcript.speakers(), vec!["CodeWriter", "CodeReviewer"]);
        assert_eq!(transcript.last().unwrap().content(), "notes");
    }

    #[test]
    fn test_transcript_serializes_as_plain_array() {
        let mut transcript = Transcript::seeded(Seed::new("ops", "task"));
        transcript.append("Solo", "done".to_string());

        let json = serde_json::to_value(&transcript).unwrap();
        let arr = json.as_array().expect("transcript is a JSON array");
        assert_eq!(arr.len(), 2);
        assert_eq!(arr[1]["source"], "Solo");

        let back: Transcript = serde_json::from_value(json).unwrap();
        assert_eq!(back, transcript);
    }
}
