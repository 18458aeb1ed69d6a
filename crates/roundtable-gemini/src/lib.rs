//! Roundtable Gemini: Google Gemini chat-completion client
//!
//! Provides a [`roundtable_core::ChatClient`] implementation backed by the
//! Gemini `generateContent` REST endpoint, so personas can be built as
//! [`roundtable_core::ModelParticipant`]s sharing one client.

pub mod client;
pub mod config;
pub mod error;
pub mod wire;

pub use client::GeminiClient;
pub use config::{GeminiConfig, DEFAULT_BASE_URL, DEFAULT_MODEL, MAX_BACKOFF};
pub use error::GeminiError;
