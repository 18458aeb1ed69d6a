//! Error types for the Gemini client

use roundtable_core::ReplyError;
use thiserror::Error;

/// Errors that can occur while talking to the Gemini API
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeminiError {
    /// No API key configured
    #[error("Gemini API key is missing")]
    MissingApiKey,

    /// HTTP client could not be built
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(String),

    /// Request never got a response
    #[error("transport error: {0}")]
    Transport(String),

    /// Request exceeded the configured timeout
    #[error("request timed out after {0}ms")]
    Timeout(u64),

    /// 401 / 403
    #[error("authentication failed (status {status}): {message}")]
    Auth { status: u16, message: String },

    /// 429
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// 5xx
    #[error("server error (status {status}): {message}")]
    Server { status: u16, message: String },

    /// Any other non-success status
    #[error("api error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Response body did not match the expected shape
    #[error("malformed response: {0}")]
    Decode(String),

    /// Prompt or reply rejected by safety filters
    #[error("blocked by the model: {0}")]
    Blocked(String),

    /// Response carried no text
    #[error("response contained no text")]
    EmptyReply,
}

impl GeminiError {
    /// Whether another attempt could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GeminiError::Transport(_)
                | GeminiError::Timeout(_)
                | GeminiError::RateLimited(_)
                | GeminiError::Server { .. }
        )
    }
}

impl From<reqwest::Error> for GeminiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            GeminiError::Decode(err.to_string())
        } else {
            GeminiError::Transport(err.to_string())
        }
    }
}

impl From<GeminiError> for ReplyError {
    fn from(err: GeminiError) -> Self {
        match err {
            GeminiError::Transport(message) => ReplyError::Transport { message },
            GeminiError::Timeout(elapsed_ms) => ReplyError::TimedOut { elapsed_ms },
            GeminiError::MissingApiKey => ReplyError::Auth {
                message: "Gemini API key is missing".to_string(),
            },
            GeminiError::Auth { message, .. } => ReplyError::Auth { message },
            GeminiError::RateLimited(message) => ReplyError::RateLimited { message },
            GeminiError::Server { status, message } | GeminiError::Api { status, message } => {
                ReplyError::Api { status, message }
            }
            GeminiError::ClientBuild(message) | GeminiError::Decode(message) => {
                ReplyError::Transport { message }
            }
            GeminiError::Blocked(reason) => ReplyError::Blocked { reason },
            GeminiError::EmptyReply => ReplyError::EmptyReply,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(GeminiError::RateLimited("slow down".into()).is_retryable());
        assert!(GeminiError::Server {
            status: 503,
            message: "overloaded".into()
        }
        .is_retryable());
        assert!(GeminiError::Timeout(1000).is_retryable());
        assert!(!GeminiError::Auth {
            status: 401,
            message: "bad key".into()
        }
        .is_retryable());
        assert!(!GeminiError::Api {
            status: 400,
            message: "bad request".into()
        }
        .is_retryable());
        assert!(!GeminiError::EmptyReply.is_retryable());
    }

    #[test]
    fn test_conversion_into_reply_error() {
        let reply: ReplyError = GeminiError::Server {
            status: 500,
            message: "internal".into(),
        }
        .into();
        assert_eq!(
            reply,
            ReplyError::Api {
                status: 500,
                message: "internal".into()
            }
        );

        let reply: ReplyError = GeminiError::MissingApiKey.into();
        assert!(matches!(reply, ReplyError::Auth { .. }));

        let reply: ReplyError = GeminiError::Timeout(120_000).into();
        assert_eq!(reply, ReplyError::TimedOut { elapsed_ms: 120_000 });
    }
}
