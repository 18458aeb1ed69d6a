//! Line-oriented console input shared by the interactive loop and the
//! human seat.

use std::io::Write;
use std::sync::Arc;

use async_trait::async_trait;
use roundtable_core::{Participant, ReplyError, Transcript};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tokio::sync::Mutex;

use crate::render::render_message;

pub type InputLines = Lines<Box<dyn AsyncBufRead + Send + Unpin>>;

/// One line source, shared so the task prompt and the human seat never
/// read concurrently.
pub type SharedLines = Arc<Mutex<InputLines>>;

pub fn stdin_lines() -> SharedLines {
    lines_from_reader(BufReader::new(tokio::io::stdin()))
}

pub fn lines_from_reader<R>(reader: R) -> SharedLines
where
    R: AsyncBufRead + Send + Unpin + 'static,
{
    let boxed: Box<dyn AsyncBufRead + Send + Unpin> = Box::new(reader);
    Arc::new(Mutex::new(boxed.lines()))
}

#[cfg(test)]
pub fn lines_from(text: &str) -> SharedLines {
    lines_from_reader(std::io::Cursor::new(text.as_bytes().to_vec()))
}

/// Print `prompt` without a newline and read the next line. `Ok(None)` on EOF.
pub async fn prompt_line(input: &SharedLines, prompt: &str) -> std::io::Result<Option<String>> {
    print!("{prompt}");
    std::io::stdout().flush()?;
    input.lock().await.next_line().await
}

/// A human at the terminal taking a seat in the roster.
///
/// Shows the latest message, then reads one non-blank line as the reply.
pub struct ConsoleParticipant {
    name: String,
    input: SharedLines,
}

impl ConsoleParticipant {
    pub fn new(name: impl Into<String>, input: SharedLines) -> Self {
        Self {
            name: name.into(),
            input,
        }
    }
}

#[async_trait]
impl Participant for ConsoleParticipant {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, transcript: &Transcript) -> Result<String, ReplyError> {
        if let Some(latest) = transcript.last() {
            println!("{}", render_message(latest));
        }

        let prompt = format!("{}> ", self.name);
        loop {
            match prompt_line(&self.input, &prompt).await {
                Ok(Some(line)) if line.trim().is_empty() => continue,
                Ok(Some(line)) => return Ok(line.trim_end().to_string()),
                Ok(None) => {
                    return Err(ReplyError::Input {
                        message: "console input closed".to_string(),
                    })
                }
                Err(e) => {
                    return Err(ReplyError::Input {
                        message: e.to_string(),
                    })
                }
            }
        }
    }
}
