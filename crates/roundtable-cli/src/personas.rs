//! The code development roster: writer, reviewer, optimizer (and an
//! optional human seat).

use std::sync::Arc;

use anyhow::{bail, Result};
use clap::ValueEnum;
use roundtable_core::{ChatClient, ModelParticipant, Participant};

use crate::console::{ConsoleParticipant, SharedLines};

/// A named system prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Persona {
    pub name: &'static str,
    pub system_prompt: &'static str,
}

pub const CODE_WRITER: Persona = Persona {
    name: "CodeWriter",
    system_prompt: "You are a professional Python developer.

Your responsibilities:
1. Write Python code for the task the user describes
2. Keep the code well structured and readable
3. Add the comments and docstrings a maintainer needs
4. Follow Python best practices
5. Deliver a complete, runnable solution

Explain your implementation approach clearly and practically.
End your reply by stating that this is the \"Initial code version\".",
};

pub const CODE_REVIEWER: Persona = Persona {
    name: "CodeReviewer",
    system_prompt: "You are an experienced code reviewer.

Your responsibilities:
1. Review the code provided in the conversation carefully
2. Identify bugs, vulnerabilities and room for improvement
3. Check performance, security, readability and maintainability
4. Give concrete suggestions grounded in best practices
5. Point out unhandled edge cases and error-handling gaps

Give constructive feedback covering:
- an assessment of code quality
- specific improvements
- performance suggestions
- security considerations

End your reply by stating that this is the \"Code review feedback\".",
};

pub const CODE_OPTIMIZER: Persona = Persona {
    name: "CodeOptimizer",
    system_prompt: "You are a code optimization specialist.

Your responsibilities:
1. Improve the original code using the reviewer's suggestions
2. Implement every improvement the reviewer asked for
3. Optimize performance, readability and maintainability
4. Keep the original behaviour intact
5. Strengthen error handling and edge-case handling

Provide:
- the complete optimized code
- a summary of what was improved
- the main differences from the original code

End your reply by stating that this is the \"Final optimized code\".",
};

/// Name of the human seat in transcripts.
pub const HUMAN_NAME: &str = "Human";

/// A seat in the roster, selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Role {
    Writer,
    Reviewer,
    Optimizer,
    Human,
}

impl Role {
    /// Persona for model-backed roles; `None` for the human seat.
    pub fn persona(self) -> Option<Persona> {
        match self {
            Role::Writer => Some(CODE_WRITER),
            Role::Reviewer => Some(CODE_REVIEWER),
            Role::Optimizer => Some(CODE_OPTIMIZER),
            Role::Human => None,
        }
    }
}

/// Whether any role in `roles` needs a chat client.
pub fn needs_model(roles: &[Role]) -> bool {
    roles.iter().any(|r| r.persona().is_some())
}

/// Instantiate participants for `roles`, in order.
///
/// Model-backed roles share `client`; the human seat reads from `input`.
pub fn build_roster(
    roles: &[Role],
    client: Option<Arc<dyn ChatClient>>,
    input: &SharedLines,
) -> Result<Vec<Arc<dyn Participant>>> {
    let mut roster: Vec<Arc<dyn Participant>> = Vec::with_capacity(roles.len());
    for role in roles {
        match (role.persona(), &client) {
            (Some(persona), Some(client)) => roster.push(Arc::new(
                ModelParticipant::new(persona.name, Arc::clone(client))
                    .with_system_prompt(persona.system_prompt),
            )),
            (Some(persona), None) => {
                bail!("{} needs a model client; set GEMINI_API_KEY or pass --api-key", persona.name)
            }
            (None, _) => roster.push(Arc::new(ConsoleParticipant::new(HUMAN_NAME, input.clone()))),
        }
    }
    Ok(roster)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::lines_from;
    use async_trait::async_trait;
    use roundtable_core::{ChatRequest, ReplyError};

    struct NullClient;

    #[async_trait]
    impl ChatClient for NullClient {
        async fn complete(&self, _request: &ChatRequest) -> Result<String, ReplyError> {
            Ok("ok".to_string())
        }
    }

    #[test]
    fn test_personas_have_distinct_names_and_labels() {
        assert_eq!(CODE_WRITER.name, "CodeWriter");
        assert_eq!(CODE_REVIEWER.name, "CodeReviewer");
        assert_eq!(CODE_OPTIMIZER.name, "CodeOptimizer");
        assert!(CODE_WRITER.system_prompt.contains("Initial code version"));
        assert!(CODE_REVIEWER.system_prompt.contains("Code review feedback"));
        assert!(CODE_OPTIMIZER.system_prompt.contains("Final optimized code"));
    }

    #[test]
    fn test_build_default_roster_in_order() {
        let input = lines_from("");
        let client: Arc<dyn ChatClient> = Arc::new(NullClient);
        let roster = build_roster(
            &[Role::Writer, Role::Reviewer, Role::Optimizer],
            Some(client),
            &input,
        )
        .unwrap();

        let names: Vec<&str> = roster.iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["CodeWriter", "CodeReviewer", "CodeOptimizer"]);
    }

    #[test]
    fn test_model_role_without_client_is_an_error() {
        let input = lines_from("");
        let err = build_roster(&[Role::Writer], None, &input).err().expect("expected an error");
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }

    #[test]
    fn test_human_only_roster_needs_no_client() {
        let input = lines_from("");
        assert!(!needs_model(&[Role::Human]));
        let roster = build_roster(&[Role::Human], None, &input).unwrap();
        assert_eq!(roster[0].name(), HUMAN_NAME);
    }
}
