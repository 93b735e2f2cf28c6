//! The Completion Gateway: builds the mode-specific system turn, makes
//! exactly one upstream call, and validates the reply before anyone
//! downstream gets to see it.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::GroqConfig;
use crate::error::{CrossroadsError, Result};
use crate::models::{AssistantReply, ChatMessage, ChatRequest, Mode, OptionPair};
use crate::prompts;
use crate::session::QuestionGateway;
use crate::transport::Transport;

/// Substituted when the upstream reply is present but empty, so the
/// response shape never degrades.
pub const EMPTY_REPLY_PLACEHOLDER: &str = "No response.";

/// Suggested replies used whenever the model fails to provide its own.
pub const DEFAULT_SUGGESTED_REPLIES: [&str; 3] = ["Yes", "No", "Maybe"];

pub fn default_suggested_replies() -> Vec<String> {
    DEFAULT_SUGGESTED_REPLIES
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Lenient shape for the model's structured `ask_questions` output. The
/// model is untrusted input: every field may be missing or empty.
#[derive(Debug, Deserialize)]
struct StructuredQuestion {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    options: Option<Vec<String>>,
}

pub struct DecisionGateway {
    tx: Arc<dyn Transport>,
    model: String,
    temperature: f32,
    max_tokens: i32,
}

impl DecisionGateway {
    pub fn new(tx: Arc<dyn Transport>, cfg: &GroqConfig) -> Self {
        Self {
            tx,
            model: cfg.model.clone(),
            temperature: cfg.temperature,
            max_tokens: cfg.max_tokens,
        }
    }

    /// Decision-variant entry point: one upstream call, mode-selected
    /// prompt, structured parse only in `ask_questions` mode.
    pub async fn decide(
        &self,
        mode: Mode,
        options: &OptionPair,
        history: &[ChatMessage],
    ) -> Result<AssistantReply> {
        tracing::info!(?mode, turns = history.len(), "dispatching completion");
        match mode {
            Mode::AskQuestions => {
                let content = self
                    .complete(prompts::ask_questions_prompt(options), history, true)
                    .await?;
                Ok(parse_structured(&content))
            }
            Mode::FinalDecision => {
                let content = self
                    .complete(prompts::final_decision_prompt(options), history, false)
                    .await?;
                Ok(AssistantReply {
                    text: content,
                    options: None,
                })
            }
        }
    }

    /// Simple-variant entry point: relay the raw conversation under the
    /// fixed persona prompt.
    pub async fn relay(&self, messages: &[ChatMessage]) -> Result<AssistantReply> {
        tracing::info!(turns = messages.len(), "relaying conversation");
        let content = self
            .complete(prompts::SIMPLE_ASSISTANT_PROMPT.to_string(), messages, false)
            .await?;
        Ok(AssistantReply {
            text: content,
            options: None,
        })
    }

    /// Prepend the system turn, call upstream once, extract the first
    /// choice. An empty reply becomes the fixed placeholder rather than
    /// a failure.
    async fn complete(
        &self,
        system_prompt: String,
        history: &[ChatMessage],
        structured: bool,
    ) -> Result<String> {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(ChatMessage::system(system_prompt));
        messages.extend_from_slice(history);

        let mut request = ChatRequest {
            model: self.model.clone(),
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            response_format: None,
        };
        if structured {
            request = request.json_format();
        }

        let response = self.tx.chat(&request).await?;
        let content = response.content().ok_or_else(|| {
            CrossroadsError::Parse("Groq API returned empty choices".to_string())
        })?;

        if content.trim().is_empty() {
            Ok(EMPTY_REPLY_PLACEHOLDER.to_string())
        } else {
            Ok(content.to_string())
        }
    }
}

/// The gateway doubles as the in-process question source for the client
/// state machine: `ask` maps to `ask_questions`, `conclude` to
/// `final_decision`.
#[async_trait]
impl QuestionGateway for DecisionGateway {
    async fn ask(&self, options: &OptionPair, history: &[ChatMessage]) -> Result<AssistantReply> {
        self.decide(Mode::AskQuestions, options, history).await
    }

    async fn conclude(
        &self,
        options: &OptionPair,
        history: &[ChatMessage],
    ) -> Result<AssistantReply> {
        self.decide(Mode::FinalDecision, options, history).await
    }
}

/// Validate the structured `ask_questions` reply. Parse failures degrade
/// to the raw text with the default suggested replies; they never bubble
/// up as a 500.
fn parse_structured(raw: &str) -> AssistantReply {
    let candidate = strip_markdown_fences(raw);
    match serde_json::from_str::<StructuredQuestion>(candidate) {
        Ok(parsed) => {
            let text = parsed
                .text
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| raw.to_string());
            let options = parsed
                .options
                .map(|opts| {
                    opts.into_iter()
                        .filter(|o| !o.trim().is_empty())
                        .collect::<Vec<_>>()
                })
                .filter(|opts| !opts.is_empty())
                .unwrap_or_else(default_suggested_replies);
            AssistantReply {
                text,
                options: Some(options),
            }
        }
        Err(e) => {
            tracing::warn!("unstructured ask_questions reply, degrading to raw text: {e}");
            AssistantReply {
                text: raw.to_string(),
                options: Some(default_suggested_replies()),
            }
        }
    }
}

/// Models sometimes wrap their JSON in markdown fences even when asked
/// not to.
fn strip_markdown_fences(content: &str) -> &str {
    let trimmed = content.trim();

    if let Some(stripped) = trimmed
        .strip_prefix("```json")
        .and_then(|s| s.strip_suffix("```"))
    {
        return stripped.trim();
    }

    if let Some(stripped) = trimmed
        .strip_prefix("```")
        .and_then(|s| s.strip_suffix("```"))
    {
        return stripped.trim();
    }

    content
}
