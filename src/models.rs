use serde::{Deserialize, Serialize};

/// One role-tagged turn in a conversation. Histories are append-only:
/// turns are never mutated or deleted once recorded.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }
}

/// The two choices under consideration. Set once when a session starts
/// and immutable afterwards.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct OptionPair {
    pub opt1: String,
    pub opt2: String,
}

impl OptionPair {
    pub fn new(opt1: impl Into<String>, opt2: impl Into<String>) -> Self {
        Self {
            opt1: opt1.into(),
            opt2: opt2.into(),
        }
    }
}

/// Selects which system prompt template the gateway uses. Transitions are
/// one-directional: any number of `ask_questions` calls, then at most one
/// `final_decision`, never back.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    AskQuestions,
    FinalDecision,
}

/// Decision-variant request body for `POST /api/decide`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DecideRequest {
    pub mode: Mode,
    pub options: OptionPair,
    #[serde(default)]
    pub history: Vec<ChatMessage>,
}

/// Simple-variant request body: a raw conversation relayed under a fixed
/// assistant persona.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SimpleRequest {
    pub messages: Vec<ChatMessage>,
}

/// The two historical body shapes accepted on the same endpoint.
#[derive(Debug, Deserialize, Clone)]
#[serde(untagged)]
pub enum DecideBody {
    Decision(DecideRequest),
    Simple(SimpleRequest),
}

/// Gateway reply. `options` is only present in `ask_questions` mode,
/// where it carries the suggested short replies.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AssistantReply {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

// Groq chat completion request format (OpenAI-compatible)
#[derive(Debug, Serialize, Clone)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<serde_json::Value>,
}

impl ChatRequest {
    /// Request JSON-object structured output from the model.
    pub fn json_format(mut self) -> Self {
        self.response_format = Some(serde_json::json!({"type": "json_object"}));
        self
    }
}

// Groq chat completion response format
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChatMessage,
}

impl ChatResponse {
    /// Content of the first choice, if the upstream returned any.
    pub fn content(&self) -> Option<&str> {
        self.choices.first().map(|c| c.message.content.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_constructors() {
        let user = ChatMessage::user("Hello");
        assert_eq!(user.role, "user");
        assert_eq!(user.content, "Hello");

        let system = ChatMessage::system("You are a decision assistant");
        assert_eq!(system.role, "system");

        let assistant = ChatMessage::assistant("Which matters more?");
        assert_eq!(assistant.role, "assistant");
    }

    #[test]
    fn test_mode_wire_names() {
        assert_eq!(
            serde_json::to_string(&Mode::AskQuestions).expect("serialize mode"),
            "\"ask_questions\""
        );
        assert_eq!(
            serde_json::from_str::<Mode>("\"final_decision\"").expect("deserialize mode"),
            Mode::FinalDecision
        );
    }

    #[test]
    fn test_body_shape_selection() {
        let decision: DecideBody = serde_json::from_str(
            r#"{"mode":"ask_questions","options":{"opt1":"Move to Berlin","opt2":"Stay in Pune"},"history":[]}"#,
        )
        .expect("decision body should parse");
        assert!(matches!(decision, DecideBody::Decision(_)));

        let simple: DecideBody =
            serde_json::from_str(r#"{"messages":[{"role":"user","content":"hi"}]}"#)
                .expect("simple body should parse");
        assert!(matches!(simple, DecideBody::Simple(_)));
    }

    #[test]
    fn test_decision_body_history_defaults_empty() {
        let body: DecideRequest =
            serde_json::from_str(r#"{"mode":"ask_questions","options":{"opt1":"A","opt2":"B"}}"#)
                .expect("history should default");
        assert!(body.history.is_empty());
    }

    #[test]
    fn test_reply_serialization_omits_absent_options() {
        let reply = AssistantReply {
            text: "Take the job.".to_string(),
            options: None,
        };
        let json = serde_json::to_string(&reply).expect("serialize reply");
        assert_eq!(json, r#"{"text":"Take the job."}"#);

        let reply = AssistantReply {
            text: "Which matters more?".to_string(),
            options: Some(vec!["Salary".to_string(), "Growth".to_string()]),
        };
        let json = serde_json::to_string(&reply).expect("serialize reply");
        assert!(json.contains("\"options\":[\"Salary\",\"Growth\"]"));
    }

    #[test]
    fn test_chat_request_json_format() {
        let req = ChatRequest {
            model: "llama-3.3-70b-versatile".to_string(),
            messages: vec![ChatMessage::user("hi")],
            temperature: 0.2,
            max_tokens: 1024,
            response_format: None,
        }
        .json_format();
        assert_eq!(
            req.response_format,
            Some(serde_json::json!({"type": "json_object"}))
        );
    }
}
