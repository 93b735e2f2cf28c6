use async_trait::async_trait;
use reqwest::Client;

use crate::error::{CrossroadsError, Result};
use crate::models::{ChatRequest, ChatResponse};

const GROQ_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

/// Seam between the gateway and the upstream completion API. Mocked in
/// tests; the only production implementation is [`GroqTransport`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn chat(&self, req: &ChatRequest) -> Result<ChatResponse>;
}

pub struct GroqTransport {
    client: Client,
    api_key: String,
}

impl GroqTransport {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
        }
    }
}

#[async_trait]
impl Transport for GroqTransport {
    /// Exactly one round trip per call. Failures surface immediately:
    /// no retry, no backoff, no timeout beyond the client default.
    async fn chat(&self, req: &ChatRequest) -> Result<ChatResponse> {
        let response = self
            .client
            .post(GROQ_API_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(req)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(CrossroadsError::UpstreamStatus { status, body });
        }

        response
            .json()
            .await
            .map_err(|e| CrossroadsError::Parse(format!("Groq API response: {e}")))
    }
}
