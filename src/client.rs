//! Wire-side question source: speaks the decision-variant `/api/decide`
//! contract against a running gateway, so any front-end can reuse the
//! session state machine.

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{CrossroadsError, Result};
use crate::models::{AssistantReply, ChatMessage, DecideRequest, Mode, OptionPair};
use crate::session::QuestionGateway;

pub struct HttpGateway {
    client: Client,
    endpoint: String,
}

impl HttpGateway {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: format!("{}/api/decide", base_url.trim_end_matches('/')),
        }
    }

    async fn post(&self, mode: Mode, options: &OptionPair, history: &[ChatMessage]) -> Result<AssistantReply> {
        let request = DecideRequest {
            mode,
            options: options.clone(),
            history: history.to_vec(),
        };
        let response = self.client.post(&self.endpoint).json(&request).send().await?;

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
            .map_err(|e| CrossroadsError::Parse(format!("gateway response: {e}")))
    }
}

#[async_trait]
impl QuestionGateway for HttpGateway {
    async fn ask(&self, options: &OptionPair, history: &[ChatMessage]) -> Result<AssistantReply> {
        self.post(Mode::AskQuestions, options, history).await
    }

    async fn conclude(
        &self,
        options: &OptionPair,
        history: &[ChatMessage],
    ) -> Result<AssistantReply> {
        self.post(Mode::FinalDecision, options, history).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_normalizes_trailing_slash() {
        let gateway = HttpGateway::new("http://127.0.0.1:8787/");
        assert_eq!(gateway.endpoint, "http://127.0.0.1:8787/api/decide");

        let gateway = HttpGateway::new("http://127.0.0.1:8787");
        assert_eq!(gateway.endpoint, "http://127.0.0.1:8787/api/decide");
    }
}
