//! HTTP surface: one logical endpoint, two historical body shapes.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::error::Result;
use crate::gateway::DecisionGateway;
use crate::models::{AssistantReply, DecideBody};

#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<DecisionGateway>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/decide", post(decide))
        .route("/health", get(|| async { "ok" }))
        .with_state(state)
}

/// The whole backend: forward the conversation upstream once and relay
/// the text back. Stateless; every call is fully determined by its body.
async fn decide(
    State(state): State<AppState>,
    Json(body): Json<DecideBody>,
) -> Result<Json<AssistantReply>> {
    let reply = match body {
        DecideBody::Decision(req) => {
            state
                .gateway
                .decide(req.mode, &req.options, &req.history)
                .await?
        }
        DecideBody::Simple(req) => state.gateway.relay(&req.messages).await?,
    };
    Ok(Json(reply))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::config::GroqConfig;
    use crate::error::CrossroadsError;
    use crate::models::{ChatMessage, ChatResponse, Choice};
    use crate::transport::MockTransport;

    fn app(mock: MockTransport) -> Router {
        let cfg = GroqConfig {
            api_key: "test-key".to_string(),
            model: "test-model".to_string(),
            temperature: 0.2,
            max_tokens: 1024,
        };
        router(AppState {
            gateway: Arc::new(DecisionGateway::new(Arc::new(mock), &cfg)),
        })
    }

    fn upstream_reply(content: &str) -> ChatResponse {
        ChatResponse {
            choices: vec![Choice {
                message: ChatMessage::assistant(content),
            }],
        }
    }

    fn json_post(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request builds")
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body collects")
            .to_bytes();
        serde_json::from_slice(&bytes).expect("body is JSON")
    }

    #[tokio::test]
    async fn test_decision_body_ask_questions() {
        let mut mock = MockTransport::new();
        mock.expect_chat().times(1).returning(|_| {
            Ok(upstream_reply(
                r#"{"text": "Which matters more?", "options": ["Salary", "Growth"]}"#,
            ))
        });

        let response = app(mock)
            .oneshot(json_post(
                "/api/decide",
                r#"{"mode":"ask_questions","options":{"opt1":"Job A","opt2":"Job B"},"history":[]}"#,
            ))
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["text"], "Which matters more?");
        assert_eq!(json["options"][0], "Salary");
    }

    #[tokio::test]
    async fn test_decision_body_final_decision_has_no_options_key() {
        let mut mock = MockTransport::new();
        mock.expect_chat()
            .times(1)
            .returning(|_| Ok(upstream_reply("Winner: Job A.")));

        let response = app(mock)
            .oneshot(json_post(
                "/api/decide",
                r#"{"mode":"final_decision","options":{"opt1":"Job A","opt2":"Job B"},"history":[{"role":"user","content":"777"}]}"#,
            ))
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["text"], "Winner: Job A.");
        assert!(json.get("options").is_none());
    }

    #[tokio::test]
    async fn test_simple_body_shape() {
        let mut mock = MockTransport::new();
        mock.expect_chat()
            .times(1)
            .returning(|_| Ok(upstream_reply("I build ML systems.")));

        let response = app(mock)
            .oneshot(json_post(
                "/api/decide",
                r#"{"messages":[{"role":"user","content":"What do you do?"}]}"#,
            ))
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["text"], "I build ML systems.");
    }

    #[tokio::test]
    async fn test_upstream_failure_maps_to_generic_500() {
        let mut mock = MockTransport::new();
        mock.expect_chat().times(1).returning(|_| {
            Err(CrossroadsError::UpstreamStatus {
                status: 429,
                body: "rate limited".to_string(),
            })
        });

        let response = app(mock)
            .oneshot(json_post(
                "/api/decide",
                r#"{"mode":"final_decision","options":{"opt1":"A","opt2":"B"},"history":[]}"#,
            ))
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = body_json(response).await;
        assert_eq!(json["error"], "Failed to connect to Groq");
    }

    #[tokio::test]
    async fn test_health() {
        let mock = MockTransport::new();
        let response = app(mock)
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::OK);
    }
}
