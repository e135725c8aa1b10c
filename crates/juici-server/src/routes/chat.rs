use super::{method_not_allowed, preflight, wants_stream, StreamResponse};
use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use juici::errors::ServiceError;
use juici::models::request::ChatRequest;

async fn handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    // an unreadable body is reported the same way as missing fields
    let Json(request) = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection, "rejected chat body");
        ServiceError::MissingParameters
    })?;

    if wants_stream(&headers) {
        let reply = state.service.chat_stream(&request).await?;
        Ok(StreamResponse::spawn(reply).into_response())
    } else {
        let reply = state.service.chat(&request).await?;
        Ok(Json(reply).into_response())
    }
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/chat",
            post(handler)
                .options(preflight)
                .fallback(method_not_allowed),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use axum::{
        body::Body,
        http::{Method, Request, StatusCode},
    };
    use serde_json::json;

    fn chat_request(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .uri("/api/chat")
            .method(Method::POST)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_buffered_reply() {
        let app = app();
        let request = chat_request(json!({
            "agent_name": "digital_transform_analyst",
            "message": "How do I start?"
        }));

        let (status, headers, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert!(headers["content-type"]
            .to_str()
            .unwrap()
            .starts_with("application/json"));

        let body = json(&body);
        assert_eq!(body["role"], "assistant");
        let content = body["content"].as_str().unwrap();
        assert!(content.starts_with("As a Digital Transform Analyst"));
        assert!(content.contains("How do I start?"));
        assert!(body["id"].as_i64().unwrap() > 0);
    }

    #[tokio::test]
    async fn test_unknown_agent_gets_fallback() {
        let app = app();
        let request = chat_request(json!({"agent_name": "not_a_real_agent", "message": "hi"}));

        let (status, _, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        let content = json(&body)["content"].as_str().unwrap().to_string();
        assert!(content.starts_with("Thank you for your message: \"hi\""));
    }

    #[tokio::test]
    async fn test_missing_agent_name_is_bad_request() {
        let app = app();
        let request = chat_request(json!({"message": "hi"}));

        let (status, _, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            json(&body)["error"],
            "Missing required parameters. Please provide agent_name and message."
        );
    }

    #[tokio::test]
    async fn test_empty_message_is_bad_request() {
        let app = app();
        let request = chat_request(json!({"agent_name": "blogsmith", "message": ""}));

        let (status, _, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json(&body)["error"].is_string());
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let app = app();
        let request = Request::builder()
            .uri("/api/chat")
            .method(Method::POST)
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let (status, _, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json(&body)["error"].is_string());
    }

    #[tokio::test]
    async fn test_streamed_reply() {
        let app = app();
        let request = Request::builder()
            .uri("/api/chat")
            .method(Method::POST)
            .header("content-type", "application/json")
            .header("accept", "application/json, text/event-stream")
            .body(Body::from(
                json!({"agent_name": "data_analyst", "message": "Which KPIs?"}).to_string(),
            ))
            .unwrap();

        let (status, headers, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers["content-type"], "text/event-stream");

        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.starts_with("Regarding your question: \"Which KPIs?\""));
        assert!(text.ends_with("extract actionable insights."));
    }

    #[tokio::test]
    async fn test_streaming_still_validates() {
        let app = app();
        let request = Request::builder()
            .uri("/api/chat")
            .method(Method::POST)
            .header("content-type", "application/json")
            .header("accept", "text/event-stream")
            .body(Body::from(json!({"agent_name": "data_analyst"}).to_string()))
            .unwrap();

        let (status, _, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
