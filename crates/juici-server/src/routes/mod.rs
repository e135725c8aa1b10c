pub mod agents;
pub mod chat;
pub mod upload;

use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    body::Body,
    http::{
        header::{ACCEPT, CACHE_CONTROL, CONTENT_TYPE},
        HeaderMap, StatusCode,
    },
    response::{IntoResponse, Response},
    Router,
};
use bytes::Bytes;
use futures::StreamExt;
use juici::service::ReplyStream;
use std::convert::Infallible;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

const EVENT_STREAM: &str = "text/event-stream";

pub fn configure(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(agents::routes(state.clone()))
        .merge(chat::routes(state.clone()))
        .merge(upload::routes(state))
        .fallback(not_found)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Reply body streamed as raw text chunks, fed by a background task
pub struct StreamResponse {
    rx: ReceiverStream<String>,
}

impl StreamResponse {
    /// Forward `reply` into the response body until it ends or the client goes away
    pub fn spawn(mut reply: ReplyStream) -> Self {
        let (tx, rx) = mpsc::channel(100);
        tokio::spawn(async move {
            while let Some(chunk) = reply.next().await {
                if tx.send(chunk).await.is_err() {
                    tracing::debug!("client disconnected, dropping the rest of the reply");
                    break;
                }
            }
        });
        Self {
            rx: ReceiverStream::new(rx),
        }
    }
}

impl IntoResponse for StreamResponse {
    fn into_response(self) -> Response {
        let body = Body::from_stream(self.rx.map(|chunk| Ok::<_, Infallible>(Bytes::from(chunk))));
        (
            [(CONTENT_TYPE, EVENT_STREAM), (CACHE_CONTROL, "no-cache")],
            body,
        )
            .into_response()
    }
}

/// Whether the caller advertised it can read a streamed reply
pub fn wants_stream(headers: &HeaderMap) -> bool {
    headers
        .get_all(ACCEPT)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .any(|value| value.contains(EVENT_STREAM))
}

async fn preflight() -> StatusCode {
    StatusCode::OK
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use axum::http::{Method, Request};

    #[tokio::test]
    async fn test_unknown_path_is_not_found() {
        let app = app();
        let request = Request::builder()
            .uri("/api/nothing-here")
            .body(Body::empty())
            .unwrap();

        let (status, _, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json(&body)["error"], "Not found");
    }

    #[tokio::test]
    async fn test_wrong_method_is_rejected() {
        let app = app();
        for (method, uri) in [
            (Method::GET, "/api/chat"),
            (Method::DELETE, "/api/upload"),
            (Method::POST, "/api/agents"),
        ] {
            let request = Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap();
            let (status, _, body) = send(&app, request).await;
            assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "{}", uri);
            assert_eq!(json(&body)["error"], "Method not allowed");
        }
    }

    #[tokio::test]
    async fn test_options_succeeds_with_cors_headers() {
        let app = app();
        for uri in ["/api/chat", "/api/upload", "/api/agents"] {
            let request = Request::builder()
                .method(Method::OPTIONS)
                .uri(uri)
                .header("origin", "http://localhost:3001")
                .header("access-control-request-method", "POST")
                .body(Body::empty())
                .unwrap();
            let (status, headers, body) = send(&app, request).await;
            assert_eq!(status, StatusCode::OK);
            assert!(body.is_empty());
            assert_eq!(headers["access-control-allow-origin"], "*");
            assert!(headers.contains_key("access-control-allow-methods"));
        }
    }

    #[tokio::test]
    async fn test_plain_options_succeeds() {
        let app = app();
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/chat")
            .body(Body::empty())
            .unwrap();
        let (status, _, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_responses_carry_cors_origin() {
        let app = app();
        let request = Request::builder()
            .uri("/api/agents")
            .header("origin", "http://localhost:3001")
            .body(Body::empty())
            .unwrap();
        let (_, headers, _) = send(&app, request).await;
        assert_eq!(headers["access-control-allow-origin"], "*");
    }

    #[test]
    fn test_wants_stream() {
        let mut headers = HeaderMap::new();
        assert!(!wants_stream(&headers));
        headers.insert(ACCEPT, "application/json".parse().unwrap());
        assert!(!wants_stream(&headers));
        headers.insert(
            ACCEPT,
            "application/json, text/event-stream".parse().unwrap(),
        );
        assert!(wants_stream(&headers));
    }
}
