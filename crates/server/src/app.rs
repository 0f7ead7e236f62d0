use std::any::Any;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Response, StatusCode},
    Router,
};
use rentdesk_agent::ChatService;
use rentdesk_db::DbPool;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer};
use tracing::error;

use crate::{chat, health};

pub const INTERNAL_ERROR_BODY: &str = r#"{"error":"An unexpected error occurred"}"#;

/// Full HTTP surface: chat API plus health probe, reachable cross-origin from the web UI.
pub fn build(chat_service: Arc<ChatService>, db_pool: DbPool) -> Router {
    chat::router(chat_service)
        .merge(health::router(db_pool))
        .layer(CatchPanicLayer::custom(internal_error))
        .layer(CorsLayer::permissive())
}

fn internal_error(panic: Box<dyn Any + Send + 'static>) -> Response<Body> {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!(event_name = "http.handler_panicked", detail, "request handler panicked");

    let mut response = Response::new(Body::from(INTERNAL_ERROR_BODY));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, header::HeaderValue::from_static("application/json"));
    response
}
