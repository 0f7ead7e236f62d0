//! Chat API consumed by the browser front end.
//!
//! - `POST /chat`          — route one message, reply plus current booking preferences
//! - `GET  /preferences`   — booking preferences of a conversation

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use rentdesk_agent::{ChatService, Reply};
use rentdesk_core::domain::preferences::PreferenceSet;
use rentdesk_core::domain::session::ConversationId;
use rentdesk_core::errors::{ApplicationError, DomainError, InterfaceError};

#[derive(Clone)]
pub struct ChatState {
    service: Arc<ChatService>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub conversation_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PreferencesQuery {
    pub conversation_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: Reply,
    pub preferences: PreferenceSet,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorBody>);

pub fn router(service: Arc<ChatService>) -> Router {
    Router::new()
        .route("/chat", post(chat))
        .route("/preferences", get(preferences))
        .with_state(ChatState { service })
}

pub async fn chat(
    State(state): State<ChatState>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let conversation = conversation_id(body.conversation_id);
    let message = body.message.unwrap_or_default();

    let response = state
        .service
        .handle_message(&conversation, &message)
        .await
        .map_err(|error| rejected(&conversation, error))?;
    let preferences = state.service.preferences(&conversation).await;

    Ok(Json(ChatResponse { response, preferences }))
}

pub async fn preferences(
    State(state): State<ChatState>,
    Query(query): Query<PreferencesQuery>,
) -> Json<PreferenceSet> {
    let conversation = conversation_id(query.conversation_id);
    Json(state.service.preferences(&conversation).await)
}

fn conversation_id(raw: Option<String>) -> ConversationId {
    raw.map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .map(ConversationId)
        .unwrap_or_default()
}

fn rejected(conversation: &ConversationId, error: DomainError) -> ApiError {
    let interface = ApplicationError::from(error).into_interface(Uuid::new_v4().to_string());
    warn!(
        event_name = "chat.rejected",
        correlation_id = interface.correlation_id(),
        conversation_id = %conversation,
        error = %interface,
        "chat message rejected"
    );

    let (status, error) = match &interface {
        InterfaceError::BadRequest { message, .. } => (StatusCode::BAD_REQUEST, sentence(message)),
        InterfaceError::ServiceUnavailable { .. } => {
            (StatusCode::SERVICE_UNAVAILABLE, interface.user_message().to_string())
        }
        InterfaceError::Internal { .. } => {
            (StatusCode::INTERNAL_SERVER_ERROR, interface.user_message().to_string())
        }
    };
    (status, Json(ErrorBody { error }))
}

fn sentence(message: &str) -> String {
    let mut chars = message.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::{conversation_id, sentence};
    use rentdesk_core::domain::session::ConversationId;

    #[test]
    fn blank_conversation_id_uses_default() {
        assert_eq!(conversation_id(Some("  ".to_string())), ConversationId::default());
        assert_eq!(conversation_id(None), ConversationId::default());
        assert_eq!(conversation_id(Some(" tab-1 ".to_string())), ConversationId("tab-1".to_string()));
    }

    #[test]
    fn error_text_reads_as_a_sentence() {
        assert_eq!(sentence("no message provided"), "No message provided");
    }
}
