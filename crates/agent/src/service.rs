//! Conversation-level entry point: validates input, serialises turns per conversation,
//! and hands each message to the router.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use rentdesk_core::config::AppConfig;
use rentdesk_core::domain::preferences::PreferenceSet;
use rentdesk_core::domain::session::ConversationId;
use rentdesk_core::errors::DomainError;
use rentdesk_core::parsing::matcher_for;
use rentdesk_db::CatalogRepository;

use crate::classifier::LlmIntentClassifier;
use crate::clock::{Clock, SystemClock};
use crate::composer::LlmResponseComposer;
use crate::extractor::LlmPreferenceExtractor;
use crate::handlers::HandlerContext;
use crate::llm::{LlmClient, LlmError, OpenAiCompatibleClient};
use crate::reply::Reply;
use crate::router::Router;
use crate::session_store::SessionStore;

pub struct ChatService {
    router: Router,
    sessions: SessionStore,
}

impl ChatService {
    pub fn new(router: Router) -> Self {
        Self { router, sessions: SessionStore::new() }
    }

    /// Wires the LLM-backed collaborators described by `config` around `catalog`.
    pub fn from_config(
        config: &AppConfig,
        catalog: Arc<dyn CatalogRepository>,
    ) -> Result<Self, LlmError> {
        let llm: Arc<dyn LlmClient> = Arc::new(OpenAiCompatibleClient::from_config(&config.llm)?);
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let handlers = HandlerContext::new(
            catalog,
            Arc::new(LlmResponseComposer::new(llm.clone())),
            matcher_for(config.assistant.entity_matching),
            clock.clone(),
        );
        let router = Router::new(
            Arc::new(LlmIntentClassifier::new(llm.clone())),
            Arc::new(LlmPreferenceExtractor::new(llm, clock)),
            handlers,
        );
        Ok(Self::new(router))
    }

    /// Handles one user message. Only an empty or oversized message is an error; every
    /// collaborator failure is already folded into the reply text.
    pub async fn handle_message(
        &self,
        conversation: &ConversationId,
        text: &str,
    ) -> Result<Reply, DomainError> {
        DomainError::check_message(text)?;

        let correlation_id = Uuid::new_v4().to_string();
        info!(
            event_name = "chat.message_received",
            correlation_id = %correlation_id,
            conversation_id = %conversation,
            chars = text.chars().count(),
            "handling chat message"
        );

        let handle = self.sessions.session(conversation).await;
        let (reply, booking_active) = {
            let mut session = handle.lock().await;
            let reply = self.router.route(&mut session, text).await;
            (reply, session.is_active())
        };
        self.sessions.release(conversation, handle).await;

        info!(
            event_name = "chat.reply_sent",
            correlation_id = %correlation_id,
            conversation_id = %conversation,
            booking_active,
            has_car_details = reply.car_details.is_some(),
            "chat message handled"
        );
        Ok(reply)
    }

    /// Snapshot of the conversation's booking preferences. Never creates a session.
    pub async fn preferences(&self, conversation: &ConversationId) -> PreferenceSet {
        self.sessions.preferences(conversation).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rentdesk_core::domain::session::ConversationId;
    use rentdesk_core::errors::DomainError;

    use super::ChatService;
    use crate::test_support::{demo_catalog, router, EchoComposer, ScriptedLlm};

    async fn service(labels: &[&str], extractions: &[&str]) -> ChatService {
        ChatService::new(router(
            demo_catalog().await,
            Arc::new(EchoComposer::default()),
            ScriptedLlm::new(labels.iter().copied()),
            ScriptedLlm::new(extractions.iter().copied()),
        ))
    }

    #[tokio::test]
    async fn blank_message_is_rejected_before_routing() {
        let service = service(&[], &[]).await;
        let error = service
            .handle_message(&ConversationId::default(), "   ")
            .await
            .expect_err("blank message");
        assert!(matches!(error, DomainError::EmptyMessage));
    }

    #[tokio::test]
    async fn booking_state_is_kept_per_conversation() {
        let service = service(
            &["booking", "color_query"],
            &["{\"color\": \"red\", \"brand\": \"Toyota\"}", "{\"color\": \"blue\"}"],
        )
        .await;
        let alpha = ConversationId("alpha".to_string());
        let beta = ConversationId("beta".to_string());

        service.handle_message(&alpha, "book a red Toyota").await.expect("reply");
        let reply = service.handle_message(&beta, "any blue cars?").await.expect("reply");

        assert!(reply.message.contains("Blue"));
        assert_eq!(service.preferences(&alpha).await.brand.as_deref(), Some("Toyota"));
        assert!(service.preferences(&beta).await.is_empty());
    }

    #[tokio::test]
    async fn conversations_without_an_open_booking_hold_no_session() {
        let service = service(
            &["color_query", "booking"],
            &["{\"color\": \"blue\"}", "{\"color\": \"red\", \"brand\": \"Toyota\"}"],
        )
        .await;

        let browsing = ConversationId("browsing".to_string());
        service.handle_message(&browsing, "any blue cars?").await.expect("reply");
        assert!(service.sessions.is_empty().await);

        let booking = ConversationId("booking".to_string());
        service.handle_message(&booking, "book a red Toyota").await.expect("reply");
        assert_eq!(service.sessions.len().await, 1);
    }
}
