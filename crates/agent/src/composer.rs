use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::llm::{ChatMessage, LlmClient, LlmError};

/// Tone instruction for single-attribute answers.
pub const ENRICH_INSTRUCTION: &str = "You are a car rental assistant. Respond to the user's query \
with concise details. If you give several options do not list the options with numbers, just give \
each option as a sentence. And be supportive if needed something else.";

pub const RECOMMENDATION_INSTRUCTION: &str = "You are a car rental assistant for a professional \
car rental company. Summarize this list of cars in a concise, first-person tone, suitable for a \
customer.";

pub const BOOKING_SUGGESTION_INSTRUCTION: &str = "You are a car rental assistant. Based on the \
user's preferences, suggest this car as a booking option. Do not say hello or goodbye. Include the \
details in a friendly and professional tone, but concisely, and clarify that this is an option, \
not a final confirmation. End the message by letting the user know you're available to help with \
recommendations, more bookings, or any questions.";

#[async_trait]
pub trait ResponseComposer: Send + Sync {
    async fn compose(&self, instruction: &str, data: &str) -> Result<String, LlmError>;
}

pub struct LlmResponseComposer {
    llm: Arc<dyn LlmClient>,
}

impl LlmResponseComposer {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl ResponseComposer for LlmResponseComposer {
    async fn compose(&self, instruction: &str, data: &str) -> Result<String, LlmError> {
        let messages = [ChatMessage::system(instruction), ChatMessage::user(data)];
        self.llm.complete(&messages).await
    }
}

/// Composes `data`, falling back to the already-templated `fallback` text when the
/// model is unavailable.
pub async fn compose_or_fallback(
    composer: &dyn ResponseComposer,
    instruction: &str,
    data: &str,
    fallback: String,
) -> String {
    match composer.compose(instruction, data).await {
        Ok(text) => text,
        Err(error) => {
            warn!(
                event_name = "composer.fallback",
                error = %error,
                "response composer unavailable, using templated text"
            );
            fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{compose_or_fallback, LlmResponseComposer, ENRICH_INSTRUCTION};
    use crate::llm::ChatRole;
    use crate::test_support::ScriptedLlm;

    #[tokio::test]
    async fn instruction_goes_in_the_system_message() {
        let llm = Arc::new(ScriptedLlm::new(["Sure, here you go."]));
        let composer = LlmResponseComposer::new(llm.clone());

        let text = compose_or_fallback(&composer, ENRICH_INSTRUCTION, "Cars by BMW: X5.", String::new())
            .await;

        assert_eq!(text, "Sure, here you go.");
        let prompt = &llm.prompts()[0];
        assert_eq!(prompt[0].role, ChatRole::System);
        assert_eq!(prompt[0].content, ENRICH_INSTRUCTION);
        assert_eq!(prompt[1].content, "Cars by BMW: X5.");
    }

    #[tokio::test]
    async fn failure_falls_back_to_template() {
        let composer = LlmResponseComposer::new(Arc::new(ScriptedLlm::failing()));

        let text = compose_or_fallback(&composer, ENRICH_INSTRUCTION, "data", "templated".to_string())
            .await;

        assert_eq!(text, "templated");
    }
}
