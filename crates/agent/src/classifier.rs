use std::sync::Arc;

use async_trait::async_trait;

use rentdesk_core::intent::Intent;

use crate::llm::{ChatMessage, LlmClient, LlmError};

const CLASSIFIER_INSTRUCTION: &str = "You are a car rental assistant. Identify the user's intent \
from their query. Possible intents include booking a car, checking car availability (based on \
month, date, or time frame), finding car prices, exploring options by color, finding cars by \
location, finding cars by model year, seeking recommendations, or inquiring about car brands and \
models. A query mentioning more than one preference (e.g., color, brand, and location) is likely a \
recommendation_request. Respond with only one of these intents: availability_query, price_query, \
color_query, location_query, year_query, recommendation_request, booking, or brand_query.";

#[async_trait]
pub trait IntentClassifier: Send + Sync {
    /// Labels outside the closed set come back as [`Intent::GeneralQuery`]; only a failed
    /// model call is an error.
    async fn classify(&self, text: &str) -> Result<Intent, LlmError>;
}

pub struct LlmIntentClassifier {
    llm: Arc<dyn LlmClient>,
}

impl LlmIntentClassifier {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl IntentClassifier for LlmIntentClassifier {
    async fn classify(&self, text: &str) -> Result<Intent, LlmError> {
        let messages = [ChatMessage::system(CLASSIFIER_INSTRUCTION), ChatMessage::user(text)];
        let raw = self.llm.complete(&messages).await?;
        Ok(Intent::from_label(&raw))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rentdesk_core::intent::Intent;

    use super::{IntentClassifier, LlmIntentClassifier};
    use crate::test_support::ScriptedLlm;

    #[tokio::test]
    async fn known_label_is_mapped() {
        let llm = Arc::new(ScriptedLlm::new(["'booking'"]));
        let classifier = LlmIntentClassifier::new(llm.clone());

        assert_eq!(classifier.classify("book me a car").await.expect("intent"), Intent::Booking);
        let prompts = llm.prompts();
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0].last().map(|message| message.content.as_str()), Some("book me a car"));
    }

    #[tokio::test]
    async fn unknown_label_is_the_catch_all() {
        let classifier =
            LlmIntentClassifier::new(Arc::new(ScriptedLlm::new(["The intent is probably price"])));

        assert_eq!(classifier.classify("hmm").await.expect("intent"), Intent::GeneralQuery);
    }

    #[tokio::test]
    async fn failed_call_is_reported() {
        let classifier = LlmIntentClassifier::new(Arc::new(ScriptedLlm::failing()));
        assert!(classifier.classify("hello").await.is_err());
    }
}
