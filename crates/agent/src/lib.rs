//! Conversational runtime for the rentdesk assistant.
//!
//! Each message goes through a constrained loop:
//! 1. **Classification** (`classifier`) - free text to one of a closed set of intents
//! 2. **Extraction** (`extractor`) - free text to a `PreferenceSet`
//! 3. **Routing** (`router`) - continue or start a booking, recommend, or answer a
//!    single-attribute question (`handlers`)
//! 4. **Composition** (`composer`) - phrase catalog facts for the user
//!
//! # Safety Principle
//!
//! The LLM only translates. Which cars exist, what they cost, and when they are free
//! always comes from the catalog; a failed model call degrades to templated text.

pub mod booking;
pub mod classifier;
pub mod clock;
pub mod composer;
pub mod extractor;
pub mod handlers;
pub mod llm;
pub mod recommendation;
pub mod reply;
pub mod router;
pub mod service;
pub mod session_store;

#[cfg(test)]
mod test_support;

pub use booking::{narrow, Narrowed, NarrowingOutcome};
pub use classifier::{IntentClassifier, LlmIntentClassifier};
pub use clock::{Clock, FixedClock, SystemClock};
pub use composer::{LlmResponseComposer, ResponseComposer};
pub use extractor::{ExtractionFailure, LlmPreferenceExtractor, PreferenceExtractor};
pub use handlers::HandlerContext;
pub use llm::{ChatMessage, ChatRole, LlmClient, LlmError, OpenAiCompatibleClient};
pub use reply::Reply;
pub use router::Router;
pub use service::ChatService;
pub use session_store::SessionStore;
