use std::sync::Arc;

use tracing::{info, warn};

use rentdesk_core::domain::preferences::PreferenceSet;
use rentdesk_core::domain::session::Session;
use rentdesk_core::intent::Intent;

use crate::booking;
use crate::classifier::IntentClassifier;
use crate::extractor::PreferenceExtractor;
use crate::handlers::{self, HandlerContext};
use crate::recommendation;
use crate::reply::Reply;

pub const HELP_MESSAGE: &str =
    "I'm here to help! You can ask for car prices, availability, or recommendations.";

/// Preferences naming at least this many non-date fields are treated as a recommendation
/// request whatever the classifier said.
pub const RECOMMENDATION_FIELD_THRESHOLD: usize = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouteBranch {
    ContinueBooking,
    StartBooking,
    Recommendation,
    Handler(Intent),
    Help,
}

impl RouteBranch {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ContinueBooking => "continue_booking",
            Self::StartBooking => "start_booking",
            Self::Recommendation => "recommendation",
            Self::Handler(_) => "handler",
            Self::Help => "help",
        }
    }
}

/// Per-turn dispatcher. Holds no conversation state of its own; the session is handed in.
#[derive(Clone)]
pub struct Router {
    classifier: Arc<dyn IntentClassifier>,
    extractor: Arc<dyn PreferenceExtractor>,
    handlers: HandlerContext,
}

impl Router {
    pub fn new(
        classifier: Arc<dyn IntentClassifier>,
        extractor: Arc<dyn PreferenceExtractor>,
        handlers: HandlerContext,
    ) -> Self {
        Self { classifier, extractor, handlers }
    }

    pub fn handlers(&self) -> &HandlerContext {
        &self.handlers
    }

    /// Routes one message. Only the booking branches touch `session`.
    pub async fn route(&self, session: &mut Session, text: &str) -> Reply {
        let intent = self.classify(text).await;
        let extracted = self.extract(text).await;
        let branch = select_branch(session, intent, &extracted);

        info!(
            event_name = "router.dispatch",
            intent = intent.as_str(),
            branch = branch.as_str(),
            session_active = session.is_active(),
            "routing message"
        );

        match branch {
            RouteBranch::ContinueBooking => {
                session.absorb(&extracted);
                booking::narrow(&self.handlers, session, false).await.reply
            }
            RouteBranch::StartBooking => {
                session.activate(extracted);
                booking::narrow(&self.handlers, session, true).await.reply
            }
            RouteBranch::Recommendation => {
                recommendation::recommend(&self.handlers, &extracted).await
            }
            RouteBranch::Handler(intent) => self.dispatch(intent, text, &extracted).await,
            RouteBranch::Help => Reply::text(HELP_MESSAGE),
        }
    }

    async fn classify(&self, text: &str) -> Intent {
        match self.classifier.classify(text).await {
            Ok(intent) => intent,
            Err(error) => {
                warn!(event_name = "router.classifier_failed", error = %error, "falling back to general query");
                Intent::GeneralQuery
            }
        }
    }

    async fn extract(&self, text: &str) -> PreferenceSet {
        match self.extractor.extract(text).await {
            Ok(preferences) => preferences,
            Err(error) => {
                warn!(event_name = "router.extraction_failed", error = %error, "continuing without preferences");
                PreferenceSet::default()
            }
        }
    }

    async fn dispatch(&self, intent: Intent, text: &str, extracted: &PreferenceSet) -> Reply {
        let ctx = &self.handlers;
        match intent {
            Intent::AvailabilityQuery => handlers::availability::handle(ctx, extracted).await,
            Intent::PriceQuery => handlers::price::handle(ctx, text).await,
            Intent::ColorQuery => handlers::color::handle(ctx, text, extracted).await,
            Intent::LocationQuery => handlers::location::handle(ctx, text, extracted).await,
            Intent::YearQuery => handlers::year::handle(ctx, text, extracted).await,
            Intent::BrandQuery => handlers::brand::handle(ctx, text, extracted).await,
            Intent::RecommendationRequest | Intent::Booking | Intent::GeneralQuery => {
                Reply::text(HELP_MESSAGE)
            }
        }
    }
}

fn select_branch(session: &Session, intent: Intent, extracted: &PreferenceSet) -> RouteBranch {
    if session.is_active() {
        return RouteBranch::ContinueBooking;
    }
    if intent == Intent::Booking {
        return RouteBranch::StartBooking;
    }
    if extracted.non_date_count() >= RECOMMENDATION_FIELD_THRESHOLD {
        return RouteBranch::Recommendation;
    }
    match intent {
        Intent::AvailabilityQuery
        | Intent::PriceQuery
        | Intent::ColorQuery
        | Intent::LocationQuery
        | Intent::YearQuery
        | Intent::BrandQuery => RouteBranch::Handler(intent),
        Intent::RecommendationRequest | Intent::Booking | Intent::GeneralQuery => RouteBranch::Help,
    }
}
