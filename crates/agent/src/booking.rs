use tracing::info;

use rentdesk_core::domain::car::{CarDetails, CarRecord};
use rentdesk_core::domain::session::Session;

use crate::composer::{compose_or_fallback, BOOKING_SUGGESTION_INSTRUCTION};
use crate::handlers::{catalog_unavailable, HandlerContext};
use crate::reply::Reply;

pub const START_MESSAGE: &str = "Great! Let's start your booking. What are your preferences for \
the car? (e.g., color, brand, location, date range).";

pub const NEED_MORE_MESSAGE: &str = "I still need more details to help you. Could you share your \
preferences for the car? (e.g., color, brand, location, etc.)";

pub const AMBIGUOUS_HEADER: &str =
    "I found multiple cars matching your preferences. Please choose one from the options below:";

pub const FALLBACK_HEADER: &str = "No exact matches were found for your preferences, but you \
might be interested in the following cars:";

pub const EXHAUSTED_MESSAGE: &str = "Unfortunately, I couldn't find any cars matching your \
preferences. Please try adjusting your criteria or starting over.";

/// Where one narrowing pass ended up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NarrowingOutcome {
    /// Booking just started without any preferences.
    AwaitingPreferences,
    /// Booking continues but nothing is known yet.
    NeedMoreDetail,
    Unique,
    Ambiguous,
    Fallback,
    Exhausted,
    CatalogUnavailable,
}

impl NarrowingOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AwaitingPreferences => "awaiting_preferences",
            Self::NeedMoreDetail => "need_more_detail",
            Self::Unique => "unique",
            Self::Ambiguous => "ambiguous",
            Self::Fallback => "fallback",
            Self::Exhausted => "exhausted",
            Self::CatalogUnavailable => "catalog_unavailable",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Narrowed {
    pub outcome: NarrowingOutcome,
    pub reply: Reply,
}

/// Re-evaluates an active booking from the session's accumulated preferences.
///
/// Empty preferences never reach the catalog. A unique match or an exhausted search
/// resets the session; every other outcome leaves it exactly as it was.
pub async fn narrow(ctx: &HandlerContext, session: &mut Session, just_started: bool) -> Narrowed {
    if session.preferences().is_empty() {
        return if just_started {
            narrowed(NarrowingOutcome::AwaitingPreferences, Reply::text(START_MESSAGE))
        } else {
            narrowed(NarrowingOutcome::NeedMoreDetail, Reply::text(NEED_MORE_MESSAGE))
        };
    }

    let preferences = session.preferences().clone();
    let cars = match ctx.catalog.find_by_filters(&preferences).await {
        Ok(cars) => cars,
        Err(error) => {
            return narrowed(
                NarrowingOutcome::CatalogUnavailable,
                catalog_unavailable("booking", &error),
            )
        }
    };

    match cars.as_slice() {
        [car] => {
            session.reset();
            let reply = suggest(ctx, car).await;
            narrowed(NarrowingOutcome::Unique, reply)
        }
        [] => {
            let suggestions = match ctx.catalog.find_by_any_one_filter(&preferences).await {
                Ok(cars) => cars,
                Err(error) => {
                    return narrowed(
                        NarrowingOutcome::CatalogUnavailable,
                        catalog_unavailable("booking", &error),
                    )
                }
            };

            if suggestions.is_empty() {
                session.reset();
                return narrowed(NarrowingOutcome::Exhausted, Reply::text(EXHAUSTED_MESSAGE));
            }

            let options = numbered(&suggestions, CarRecord::suggestion_line);
            narrowed(NarrowingOutcome::Fallback, Reply::text(format!("{FALLBACK_HEADER}\n{options}")))
        }
        many => {
            let options = numbered(many, CarRecord::option_line);
            narrowed(NarrowingOutcome::Ambiguous, Reply::text(format!("{AMBIGUOUS_HEADER}\n{options}")))
        }
    }
}

async fn suggest(ctx: &HandlerContext, car: &CarRecord) -> Reply {
    let details = CarDetails::from(car);
    let summary = format!(
        "{} {} ({}, {}) - ${}/day located in {}.",
        details.brand, details.model, details.year, details.color, details.price, details.location
    );
    let fallback = format!(
        "Here is a car that matches your preferences: {summary} This is an option, not a final \
         confirmation. Let me know if you need recommendations, more bookings, or any questions."
    );

    let message =
        compose_or_fallback(ctx.composer.as_ref(), BOOKING_SUGGESTION_INSTRUCTION, &summary, fallback)
            .await;
    Reply::with_car(message, details)
}

fn numbered(cars: &[CarRecord], line: fn(&CarRecord) -> String) -> String {
    cars.iter()
        .enumerate()
        .map(|(index, car)| format!("{}. {}", index + 1, line(car)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn narrowed(outcome: NarrowingOutcome, reply: Reply) -> Narrowed {
    info!(event_name = "booking.narrowed", outcome = outcome.as_str(), "booking narrowing finished");
    Narrowed { outcome, reply }
}
