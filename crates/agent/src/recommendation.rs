use rentdesk_core::domain::car::CarRecord;
use rentdesk_core::domain::preferences::PreferenceSet;
use rentdesk_db::RepositoryError;

use crate::composer::{compose_or_fallback, RECOMMENDATION_INSTRUCTION};
use crate::handlers::{catalog_unavailable, HandlerContext};
use crate::reply::Reply;

pub const NO_RECOMMENDATION_MESSAGE: &str = "Unfortunately, no cars matched your preferences.";

/// Multi-attribute recommendation. Never touches the booking session.
pub async fn recommend(ctx: &HandlerContext, preferences: &PreferenceSet) -> Reply {
    match run(ctx, preferences).await {
        Ok(reply) => reply,
        Err(error) => catalog_unavailable("recommendation", &error),
    }
}

async fn run(ctx: &HandlerContext, preferences: &PreferenceSet) -> Result<Reply, RepositoryError> {
    let matches = ctx.catalog.find_by_filters(preferences).await?;
    if !matches.is_empty() {
        let listing = lines(&matches).join("\n");
        let fallback = format!("Here are the cars that match your preferences:\n{listing}");
        let message =
            compose_or_fallback(ctx.composer.as_ref(), RECOMMENDATION_INSTRUCTION, &listing, fallback)
                .await;
        return Ok(Reply::text(message));
    }

    let suggestions = ctx.catalog.find_by_any_one_filter(preferences).await?;
    if suggestions.is_empty() {
        return Ok(Reply::text(NO_RECOMMENDATION_MESSAGE));
    }

    Ok(Reply::text(format!(
        "Sorry, no cars fully matched your preferences. However, you might like:\n{}.",
        lines(&suggestions).join(", ")
    )))
}

fn lines(cars: &[CarRecord]) -> Vec<String> {
    cars.iter().map(CarRecord::suggestion_line).collect()
}
