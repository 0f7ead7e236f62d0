use chrono::Datelike;

use rentdesk_core::domain::preferences::PreferenceSet;
use rentdesk_core::parsing::detect_year;
use rentdesk_db::RepositoryError;

use super::{catalog_unavailable, HandlerContext};
use crate::reply::Reply;

pub async fn handle(ctx: &HandlerContext, text: &str, preferences: &PreferenceSet) -> Reply {
    match run(ctx, text, preferences).await {
        Ok(reply) => reply,
        Err(error) => catalog_unavailable("year", &error),
    }
}

async fn run(
    ctx: &HandlerContext,
    text: &str,
    preferences: &PreferenceSet,
) -> Result<Reply, RepositoryError> {
    let current_year = ctx.clock.today().year();
    let Some(year) = detect_year(text, current_year).or(preferences.year) else {
        return Ok(Reply::text(
            ctx.enrich(
                "Please specify a valid year in your query. For example, 'cars from 2022' or \
                 'cars from four years ago.'"
                    .to_string(),
            )
            .await,
        ));
    };

    let cars = ctx.catalog.find_by_year(year).await?;
    let base = if cars.is_empty() {
        format!("No cars are available from {year}.")
    } else {
        let lines: Vec<String> = cars
            .iter()
            .map(|car| format!("{} ({}, {} color)", car.model, car.brand, car.color))
            .collect();
        format!("Cars from {year}: {}.", lines.join(", "))
    };

    Ok(Reply::text(ctx.enrich(base).await))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rentdesk_core::domain::preferences::PreferenceSet;

    use super::handle;
    use crate::test_support::{context, demo_catalog, EchoComposer};

    #[tokio::test]
    async fn explicit_year_lists_matching_cars() {
        let ctx = context(demo_catalog().await, Arc::new(EchoComposer::failing()));

        let reply = handle(&ctx, "cars from 2021", &PreferenceSet::default()).await;

        assert_eq!(reply.message, "Cars from 2021: Corolla (Toyota, Red color), A4 (Audi, Silver color).");
    }

    #[tokio::test]
    async fn relative_year_uses_the_clock() {
        let ctx = context(demo_catalog().await, Arc::new(EchoComposer::failing()));

        let reply = handle(&ctx, "anything from seven years ago", &PreferenceSet::default()).await;

        assert_eq!(reply.message, "Cars from 2019: Mustang (Ford, Blue color).");
    }

    #[tokio::test]
    async fn year_without_cars_says_so() {
        let ctx = context(demo_catalog().await, Arc::new(EchoComposer::failing()));

        let reply = handle(&ctx, "cars from last year", &PreferenceSet::default()).await;

        assert_eq!(reply.message, "No cars are available from 2025.");
    }
}
