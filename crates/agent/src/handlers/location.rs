use rentdesk_core::domain::preferences::PreferenceSet;
use rentdesk_core::parsing::EntityKind;
use rentdesk_db::RepositoryError;

use super::{capitalize, catalog_unavailable, HandlerContext};
use crate::reply::Reply;

pub async fn handle(ctx: &HandlerContext, text: &str, preferences: &PreferenceSet) -> Reply {
    match run(ctx, text, preferences).await {
        Ok(reply) => reply,
        Err(error) => catalog_unavailable("location", &error),
    }
}

async fn run(
    ctx: &HandlerContext,
    text: &str,
    preferences: &PreferenceSet,
) -> Result<Reply, RepositoryError> {
    let index = ctx.entity_index(EntityKind::Location).await?;
    let known_extracted = preferences.location.as_deref().and_then(|location| {
        index
            .values(EntityKind::Location)
            .iter()
            .find(|known| known.eq_ignore_ascii_case(location))
            .cloned()
    });

    let Some(location) = index.detect(EntityKind::Location, text).or(known_extracted) else {
        let shops: Vec<String> =
            index.values(EntityKind::Location).iter().map(|shop| capitalize(shop)).collect();
        let base = format!(
            "We currently don't have any shops in the specified location. \
             Our available shops are in: {}.",
            shops.join(", ")
        );
        return Ok(Reply::text(ctx.enrich(base).await));
    };

    let cars = ctx.catalog.find_by_location(&location).await?;
    let location = capitalize(&location);
    let base = if cars.is_empty() {
        format!("No cars are available in {location}.")
    } else {
        let lines: Vec<String> = cars
            .iter()
            .map(|car| format!("{} ({}, {}) - {} color", car.model, car.brand, car.year, car.color))
            .collect();
        format!("Cars available in {location}: {}.", lines.join(", "))
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
    async fn lists_cars_at_the_named_shop() {
        let ctx = context(demo_catalog().await, Arc::new(EchoComposer::failing()));

        let reply = handle(&ctx, "what do you have in Miami?", &PreferenceSet::default()).await;

        assert_eq!(
            reply.message,
            "Cars available in Miami: Mustang (Ford, 2019) - Blue color, A4 (Audi, 2021) - Silver color."
        );
    }

    #[tokio::test]
    async fn unknown_location_lists_available_shops() {
        let ctx = context(demo_catalog().await, Arc::new(EchoComposer::failing()));
        let preferences =
            PreferenceSet { location: Some("Boston".to_string()), ..PreferenceSet::default() };

        let reply = handle(&ctx, "cars in Boston", &preferences).await;

        assert_eq!(
            reply.message,
            "We currently don't have any shops in the specified location. \
             Our available shops are in: Chicago, New York, Los Angeles, Miami."
        );
    }

    #[tokio::test]
    async fn extracted_location_must_be_a_known_shop() {
        let ctx = context(demo_catalog().await, Arc::new(EchoComposer::failing()));
        let preferences =
            PreferenceSet { location: Some("los angeles".to_string()), ..PreferenceSet::default() };

        let reply = handle(&ctx, "cars in LA", &preferences).await;

        assert!(reply.message.starts_with("Cars available in Los Angeles: Civic (Honda, 2020)"));
    }
}
