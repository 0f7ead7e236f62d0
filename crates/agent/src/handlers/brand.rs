use rentdesk_core::domain::preferences::PreferenceSet;
use rentdesk_core::parsing::EntityKind;
use rentdesk_db::RepositoryError;

use super::{catalog_unavailable, HandlerContext};
use crate::reply::Reply;

pub async fn handle(ctx: &HandlerContext, text: &str, preferences: &PreferenceSet) -> Reply {
    match run(ctx, text, preferences).await {
        Ok(reply) => reply,
        Err(error) => catalog_unavailable("brand", &error),
    }
}

async fn run(
    ctx: &HandlerContext,
    text: &str,
    preferences: &PreferenceSet,
) -> Result<Reply, RepositoryError> {
    let detected = ctx.detect_entity(EntityKind::Brand, text).await?;
    let Some(brand) = detected.or_else(|| preferences.brand.clone()) else {
        return Ok(Reply::text(
            ctx.enrich(
                "Please specify a valid brand in your query. For example, BMW, Tesla, or Toyota."
                    .to_string(),
            )
            .await,
        ));
    };

    let cars = ctx.catalog.find_by_brand(&brand).await?;
    let base = if cars.is_empty() {
        format!("No cars available by {brand}.")
    } else {
        let lines: Vec<String> = cars
            .iter()
            .map(|car| format!("{} ({}, {} color)", car.model, car.year, car.color))
            .collect();
        format!("Cars by {brand}: {}.", lines.join(", "))
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
    async fn lists_models_of_the_brand() {
        let ctx = context(demo_catalog().await, Arc::new(EchoComposer::failing()));

        let reply = handle(&ctx, "which tesla models do you have", &PreferenceSet::default()).await;

        assert_eq!(reply.message, "Cars by Tesla: Model 3 (2023, White color), Model Y (2024, Red color).");
    }

    #[tokio::test]
    async fn missing_brand_prompts_with_examples() {
        let composer = Arc::new(EchoComposer::default());
        let ctx = context(demo_catalog().await, composer.clone());

        let reply = handle(&ctx, "brands?", &PreferenceSet::default()).await;

        assert!(reply.message.contains("For example, BMW, Tesla, or Toyota."));
        assert_eq!(composer.calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unknown_extracted_brand_reports_no_cars() {
        let ctx = context(demo_catalog().await, Arc::new(EchoComposer::failing()));
        let preferences =
            PreferenceSet { brand: Some("Ferrari".to_string()), ..PreferenceSet::default() };

        let reply = handle(&ctx, "got any ferraris", &preferences).await;

        assert_eq!(reply.message, "No cars available by Ferrari.");
    }
}
