use rentdesk_core::domain::preferences::PreferenceSet;
use rentdesk_core::parsing::EntityKind;
use rentdesk_db::RepositoryError;

use super::{capitalize, catalog_unavailable, HandlerContext};
use crate::reply::Reply;

/// Lists every car in the color named in `text`, or the extracted color when the text
/// names none the catalog knows.
pub async fn handle(ctx: &HandlerContext, text: &str, preferences: &PreferenceSet) -> Reply {
    match run(ctx, text, preferences).await {
        Ok(reply) => reply,
        Err(error) => catalog_unavailable("color", &error),
    }
}

async fn run(
    ctx: &HandlerContext,
    text: &str,
    preferences: &PreferenceSet,
) -> Result<Reply, RepositoryError> {
    let detected = ctx.detect_entity(EntityKind::Color, text).await?;
    let Some(color) = detected.or_else(|| preferences.color.clone()) else {
        return Ok(Reply::text(ctx.enrich("Please specify a color in your query.".to_string()).await));
    };

    let color = capitalize(&color);
    let cars = ctx.catalog.find_by_color(&color).await?;
    let base = if cars.is_empty() {
        format!("No cars available in {color}.")
    } else {
        let lines: Vec<String> = cars
            .iter()
            .map(|car| {
                format!("{} ({}, {}) - ${:.2} per day", car.model, car.brand, car.year, car.price_per_day)
            })
            .collect();
        format!("Here are the cars available in {color}:\n{}", lines.join("\n"))
    };

    Ok(Reply::text(ctx.enrich(base).await))
}
