use chrono::NaiveDate;
use tracing::info;

use rentdesk_core::domain::preferences::PreferenceSet;
use rentdesk_db::RepositoryError;

use super::{catalog_unavailable, HandlerContext};
use crate::reply::Reply;

pub const MISSING_DATES_MESSAGE: &str =
    "Please specify valid start and end dates in YYYY-MM-DD format or natural language.";

pub const INVERTED_DATES_MESSAGE: &str = "The end date comes before the start date. Please \
specify valid start and end dates in YYYY-MM-DD format or natural language.";

/// Cars with an availability window overlapping the extracted date range.
pub async fn handle(ctx: &HandlerContext, preferences: &PreferenceSet) -> Reply {
    let Some((start, end)) = preferences.date_range() else {
        return Reply::text(MISSING_DATES_MESSAGE);
    };
    if end < start {
        info!(
            event_name = "availability.invalid_dates",
            start = %start,
            end = %end,
            "rejecting inverted date range"
        );
        return Reply::text(INVERTED_DATES_MESSAGE);
    }

    match run(ctx, start, end).await {
        Ok(reply) => reply,
        Err(error) => catalog_unavailable("availability", &error),
    }
}

async fn run(ctx: &HandlerContext, start: NaiveDate, end: NaiveDate) -> Result<Reply, RepositoryError> {
    let cars = ctx.catalog.find_available(start, end).await?;
    if cars.is_empty() {
        return Ok(Reply::text(format!("No cars are available from {start} to {end}.")));
    }

    let lines: Vec<String> = cars
        .iter()
        .map(|car| {
            format!(
                "{} {} ({}, {} color) - ${:.2}/day in {}",
                car.brand, car.model, car.year, car.color, car.price_per_day, car.location
            )
        })
        .collect();
    Ok(Reply::text(format!("Here are the available cars:\n{}", lines.join("\n"))))
}
