use rentdesk_core::domain::car::CarRecord;
use rentdesk_core::parsing::{detect_price_phrase, EntityKind, PriceComparison};
use rentdesk_db::RepositoryError;

use super::{capitalize, catalog_unavailable, HandlerContext};
use crate::reply::Reply;

/// Answers in priority order: a price phrase (`under 70`, `above 100`, `for 55`), then a
/// named model, then a named brand.
pub async fn handle(ctx: &HandlerContext, text: &str) -> Reply {
    match run(ctx, text).await {
        Ok(reply) => reply,
        Err(error) => catalog_unavailable("price", &error),
    }
}

async fn run(ctx: &HandlerContext, text: &str) -> Result<Reply, RepositoryError> {
    let base = if let Some(comparison) = detect_price_phrase(text) {
        by_comparison(ctx, comparison).await?
    } else if let Some(model) = ctx.detect_entity(EntityKind::Model, text).await? {
        by_model(ctx, &model).await?
    } else if let Some(brand) = ctx.detect_entity(EntityKind::Brand, text).await? {
        by_brand(ctx, &brand).await?
    } else {
        "Please specify a car brand, model, or price range to provide price information."
            .to_string()
    };

    Ok(Reply::text(ctx.enrich(base).await))
}

async fn by_comparison(
    ctx: &HandlerContext,
    comparison: PriceComparison,
) -> Result<String, RepositoryError> {
    let PriceComparison { operator, amount } = comparison;
    let cars = ctx.catalog.find_by_price_comparison(amount, operator).await?;
    let bound = format!("{} ${amount:.2} per day", operator.describe());

    if cars.is_empty() {
        return Ok(format!("No cars are available {bound}."));
    }

    let lines: Vec<String> = cars.iter().map(daily_line).collect();
    Ok(format!("Here are the cars available {bound}:\n{}", lines.join("\n")))
}

async fn by_model(ctx: &HandlerContext, model: &str) -> Result<String, RepositoryError> {
    let cars = ctx.catalog.find_by_model(model).await?;
    let label = capitalize(model);

    Ok(match cars.first() {
        Some(car) => match car.price_per_month {
            Some(monthly) => format!(
                "The price for {label} is ${:.2} per day or ${monthly:.2} per month.",
                car.price_per_day
            ),
            None => format!("The price for {label} is ${:.2} per day.", car.price_per_day),
        },
        None => format!("Price information for {label} is not available."),
    })
}

async fn by_brand(ctx: &HandlerContext, brand: &str) -> Result<String, RepositoryError> {
    let cars = ctx.catalog.find_by_brand(brand).await?;
    let label = capitalize(brand);

    if cars.is_empty() {
        return Ok(format!("No pricing information available for {label}."));
    }

    let lines: Vec<String> = cars
        .iter()
        .map(|car| match car.price_per_month {
            Some(monthly) => format!("{}: ${:.2}/day, ${monthly:.2}/month", car.model, car.price_per_day),
            None => format!("{}: ${:.2}/day", car.model, car.price_per_day),
        })
        .collect();
    Ok(format!("Here are the prices for {label} models:\n{}", lines.join("\n")))
}

fn daily_line(car: &CarRecord) -> String {
    format!("{} ({}, {}) - ${:.2} per day", car.model, car.brand, car.year, car.price_per_day)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::handle;
    use crate::test_support::{context, demo_catalog, EchoComposer};

    async fn answer(text: &str) -> String {
        let ctx = context(demo_catalog().await, Arc::new(EchoComposer::failing()));
        handle(&ctx, text).await.message
    }

    #[tokio::test]
    async fn upper_bound_includes_equal_prices() {
        assert_eq!(
            answer("cars under 40").await,
            "Here are the cars available under or equal to $40.00 per day:\n\
             Corolla (Toyota, 2021) - $40.00 per day\n\
             Civic (Honda, 2020) - $38.00 per day"
        );
    }

    #[tokio::test]
    async fn above_is_strict() {
        assert_eq!(
            answer("anything above 105").await,
            "Here are the cars available above $105.00 per day:\nX5 (BMW, 2022) - $110.00 per day"
        );
    }

    #[tokio::test]
    async fn exact_price_without_matches() {
        assert_eq!(answer("a car for 99").await, "No cars are available for exactly $99.00 per day.");
    }

    #[tokio::test]
    async fn model_price_includes_monthly_rate() {
        assert_eq!(
            answer("how much is the Model 3?").await,
            "The price for Model 3 is $95.00 per day or $2500.00 per month."
        );
    }

    #[tokio::test]
    async fn brand_prices_list_each_model() {
        assert_eq!(
            answer("what do hondas cost, honda prices").await,
            "Here are the prices for Honda models:\n\
             Civic: $38.00/day, $1000.00/month\n\
             Accord: $50.00/day, $1300.00/month"
        );
    }

    #[tokio::test]
    async fn nothing_detected_prompts_for_detail() {
        assert_eq!(
            answer("how expensive is it").await,
            "Please specify a car brand, model, or price range to provide price information."
        );
    }
}
