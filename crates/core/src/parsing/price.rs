use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use rust_decimal::Decimal;

use crate::domain::car::PriceOperator;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PriceComparison {
    pub operator: PriceOperator,
    pub amount: Decimal,
}

/// Recognises `under|below|less than|cheaper than N` (at most), `above N` (strictly
/// greater) and `for N` (exact).
pub fn detect_price_phrase(text: &str) -> Option<PriceComparison> {
    let lowered = text.to_lowercase();
    let captures = price_phrase_pattern().captures(&lowered)?;
    let amount = Decimal::from_str(&captures[2]).ok()?;

    let operator = match &captures[1] {
        "under" | "below" | "less than" | "cheaper than" => PriceOperator::AtMost,
        "above" => PriceOperator::Above,
        _ => PriceOperator::Exactly,
    };

    Some(PriceComparison { operator, amount })
}

fn price_phrase_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\b(under|below|less than|cheaper than|above|for)\s+\$?(\d+(?:\.\d+)?)")
            .expect("price phrase pattern")
    })
}
