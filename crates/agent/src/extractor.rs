use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

use rentdesk_core::domain::preferences::PreferenceSet;
use rentdesk_core::parsing::parse_natural_language_date;

use crate::clock::Clock;
use crate::llm::{ChatMessage, LlmClient, LlmError};

const EXTRACTOR_INSTRUCTION: &str = "You are a car rental assistant. Analyze the user's query \
and extract preferences in JSON format. Preferences can include 'color', 'location', 'price', \
'brand', 'year', 'start_date', or 'end_date'. Use null for anything the user did not mention. \
Keep dates as the user wrote them. Respond with JSON only, e.g., {\"color\": \"blue\", \"brand\": \
\"audi\", \"location\": null, \"year\": 2020, \"price\": 100, \"start_date\": \"December 1\", \
\"end_date\": \"December 10\"}.";

#[derive(Debug, Error)]
pub enum ExtractionFailure {
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error("extractor output is not a JSON object: {0}")]
    Malformed(String),
}

#[async_trait]
pub trait PreferenceExtractor: Send + Sync {
    async fn extract(&self, text: &str) -> Result<PreferenceSet, ExtractionFailure>;
}

pub struct LlmPreferenceExtractor {
    llm: Arc<dyn LlmClient>,
    clock: Arc<dyn Clock>,
}

impl LlmPreferenceExtractor {
    pub fn new(llm: Arc<dyn LlmClient>, clock: Arc<dyn Clock>) -> Self {
        Self { llm, clock }
    }
}

#[async_trait]
impl PreferenceExtractor for LlmPreferenceExtractor {
    async fn extract(&self, text: &str) -> Result<PreferenceSet, ExtractionFailure> {
        let messages = [ChatMessage::system(EXTRACTOR_INSTRUCTION), ChatMessage::user(text)];
        let raw = self.llm.complete(&messages).await?;
        parse_preferences(&raw, self.clock.today().year())
    }
}

/// Reads the model's JSON answer. Blank or `null`-ish values stay unset, and a date that
/// does not parse is dropped rather than failing the whole extraction.
pub fn parse_preferences(raw: &str, default_year: i32) -> Result<PreferenceSet, ExtractionFailure> {
    let body = json_object_slice(raw).ok_or_else(|| ExtractionFailure::Malformed(preview(raw)))?;
    let value: Value = serde_json::from_str(body)
        .map_err(|error| ExtractionFailure::Malformed(error.to_string()))?;
    let Value::Object(fields) = value else {
        return Err(ExtractionFailure::Malformed(preview(raw)));
    };

    Ok(PreferenceSet {
        color: text_field(&fields, "color"),
        brand: text_field(&fields, "brand"),
        location: text_field(&fields, "location"),
        year: year_field(&fields),
        price: price_field(&fields),
        start_date: date_field(&fields, "start_date", default_year),
        end_date: date_field(&fields, "end_date", default_year),
    })
}

fn json_object_slice(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (start < end).then(|| &raw[start..=end])
}

fn preview(raw: &str) -> String {
    raw.chars().take(120).collect()
}

fn text_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    let value = fields.get(key)?.as_str()?.trim();
    if value.is_empty() || is_placeholder(value) {
        return None;
    }
    Some(value.to_string())
}

fn is_placeholder(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "null" | "none" | "any" | "n/a" | "unknown")
}

fn year_field(fields: &Map<String, Value>) -> Option<i32> {
    let year = match fields.get("year")? {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse::<i64>().ok(),
        _ => None,
    }?;
    i32::try_from(year).ok().filter(|year| (1900..=2100).contains(year))
}

fn price_field(fields: &Map<String, Value>) -> Option<Decimal> {
    let price = match fields.get("price")? {
        Value::Number(number) => Decimal::from_str(&number.to_string()).ok(),
        Value::String(text) => {
            let cleaned: String =
                text.chars().filter(|ch| ch.is_ascii_digit() || *ch == '.').collect();
            Decimal::from_str(&cleaned).ok()
        }
        _ => None,
    }?;
    (price >= Decimal::ZERO).then_some(price)
}

fn date_field(fields: &Map<String, Value>, key: &str, default_year: i32) -> Option<NaiveDate> {
    let raw = text_field(fields, key)?;
    match parse_natural_language_date(&raw, default_year) {
        Ok(date) => Some(date),
        Err(error) => {
            warn!(event_name = "extractor.date_dropped", field = key, error = %error, "ignoring unparseable date");
            None
        }
    }
}
