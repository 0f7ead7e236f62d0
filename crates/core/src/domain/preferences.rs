use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// User-stated filter criteria. Every field is independently optional; `price` is an
/// upper bound on the daily rate.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceSet {
    pub color: Option<String>,
    pub brand: Option<String>,
    pub location: Option<String>,
    pub year: Option<i32>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// The single attribute used by the relaxed fallback lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FallbackFilter {
    Color(String),
    Brand(String),
    Location(String),
}

impl PreferenceSet {
    pub fn is_empty(&self) -> bool {
        self.color.is_none()
            && self.brand.is_none()
            && self.location.is_none()
            && self.year.is_none()
            && self.price.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
    }

    /// Number of set fields, not counting the two dates.
    pub fn non_date_count(&self) -> usize {
        [
            self.color.is_some(),
            self.brand.is_some(),
            self.location.is_some(),
            self.year.is_some(),
            self.price.is_some(),
        ]
        .into_iter()
        .filter(|set| *set)
        .count()
    }

    /// Overlays the set fields of `newer` onto `self`. An unset field never clears a
    /// value that is already present.
    pub fn merge(&mut self, newer: &PreferenceSet) {
        overlay(&mut self.color, &newer.color);
        overlay(&mut self.brand, &newer.brand);
        overlay(&mut self.location, &newer.location);
        overlay(&mut self.year, &newer.year);
        overlay(&mut self.price, &newer.price);
        overlay(&mut self.start_date, &newer.start_date);
        overlay(&mut self.end_date, &newer.end_date);
    }

    pub fn merged(&self, newer: &PreferenceSet) -> PreferenceSet {
        let mut merged = self.clone();
        merged.merge(newer);
        merged
    }

    /// Both ends of the requested rental range, only when both are known.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => Some((start, end)),
            _ => None,
        }
    }

    /// First of color, brand, location that is set, in that priority order.
    pub fn fallback_filter(&self) -> Option<FallbackFilter> {
        if let Some(color) = &self.color {
            return Some(FallbackFilter::Color(color.clone()));
        }
        if let Some(brand) = &self.brand {
            return Some(FallbackFilter::Brand(brand.clone()));
        }
        self.location.clone().map(FallbackFilter::Location)
    }
}

fn overlay<T: Clone>(target: &mut Option<T>, newer: &Option<T>) {
    if let Some(value) = newer {
        *target = Some(value.clone());
    }
}
