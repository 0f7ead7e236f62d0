use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One catalog row as seen by the assistant: a car joined with the shop holding it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CarRecord {
    pub model: String,
    pub brand: String,
    pub year: i32,
    pub color: String,
    pub price_per_day: Decimal,
    pub price_per_month: Option<Decimal>,
    pub location: String,
}

impl CarRecord {
    /// `Toyota Camry (Red color, 2022 year) - $45.00/day in Chicago`
    pub fn option_line(&self) -> String {
        format!(
            "{} {} ({} color, {} year) - ${:.2}/day in {}",
            self.brand, self.model, self.color, self.year, self.price_per_day, self.location
        )
    }

    /// `Toyota Camry (Red color) - $45.00/day in Chicago`
    pub fn suggestion_line(&self) -> String {
        format!(
            "{} {} ({} color) - ${:.2}/day in {}",
            self.brand, self.model, self.color, self.price_per_day, self.location
        )
    }
}

/// Structured payload handed back with a booking suggestion.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarDetails {
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub color: String,
    pub price: String,
    pub location: String,
}

impl From<&CarRecord> for CarDetails {
    fn from(car: &CarRecord) -> Self {
        Self {
            brand: car.brand.clone(),
            model: car.model.clone(),
            year: car.year,
            color: car.color.clone(),
            price: format!("{:.2}", car.price_per_day),
            location: car.location.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityWindow {
    pub car_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl AvailabilityWindow {
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        ranges_overlap(self.start_date, self.end_date, start, end)
    }
}

/// Interval overlap, not containment: the window only has to touch the requested range.
pub fn ranges_overlap(
    window_start: NaiveDate,
    window_end: NaiveDate,
    requested_start: NaiveDate,
    requested_end: NaiveDate,
) -> bool {
    window_start <= requested_end && window_end >= requested_start
}

/// Comparison applied to the daily rate by price lookups.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceOperator {
    AtMost,
    Above,
    Exactly,
}

impl PriceOperator {
    pub fn sql_operator(&self) -> &'static str {
        match self {
            Self::AtMost => "<=",
            Self::Above => ">",
            Self::Exactly => "=",
        }
    }

    pub fn matches(&self, price: Decimal, threshold: Decimal) -> bool {
        match self {
            Self::AtMost => price <= threshold,
            Self::Above => price > threshold,
            Self::Exactly => price == threshold,
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Self::AtMost => "under or equal to",
            Self::Above => "above",
            Self::Exactly => "for exactly",
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use super::{AvailabilityWindow, CarDetails, CarRecord, PriceOperator};

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    fn window(start: NaiveDate, end: NaiveDate) -> AvailabilityWindow {
        AvailabilityWindow { car_id: 1, start_date: start, end_date: end }
    }

    #[test]
    fn overlapping_window_matches_requested_range() {
        let requested = (date(2024, 12, 5), date(2024, 12, 10));
        assert!(window(date(2024, 12, 1), date(2024, 12, 7)).overlaps(requested.0, requested.1));
    }

    #[test]
    fn disjoint_window_does_not_match() {
        let requested = (date(2024, 12, 5), date(2024, 12, 10));
        assert!(!window(date(2024, 12, 11), date(2024, 12, 20)).overlaps(requested.0, requested.1));
    }

    #[test]
    fn touching_edges_count_as_overlap() {
        assert!(window(date(2024, 12, 10), date(2024, 12, 20))
            .overlaps(date(2024, 12, 5), date(2024, 12, 10)));
    }

    #[test]
    fn price_operators_follow_their_comparison() {
        let seventy = Decimal::new(70, 0);
        assert!(PriceOperator::AtMost.matches(seventy, seventy));
        assert!(!PriceOperator::Above.matches(seventy, seventy));
        assert!(PriceOperator::Exactly.matches(Decimal::new(7000, 2), seventy));
    }

    #[test]
    fn car_details_render_price_with_two_decimals() {
        let car = CarRecord {
            model: "Camry".to_string(),
            brand: "Toyota".to_string(),
            year: 2022,
            color: "Red".to_string(),
            price_per_day: Decimal::new(45, 0),
            price_per_month: None,
            location: "Chicago".to_string(),
        };

        assert_eq!(CarDetails::from(&car).price, "45.00");
        assert_eq!(car.option_line(), "Toyota Camry (Red color, 2022 year) - $45.00/day in Chicago");
    }
}
