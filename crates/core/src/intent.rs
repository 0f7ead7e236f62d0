use serde::{Deserialize, Serialize};

/// Closed set of labels the classifier may return, plus the catch-all.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    AvailabilityQuery,
    PriceQuery,
    ColorQuery,
    LocationQuery,
    YearQuery,
    RecommendationRequest,
    Booking,
    BrandQuery,
    GeneralQuery,
}

impl Intent {
    pub const CLASSIFIABLE: [Intent; 8] = [
        Intent::AvailabilityQuery,
        Intent::PriceQuery,
        Intent::ColorQuery,
        Intent::LocationQuery,
        Intent::YearQuery,
        Intent::RecommendationRequest,
        Intent::Booking,
        Intent::BrandQuery,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AvailabilityQuery => "availability_query",
            Self::PriceQuery => "price_query",
            Self::ColorQuery => "color_query",
            Self::LocationQuery => "location_query",
            Self::YearQuery => "year_query",
            Self::RecommendationRequest => "recommendation_request",
            Self::Booking => "booking",
            Self::BrandQuery => "brand_query",
            Self::GeneralQuery => "general_query",
        }
    }

    /// Maps raw classifier output to an intent. Anything outside the closed set,
    /// including the catch-all's own label, becomes [`Intent::GeneralQuery`].
    pub fn from_label(raw: &str) -> Self {
        let label = raw
            .trim()
            .trim_matches(|ch: char| matches!(ch, '\'' | '"' | '`' | '.'))
            .trim()
            .to_ascii_lowercase();

        Self::CLASSIFIABLE
            .into_iter()
            .find(|intent| intent.as_str() == label)
            .unwrap_or(Self::GeneralQuery)
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
