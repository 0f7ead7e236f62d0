//! Deterministic text helpers used around the language model: calendar dates, model
//! years, price phrases, and catalog entity spotting.

pub mod dates;
pub mod entity;
pub mod price;
pub mod year;

pub use dates::{parse_natural_language_date, DateParseError};
pub use entity::{
    matcher_for, EntityIndex, EntityKind, EntityMatcher, SubstringEntityMatcher,
    TokenEntityMatcher,
};
pub use price::{detect_price_phrase, PriceComparison};
pub use year::detect_year;
