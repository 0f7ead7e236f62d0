use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DateParseError {
    #[error("no calendar date found in `{0}`")]
    Unrecognized(String),
    #[error("`{0}` is not a valid calendar date")]
    OutOfRange(String),
}

/// Parses ISO dates (`2024-12-05`), US numeric dates (`12/05/2024`), and loose natural
/// phrasing (`December 5`, `5th of Dec 2024`). A missing year becomes `default_year`;
/// a missing day becomes the first of the month.
pub fn parse_natural_language_date(
    text: &str,
    default_year: i32,
) -> Result<NaiveDate, DateParseError> {
    let trimmed = text.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }

    let lowered = trimmed.to_ascii_lowercase();
    if let Some(captures) = numeric_date_pattern().captures(&lowered) {
        let month = captures[1].parse::<u32>().unwrap_or(0);
        let day = captures[2].parse::<u32>().unwrap_or(0);
        let year = captures.get(3).map(|raw| expand_year(raw.as_str())).unwrap_or(default_year);
        return NaiveDate::from_ymd_opt(year, month, day)
            .ok_or_else(|| DateParseError::OutOfRange(trimmed.to_string()));
    }

    let mut month = None;
    let mut day = None;
    let mut year = None;

    for token in lowered.split(|ch: char| !ch.is_ascii_alphanumeric()).filter(|t| !t.is_empty()) {
        if month.is_none() {
            if let Some(number) = month_number(token) {
                month = Some(number);
                continue;
            }
        }

        let digits = strip_ordinal_suffix(token);
        if digits.is_empty() || !digits.chars().all(|ch| ch.is_ascii_digit()) {
            continue;
        }

        if digits.len() == 4 && year.is_none() {
            year = digits.parse::<i32>().ok();
        } else if digits.len() <= 2 && day.is_none() {
            day = digits.parse::<u32>().ok().filter(|value| (1..=31).contains(value));
        }
    }

    let Some(month) = month else {
        return Err(DateParseError::Unrecognized(trimmed.to_string()));
    };

    NaiveDate::from_ymd_opt(year.unwrap_or(default_year), month, day.unwrap_or(1))
        .ok_or_else(|| DateParseError::OutOfRange(trimmed.to_string()))
}

fn numeric_date_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\b(\d{1,2})/(\d{1,2})(?:/(\d{4}|\d{2}))?\b").expect("numeric date pattern")
    })
}

fn expand_year(raw: &str) -> i32 {
    let value = raw.parse::<i32>().unwrap_or(0);
    if raw.len() == 2 {
        2000 + value
    } else {
        value
    }
}

fn strip_ordinal_suffix(token: &str) -> &str {
    ["st", "nd", "rd", "th"]
        .iter()
        .find_map(|suffix| token.strip_suffix(suffix))
        .filter(|rest| !rest.is_empty())
        .unwrap_or(token)
}

fn month_number(token: &str) -> Option<u32> {
    let month = match token {
        "january" | "jan" => 1,
        "february" | "feb" => 2,
        "march" | "mar" => 3,
        "april" | "apr" => 4,
        "may" => 5,
        "june" | "jun" => 6,
        "july" | "jul" => 7,
        "august" | "aug" => 8,
        "september" | "sept" | "sep" => 9,
        "october" | "oct" => 10,
        "november" | "nov" => 11,
        "december" | "dec" => 12,
        _ => return None,
    };
    Some(month)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{parse_natural_language_date, DateParseError};

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    #[test]
    fn iso_dates_are_kept_verbatim() {
        assert_eq!(parse_natural_language_date("2023-12-01", 2030), Ok(date(2023, 12, 1)));
    }

    #[test]
    fn natural_dates_without_year_use_default_year() {
        assert_eq!(parse_natural_language_date("December 1", 2024), Ok(date(2024, 12, 1)));
        assert_eq!(parse_natural_language_date("dec 10th", 2024), Ok(date(2024, 12, 10)));
        assert_eq!(parse_natural_language_date("the 5th of March", 2025), Ok(date(2025, 3, 5)));
    }

    #[test]
    fn explicit_year_wins_over_default() {
        assert_eq!(
            parse_natural_language_date("January 15, 2026", 2024),
            Ok(date(2026, 1, 15))
        );
        assert_eq!(parse_natural_language_date("12/05/2024", 2020), Ok(date(2024, 12, 5)));
        assert_eq!(parse_natural_language_date("7/4/25", 2020), Ok(date(2025, 7, 4)));
    }

    #[test]
    fn month_without_day_defaults_to_first() {
        assert_eq!(parse_natural_language_date("next August", 2024), Ok(date(2024, 8, 1)));
    }

    #[test]
    fn impossible_dates_are_rejected() {
        assert!(matches!(
            parse_natural_language_date("February 30", 2024),
            Err(DateParseError::OutOfRange(_))
        ));
        assert!(matches!(
            parse_natural_language_date("13/01/2024", 2024),
            Err(DateParseError::OutOfRange(_))
        ));
    }

    #[test]
    fn text_without_a_month_is_unrecognized() {
        assert!(matches!(
            parse_natural_language_date("soon please", 2024),
            Err(DateParseError::Unrecognized(_))
        ));
    }
}
