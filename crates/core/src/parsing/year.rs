use std::sync::OnceLock;

use regex::Regex;

/// Finds the model year a query refers to: an explicit `19xx`/`20xx`, `N years ago`
/// (digits or number words), or `last/next/this year` relative to `current_year`.
pub fn detect_year(text: &str, current_year: i32) -> Option<i32> {
    if let Some(found) = explicit_year_pattern().find(text) {
        return found.as_str().parse().ok();
    }

    let lowered = text.to_ascii_lowercase();
    if let Some(captures) = relative_year_pattern().captures(&lowered) {
        let amount = &captures[1];
        let years_ago = if amount.chars().all(|ch| ch.is_ascii_digit()) {
            amount.parse::<i32>().ok()
        } else {
            word_to_number(amount)
        };
        // "many years ago" names no year; do not fall through to the phrases below.
        return years_ago.map(|years| current_year - years);
    }

    if lowered.contains("last year") {
        return Some(current_year - 1);
    }
    if lowered.contains("next year") {
        return Some(current_year + 1);
    }
    if lowered.contains("this year") {
        return Some(current_year);
    }

    None
}

fn explicit_year_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\b(?:19|20)\d{2}\b").expect("explicit year pattern"))
}

fn relative_year_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\b(\d+|[a-z]+(?:-[a-z]+)?)\s+years?\s+ago").expect("relative year pattern")
    })
}

fn word_to_number(word: &str) -> Option<i32> {
    if let Some((tens, units)) = word.split_once('-') {
        let tens = tens_value(tens)?;
        let units = unit_value(units).filter(|value| (1..=9).contains(value))?;
        return Some(tens + units);
    }

    unit_value(word).or_else(|| tens_value(word))
}

fn unit_value(word: &str) -> Option<i32> {
    let value = match word {
        "a" | "an" | "one" => 1,
        "zero" => 0,
        "two" => 2,
        "three" => 3,
        "four" => 4,
        "five" => 5,
        "six" => 6,
        "seven" => 7,
        "eight" => 8,
        "nine" => 9,
        "ten" => 10,
        "eleven" => 11,
        "twelve" => 12,
        "thirteen" => 13,
        "fourteen" => 14,
        "fifteen" => 15,
        "sixteen" => 16,
        "seventeen" => 17,
        "eighteen" => 18,
        "nineteen" => 19,
        _ => return None,
    };
    Some(value)
}

fn tens_value(word: &str) -> Option<i32> {
    let value = match word {
        "twenty" => 20,
        "thirty" => 30,
        "forty" => 40,
        "fifty" => 50,
        "sixty" => 60,
        "seventy" => 70,
        "eighty" => 80,
        "ninety" => 90,
        _ => return None,
    };
    Some(value)
}
