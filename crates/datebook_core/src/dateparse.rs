//! Free-text date parsing for entry selection.
//!
//! # Responsibility
//! - Turn command-line words such as `yesterday`, `last friday` or
//!   `march 15 2024` into a calendar date.
//!
//! # Invariants
//! - Parsing is relative to an explicit `today`; no clock access here.
//! - Matching is case-insensitive and ignores commas.

use chrono::{Datelike, Days, Month, NaiveDate, Weekday};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static RELATIVE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(\d+) (day|days|week|weeks) ago|in (\d+) (day|days|week|weeks))$")
        .expect("valid relative date regex")
});
static US_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4})$").expect("valid us date regex"));

/// Input that names no recognizable date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateParseError {
    Unrecognized(String),
}

impl Display for DateParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unrecognized(input) => write!(f, "could not parse date `{input}`"),
        }
    }
}

impl Error for DateParseError {}

/// Parses `words` (already split on whitespace) relative to `today`.
///
/// An empty input means `today`.
pub fn parse_date_words<S: AsRef<str>>(
    words: &[S],
    today: NaiveDate,
) -> Result<NaiveDate, DateParseError> {
    let joined = words
        .iter()
        .map(|word| word.as_ref())
        .collect::<Vec<_>>()
        .join(" ");
    parse_date(&joined, today)
}

/// Parses one free-text date string relative to `today`.
pub fn parse_date(input: &str, today: NaiveDate) -> Result<NaiveDate, DateParseError> {
    let normalized = input
        .replace(',', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_lowercase();
    let unrecognized = || DateParseError::Unrecognized(input.trim().to_string());

    if normalized.is_empty() {
        return Ok(today);
    }
    if let Some(date) = parse_keyword(&normalized, today) {
        return Ok(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(&normalized, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Some(caps) = US_DATE_RE.captures(&normalized) {
        let month = caps[1].parse().map_err(|_| unrecognized())?;
        let day = caps[2].parse().map_err(|_| unrecognized())?;
        let year = caps[3].parse().map_err(|_| unrecognized())?;
        return NaiveDate::from_ymd_opt(year, month, day).ok_or_else(unrecognized);
    }
    if let Some(caps) = RELATIVE_RE.captures(&normalized) {
        let (count, unit, backwards) = match (caps.get(1), caps.get(3)) {
            (Some(count), _) => (count.as_str(), &caps[2], true),
            (None, Some(count)) => (count.as_str(), &caps[4], false),
            (None, None) => return Err(unrecognized()),
        };
        let count: u64 = count.parse().map_err(|_| unrecognized())?;
        let days = if unit.starts_with("week") {
            count.checked_mul(7).ok_or_else(unrecognized)?
        } else {
            count
        };
        return shift(today, days, backwards).ok_or_else(unrecognized);
    }

    let tokens: Vec<&str> = normalized.split(' ').collect();
    match tokens.as_slice() {
        [weekday] => {
            let weekday = parse_weekday(weekday).ok_or_else(unrecognized)?;
            Ok(previous_or_same(today, weekday))
        }
        ["last", weekday] => {
            let weekday = parse_weekday(weekday).ok_or_else(unrecognized)?;
            let yesterday = today.pred_opt().ok_or_else(unrecognized)?;
            Ok(previous_or_same(yesterday, weekday))
        }
        ["next", weekday] => {
            let weekday = parse_weekday(weekday).ok_or_else(unrecognized)?;
            let ahead = (7 + weekday.num_days_from_monday()
                - today.weekday().num_days_from_monday())
                % 7;
            let ahead = if ahead == 0 { 7 } else { ahead };
            shift(today, u64::from(ahead), false).ok_or_else(unrecognized)
        }
        _ => parse_month_day(&tokens, today).ok_or_else(unrecognized),
    }
}

fn parse_keyword(normalized: &str, today: NaiveDate) -> Option<NaiveDate> {
    match normalized {
        "today" | "now" => Some(today),
        "yesterday" => today.pred_opt(),
        "tomorrow" => today.succ_opt(),
        "last week" => shift(today, 7, true),
        "next week" => shift(today, 7, false),
        _ => None,
    }
}

/// `<month> <day> [year]` or `<day> <month> [year]`; year defaults to today's.
fn parse_month_day(tokens: &[&str], today: NaiveDate) -> Option<NaiveDate> {
    let (month, day, year) = match tokens {
        [first, second] | [first, second, _] => match parse_month(first) {
            Some(month) => (month, parse_day(second)?, tokens.get(2)),
            None => (parse_month(second)?, parse_day(first)?, tokens.get(2)),
        },
        _ => return None,
    };
    let year = match year {
        Some(year) => year.parse().ok()?,
        None => today.year(),
    };
    NaiveDate::from_ymd_opt(year, month, day)
}

fn parse_day(token: &str) -> Option<u32> {
    let digits = token.trim_end_matches(|c: char| c.is_ascii_alphabetic());
    digits.parse().ok()
}

/// Full name or three-letter abbreviation, any case.
fn parse_month(token: &str) -> Option<u32> {
    token
        .parse::<Month>()
        .ok()
        .map(|month| month.number_from_month())
}

fn parse_weekday(token: &str) -> Option<Weekday> {
    token.parse().ok()
}

fn previous_or_same(from: NaiveDate, weekday: Weekday) -> NaiveDate {
    let back = (7 + from.weekday().num_days_from_monday() - weekday.num_days_from_monday()) % 7;
    from - Days::new(u64::from(back))
}

fn shift(from: NaiveDate, days: u64, backwards: bool) -> Option<NaiveDate> {
    if backwards {
        from.checked_sub_days(Days::new(days))
    } else {
        from.checked_add_days(Days::new(days))
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_date, parse_date_words, DateParseError};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // Friday.
    fn today() -> NaiveDate {
        date(2024, 3, 15)
    }

    #[test]
    fn empty_input_is_today() {
        let words: [&str; 0] = [];
        assert_eq!(parse_date_words(&words[..], today()).unwrap(), today());
    }

    #[test]
    fn keywords() {
        assert_eq!(parse_date("Yesterday", today()).unwrap(), date(2024, 3, 14));
        assert_eq!(parse_date("tomorrow", today()).unwrap(), date(2024, 3, 16));
        assert_eq!(parse_date("last week", today()).unwrap(), date(2024, 3, 8));
    }

    #[test]
    fn absolute_forms() {
        assert_eq!(parse_date("2023-12-31", today()).unwrap(), date(2023, 12, 31));
        assert_eq!(parse_date("1/2/2024", today()).unwrap(), date(2024, 1, 2));
        assert_eq!(parse_date("March 1, 2020", today()).unwrap(), date(2020, 3, 1));
        assert_eq!(parse_date("1st mar", today()).unwrap(), date(2024, 3, 1));
        assert_eq!(
            parse_date_words(&["dec", "25"][..], today()).unwrap(),
            date(2024, 12, 25)
        );
    }

    #[test]
    fn relative_forms() {
        assert_eq!(parse_date("3 days ago", today()).unwrap(), date(2024, 3, 12));
        assert_eq!(parse_date("in 2 weeks", today()).unwrap(), date(2024, 3, 29));
    }

    #[test]
    fn weekday_forms() {
        assert_eq!(parse_date("friday", today()).unwrap(), today());
        assert_eq!(parse_date("monday", today()).unwrap(), date(2024, 3, 11));
        assert_eq!(parse_date("last friday", today()).unwrap(), date(2024, 3, 8));
        assert_eq!(parse_date("next friday", today()).unwrap(), date(2024, 3, 22));
        assert_eq!(parse_date("next sat", today()).unwrap(), date(2024, 3, 16));
        assert_eq!(parse_date("WED", today()).unwrap(), date(2024, 3, 13));
    }

    #[test]
    fn garbage_is_rejected() {
        let err = parse_date("the day after the thing", today()).unwrap_err();
        assert_eq!(
            err,
            DateParseError::Unrecognized("the day after the thing".to_string())
        );
        assert!(parse_date("february 30 2024", today()).is_err());
        assert!(parse_date("13/40/2024", today()).is_err());
        assert!(parse_date("thurs", today()).is_err());
    }

    #[test]
    fn huge_relative_counts_are_errors() {
        let err = parse_date("3000000000000000000 weeks ago", today()).unwrap_err();
        assert!(matches!(err, DateParseError::Unrecognized(_)));
        assert!(parse_date("in 3000000000000000000 days", today()).is_err());
    }
}
