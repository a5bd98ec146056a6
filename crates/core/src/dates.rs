// ABOUTME: Locale-aware date parsing for portal date strings (Hungarian month and weekday names).
// ABOUTME: Translates locale names through a small table and delegates the pattern work to chrono.

//! Date parsing.
//!
//! Portals print dates in the local language with many punctuation
//! conventions (`2021. július 4. 14:30`, `2021.07.04 14:30`,
//! `2021. 07. 04. - 14:30`). Patterns use chrono's `strftime` syntax.
//! Month and weekday names are looked up in a [`Locale`] table and replaced
//! with their English forms before chrono parses the text, so `%B`, `%b`,
//! `%A` and `%a` work with localized input.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use thiserror::Error;

use crate::dom::normalize_whitespace;

const ENGLISH_MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const ENGLISH_WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\p{L}+").unwrap());

/// Errors produced when a date string cannot be read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateFormatError {
    /// The text was empty after trimming.
    #[error("empty date text")]
    Empty,

    /// The text did not fit the expected pattern.
    #[error("date text {text:?} does not match pattern {pattern:?}: {reason}")]
    Mismatch {
        text: String,
        pattern: String,
        reason: String,
    },

    /// A machine-readable date attribute could not be read.
    #[error("unreadable machine date {0:?}")]
    Machine(String),
}

/// Month and weekday names of one language.
#[derive(Debug, Clone)]
pub struct Locale {
    /// Full month names, January first.
    pub months: [&'static str; 12],
    /// Accepted abbreviations per month (without trailing period).
    pub month_abbreviations: [&'static [&'static str]; 12],
    /// Full weekday names, Monday first.
    pub weekdays: [&'static str; 7],
}

impl Locale {
    /// Index (0-based) of a month name or abbreviation, case-insensitive.
    pub fn month_index(&self, word: &str) -> Option<usize> {
        let lower = word.to_lowercase();
        self.months
            .iter()
            .position(|m| *m == lower)
            .or_else(|| {
                self.month_abbreviations
                    .iter()
                    .position(|abbrs| abbrs.contains(&lower.as_str()))
            })
    }

    /// Index (0-based, Monday first) of a weekday name, case-insensitive.
    pub fn weekday_index(&self, word: &str) -> Option<usize> {
        let lower = word.to_lowercase();
        self.weekdays.iter().position(|d| *d == lower)
    }

    /// Replaces localized month and weekday names with three-letter English ones.
    ///
    /// chrono reads the short form for `%b` and `%a`, and for `%B` and `%A` too.
    fn translate(&self, text: &str) -> String {
        WORD_RE
            .replace_all(text, |caps: &Captures| {
                let word = &caps[0];
                if let Some(i) = self.month_index(word) {
                    ENGLISH_MONTHS[i][..3].to_string()
                } else if let Some(i) = self.weekday_index(word) {
                    ENGLISH_WEEKDAYS[i][..3].to_string()
                } else {
                    word.to_string()
                }
            })
            .into_owned()
    }
}

/// The Hungarian locale used by every builtin portal.
pub static HUNGARIAN: Lazy<Locale> = Lazy::new(|| Locale {
    months: [
        "január",
        "február",
        "március",
        "április",
        "május",
        "június",
        "július",
        "augusztus",
        "szeptember",
        "október",
        "november",
        "december",
    ],
    month_abbreviations: [
        &["jan"],
        &["febr", "feb"],
        &["márc", "már"],
        &["ápr"],
        &["máj"],
        &["jún"],
        &["júl"],
        &["aug"],
        &["szept", "szep"],
        &["okt"],
        &["nov"],
        &["dec"],
    ],
    weekdays: [
        "hétfő",
        "kedd",
        "szerda",
        "csütörtök",
        "péntek",
        "szombat",
        "vasárnap",
    ],
});

/// Parses a Hungarian date string with a chrono pattern.
pub fn parse_date(text: &str, pattern: &str) -> Result<NaiveDateTime, DateFormatError> {
    parse_date_in(text, pattern, &HUNGARIAN)
}

/// Parses a date string with a chrono pattern using the given locale.
///
/// Patterns without a time component yield midnight.
pub fn parse_date_in(
    text: &str,
    pattern: &str,
    locale: &Locale,
) -> Result<NaiveDateTime, DateFormatError> {
    let normalized = normalize_whitespace(text);
    if normalized.is_empty() {
        return Err(DateFormatError::Empty);
    }
    let translated = locale.translate(&normalized);

    let datetime_err = match NaiveDateTime::parse_from_str(&translated, pattern) {
        Ok(dt) => return Ok(dt),
        Err(err) => err,
    };
    if let Ok(date) = NaiveDate::parse_from_str(&translated, pattern) {
        if let Some(dt) = date.and_hms_opt(0, 0, 0) {
            return Ok(dt);
        }
    }
    Err(DateFormatError::Mismatch {
        text: normalized,
        pattern: pattern.to_string(),
        reason: datetime_err.to_string(),
    })
}

/// Formats a timestamp with a chrono pattern in Hungarian.
pub fn format_date(ts: &NaiveDateTime, pattern: &str) -> String {
    format_date_in(ts, pattern, &HUNGARIAN)
}

/// Formats a timestamp with a chrono pattern, spelling names in the given locale.
///
/// `%B` and `%A` use the locale's full names; `%b` uses its first abbreviation.
pub fn format_date_in(ts: &NaiveDateTime, pattern: &str, locale: &Locale) -> String {
    use chrono::Datelike;
    use std::fmt::Write;

    let month = ts.month0() as usize;
    let weekday = ts.weekday().num_days_from_monday() as usize;

    let mut localized = String::with_capacity(pattern.len());
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            localized.push(c);
            continue;
        }
        match chars.next() {
            Some('B') => localized.push_str(locale.months[month]),
            Some('b') => localized.push_str(
                locale.month_abbreviations[month]
                    .first()
                    .copied()
                    .unwrap_or(locale.months[month]),
            ),
            Some('A') => localized.push_str(locale.weekdays[weekday]),
            Some(other) => {
                localized.push('%');
                localized.push(other);
            }
            None => localized.push('%'),
        }
    }

    let mut out = String::new();
    if write!(out, "{}", ts.format(&localized)).is_err() {
        // chrono reports unknown specifiers as a formatting error
        return ts.to_string();
    }
    out
}

/// Parses a machine-readable date such as a `<time datetime>` attribute.
///
/// RFC 3339 values keep the wall-clock time of their own offset, which is
/// the portal's local time. Other values go through a loose parser.
pub fn parse_machine_date(text: &str) -> Result<NaiveDateTime, DateFormatError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(DateFormatError::Empty);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.naive_local());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Ok(dt);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        if let Some(dt) = date.and_hms_opt(0, 0, 0) {
            return Ok(dt);
        }
    }
    dateparser::parse(trimmed)
        .map(|dt| dt.naive_utc())
        .map_err(|_| DateFormatError::Machine(trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn parses_full_month_name() {
        let dt = parse_date("2021. július 4. 14:30", "%Y. %B %d. %H:%M").unwrap();
        assert_eq!(dt, at(2021, 7, 4, 14, 30));
    }

    #[test]
    fn month_names_are_case_insensitive() {
        let dt = parse_date("2020. Február 17. 09:05", "%Y. %B %d. %H:%M").unwrap();
        assert_eq!(dt, at(2020, 2, 17, 9, 5));
    }

    #[test]
    fn parses_numeric_conventions() {
        assert_eq!(
            parse_date("2021.07.04 14:30", "%Y.%m.%d %H:%M").unwrap(),
            at(2021, 7, 4, 14, 30)
        );
        assert_eq!(
            parse_date("2021. 07. 04. - 14:30", "%Y. %m. %d. - %H:%M").unwrap(),
            at(2021, 7, 4, 14, 30)
        );
        assert_eq!(
            parse_date("2021.07.04. 14:30", "%Y.%m.%d. %H:%M").unwrap(),
            at(2021, 7, 4, 14, 30)
        );
    }

    #[test]
    fn parses_weekday_and_comma_conventions() {
        assert_eq!(
            parse_date("2021. július 4. vasárnap 14:30", "%Y. %B %d. %A %H:%M").unwrap(),
            at(2021, 7, 4, 14, 30)
        );
        assert_eq!(
            parse_date("2022. március 15., 08:00", "%Y. %B %d., %H:%M").unwrap(),
            at(2022, 3, 15, 8, 0)
        );
        assert_eq!(
            parse_date("2019. október 23. - 10:15", "%Y. %B %d. - %H:%M").unwrap(),
            at(2019, 10, 23, 10, 15)
        );
    }

    #[test]
    fn parses_abbreviated_month() {
        assert_eq!(
            parse_date("2021. szept. 9. 7:05", "%Y. %b. %d. %H:%M").unwrap(),
            at(2021, 9, 9, 7, 5)
        );
    }

    #[test]
    fn parses_every_abbreviated_month() {
        for (i, abbrs) in HUNGARIAN.month_abbreviations.iter().enumerate() {
            for abbr in abbrs.iter() {
                let text = format!("2021. {abbr}. 9. 7:05");
                let dt = parse_date(&text, "%Y. %b. %d. %H:%M")
                    .unwrap_or_else(|err| panic!("{text}: {err}"));
                assert_eq!(dt, at(2021, i as u32 + 1, 9, 7, 5), "{text}");
            }
        }
        assert_eq!(
            parse_date("2021. jan. 9. 7:05", "%Y. %b. %d. %H:%M").unwrap(),
            at(2021, 1, 9, 7, 5)
        );
    }

    #[test]
    fn abbreviated_weekday() {
        assert_eq!(
            parse_date("2021. júl. 4. (vasárnap) 14:30", "%Y. %b. %d. (%a) %H:%M").unwrap(),
            at(2021, 7, 4, 14, 30)
        );
    }

    #[test]
    fn date_only_pattern_yields_midnight() {
        assert_eq!(
            parse_date("2018. december 1.", "%Y. %B %d.").unwrap(),
            at(2018, 12, 1, 0, 0)
        );
    }

    #[test]
    fn surrounding_and_internal_whitespace_is_normalized() {
        assert_eq!(
            parse_date("\n  2021.  július 4.\t14:30 ", "%Y. %B %d. %H:%M").unwrap(),
            at(2021, 7, 4, 14, 30)
        );
    }

    #[test]
    fn mismatch_is_reported_not_panicked() {
        let err = parse_date("tegnap délután", "%Y. %B %d. %H:%M").unwrap_err();
        assert!(matches!(err, DateFormatError::Mismatch { .. }));
        assert_eq!(parse_date("   ", "%Y").unwrap_err(), DateFormatError::Empty);
    }

    #[test]
    fn inconsistent_weekday_is_rejected() {
        assert!(parse_date("2021. július 4. hétfő 14:30", "%Y. %B %d. %A %H:%M").is_err());
    }

    #[test]
    fn round_trip_reproduces_normalized_text() {
        let pattern = "%Y. %B %d. %H:%M";
        let dt = parse_date("2021. július 4. 14:30", pattern).unwrap();
        let formatted = format_date(&dt, pattern);
        assert_eq!(formatted, "2021. július 04. 14:30");
        assert_eq!(parse_date(&formatted, pattern).unwrap(), dt);
    }

    #[test]
    fn round_trip_for_each_builtin_pattern() {
        let dt = at(2021, 7, 4, 14, 30);
        for pattern in [
            "%Y. %B %d. %A %H:%M",
            "%Y. %B %d., %H:%M",
            "%Y.%m.%d. %H:%M",
            "%Y. %m. %d. - %H:%M",
            "%Y. %B %d. - %H:%M",
            "%Y.%m.%d %H:%M",
            "%Y. %b. %d. %H:%M",
        ] {
            let text = format_date(&dt, pattern);
            assert_eq!(parse_date(&text, pattern).unwrap(), dt, "pattern {pattern}: {text}");
        }
    }

    #[test]
    fn format_keeps_escaped_percent() {
        let dt = at(2021, 7, 4, 14, 30);
        assert_eq!(format_date(&dt, "%%B %B"), "%B július");
    }

    #[test]
    fn machine_dates() {
        assert_eq!(
            parse_machine_date("2021-07-04T14:30:00+02:00").unwrap(),
            at(2021, 7, 4, 14, 30)
        );
        assert_eq!(
            parse_machine_date("2021-07-04 14:30:00").unwrap(),
            at(2021, 7, 4, 14, 30)
        );
        assert_eq!(parse_machine_date("2021-07-04").unwrap(), at(2021, 7, 4, 0, 0));
        assert!(parse_machine_date("").is_err());
        assert!(parse_machine_date("not a date at all").is_err());
    }

    #[test]
    fn locale_lookup() {
        assert_eq!(HUNGARIAN.month_index("Március"), Some(2));
        assert_eq!(HUNGARIAN.month_index("febr"), Some(1));
        assert_eq!(HUNGARIAN.weekday_index("Csütörtök"), Some(3));
        assert_eq!(HUNGARIAN.month_index("kedd"), None);
    }
}
