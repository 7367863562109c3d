//! Date parsing helpers shared by the date rules.
//!
//! Reference dates in rule arguments (`after:tomorrow`, `before:2024-01-01`)
//! accept a small keyword set plus the common literal formats the admin
//! application actually submits.

use chrono::{Duration, Local, NaiveDate, NaiveDateTime};

/// Seconds in a year, as used by the age computation
const SECONDS_PER_YEAR: i64 = 31_556_926;

/// Parse a date string: keywords first, then literal formats.
pub fn parse(input: &str) -> Option<NaiveDateTime> {
    let input = input.trim();
    let now = Local::now().naive_local();
    let midnight = now.date().and_hms_opt(0, 0, 0)?;

    match input.to_ascii_lowercase().as_str() {
        "now" => return Some(now),
        "today" => return Some(midnight),
        "tomorrow" => return Some(midnight + Duration::days(1)),
        "yesterday" => return Some(midnight - Duration::days(1)),
        _ => {}
    }

    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(input, format) {
            return Some(parsed);
        }
    }

    for format in ["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d"] {
        if let Ok(parsed) = NaiveDate::parse_from_str(input, format) {
            return parsed.and_hms_opt(0, 0, 0);
        }
    }

    None
}

/// Translate a PHP-style date format (`Y-m-d`, `d/m/Y H:i:s`) into a chrono
/// format string. Unrecognized characters pass through as literals.
pub fn php_format_to_chrono(format: &str) -> String {
    let mut out = String::with_capacity(format.len() * 2);
    for c in format.chars() {
        match c {
            'Y' => out.push_str("%Y"),
            'y' => out.push_str("%y"),
            'm' => out.push_str("%m"),
            'd' => out.push_str("%d"),
            'H' => out.push_str("%H"),
            'i' => out.push_str("%M"),
            's' => out.push_str("%S"),
            '%' => out.push_str("%%"),
            other => out.push(other),
        }
    }
    out
}

/// Parse a value against a PHP-style format string.
pub fn parse_with_php_format(value: &str, php_format: &str) -> Option<NaiveDateTime> {
    let format = php_format_to_chrono(php_format);

    if format.contains("%H") {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, &format) {
            return Some(parsed);
        }
        return None;
    }

    NaiveDate::parse_from_str(value, &format)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Whole years elapsed since the given date, using the fixed seconds-per-year
/// constant the original age check was written with.
pub fn age_in_years(birth: NaiveDateTime) -> i64 {
    let elapsed = Local::now().naive_local() - birth;
    elapsed.num_seconds() / SECONDS_PER_YEAR
}

/// A bare 4-digit string is accepted as a year-only date.
pub fn is_year_only(value: &str) -> bool {
    value.len() == 4 && value.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_iso_date() {
        let parsed = parse("2020-05-17").unwrap();
        assert_eq!(parsed.date(), NaiveDate::from_ymd_opt(2020, 5, 17).unwrap());
    }

    #[test]
    fn test_parse_br_date() {
        let parsed = parse("17/05/2020").unwrap();
        assert_eq!(parsed.date(), NaiveDate::from_ymd_opt(2020, 5, 17).unwrap());
    }

    #[test]
    fn test_parse_datetime() {
        let parsed = parse("2020-05-17 13:45:00").unwrap();
        assert_eq!(parsed.time().to_string(), "13:45:00");
    }

    #[test]
    fn test_keywords_ordering() {
        let yesterday = parse("yesterday").unwrap();
        let today = parse("today").unwrap();
        let tomorrow = parse("tomorrow").unwrap();
        assert!(yesterday < today && today < tomorrow);
    }

    #[test]
    fn test_garbage_is_none() {
        assert!(parse("not a date").is_none());
    }

    #[test]
    fn test_php_format_translation() {
        assert_eq!(php_format_to_chrono("Y-m-d"), "%Y-%m-%d");
        assert_eq!(php_format_to_chrono("d/m/Y H:i:s"), "%d/%m/%Y %H:%M:%S");
    }

    #[test]
    fn test_parse_with_php_format() {
        assert!(parse_with_php_format("2020-05-17", "Y-m-d").is_some());
        assert!(parse_with_php_format("17/05/2020", "Y-m-d").is_none());
    }

    #[test]
    fn test_year_only() {
        assert!(is_year_only("1999"));
        assert!(!is_year_only("19999"));
        assert!(!is_year_only("19a9"));
    }
}
