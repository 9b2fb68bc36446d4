//! Date parsing and display helpers
//!
//! The Hijri rendering is a fixed-offset approximation (year − 579, Gregorian
//! month index mapped onto Hijri month names, same day number). It is a
//! display convenience, not a calendar conversion.

use chrono::{DateTime, Datelike, NaiveDate, Utc};

/// Placeholder for missing dates
pub const NO_DATE: &str = "—";

/// Offset between Gregorian and approximate Hijri years
pub const HIJRI_YEAR_OFFSET: i32 = 579;

pub const HIJRI_MONTHS: [&str; 12] = [
    "Muharram",
    "Safar",
    "Rabi’ al-awwal",
    "Rabi’ al-thani",
    "Jumada al-awwal",
    "Jumada al-thani",
    "Rajab",
    "Sha‘ban",
    "Ramadan",
    "Shawwal",
    "Dhul-Qa‘dah",
    "Dhul-Hijjah",
];

/// Parse an API date: RFC 3339 timestamp or bare `YYYY-MM-DD`
pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.and_utc());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Approximate Hijri rendering of a date, e.g. `5 Rajab 1445 AH`
pub fn hijri_from_date(date: NaiveDate) -> String {
    let month = HIJRI_MONTHS[date.month0() as usize];
    format!(
        "{} {} {} AH",
        date.day(),
        month,
        date.year() - HIJRI_YEAR_OFFSET
    )
}

/// Approximate Hijri rendering of an optional API date string
pub fn to_hijri(value: Option<&str>) -> String {
    value
        .and_then(parse_date)
        .map(|dt| hijri_from_date(dt.date_naive()))
        .unwrap_or_else(|| NO_DATE.to_string())
}

/// `January 5, 2024`
pub fn long_date(value: Option<&str>) -> Option<String> {
    value
        .and_then(parse_date)
        .map(|dt| dt.format("%B %-d, %Y").to_string())
}

/// `5 January 2024`
pub fn british_date(value: Option<&str>) -> Option<String> {
    value
        .and_then(parse_date)
        .map(|dt| dt.format("%-d %B %Y").to_string())
}

/// `1/5/2024`
pub fn short_date(value: Option<&str>) -> Option<String> {
    value
        .and_then(parse_date)
        .map(|dt| dt.format("%-m/%-d/%Y").to_string())
}

/// `YYYY-MM-DD` prefix used to prefill date inputs
pub fn input_date(value: Option<&str>) -> String {
    value
        .map(|v| v.split('T').next().unwrap_or_default().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_formats() {
        assert!(parse_date("2024-01-05T10:30:00.000Z").is_some());
        assert!(parse_date("2024-01-05T10:30:00").is_some());
        assert!(parse_date("2024-01-05").is_some());
        assert!(parse_date("").is_none());
        assert!(parse_date("yesterday").is_none());
    }

    #[test]
    fn test_hijri_approximation() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(hijri_from_date(date), "5 Muharram 1445 AH");

        let date = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
        assert_eq!(hijri_from_date(date), "31 Dhul-Hijjah 1444 AH");
    }

    #[test]
    fn test_to_hijri_missing() {
        assert_eq!(to_hijri(None), NO_DATE);
        assert_eq!(to_hijri(Some("garbage")), NO_DATE);
        assert_eq!(to_hijri(Some("2020-07-15")), "15 Rajab 1441 AH");
    }

    #[test]
    fn test_display_formats() {
        assert_eq!(
            long_date(Some("2024-03-09T00:00:00Z")).as_deref(),
            Some("March 9, 2024")
        );
        assert_eq!(
            british_date(Some("2024-03-09")).as_deref(),
            Some("9 March 2024")
        );
        assert_eq!(short_date(Some("2024-03-09")).as_deref(), Some("3/9/2024"));
        assert_eq!(input_date(Some("2024-03-09T12:00:00Z")), "2024-03-09");
        assert_eq!(input_date(None), "");
    }
}
