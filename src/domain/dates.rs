//! D/M/YYYY date handling.
//!
//! All user-facing commission dates are non-zero-padded D/M/YYYY strings
//! (the ca-ES numeric format). Date pickers speak YYYY-MM-DD; both forms are
//! converted here and nowhere else.

use chrono::{DateTime, Datelike, Local, NaiveDate, Timelike};

/// Catalan weekday names, Sunday first.
const WEEKDAYS: [&str; 7] = [
    "diumenge",
    "dilluns",
    "dimarts",
    "dimecres",
    "dijous",
    "divendres",
    "dissabte",
];

/// Parse a D/M/YYYY string. Zero-padded day/month values are accepted.
pub fn parse_dmy(s: &str) -> Option<NaiveDate> {
    let mut parts = s.split('/');
    let day: u32 = parts.next()?.parse().ok()?;
    let month: u32 = parts.next()?.parse().ok()?;
    let year: i32 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Format a date as non-zero-padded D/M/YYYY.
pub fn format_dmy(date: NaiveDate) -> String {
    format!("{}/{}/{}", date.day(), date.month(), date.year())
}

/// Today's date in D/M/YYYY form.
pub fn today_dmy() -> String {
    format_dmy(Local::now().date_naive())
}

/// Localized "D/M/YYYY HH:MM:SS" label for backup descriptions.
pub fn format_local_timestamp(at: DateTime<Local>) -> String {
    format!(
        "{} {:02}:{:02}:{:02}",
        format_dmy(at.date_naive()),
        at.hour(),
        at.minute(),
        at.second()
    )
}

/// Catalan weekday name for a D/M/YYYY string; empty for malformed input.
pub fn weekday_catalan(date_str: &str) -> String {
    match parse_dmy(date_str) {
        Some(date) => WEEKDAYS[date.weekday().num_days_from_sunday() as usize].to_string(),
        None => String::new(),
    }
}

/// The year component of a D/M/YYYY string.
pub fn year_of(date_str: &str) -> Option<i32> {
    date_str.rsplit('/').next()?.parse().ok()
}

/// Whether a D/M/YYYY string falls in the given year, by suffix check.
pub fn in_year(date_str: &str, year: i32) -> bool {
    date_str.ends_with(&format!("/{year}"))
}

/// Accept either D/M/YYYY or the date-picker YYYY-MM-DD form and return the
/// canonical D/M/YYYY string. None for anything unparseable.
pub fn normalize(input: &str) -> Option<String> {
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Some(format_dmy(date));
    }
    parse_dmy(input).map(format_dmy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_format_roundtrip() {
        let date = parse_dmy("17/12/2025").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 12, 17).unwrap());
        assert_eq!(format_dmy(date), "17/12/2025");
    }

    #[test]
    fn test_format_is_not_zero_padded() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
        assert_eq!(format_dmy(date), "2/1/2025");
    }

    #[test]
    fn test_parse_accepts_zero_padded_input() {
        assert_eq!(
            parse_dmy("09/04/2025"),
            NaiveDate::from_ymd_opt(2025, 4, 9)
        );
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(parse_dmy("").is_none());
        assert!(parse_dmy("17/12").is_none());
        assert!(parse_dmy("17/12/2025/1").is_none());
        assert!(parse_dmy("32/1/2025").is_none());
        assert!(parse_dmy("a/b/c").is_none());
    }

    #[test]
    fn test_weekday_catalan() {
        // 17/12/2025 is a Wednesday.
        assert_eq!(weekday_catalan("17/12/2025"), "dimecres");
        // 2/1/2025 is a Thursday.
        assert_eq!(weekday_catalan("2/1/2025"), "dijous");
        assert_eq!(weekday_catalan("not a date"), "");
    }

    #[test]
    fn test_year_helpers() {
        assert_eq!(year_of("17/12/2025"), Some(2025));
        assert!(in_year("17/12/2025", 2025));
        assert!(!in_year("17/12/2025", 2026));
    }

    #[test]
    fn test_normalize_both_forms() {
        assert_eq!(normalize("2025-12-17").as_deref(), Some("17/12/2025"));
        assert_eq!(normalize("17/12/2025").as_deref(), Some("17/12/2025"));
        assert_eq!(normalize("09/04/2025").as_deref(), Some("9/4/2025"));
        assert!(normalize("2025-13-40").is_none());
    }

}
