use chrono::{Days, NaiveDate};
use regex::Regex;
use std::sync::LazyLock;

static ABSOLUTE_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"\b\d{4}-\d{2}-\d{2}\b").expect("absolute date regex")
});

/// Resolve a suggested due date against `today` (a UTC calendar date).
///
/// `"+14 days"` style offsets keep only their digits. Otherwise the first
/// `YYYY-MM-DD` in the text is used, so `"by 2025-06-01"` works too.
/// Anything else, including an offset with no digits or a calendar date
/// that does not exist, resolves to no due date.
pub fn resolve_due_date(suggested: &str, today: NaiveDate) -> Option<NaiveDate> {
    let suggested = suggested.trim();

    if suggested.contains('+') {
        let digits: String = suggested.chars().filter(char::is_ascii_digit).collect();
        let days: u64 = digits.parse().ok()?;
        return today.checked_add_days(Days::new(days));
    }

    ABSOLUTE_DATE_RE
        .find(suggested)
        .and_then(|date| NaiveDate::parse_from_str(date.as_str(), "%Y-%m-%d").ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_relative_offset() {
        let today = day(2025, 1, 1);
        assert_eq!(resolve_due_date("+14 days", today), Some(day(2025, 1, 15)));
        assert_eq!(resolve_due_date("+30", today), Some(day(2025, 1, 31)));
        assert_eq!(resolve_due_date("+365 days", today), Some(day(2026, 1, 1)));
    }

    #[test]
    fn test_absolute_date_is_kept() {
        let today = day(2025, 1, 1);
        assert_eq!(resolve_due_date("2025-06-01", today), Some(day(2025, 6, 1)));
        assert_eq!(resolve_due_date("2025-02-30", today), None);
    }

    #[test]
    fn test_absolute_date_inside_text() {
        let today = day(2025, 1, 1);
        assert_eq!(resolve_due_date("by 2025-06-01", today), Some(day(2025, 6, 1)));
        assert_eq!(
            resolve_due_date("before 2025-03-15 at the latest", today),
            Some(day(2025, 3, 15))
        );
        assert_eq!(resolve_due_date("ref 12025-06-011", today), None);
    }

    #[test]
    fn test_unrecognised_forms() {
        let today = day(2025, 1, 1);
        assert_eq!(resolve_due_date("+ soon", today), None);
        assert_eq!(resolve_due_date("next month", today), None);
        assert_eq!(resolve_due_date("", today), None);
    }
}
