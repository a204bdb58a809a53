//! Date extraction for receipt text.

use chrono::NaiveDate;
use regex::{Captures, Regex};

use super::patterns::{DATE_DMY_DASH, DATE_DMY_SLASH, DATE_ISO, DATE_LABELED};
use super::{ExtractionMatch, FieldExtractor};

/// Supported date shapes, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePattern {
    /// `Date: YYYY-MM-DD`
    Labeled,
    /// `YYYY-MM-DD`
    Iso,
    /// `DD/MM/YYYY`
    DayMonthYearSlash,
    /// `DD-MM-YYYY`
    DayMonthYearDash,
}

impl DatePattern {
    /// All patterns, highest priority first.
    pub const PRIORITY: [DatePattern; 4] = [
        DatePattern::Labeled,
        DatePattern::Iso,
        DatePattern::DayMonthYearSlash,
        DatePattern::DayMonthYearDash,
    ];

    fn regex(&self) -> &'static Regex {
        match self {
            DatePattern::Labeled => &DATE_LABELED,
            DatePattern::Iso => &DATE_ISO,
            DatePattern::DayMonthYearSlash => &DATE_DMY_SLASH,
            DatePattern::DayMonthYearDash => &DATE_DMY_DASH,
        }
    }

    fn to_date(&self, caps: &Captures<'_>) -> Option<NaiveDate> {
        let (year, month, day) = match self {
            DatePattern::Labeled | DatePattern::Iso => (&caps[1], &caps[2], &caps[3]),
            DatePattern::DayMonthYearSlash | DatePattern::DayMonthYearDash => {
                (&caps[3], &caps[2], &caps[1])
            }
        };

        NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
    }

    /// Every valid calendar date this pattern finds, top to bottom.
    pub fn find_all(&self, text: &str) -> Vec<ExtractionMatch<NaiveDate>> {
        self.regex()
            .captures_iter(text)
            .filter_map(|caps| {
                let date = self.to_date(&caps)?;
                let full_match = caps.get(0)?;
                let source = full_match.as_str().trim_end_matches(['T', 't']);
                Some(
                    ExtractionMatch::new(date, source)
                        .with_position(full_match.start(), full_match.start() + source.len()),
                )
            })
            .collect()
    }

    /// First valid calendar date this pattern finds.
    pub fn find(&self, text: &str) -> Option<ExtractionMatch<NaiveDate>> {
        self.find_all(text).into_iter().next()
    }
}

/// Date field extractor.
///
/// Patterns are tried in priority order and the first pattern that yields a
/// valid calendar date wins outright; matches from lower-priority patterns
/// are never considered once a higher one has succeeded.
#[derive(Debug, Clone)]
pub struct DateExtractor;

impl DateExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Like `extract`, also reporting which pattern fired.
    pub fn extract_with_pattern(&self, text: &str) -> Option<(DatePattern, ExtractionMatch<NaiveDate>)> {
        DatePattern::PRIORITY
            .into_iter()
            .find_map(|pattern| pattern.find(text).map(|m| (pattern, m)))
    }
}

impl Default for DateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DateExtractor {
    type Output = ExtractionMatch<NaiveDate>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_with_pattern(text).map(|(_, m)| m)
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        DatePattern::PRIORITY
            .into_iter()
            .flat_map(|pattern| pattern.find_all(text))
            .collect()
    }
}

/// Extract the bill date from receipt text.
pub fn extract_date(text: &str) -> Option<ExtractionMatch<NaiveDate>> {
    DateExtractor::new().extract(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_labeled_date() {
        let result = extract_date("Store XYZ\nDate: 2024-01-15\n").unwrap();
        assert_eq!(result.value, date(2024, 1, 15));
        assert_eq!(result.source, "Date: 2024-01-15");
    }

    #[test]
    fn test_date_followed_by_time() {
        let result = extract_date("Date: 2024-01-15T10:30").unwrap();
        assert_eq!(result.value, date(2024, 1, 15));
        assert_eq!(result.source, "Date: 2024-01-15");

        let (pattern, result) = DateExtractor::new()
            .extract_with_pattern("Printed 2024-01-15T10:30:00")
            .unwrap();
        assert_eq!(pattern, DatePattern::Iso);
        assert_eq!(result.value, date(2024, 1, 15));
        assert_eq!(result.source, "2024-01-15");
        assert_eq!(result.position, Some((8, 18)));
    }

    #[test]
    fn test_labeled_beats_earlier_bare_date() {
        let text = "Printed 2024-05-10\n- Milk: €2.50 (Category: grocery)\nDate: 2024-03-01";
        let (pattern, result) = DateExtractor::new().extract_with_pattern(text).unwrap();
        assert_eq!(pattern, DatePattern::Labeled);
        assert_eq!(result.value, date(2024, 3, 1));
    }

    #[test]
    fn test_iso_beats_day_month_year() {
        let text = "01/02/2023 then 2024-06-30";
        let (pattern, result) = DateExtractor::new().extract_with_pattern(text).unwrap();
        assert_eq!(pattern, DatePattern::Iso);
        assert_eq!(result.value, date(2024, 6, 30));
    }

    #[test]
    fn test_first_match_within_class_wins() {
        let result = extract_date("2024-02-01 and 2024-02-02").unwrap();
        assert_eq!(result.value, date(2024, 2, 1));
    }

    #[test]
    fn test_day_month_year_is_normalized() {
        let result = extract_date("Receipt from 15/01/2024").unwrap();
        assert_eq!(result.value, date(2024, 1, 15));
        assert_eq!(result.value.to_string(), "2024-01-15");
        assert_eq!(result.source, "15/01/2024");

        let result = extract_date("15-01-2024").unwrap();
        assert_eq!(result.value, date(2024, 1, 15));
    }

    #[test]
    fn test_invalid_calendar_date_falls_through() {
        // 2024-13-45 is not a date, so the slash form is used instead.
        let (pattern, result) = DateExtractor::new()
            .extract_with_pattern("2024-13-45 / 03/04/2024")
            .unwrap();
        assert_eq!(pattern, DatePattern::DayMonthYearSlash);
        assert_eq!(result.value, date(2024, 4, 3));
    }

    #[test]
    fn test_no_date() {
        assert!(extract_date("no date in here, only €2.50").is_none());
        assert!(extract_date("").is_none());
    }

    #[test]
    fn test_extract_all_in_priority_order() {
        let all = DateExtractor::new().extract_all("31/12/2023\nDate: 2024-01-15");
        let values: Vec<NaiveDate> = all.iter().map(|m| m.value).collect();
        assert_eq!(values, vec![date(2024, 1, 15), date(2024, 1, 15), date(2023, 12, 31)]);
    }
}
