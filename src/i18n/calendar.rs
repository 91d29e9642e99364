use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use super::catalog::Translator;

const DAYS: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

const MONTHS: [&str; 12] = [
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

/// Day and month names in the request's locale.
///
/// Message keys are `LongDayName<Day>`, `ShortDayName<Day>`,
/// `LongMonthName<Month>` and `ShortMonthName<Month>`. Days start on Sunday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarNames {
    pub long_days: [String; 7],
    pub short_days: [String; 7],
    pub long_months: [String; 12],
    pub short_months: [String; 12],
}

fn translate_all<const N: usize>(
    translator: Translator<'_>,
    prefix: &str,
    items: [&str; N],
) -> [String; N] {
    items.map(|item| translator.translate(&format!("{}{}", prefix, item)))
}

impl CalendarNames {
    pub fn for_locale(translator: Translator<'_>) -> Self {
        CalendarNames {
            long_days: translate_all(translator, "LongDayName", DAYS),
            short_days: translate_all(translator, "ShortDayName", DAYS),
            long_months: translate_all(translator, "LongMonthName", MONTHS),
            short_months: translate_all(translator, "ShortMonthName", MONTHS),
        }
    }

    /// Formats `date` with `%A %a %B %b` replaced by localized names.
    /// `%d`, `%m`, `%Y` and `%%` behave as in strftime; other characters are
    /// copied through.
    pub fn format_date(&self, date: NaiveDate, pattern: &str) -> String {
        let weekday = date.weekday().num_days_from_sunday() as usize;
        let month = date.month0() as usize;

        let mut out = String::with_capacity(pattern.len() + 16);
        let mut chars = pattern.chars();
        while let Some(c) = chars.next() {
            if c != '%' {
                out.push(c);
                continue;
            }
            match chars.next() {
                Some('A') => out.push_str(&self.long_days[weekday]),
                Some('a') => out.push_str(&self.short_days[weekday]),
                Some('B') => out.push_str(&self.long_months[month]),
                Some('b') => out.push_str(&self.short_months[month]),
                Some('d') => out.push_str(&format!("{:02}", date.day())),
                Some('m') => out.push_str(&format!("{:02}", date.month())),
                Some('Y') => out.push_str(&date.year().to_string()),
                Some('%') => out.push('%'),
                Some(other) => {
                    out.push('%');
                    out.push(other);
                }
                None => out.push('%'),
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::catalog::LocaleCatalog;
    use crate::i18n::source::StaticSource;

    fn catalog() -> LocaleCatalog {
        let source = StaticSource::new()
            .with_locale(
                "en-US",
                [
                    ("LongDayNameWednesday", "Wednesday"),
                    ("LongMonthNameJanuary", "January"),
                ],
            )
            .with_locale(
                "pl-PL",
                [
                    ("LongDayNameWednesday", "środa"),
                    ("ShortDayNameWednesday", "śr"),
                    ("LongMonthNameJanuary", "stycznia"),
                    ("ShortMonthNameJanuary", "sty"),
                ],
            );
        LocaleCatalog::load(
            &["en-US".to_string(), "pl-PL".to_string()],
            &["English".to_string(), "Polski".to_string()],
            &source,
        )
        .unwrap()
    }

    #[test]
    fn names_follow_locale() {
        let catalog = catalog();
        let names = CalendarNames::for_locale(catalog.translator("pl-PL"));
        assert_eq!(names.long_days.len(), 7);
        assert_eq!(names.long_months.len(), 12);
        assert_eq!(names.long_days[3], "środa");
        // untranslated keys come back as the key itself
        assert_eq!(names.long_days[0], "LongDayNameSunday");
    }

    #[test]
    fn formats_with_localized_names() {
        let catalog = catalog();
        let names = CalendarNames::for_locale(catalog.translator("pl-PL"));
        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        assert_eq!(names.format_date(date, "%A, %d %B %Y"), "środa, 15 stycznia 2025");
        assert_eq!(names.format_date(date, "%a %b %m 100%%"), "śr sty 01 100%");
        assert_eq!(names.format_date(date, "%q%"), "%q%");
    }

    #[test]
    fn missing_translation_falls_back_to_default_locale() {
        let catalog = catalog();
        let names = CalendarNames::for_locale(catalog.translator("de-DE"));
        assert_eq!(names.long_days[3], "Wednesday");
    }

    #[test]
    fn hand_built_names_format_every_weekday_and_month() {
        let names = CalendarNames {
            long_days: DAYS.map(str::to_uppercase),
            short_days: DAYS.map(|d| d[..2].to_string()),
            long_months: MONTHS.map(str::to_uppercase),
            short_months: MONTHS.map(|m| m[..2].to_string()),
        };
        let mut date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        for _ in 0..366 {
            assert!(!names.format_date(date, "%A %a %B %b").is_empty());
            date = date.succ_opt().unwrap();
        }
        let date = NaiveDate::from_ymd_opt(2024, 12, 29).unwrap();
        assert_eq!(names.format_date(date, "%a %B"), "Su DECEMBER");
    }
}
