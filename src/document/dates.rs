/*!
 * Calendar dates in the two textual encodings used by the templates.
 *
 * - `DMY`: `D-MM-YYYY`, day not zero-padded when rendered
 * - `YMD`: `YYYY-MM-DD`, fully padded
 *
 * The rendered forms must match the template's literal placeholders byte for
 * byte. Dates are never checked for calendar validity.
 */

use chrono::{Datelike, Duration, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

use crate::errors::DateError;

static YEAR_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d{4}").expect("Invalid year regex")
});

static DAY_MONTH_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d{1,2}").expect("Invalid day/month regex")
});

/// A year/month/day triple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CalendarDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl CalendarDate {
    /// Parse `DD-MM-YYYY`
    pub fn parse_dmy(input: &str) -> Result<Self, DateError> {
        let (year, groups) = Self::digit_groups(input)?;
        Ok(Self { year, day: groups[0], month: groups[1] })
    }

    /// Parse `YYYY-MM-DD`
    pub fn parse_ymd(input: &str) -> Result<Self, DateError> {
        let (year, groups) = Self::digit_groups(input)?;
        Ok(Self { year, month: groups[0], day: groups[1] })
    }

    /// Year from the first four-digit group, then the short groups of the
    /// remaining text in order. The year is cut out before the short scan so
    /// its digits can never be mistaken for a day or month.
    fn digit_groups(input: &str) -> Result<(i32, Vec<u32>), DateError> {
        let ambiguous = |reason: &str| DateError::DateParseAmbiguous {
            input: input.to_string(),
            reason: reason.to_string(),
        };

        let year_match = YEAR_REGEX.find(input).ok_or_else(|| ambiguous("no four-digit year group"))?;
        let year = year_match
            .as_str()
            .parse::<i32>()
            .map_err(|_| ambiguous("unreadable year group"))?;

        let rest = format!("{} {}", &input[..year_match.start()], &input[year_match.end()..]);
        let groups: Vec<u32> = DAY_MONTH_REGEX
            .find_iter(&rest)
            .filter_map(|m| m.as_str().parse().ok())
            .collect();

        if groups.len() < 2 {
            return Err(ambiguous("expected day and month groups"));
        }

        Ok((year, groups))
    }

    /// Resolve a command line date argument against `today`
    ///
    /// An all-digit argument is an offset in days, an empty one means today,
    /// `YYYY-...` is read as YMD and anything else as DMY.
    pub fn from_cli_argument(argument: &str, today: NaiveDate) -> Result<Self, DateError> {
        let argument = argument.trim();

        if argument.is_empty() {
            return Ok(Self::from(today));
        }

        if argument.chars().all(|c| c.is_ascii_digit()) {
            let out_of_range = || DateError::DateParseAmbiguous {
                input: argument.to_string(),
                reason: "day offset out of range".to_string(),
            };
            let days: i64 = argument.parse().map_err(|_| out_of_range())?;
            let date = Duration::try_days(days)
                .and_then(|offset| today.checked_add_signed(offset))
                .ok_or_else(out_of_range)?;
            return Ok(Self::from(date));
        }

        let starts_with_year = argument
            .get(..4)
            .is_some_and(|head| head.chars().all(|c| c.is_ascii_digit()))
            && argument
                .get(4..)
                .is_some_and(|tail| !tail.is_empty() && !tail.starts_with(|c: char| c.is_ascii_digit()));

        if starts_with_year {
            Self::parse_ymd(argument)
        } else {
            Self::parse_dmy(argument)
        }
    }

    /// `D-MM-YYYY` with an unpadded day
    pub fn dmy(&self) -> String {
        format!("{}-{:02}-{}", self.day, self.month, self.year)
    }

    /// `YYYY-MM-DD`
    pub fn ymd(&self) -> String {
        format!("{}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

impl From<NaiveDate> for CalendarDate {
    fn from(date: NaiveDate) -> Self {
        Self { year: date.year(), month: date.month(), day: date.day() }
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ymd())
    }
}
