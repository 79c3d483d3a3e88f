use std::fmt;

use chrono::{Datelike, Local, NaiveDate, TimeDelta};
use tracing::warn;

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const DAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// A logical calendar day. Arithmetic never goes through a timestamp, so there
/// is no local-timezone shifting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDate(NaiveDate);

impl CalendarDate {
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Today's date on the local wall clock.
    pub fn today() -> Self {
        Self(Local::now().date_naive())
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }

    /// Sunday = 0 .. Saturday = 6
    pub fn weekday_from_sunday(&self) -> u32 {
        self.0.weekday().num_days_from_sunday()
    }

    pub fn day_name(&self) -> &'static str {
        DAY_NAMES[self.weekday_from_sunday() as usize]
    }

    /// Offsets by whole days, clamping to chrono's first and last representable date.
    pub fn add_days(&self, days: i64) -> Self {
        let limit = if days < 0 { NaiveDate::MIN } else { NaiveDate::MAX };
        let shifted = TimeDelta::try_days(days).and_then(|delta| self.0.checked_add_signed(delta));
        Self(shifted.unwrap_or(limit))
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year(), self.month(), self.day())
    }
}

/// "2024-03-05" -> "Mar 5, 2024". Anything that doesn't look like a date is
/// echoed back unchanged.
pub fn to_display_string(input: &str) -> String {
    let parts: Vec<&str> = input.split('-').collect();
    let [year, month, day] = parts.as_slice() else {
        return input.to_string();
    };

    let (Ok(year), Ok(month), Ok(day)) = (
        year.parse::<i32>(),
        month.parse::<usize>(),
        day.parse::<u32>(),
    ) else {
        return input.to_string();
    };

    match month.checked_sub(1).and_then(|m| MONTH_ABBREVIATIONS.get(m)) {
        Some(name) => format!("{} {}, {}", name, day, year),
        None => input.to_string(),
    }
}

/// "2024-01-31" -> "01/31/2024", falling back to today's date when the input
/// does not have three parts.
pub fn to_api_string(input: &str) -> String {
    to_api_string_with_today(input, CalendarDate::today())
}

/// Reorders the substrings as-is; no numeric parsing happens on the happy path.
pub fn to_api_string_with_today(input: &str, today: CalendarDate) -> String {
    let parts: Vec<&str> = input.split('-').collect();
    match parts.as_slice() {
        [year, month, day] => format!("{}/{}/{}", month, day, year),
        _ => {
            warn!(input, "malformed date input, querying today's games instead");
            format!("{:02}/{:02}/{}", today.month(), today.day(), today.year())
        }
    }
}

/// "YYYY-MM-DD" for the date input control.
pub fn to_input_string(date: CalendarDate) -> String {
    date.to_string()
}

pub fn parse_input(input: &str) -> Option<CalendarDate> {
    let parts: Vec<&str> = input.trim().split('-').collect();
    let [year, month, day] = parts.as_slice() else {
        return None;
    };
    CalendarDate::from_ymd(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

/// Reads the date control, substituting `today` for anything unparseable.
pub fn date_from_input(input: &str, today: CalendarDate) -> CalendarDate {
    parse_input(input).unwrap_or_else(|| {
        warn!(input, "unreadable date input, using today");
        today
    })
}
