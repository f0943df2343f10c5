//! Slot templates and booked slot occurrences

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::validation::FieldError;

/// Day of the week a slot template recurs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
        }
    }

    /// Accepts full names and three-letter abbreviations, any case
    pub fn parse(s: &str) -> Option<Self> {
        let lower = s.trim().to_ascii_lowercase();
        Weekday::ALL.into_iter().find(|day| {
            let name = day.as_str().to_ascii_lowercase();
            name == lower || name[..3] == lower
        })
    }

    pub fn of(date: NaiveDate) -> Self {
        date.weekday().into()
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(day: chrono::Weekday) -> Self {
        match day {
            chrono::Weekday::Mon => Weekday::Monday,
            chrono::Weekday::Tue => Weekday::Tuesday,
            chrono::Weekday::Wed => Weekday::Wednesday,
            chrono::Weekday::Thu => Weekday::Thursday,
            chrono::Weekday::Fri => Weekday::Friday,
            chrono::Weekday::Sat => Weekday::Saturday,
            chrono::Weekday::Sun => Weekday::Sunday,
        }
    }
}

impl TryFrom<String> for Weekday {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Weekday::parse(&value).ok_or_else(|| format!("invalid weekday: {value}"))
    }
}

impl From<Weekday> for String {
    fn from(day: Weekday) -> Self {
        day.as_str().to_string()
    }
}

impl std::fmt::Display for Weekday {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wall-clock time in 24-hour `HH:MM` form, stored as minutes after midnight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    pub fn new(hour: u16, minute: u16) -> Option<Self> {
        (hour < 24 && minute < 60).then_some(Self(hour * 60 + minute))
    }

    /// Strict `HH:MM` parsing: two digits each, 00:00 through 23:59
    pub fn parse(s: &str) -> Option<Self> {
        let (h, m) = s.split_once(':')?;
        if h.len() != 2 || m.len() != 2 {
            return None;
        }
        if !h.chars().chain(m.chars()).all(|c| c.is_ascii_digit()) {
            return None;
        }
        Self::new(h.parse().ok()?, m.parse().ok()?)
    }

    pub fn hour(&self) -> u16 {
        self.0 / 60
    }

    pub fn minute(&self) -> u16 {
        self.0 % 60
    }

    pub fn minutes_since_midnight(&self) -> u16 {
        self.0
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        TimeOfDay::parse(&value).ok_or_else(|| format!("invalid time, expected HH:MM: {value}"))
    }
}

impl From<TimeOfDay> for String {
    fn from(time: TimeOfDay) -> Self {
        time.to_string()
    }
}

impl std::fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

/// A recurring weekly availability window on a turf
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotTemplate {
    pub day: Weekday,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
}

impl SlotTemplate {
    pub fn new(day: Weekday, start_time: TimeOfDay, end_time: TimeOfDay) -> Result<Self, FieldError> {
        let template = Self {
            day,
            start_time,
            end_time,
        };
        template.validate()?;
        Ok(template)
    }

    pub fn validate(&self) -> Result<(), FieldError> {
        if self.start_time >= self.end_time {
            return Err(FieldError::new(
                "slots",
                format!(
                    "{} {}-{}: start time must be before end time",
                    self.day, self.start_time, self.end_time
                ),
            ));
        }
        Ok(())
    }

    pub fn duration_minutes(&self) -> u16 {
        self.end_time
            .minutes_since_midnight()
            .saturating_sub(self.start_time.minutes_since_midnight())
    }
}

/// Validate a turf's template list: at least one, each well-formed, no duplicates
pub fn validate_slot_templates(slots: &[SlotTemplate]) -> Result<(), FieldError> {
    if slots.is_empty() {
        return Err(FieldError::new("slots", "At least one slot is required"));
    }
    for (i, slot) in slots.iter().enumerate() {
        slot.validate()?;
        if slots[..i].contains(slot) {
            return Err(FieldError::new(
                "slots",
                format!("Duplicate slot {} {}-{}", slot.day, slot.start_time, slot.end_time),
            ));
        }
    }
    Ok(())
}

/// One concrete occurrence of a slot: a calendar date plus a time window.
///
/// The date is authoritative; `day` is derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookingSlot {
    pub date: NaiveDate,
    pub day: Weekday,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
}

impl BookingSlot {
    pub fn new(date: NaiveDate, start_time: TimeOfDay, end_time: TimeOfDay) -> Result<Self, FieldError> {
        if start_time >= end_time {
            return Err(FieldError::new("end_time", "Start time must be before end time"));
        }
        Ok(Self {
            date,
            day: Weekday::of(date),
            start_time,
            end_time,
        })
    }

    pub fn matches_template(&self, template: &SlotTemplate) -> bool {
        self.day == template.day
            && self.start_time == template.start_time
            && self.end_time == template.end_time
    }

    /// Two slots are the same occurrence when date and window are identical
    pub fn same_occurrence(&self, other: &BookingSlot) -> bool {
        self.date == other.date
            && self.start_time == other.start_time
            && self.end_time == other.end_time
    }

    pub fn duration_minutes(&self) -> u16 {
        self.end_time
            .minutes_since_midnight()
            .saturating_sub(self.start_time.minutes_since_midnight())
    }
}

/// Raw slot selection as submitted by a customer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlotRequest {
    pub date: String,
    #[serde(default)]
    pub day: Option<String>,
    pub start_time: String,
    pub end_time: String,
}

impl SlotRequest {
    /// Parse into a [`BookingSlot`], checking the optional weekday against the date
    pub fn resolve(&self) -> Result<BookingSlot, FieldError> {
        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d")
            .map_err(|_| FieldError::new("date", "Date must be in YYYY-MM-DD format"))?;
        let start = TimeOfDay::parse(self.start_time.trim())
            .ok_or_else(|| FieldError::new("start_time", "Start time must be in HH:MM format"))?;
        let end = TimeOfDay::parse(self.end_time.trim())
            .ok_or_else(|| FieldError::new("end_time", "End time must be in HH:MM format"))?;

        let slot = BookingSlot::new(date, start, end)?;

        if let Some(day) = self.day.as_deref().filter(|d| !d.trim().is_empty()) {
            let day = Weekday::parse(day)
                .ok_or_else(|| FieldError::new("day", format!("Unknown weekday: {day}")))?;
            if day != slot.day {
                return Err(FieldError::new(
                    "day",
                    format!("{} falls on a {}, not a {}", slot.date, slot.day, day),
                ));
            }
        }

        Ok(slot)
    }
}
