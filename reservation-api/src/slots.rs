//! Reservation time slots and the overlap rule.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

use shared::{Error, Reservation, Result};

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const TIME_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M"];

/// Parse a slot timestamp.
///
/// Accepts RFC 3339 (normalised to UTC), a naive date-time, or a bare time of
/// day which is placed on `date`.
pub fn parse_timestamp(value: &str, date: &str) -> Option<NaiveDateTime> {
    let value = value.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.naive_utc());
    }

    for format in DATE_TIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Some(parsed);
        }
    }

    let day = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").ok()?;
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(value, format).ok())
        .map(|time| day.and_time(time))
}

/// A half-open `[start, end)` interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Slot {
    /// Validate requested slot boundaries before anything is written.
    pub fn from_request(date: &str, start: &str, end: &str) -> Result<Self> {
        let start_at = parse_timestamp(start, date).ok_or_else(|| {
            Error::Validation(format!("slotTimeStart is not a valid date-time: {}", start))
        })?;
        let end_at = parse_timestamp(end, date).ok_or_else(|| {
            Error::Validation(format!("slotTimeEnd is not a valid date-time: {}", end))
        })?;

        if end_at <= start_at {
            return Err(Error::Validation(format!(
                "slotTimeEnd ({}) must be after slotTimeStart ({})",
                end, start
            )));
        }

        Ok(Self {
            start: start_at,
            end: end_at,
        })
    }

    /// Intervals conflict when they share any instant; touching ends do not.
    pub fn overlaps(&self, other: &Slot) -> bool {
        if self.end == other.start || self.start == other.end {
            return false;
        }
        self.start < other.end && self.end > other.start
    }
}

/// Whether `requested` collides with an already stored reservation.
///
/// Stored reservations with an empty boundary never collide. A stored
/// boundary that cannot be parsed is corrupt data and aborts the check.
pub fn conflicts_with(requested: &Slot, existing: &Reservation) -> Result<bool> {
    if existing.slot_time_start.trim().is_empty() || existing.slot_time_end.trim().is_empty() {
        return Ok(false);
    }

    let parse = |value: &str| {
        parse_timestamp(value, &existing.date).ok_or_else(|| {
            Error::CorruptData(format!(
                "Reservation {} has an invalid slot time: {}",
                existing.id, value
            ))
        })
    };

    let stored = Slot {
        start: parse(&existing.slot_time_start)?,
        end: parse(&existing.slot_time_end)?,
    };
    Ok(requested.overlaps(&stored))
}
