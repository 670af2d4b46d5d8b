use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// Unix milliseconds, used for job timestamps.
pub type Ms = i64;

pub type BookingId = u32;
pub type JobId = u64;

pub fn now_ms() -> Ms {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as Ms)
        .unwrap_or_default()
}

// ── Calendar types ───────────────────────────────────────────────

/// A calendar day. Field order makes the derived `Ord` chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Date {
    year: i32,
    month: u8,
    day: u8,
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn days_in_month(year: i32, month: u8) -> u8 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

impl Date {
    pub fn new(year: i32, month: u8, day: u8) -> Option<Self> {
        if !(1..=12).contains(&month) || day == 0 || day > days_in_month(year, month) {
            return None;
        }
        Some(Self { year, month, day })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u8 {
        self.month
    }

    pub fn day(&self) -> u8 {
        self.day
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError(pub String);

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "parse error: {}", self.0)
    }
}

impl std::error::Error for ParseError {}

impl FromStr for Date {
    type Err = ParseError;

    /// Parses `YYYY-MM-DD`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || ParseError(format!("invalid date {s:?}, expected YYYY-MM-DD"));
        let mut parts = s.trim().splitn(3, '-');
        let year = parts.next().and_then(|p| p.parse().ok()).ok_or_else(bad)?;
        let month = parts.next().and_then(|p| p.parse().ok()).ok_or_else(bad)?;
        let day = parts.next().and_then(|p| p.parse().ok()).ok_or_else(bad)?;
        Date::new(year, month, day).ok_or_else(bad)
    }
}

impl TryFrom<String> for Date {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Date> for String {
    fn from(value: Date) -> Self {
        value.to_string()
    }
}

/// Minutes since midnight, `00:00` through `23:59`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    pub const MINUTES_PER_DAY: u16 = 24 * 60;

    pub fn new(hour: u8, minute: u8) -> Option<Self> {
        if hour >= 24 || minute >= 60 {
            return None;
        }
        Some(Self(u16::from(hour) * 60 + u16::from(minute)))
    }

    pub fn from_minutes(minutes: u16) -> Option<Self> {
        (minutes < Self::MINUTES_PER_DAY).then_some(Self(minutes))
    }

    pub fn minutes(&self) -> u16 {
        self.0
    }

    pub fn hour(&self) -> u8 {
        (self.0 / 60) as u8
    }

    pub fn minute(&self) -> u8 {
        (self.0 % 60) as u8
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for TimeOfDay {
    type Err = ParseError;

    /// Parses 24-hour `HH:MM`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || ParseError(format!("invalid time {s:?}, expected HH:MM"));
        let (h, m) = s.trim().split_once(':').ok_or_else(bad)?;
        let hour = h.parse().map_err(|_| bad())?;
        let minute = m.parse().map_err(|_| bad())?;
        TimeOfDay::new(hour, minute).ok_or_else(bad)
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        value.to_string()
    }
}

/// Half-open interval `[start, end)` within one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSpan {
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

impl TimeSpan {
    pub fn new(start: TimeOfDay, end: TimeOfDay) -> Self {
        debug_assert!(start < end, "TimeSpan start must be before end");
        Self { start, end }
    }

    pub fn duration_minutes(&self) -> u16 {
        self.end.minutes() - self.start.minutes()
    }

    pub fn overlaps(&self, other: &TimeSpan) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn contains_instant(&self, t: TimeOfDay) -> bool {
        self.start <= t && t < self.end
    }
}

// ── Bookings ─────────────────────────────────────────────────────

/// Room codes compare without regard to case ("a101" books the same room as "A101").
pub fn rooms_match(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

/// A stored reservation. Deserialization rejects records whose `start` is
/// not before `end`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Booking {
    pub id: BookingId,
    pub room: String,
    pub date: Date,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
    pub owner: Option<String>,
}

impl<'de> Deserialize<'de> for Booking {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Record {
            id: BookingId,
            room: String,
            date: Date,
            start: TimeOfDay,
            end: TimeOfDay,
            owner: Option<String>,
        }

        let r = Record::deserialize(deserializer)?;
        if r.start >= r.end {
            return Err(serde::de::Error::custom(format!(
                "booking #{}: start {} must be before end {}",
                r.id, r.start, r.end
            )));
        }
        Ok(Booking {
            id: r.id,
            room: r.room,
            date: r.date,
            start: r.start,
            end: r.end,
            owner: r.owner,
        })
    }
}

impl Booking {
    /// Chronological sort key.
    pub fn key(&self) -> (Date, TimeOfDay) {
        (self.date, self.start)
    }

    pub fn span(&self) -> TimeSpan {
        TimeSpan::new(self.start, self.end)
    }

    pub fn is_same_day_in(&self, room: &str, date: Date) -> bool {
        self.date == date && rooms_match(&self.room, room)
    }
}

// ── Jobs ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PriorityClass {
    Low,
    Normal,
    High,
}

impl PriorityClass {
    /// Higher rank is served first.
    pub fn rank(self) -> u8 {
        match self {
            PriorityClass::Low => 1,
            PriorityClass::Normal => 2,
            PriorityClass::High => 3,
        }
    }
}

impl fmt::Display for PriorityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PriorityClass::Low => "LOW",
            PriorityClass::Normal => "NORMAL",
            PriorityClass::High => "HIGH",
        };
        f.write_str(s)
    }
}

impl FromStr for PriorityClass {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HIGH" => Ok(PriorityClass::High),
            "NORMAL" => Ok(PriorityClass::Normal),
            "LOW" => Ok(PriorityClass::Low),
            _ => Err(ParseError(format!(
                "invalid priority {s:?}, expected HIGH, NORMAL or LOW"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPayload {
    pub name: String,
    pub pages: u32,
}

impl JobPayload {
    pub fn new(name: impl Into<String>, pages: u32) -> Self {
        Self {
            name: name.into(),
            pages,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledJob {
    pub id: JobId,
    pub payload: JobPayload,
    pub priority: PriorityClass,
    pub submitted_at: Ms,
    /// Set when the job leaves the queue.
    pub served_at: Option<Ms>,
}

impl ScheduledJob {
    /// Case-insensitive substring match on the payload name.
    /// `term` is expected trimmed and non-empty.
    pub fn matches_name(&self, term: &str) -> bool {
        self.payload
            .name
            .to_lowercase()
            .contains(&term.to_lowercase())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityCount {
    pub high: usize,
    pub normal: usize,
    pub low: usize,
}

impl PriorityCount {
    pub fn total(&self) -> usize {
        self.high + self.normal + self.low
    }
}
