use crate::collections::GrowableArray;
use crate::error::{Error, Result};
use crate::limits::*;
use crate::model::*;

pub(crate) fn validate_span(start: TimeOfDay, end: TimeOfDay) -> Result<TimeSpan> {
    if start >= end {
        return Err(Error::InvalidInterval { start, end });
    }
    Ok(TimeSpan::new(start, end))
}

pub(crate) fn validate_names(room: &str, owner: Option<&str>) -> Result<()> {
    if room.len() > MAX_ROOM_LEN {
        return Err(Error::LimitExceeded("room name too long"));
    }
    if owner.is_some_and(|o| o.len() > MAX_OWNER_LEN) {
        return Err(Error::LimitExceeded("owner name too long"));
    }
    Ok(())
}

/// First stored booking in the same room on the same day whose
/// `[start, end)` overlaps `span`. Touching endpoints do not overlap.
pub(crate) fn find_conflict<'a>(
    bookings: &'a GrowableArray<Booking>,
    room: &str,
    date: Date,
    span: &TimeSpan,
) -> Option<&'a Booking> {
    bookings
        .iter()
        .filter(|b| b.is_same_day_in(room, date))
        .find(|b| b.span().overlaps(span))
}

pub(crate) fn check_no_conflict(
    bookings: &GrowableArray<Booking>,
    room: &str,
    date: Date,
    span: &TimeSpan,
) -> Result<()> {
    match find_conflict(bookings, room, date, span) {
        Some(existing) => Err(Error::Conflict(existing.id)),
        None => Ok(()),
    }
}
