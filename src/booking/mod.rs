mod conflict;
mod id_pool;
mod sort;

pub use id_pool::FreeIdPool;
pub use sort::{merge_sort_by, merge_sort_by_key};

use tracing::{debug, info};

use crate::collections::GrowableArray;
use crate::error::{Error, Result};
use crate::model::*;
use crate::observability::{
    BOOKINGS_ACTIVE, BOOKINGS_ADDED_TOTAL, BOOKINGS_CANCELLED_TOTAL, BOOKINGS_REJECTED_TOTAL,
};

use conflict::{check_no_conflict, validate_names, validate_span};

/// Room bookings with per-room, per-day overlap checks.
///
/// Storage is an unsorted growable array scanned linearly; catalogs are
/// small. Ids come from a [`FreeIdPool`] owned by this scheduler.
#[derive(Debug, Clone, Default)]
pub struct IntervalBookingScheduler {
    bookings: GrowableArray<Booking>,
    ids: FreeIdPool,
}

impl IntervalBookingScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a booking for `[start, end)` if nothing overlaps it in the same
    /// room on the same day. A rejected call changes nothing.
    pub fn add(
        &mut self,
        room: impl Into<String>,
        date: Date,
        start: TimeOfDay,
        end: TimeOfDay,
        owner: Option<String>,
    ) -> Result<Booking> {
        let room = room.into();
        let span = validate_span(start, end).inspect_err(|_| {
            metrics::counter!(BOOKINGS_REJECTED_TOTAL, "reason" => "invalid_interval").increment(1);
        })?;
        validate_names(&room, owner.as_deref())?;
        if let Err(e) = check_no_conflict(&self.bookings, &room, date, &span) {
            debug!(%room, %date, %start, %end, "booking rejected: {e}");
            metrics::counter!(BOOKINGS_REJECTED_TOTAL, "reason" => "conflict").increment(1);
            return Err(e);
        }

        let booking = Booking {
            id: self.ids.acquire(),
            room,
            date,
            start,
            end,
            owner,
        };
        self.bookings.add(booking.clone());

        info!(
            booking_id = booking.id,
            room = %booking.room,
            date = %booking.date,
            "booked {}-{}",
            booking.start,
            booking.end
        );
        metrics::counter!(BOOKINGS_ADDED_TOTAL).increment(1);
        metrics::gauge!(BOOKINGS_ACTIVE).set(self.bookings.len() as f64);
        Ok(booking)
    }

    /// Whether `[start, end)` is free in `room` on `date`. Never mutates.
    pub fn is_available(
        &self,
        room: &str,
        date: Date,
        start: TimeOfDay,
        end: TimeOfDay,
    ) -> Result<bool> {
        let span = validate_span(start, end)?;
        Ok(check_no_conflict(&self.bookings, room, date, &span).is_ok())
    }

    /// Remove the booking and release its id for reuse.
    pub fn cancel(&mut self, id: BookingId) -> Result<Booking> {
        let pos = self
            .bookings
            .position(|b| b.id == id)
            .ok_or_else(|| Error::NotFound(format!("booking #{id}")))?;
        let booking = self.bookings.remove_at(pos)?;
        self.ids.release(id);

        info!(booking_id = id, room = %booking.room, "booking cancelled");
        metrics::counter!(BOOKINGS_CANCELLED_TOTAL).increment(1);
        metrics::gauge!(BOOKINGS_ACTIVE).set(self.bookings.len() as f64);
        Ok(booking)
    }

    /// Snapshot ordered by `(date, start)`. Bookings with the same key keep
    /// their storage order.
    pub fn list_chronological(&self) -> Vec<Booking> {
        merge_sort_by_key(self.bookings.to_vec(), Booking::key)
    }

    pub fn find_exact(
        &self,
        room: &str,
        date: Date,
        start: TimeOfDay,
        end: TimeOfDay,
    ) -> Result<&Booking> {
        self.bookings
            .iter()
            .find(|b| b.is_same_day_in(room, date) && b.start == start && b.end == end)
            .ok_or_else(|| Error::NotFound(format!("booking for {room} on {date} {start}-{end}")))
    }

    pub fn get(&self, id: BookingId) -> Option<&Booking> {
        self.bookings.iter().find(|b| b.id == id)
    }

    pub fn len(&self) -> usize {
        self.bookings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookings.is_empty()
    }

    /// Bookings in storage order.
    pub fn iter(&self) -> impl Iterator<Item = &Booking> {
        self.bookings.iter()
    }
}
