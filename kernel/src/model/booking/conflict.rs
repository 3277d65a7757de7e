//! Booking conflict detection.
//!
//! Two bookings conflict when they reserve the same room on the same calendar
//! day and their hour-level intervals overlap (see [`TimeSlot::overlaps_by_hour`]).
//! This is a read-side check only; stores that need exclusivity under
//! concurrent writers have to repeat it inside their own transaction.

use super::clock::TimeSlot;
use crate::model::id::BookingId;
use chrono::NaiveDate;
use derive_new::new;

pub const ROOM_ALREADY_BOOKED: &str = "Room is already booked for this time period";

/// Where and when a booking takes place.
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct BookingSlot {
    pub room: String,
    pub date: NaiveDate,
    pub time: TimeSlot,
}

impl BookingSlot {
    pub fn conflicts_with(&self, existing: &BookingSlot) -> bool {
        self.room == existing.room
            && self.date == existing.date
            && existing.time.overlaps_by_hour(self.time)
    }
}

/// Returns true as soon as one of `existing` conflicts with `candidate`.
/// The booking named by `exclude` is skipped, which lets an update be checked
/// against everything except itself.
pub fn has_conflict<'a, I>(candidate: &BookingSlot, existing: I, exclude: Option<BookingId>) -> bool
where
    I: IntoIterator<Item = (BookingId, &'a BookingSlot)>,
{
    existing
        .into_iter()
        .filter(|(id, _)| Some(*id) != exclude)
        .any(|(_, slot)| candidate.conflicts_with(slot))
}
