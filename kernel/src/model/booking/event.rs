use super::{clock::TimeSlot, conflict::BookingSlot};
use crate::model::id::{BookingId, UserId};
use chrono::NaiveDate;
use derive_new::new;

#[derive(Debug, new)]
pub struct CreateBooking {
    pub booked_by: UserId,
    pub slot: BookingSlot,
    pub event: String,
    pub pic: String,
    pub kapasitas: i32,
    pub rapat: String,
    pub catatan: String,
}

/// Partial update; `None` leaves the stored value untouched.
#[derive(Debug, Default)]
pub struct UpdateBooking {
    pub booking_id: BookingId,
    pub user_id: Option<UserId>,
    pub date: Option<NaiveDate>,
    pub event: Option<String>,
    pub time: Option<TimeSlot>,
    pub room: Option<String>,
    pub pic: Option<String>,
    pub kapasitas: Option<i32>,
    pub rapat: Option<String>,
    pub catatan: Option<String>,
}

impl UpdateBooking {
    pub fn touches_slot(&self) -> bool {
        self.date.is_some() || self.time.is_some() || self.room.is_some()
    }

    /// The slot the booking will occupy once this update is applied to `current`.
    pub fn resolve_slot(&self, current: &BookingSlot) -> BookingSlot {
        BookingSlot {
            room: self.room.clone().unwrap_or_else(|| current.room.clone()),
            date: self.date.unwrap_or(current.date),
            time: self.time.unwrap_or(current.time),
        }
    }
}

#[derive(Debug, new)]
pub struct DeleteBooking {
    pub booking_id: BookingId,
}
