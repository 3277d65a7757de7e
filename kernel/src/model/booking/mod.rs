use crate::model::{id::BookingId, user::BookingOwner};
use chrono::{DateTime, NaiveDate, Utc};

pub mod clock;
pub mod conflict;
pub mod event;

use clock::TimeSlot;
use conflict::BookingSlot;

pub const BOOKING_NOT_FOUND: &str = "Booking not found";

#[derive(Debug, Clone)]
pub struct Booking {
    pub id: BookingId,
    pub date: NaiveDate,
    pub event: String,
    pub time: TimeSlot,
    pub room: String,
    pub pic: String,
    pub kapasitas: i32,
    pub rapat: String,
    pub catatan: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub owner: BookingOwner,
}

impl Booking {
    pub fn slot(&self) -> BookingSlot {
        BookingSlot::new(self.room.clone(), self.date, self.time)
    }
}
