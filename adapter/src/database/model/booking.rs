use kernel::model::{
    booking::{
        clock::{ClockTime, TimeSlot},
        conflict::BookingSlot,
        Booking,
    },
    id::{BookingId, UserId},
    user::BookingOwner,
};
use shared::error::AppError;
use sqlx::types::chrono::{DateTime, NaiveDate, Utc};

fn time_slot(start: (i16, i16), end: (i16, i16)) -> Result<TimeSlot, AppError> {
    let clock = |(hour, minute): (i16, i16)| {
        ClockTime::try_new(hour.into(), minute.into()).ok_or_else(|| {
            AppError::ConversionEntityError(format!("stored clock time {hour}:{minute} is out of range"))
        })
    };
    TimeSlot::new(clock(start)?, clock(end)?).ok_or_else(|| {
        AppError::ConversionEntityError("stored booking ends before it starts".into())
    })
}

// A booking joined with its owner.
#[derive(sqlx::FromRow)]
pub struct BookingRow {
    pub booking_id: BookingId,
    pub booking_date: NaiveDate,
    pub event: String,
    pub clock_start_hour: i16,
    pub clock_start_minute: i16,
    pub clock_end_hour: i16,
    pub clock_end_minute: i16,
    pub room: String,
    pub pic: String,
    pub kapasitas: i32,
    pub rapat: String,
    pub catatan: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user_id: UserId,
    pub username: String,
    pub user_created_at: DateTime<Utc>,
    pub user_updated_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = AppError;

    fn try_from(value: BookingRow) -> Result<Self, Self::Error> {
        let BookingRow {
            booking_id,
            booking_date,
            event,
            clock_start_hour,
            clock_start_minute,
            clock_end_hour,
            clock_end_minute,
            room,
            pic,
            kapasitas,
            rapat,
            catatan,
            created_at,
            updated_at,
            user_id,
            username,
            user_created_at,
            user_updated_at,
        } = value;
        Ok(Booking {
            id: booking_id,
            date: booking_date,
            event,
            time: time_slot(
                (clock_start_hour, clock_start_minute),
                (clock_end_hour, clock_end_minute),
            )?,
            room,
            pic,
            kapasitas,
            rapat,
            catatan,
            created_at,
            updated_at,
            owner: BookingOwner {
                user_id,
                username,
                created_at: user_created_at,
                updated_at: user_updated_at,
            },
        })
    }
}

// Just enough of a booking to run the conflict check.
#[derive(sqlx::FromRow)]
pub struct BookingSlotRow {
    pub booking_id: BookingId,
    pub room: String,
    pub booking_date: NaiveDate,
    pub clock_start_hour: i16,
    pub clock_start_minute: i16,
    pub clock_end_hour: i16,
    pub clock_end_minute: i16,
}

impl BookingSlotRow {
    pub fn into_slot(self) -> Result<(BookingId, BookingSlot), AppError> {
        let BookingSlotRow {
            booking_id,
            room,
            booking_date,
            clock_start_hour,
            clock_start_minute,
            clock_end_hour,
            clock_end_minute,
        } = self;
        let time = time_slot(
            (clock_start_hour, clock_start_minute),
            (clock_end_hour, clock_end_minute),
        )?;
        Ok((booking_id, BookingSlot::new(room, booking_date, time)))
    }
}
