use crate::model::{
    booking::{
        conflict::BookingSlot,
        event::{CreateBooking, DeleteBooking, UpdateBooking},
        Booking,
    },
    id::BookingId,
};
use async_trait::async_trait;
use shared::error::AppResult;

#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Stores a new booking. Fails with `AppError::Conflict` if the slot is taken.
    async fn create(&self, event: CreateBooking) -> AppResult<Booking>;
    /// All bookings, latest date first.
    async fn find_all(&self) -> AppResult<Vec<Booking>>;
    async fn find_by_id(&self, booking_id: BookingId) -> AppResult<Option<Booking>>;
    /// Applies a partial update. Fails with `AppError::EntityNotFound` for an
    /// unknown id and `AppError::Conflict` if the resulting slot is taken.
    async fn update(&self, event: UpdateBooking) -> AppResult<Booking>;
    async fn delete(&self, event: DeleteBooking) -> AppResult<()>;
    async fn has_conflict(&self, slot: &BookingSlot, exclude: Option<BookingId>) -> AppResult<bool>;
}
