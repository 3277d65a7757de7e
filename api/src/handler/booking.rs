use crate::{
    extractor::{AppJson, AppPath, AuthorizedUser, USER_NOT_FOUND},
    model::booking::{
        BookingResponse, CreateBookingRequest, CreateBookingRequestWithUserId, MessageResponse,
        UpdateBookingRequest,
    },
};
use axum::{extract::State, http::StatusCode, Json};
use kernel::model::{
    booking::{
        conflict::ROOM_ALREADY_BOOKED,
        event::{CreateBooking, DeleteBooking},
        Booking, BOOKING_NOT_FOUND,
    },
    id::{BookingId, UserId},
};
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

// An id that is not a UUID cannot reference an existing user either.
async fn find_owner(registry: &AppRegistry, raw_user_id: &str) -> AppResult<UserId> {
    let user_id = raw_user_id
        .parse::<UserId>()
        .map_err(|_| AppError::EntityNotFound(USER_NOT_FOUND.into()))?;
    registry
        .user_repository()
        .find_by_id(user_id)
        .await?
        .map(|user| user.id)
        .ok_or_else(|| AppError::EntityNotFound(USER_NOT_FOUND.into()))
}

async fn find_booking(registry: &AppRegistry, booking_id: BookingId) -> AppResult<Booking> {
    registry
        .booking_repository()
        .find_by_id(booking_id)
        .await?
        .ok_or_else(|| AppError::EntityNotFound(BOOKING_NOT_FOUND.into()))
}

pub async fn show_booking_list(
    _user: AuthorizedUser,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<Vec<BookingResponse>>> {
    registry
        .booking_repository()
        .find_all()
        .await
        .map(|bookings| bookings.into_iter().map(BookingResponse::from).collect())
        .map(Json)
}

pub async fn register_booking(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
    AppJson(req): AppJson<CreateBookingRequest>,
) -> AppResult<(StatusCode, Json<BookingResponse>)> {
    let event = CreateBooking::try_from(CreateBookingRequestWithUserId::new(user.id(), req))?;

    if registry.user_repository().find_by_id(user.id()).await?.is_none() {
        return Err(AppError::EntityNotFound(USER_NOT_FOUND.into()));
    }

    let booking_repository = registry.booking_repository();
    if booking_repository.has_conflict(&event.slot, None).await? {
        return Err(AppError::Conflict(ROOM_ALREADY_BOOKED.into()));
    }

    let booking = booking_repository.create(event).await?;
    tracing::info!(
        booking.id = %booking.id,
        booking.room = %booking.room,
        booking.date = %booking.date,
        user.id = %user.id(),
        "booking created"
    );

    Ok((StatusCode::CREATED, Json(booking.into())))
}

pub async fn show_booking(
    AppPath(booking_id): AppPath<BookingId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<BookingResponse>> {
    find_booking(&registry, booking_id)
        .await
        .map(BookingResponse::from)
        .map(Json)
}

pub async fn update_booking(
    AppPath(booking_id): AppPath<BookingId>,
    State(registry): State<AppRegistry>,
    AppJson(mut req): AppJson<UpdateBookingRequest>,
) -> AppResult<Json<BookingResponse>> {
    let current = find_booking(&registry, booking_id).await?;
    let new_owner = req.take_user_id();
    let mut event = req.into_event(&current)?;

    let booking_repository = registry.booking_repository();
    if event.touches_slot() {
        let slot = event.resolve_slot(&current.slot());
        if booking_repository
            .has_conflict(&slot, Some(booking_id))
            .await?
        {
            return Err(AppError::Conflict(ROOM_ALREADY_BOOKED.into()));
        }
    }

    if let Some(raw_user_id) = new_owner {
        event.user_id = Some(find_owner(&registry, &raw_user_id).await?);
    }

    let booking = booking_repository.update(event).await?;
    tracing::info!(booking.id = %booking.id, "booking updated");

    Ok(Json(booking.into()))
}

pub async fn delete_booking(
    AppPath(booking_id): AppPath<BookingId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<MessageResponse>> {
    let booking_repository = registry.booking_repository();
    if booking_repository.find_by_id(booking_id).await?.is_none() {
        return Err(AppError::EntityNotFound(BOOKING_NOT_FOUND.into()));
    }

    booking_repository
        .delete(DeleteBooking::new(booking_id))
        .await?;
    tracing::info!(booking.id = %booking_id, "booking deleted");

    Ok(Json(MessageResponse {
        message: "Booking deleted successfully".into(),
    }))
}
