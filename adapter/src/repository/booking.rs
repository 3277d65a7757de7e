use crate::database::{
    model::booking::{BookingRow, BookingSlotRow},
    ConnectionPool,
};
use async_trait::async_trait;
use derive_new::new;
use kernel::model::{
    booking::{
        conflict::{has_conflict, BookingSlot, ROOM_ALREADY_BOOKED},
        event::{CreateBooking, DeleteBooking, UpdateBooking},
        Booking, BOOKING_NOT_FOUND,
    },
    id::BookingId,
};
use kernel::repository::booking::BookingRepository;
use shared::error::{AppError, AppResult};
use sqlx::{Executor, Postgres};

#[derive(new)]
pub struct BookingRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl BookingRepository for BookingRepositoryImpl {
    async fn create(&self, event: CreateBooking) -> AppResult<Booking> {
        let mut tx = self.db.begin().await?;
        self.set_transaction_serializable(&mut tx).await?;

        // Repeat the conflict check inside the transaction; a concurrent
        // writer that slips past it makes the commit fail with 40001.
        if slot_taken(&mut *tx, &event.slot, None).await? {
            return Err(AppError::Conflict(ROOM_ALREADY_BOOKED.into()));
        }

        let booking_id = BookingId::new();
        let time = event.slot.time;
        let res = sqlx::query(
            r#"
                INSERT INTO bookings
                (booking_id, user_id, booking_date, event,
                clock_start_hour, clock_start_minute, clock_end_hour, clock_end_minute,
                room, pic, kapasitas, rapat, catatan)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(booking_id)
        .bind(event.booked_by)
        .bind(event.slot.date)
        .bind(&event.event)
        .bind(i16::from(time.start().hour()))
        .bind(i16::from(time.start().minute()))
        .bind(i16::from(time.end().hour()))
        .bind(i16::from(time.end().minute()))
        .bind(&event.slot.room)
        .bind(&event.pic)
        .bind(event.kapasitas)
        .bind(&event.rapat)
        .bind(&event.catatan)
        .execute(&mut *tx)
        .await
        .map_err(write_error)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "No booking record has been created".into(),
            ));
        }

        let booking = fetch_booking(&mut *tx, booking_id).await?.ok_or_else(|| {
            AppError::NoRowsAffectedError("Created booking could not be read back".into())
        })?;

        tx.commit().await.map_err(commit_error)?;

        Ok(booking)
    }

    async fn find_all(&self) -> AppResult<Vec<Booking>> {
        sqlx::query_as::<_, BookingRow>(
            r#"
                SELECT
                b.booking_id,
                b.booking_date,
                b.event,
                b.clock_start_hour,
                b.clock_start_minute,
                b.clock_end_hour,
                b.clock_end_minute,
                b.room,
                b.pic,
                b.kapasitas,
                b.rapat,
                b.catatan,
                b.created_at,
                b.updated_at,
                u.user_id,
                u.username,
                u.created_at AS user_created_at,
                u.updated_at AS user_updated_at
                FROM bookings AS b
                INNER JOIN users AS u ON b.user_id = u.user_id
                ORDER BY b.booking_date DESC, b.created_at DESC
            "#,
        )
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?
        .into_iter()
        .map(Booking::try_from)
        .collect()
    }

    async fn find_by_id(&self, booking_id: BookingId) -> AppResult<Option<Booking>> {
        fetch_booking(self.db.inner_ref(), booking_id).await
    }

    async fn update(&self, event: UpdateBooking) -> AppResult<Booking> {
        let mut tx = self.db.begin().await?;
        self.set_transaction_serializable(&mut tx).await?;

        {
            let current = sqlx::query_as::<_, BookingSlotRow>(
                r#"
                    SELECT booking_id, room, booking_date,
                    clock_start_hour, clock_start_minute, clock_end_hour, clock_end_minute
                    FROM bookings
                    WHERE booking_id = $1
                    FOR UPDATE
                "#,
            )
            .bind(event.booking_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(write_error)?
            .ok_or_else(|| AppError::EntityNotFound(BOOKING_NOT_FOUND.into()))?;

            if event.touches_slot() {
                let (_, current) = current.into_slot()?;
                let target = event.resolve_slot(&current);
                if slot_taken(&mut *tx, &target, Some(event.booking_id)).await? {
                    return Err(AppError::Conflict(ROOM_ALREADY_BOOKED.into()));
                }
            }
        }

        let start = event.time.map(|t| t.start());
        let end = event.time.map(|t| t.end());
        let res = sqlx::query(
            r#"
                UPDATE bookings
                SET
                    user_id = COALESCE($2, user_id),
                    booking_date = COALESCE($3, booking_date),
                    event = COALESCE($4, event),
                    clock_start_hour = COALESCE($5, clock_start_hour),
                    clock_start_minute = COALESCE($6, clock_start_minute),
                    clock_end_hour = COALESCE($7, clock_end_hour),
                    clock_end_minute = COALESCE($8, clock_end_minute),
                    room = COALESCE($9, room),
                    pic = COALESCE($10, pic),
                    kapasitas = COALESCE($11, kapasitas),
                    rapat = COALESCE($12, rapat),
                    catatan = COALESCE($13, catatan)
                WHERE booking_id = $1
            "#,
        )
        .bind(event.booking_id)
        .bind(event.user_id)
        .bind(event.date)
        .bind(&event.event)
        .bind(start.map(|c| i16::from(c.hour())))
        .bind(start.map(|c| i16::from(c.minute())))
        .bind(end.map(|c| i16::from(c.hour())))
        .bind(end.map(|c| i16::from(c.minute())))
        .bind(&event.room)
        .bind(&event.pic)
        .bind(event.kapasitas)
        .bind(&event.rapat)
        .bind(&event.catatan)
        .execute(&mut *tx)
        .await
        .map_err(write_error)?;

        if res.rows_affected() < 1 {
            return Err(AppError::EntityNotFound(BOOKING_NOT_FOUND.into()));
        }

        let booking = fetch_booking(&mut *tx, event.booking_id)
            .await?
            .ok_or_else(|| AppError::EntityNotFound(BOOKING_NOT_FOUND.into()))?;

        tx.commit().await.map_err(commit_error)?;

        Ok(booking)
    }

    async fn delete(&self, event: DeleteBooking) -> AppResult<()> {
        let res = sqlx::query(
            r#"
                DELETE FROM bookings WHERE booking_id = $1
            "#,
        )
        .bind(event.booking_id)
        .execute(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::EntityNotFound(BOOKING_NOT_FOUND.into()));
        }

        Ok(())
    }

    async fn has_conflict(&self, slot: &BookingSlot, exclude: Option<BookingId>) -> AppResult<bool> {
        slot_taken(self.db.inner_ref(), slot, exclude).await
    }
}

impl BookingRepositoryImpl {
    async fn set_transaction_serializable(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    ) -> AppResult<()> {
        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut **tx)
            .await
            .map_err(AppError::SpecificOperationError)?;
        Ok(())
    }
}

async fn fetch_booking<'e, E>(executor: E, booking_id: BookingId) -> AppResult<Option<Booking>>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as::<_, BookingRow>(
        r#"
            SELECT
            b.booking_id,
            b.booking_date,
            b.event,
            b.clock_start_hour,
            b.clock_start_minute,
            b.clock_end_hour,
            b.clock_end_minute,
            b.room,
            b.pic,
            b.kapasitas,
            b.rapat,
            b.catatan,
            b.created_at,
            b.updated_at,
            u.user_id,
            u.username,
            u.created_at AS user_created_at,
            u.updated_at AS user_updated_at
            FROM bookings AS b
            INNER JOIN users AS u ON b.user_id = u.user_id
            WHERE b.booking_id = $1
        "#,
    )
    .bind(booking_id)
    .fetch_optional(executor)
    .await
    .map_err(write_error)?
    .map(Booking::try_from)
    .transpose()
}

// Loads the bookings sharing the slot's room and day and runs the
// conflict engine over them.
async fn slot_taken<'e, E>(
    executor: E,
    slot: &BookingSlot,
    exclude: Option<BookingId>,
) -> AppResult<bool>
where
    E: Executor<'e, Database = Postgres>,
{
    let existing = sqlx::query_as::<_, BookingSlotRow>(
        r#"
            SELECT booking_id, room, booking_date,
            clock_start_hour, clock_start_minute, clock_end_hour, clock_end_minute
            FROM bookings
            WHERE room = $1
              AND booking_date = $2
              AND ($3::uuid IS NULL OR booking_id <> $3)
        "#,
    )
    .bind(&slot.room)
    .bind(slot.date)
    .bind(exclude)
    .fetch_all(executor)
    .await
    .map_err(write_error)?
    .into_iter()
    .map(BookingSlotRow::into_slot)
    .collect::<AppResult<Vec<_>>>()?;

    Ok(has_conflict(
        slot,
        existing.iter().map(|(id, s)| (*id, s)),
        exclude,
    ))
}

const SERIALIZATION_FAILURE: &str = "40001";
const FOREIGN_KEY_VIOLATION: &str = "23503";

fn write_error(e: sqlx::Error) -> AppError {
    match &e {
        sqlx::Error::Database(db) if db.code().as_deref() == Some(SERIALIZATION_FAILURE) => {
            AppError::Conflict(ROOM_ALREADY_BOOKED.into())
        }
        sqlx::Error::Database(db) if db.code().as_deref() == Some(FOREIGN_KEY_VIOLATION) => {
            AppError::EntityNotFound("User not found".into())
        }
        _ => AppError::SpecificOperationError(e),
    }
}

fn commit_error(e: sqlx::Error) -> AppError {
    match &e {
        sqlx::Error::Database(db) if db.code().as_deref() == Some(SERIALIZATION_FAILURE) => {
            AppError::Conflict(ROOM_ALREADY_BOOKED.into())
        }
        _ => AppError::TransactionError(e),
    }
}
