use super::user::UserResponse;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use derive_new::new;
use kernel::model::{
    booking::{
        clock::{ClockTime, TimeSlot},
        conflict::BookingSlot,
        event::{CreateBooking, UpdateBooking},
        Booking,
    },
    id::{BookingId, UserId},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::error::{AppError, AppResult};

pub const INVALID_DATE: &str = "Invalid date format";
pub const INVALID_TIME: &str = "Invalid time format. Must be { hours: number, minutes: number }";
pub const INVALID_CLOCK: &str = "Invalid clock format. Must be { hour: number, minute: number }";
pub const END_BEFORE_START: &str = "End time must be after start time";

/// Accepts `YYYY-MM-DD`, an RFC 3339 timestamp (reduced to its UTC day) or a
/// naive `YYYY-MM-DDTHH:MM:SS` timestamp.
pub fn parse_booking_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.with_timezone(&Utc).date_naive())
        })
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|dt| dt.date())
        })
}

#[derive(Deserialize)]
struct ClockPayload {
    hours: Option<i64>,
    minutes: Option<i64>,
    hour: Option<i64>,
    minute: Option<i64>,
}

/// Reads `{hours, minutes}`, or additionally `{hour, minute}` when
/// `accept_singular` is set.
fn parse_clock(value: &Value, accept_singular: bool) -> Option<ClockTime> {
    let payload = ClockPayload::deserialize(value).ok()?;
    let (hour, minute) = match payload.hours.zip(payload.minutes) {
        Some(pair) => pair,
        None if accept_singular => payload.hour.zip(payload.minute)?,
        None => return None,
    };
    ClockTime::try_new(hour, minute)
}

fn missing(field: &str) -> AppError {
    AppError::ValidationError(format!("Missing required field: {field}"))
}

fn required_text(field: &str, value: Option<String>) -> AppResult<String> {
    value.filter(|v| !v.is_empty()).ok_or_else(|| missing(field))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub date: Option<String>,
    pub event: Option<String>,
    pub clock_start: Option<Value>,
    pub clock_end: Option<Value>,
    pub room: Option<String>,
    pub pic: Option<String>,
    pub kapasitas: Option<i32>,
    pub rapat: Option<String>,
    pub catatan: Option<String>,
}

#[derive(new)]
pub struct CreateBookingRequestWithUserId(UserId, CreateBookingRequest);

impl TryFrom<CreateBookingRequestWithUserId> for CreateBooking {
    type Error = AppError;

    fn try_from(value: CreateBookingRequestWithUserId) -> Result<Self, Self::Error> {
        let CreateBookingRequestWithUserId(
            user_id,
            CreateBookingRequest {
                date,
                event,
                clock_start,
                clock_end,
                room,
                pic,
                kapasitas,
                rapat,
                catatan,
            },
        ) = value;

        let date = required_text("date", date)?;
        let event = required_text("event", event)?;
        let clock_start = clock_start.ok_or_else(|| missing("clockStart"))?;
        let clock_end = clock_end.ok_or_else(|| missing("clockEnd"))?;
        let room = required_text("room", room)?;
        let pic = required_text("pic", pic)?;
        let kapasitas = kapasitas.filter(|k| *k != 0).ok_or_else(|| missing("kapasitas"))?;
        let rapat = required_text("rapat", rapat)?;
        let catatan = required_text("catatan", catatan)?;

        let date =
            parse_booking_date(&date).ok_or_else(|| AppError::ValidationError(INVALID_DATE.into()))?;

        let (Some(start), Some(end)) = (parse_clock(&clock_start, false), parse_clock(&clock_end, false))
        else {
            return Err(AppError::ValidationError(INVALID_TIME.into()));
        };
        let time = TimeSlot::new(start, end)
            .ok_or_else(|| AppError::ValidationError(END_BEFORE_START.into()))?;

        Ok(CreateBooking::new(
            user_id,
            BookingSlot::new(room, date, time),
            event,
            pic,
            kapasitas,
            rapat,
            catatan,
        ))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookingRequest {
    pub user_id: Option<String>,
    pub date: Option<String>,
    pub event: Option<String>,
    pub clock_start: Option<Value>,
    pub clock_end: Option<Value>,
    pub room: Option<String>,
    pub pic: Option<String>,
    pub kapasitas: Option<i32>,
    pub rapat: Option<String>,
    pub catatan: Option<String>,
}

impl UpdateBookingRequest {
    /// Takes the requested owner out of the request. An empty value counts
    /// as not provided; the rest is resolved against the user store.
    pub fn take_user_id(&mut self) -> Option<String> {
        self.user_id.take().filter(|id| !id.is_empty())
    }

    /// Validates the provided fields against the stored booking. Empty `date`
    /// and `room` values count as not provided. The owner is left unchanged;
    /// see [`Self::take_user_id`].
    pub fn into_event(self, current: &Booking) -> AppResult<UpdateBooking> {
        let UpdateBookingRequest {
            user_id: _,
            date,
            event,
            clock_start,
            clock_end,
            room,
            pic,
            kapasitas,
            rapat,
            catatan,
        } = self;

        let date = date
            .filter(|d| !d.is_empty())
            .map(|d| {
                parse_booking_date(&d).ok_or_else(|| AppError::ValidationError(INVALID_DATE.into()))
            })
            .transpose()?;

        let time = if clock_start.is_some() || clock_end.is_some() {
            let resolve = |value: Option<Value>, stored: ClockTime| match value {
                Some(value) => parse_clock(&value, true),
                None => Some(stored),
            };
            let (Some(start), Some(end)) = (
                resolve(clock_start, current.time.start()),
                resolve(clock_end, current.time.end()),
            ) else {
                return Err(AppError::ValidationError(INVALID_CLOCK.into()));
            };
            Some(
                TimeSlot::new(start, end)
                    .ok_or_else(|| AppError::ValidationError(END_BEFORE_START.into()))?,
            )
        } else {
            None
        };

        Ok(UpdateBooking {
            booking_id: current.id,
            user_id: None,
            date,
            event,
            time,
            room: room.filter(|r| !r.is_empty()),
            pic,
            kapasitas,
            rapat,
            catatan,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClockResponse {
    pub hours: u8,
    pub minutes: u8,
}

impl From<ClockTime> for ClockResponse {
    fn from(value: ClockTime) -> Self {
        Self {
            hours: value.hour(),
            minutes: value.minute(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub id: BookingId,
    pub user_id: UserId,
    pub date: NaiveDate,
    pub event: String,
    pub clock_start: ClockResponse,
    pub clock_end: ClockResponse,
    pub room: String,
    pub pic: String,
    pub kapasitas: i32,
    pub rapat: String,
    pub catatan: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user: UserResponse,
}

impl From<Booking> for BookingResponse {
    fn from(value: Booking) -> Self {
        let Booking {
            id,
            date,
            event,
            time,
            room,
            pic,
            kapasitas,
            rapat,
            catatan,
            created_at,
            updated_at,
            owner,
        } = value;
        Self {
            id,
            user_id: owner.user_id,
            date,
            event,
            clock_start: time.start().into(),
            clock_end: time.end().into(),
            room,
            pic,
            kapasitas,
            rapat,
            catatan,
            created_at,
            updated_at,
            user: owner.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel::model::user::BookingOwner;
    use serde_json::json;

    fn create_request(body: Value) -> CreateBookingRequest {
        serde_json::from_value(body).unwrap()
    }

    fn valid_body() -> Value {
        json!({
            "date": "2024-01-01",
            "event": "Meeting",
            "clockStart": { "hours": 9, "minutes": 0 },
            "clockEnd": { "hours": 10, "minutes": 0 },
            "room": "A",
            "pic": "Budi",
            "kapasitas": 10,
            "rapat": "Weekly sync",
            "catatan": "-"
        })
    }

    fn create(body: Value) -> AppResult<CreateBooking> {
        CreateBooking::try_from(CreateBookingRequestWithUserId::new(
            UserId::new(),
            create_request(body),
        ))
    }

    fn message(result: AppResult<impl std::fmt::Debug>) -> String {
        result.unwrap_err().to_string()
    }

    fn stored_booking() -> Booking {
        let time = TimeSlot::new(
            ClockTime::try_new(9, 0).unwrap(),
            ClockTime::try_new(10, 0).unwrap(),
        )
        .unwrap();
        Booking {
            id: BookingId::new(),
            date: "2024-01-01".parse().unwrap(),
            event: "Meeting".into(),
            time,
            room: "A".into(),
            pic: "Budi".into(),
            kapasitas: 10,
            rapat: "Weekly sync".into(),
            catatan: "-".into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            owner: BookingOwner {
                user_id: UserId::new(),
                username: "budi".into(),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
        }
    }

    #[test]
    fn parses_supported_date_shapes() {
        let day: NaiveDate = "2024-01-01".parse().unwrap();
        assert_eq!(parse_booking_date("2024-01-01"), Some(day));
        assert_eq!(parse_booking_date("2024-01-01T15:30:00Z"), Some(day));
        assert_eq!(parse_booking_date("2024-01-01T15:30:00.000Z"), Some(day));
        assert_eq!(parse_booking_date("2024-01-01T08:00:00"), Some(day));
        assert_eq!(parse_booking_date("2024-01-02T03:00:00+07:00"), Some(day));
        assert_eq!(parse_booking_date("tomorrow"), None);
        assert_eq!(parse_booking_date("2024-13-01"), None);
    }

    #[test]
    fn valid_request_becomes_event() {
        let event = create(valid_body()).unwrap();
        assert_eq!(event.slot.room, "A");
        assert_eq!(event.slot.time.start(), ClockTime::try_new(9, 0).unwrap());
        assert_eq!(event.kapasitas, 10);
    }

    #[test]
    fn reports_first_missing_field_in_order() {
        let mut body = valid_body();
        body.as_object_mut().unwrap().remove("room");
        body["pic"] = json!("");
        assert_eq!(message(create(body)), "Missing required field: room");

        let mut body = valid_body();
        body["kapasitas"] = json!(0);
        assert_eq!(message(create(body)), "Missing required field: kapasitas");

        let mut body = valid_body();
        body["clockEnd"] = Value::Null;
        assert_eq!(message(create(body)), "Missing required field: clockEnd");
    }

    #[test]
    fn rejects_bad_date_and_times() {
        let mut body = valid_body();
        body["date"] = json!("not a date");
        assert_eq!(message(create(body)), INVALID_DATE);

        let mut body = valid_body();
        body["clockStart"] = json!({ "hours": 24, "minutes": 0 });
        assert_eq!(message(create(body)), INVALID_TIME);

        let mut body = valid_body();
        body["clockStart"] = json!({ "hour": 9, "minute": 0 });
        assert_eq!(message(create(body)), INVALID_TIME);

        let mut body = valid_body();
        body["clockStart"] = json!({ "hours": 9.5, "minutes": 0 });
        assert_eq!(message(create(body)), INVALID_TIME);

        let mut body = valid_body();
        body["clockEnd"] = json!({ "hours": 9, "minutes": 0 });
        assert_eq!(message(create(body)), END_BEFORE_START);
    }

    #[test]
    fn update_accepts_singular_clock_names() {
        let current = stored_booking();
        let req = UpdateBookingRequest {
            clock_end: Some(json!({ "hour": 11, "minute": 30 })),
            ..Default::default()
        };
        let event = req.into_event(&current).unwrap();
        let time = event.time.unwrap();
        assert_eq!(time.start(), current.time.start());
        assert_eq!(time.end(), ClockTime::try_new(11, 30).unwrap());
        assert!(event.touches_slot());
    }

    #[test]
    fn update_validates_only_provided_fields() {
        let current = stored_booking();
        let event = UpdateBookingRequest {
            pic: Some("Sari".into()),
            ..Default::default()
        }
        .into_event(&current)
        .unwrap();
        assert!(!event.touches_slot());
        assert_eq!(event.pic.as_deref(), Some("Sari"));

        let bad_order = UpdateBookingRequest {
            clock_start: Some(json!({ "hours": 10, "minutes": 30 })),
            ..Default::default()
        };
        assert_eq!(message(bad_order.into_event(&current)), END_BEFORE_START);

        let bad_clock = UpdateBookingRequest {
            clock_start: Some(json!("09:00")),
            ..Default::default()
        };
        assert_eq!(message(bad_clock.into_event(&current)), INVALID_CLOCK);

        let bad_date = UpdateBookingRequest {
            date: Some("31/12/2024".into()),
            ..Default::default()
        };
        assert_eq!(message(bad_date.into_event(&current)), INVALID_DATE);
    }

    #[test]
    fn owner_is_taken_out_before_validation() {
        let current = stored_booking();
        let mut req = UpdateBookingRequest {
            user_id: Some("nobody".into()),
            pic: Some("Sari".into()),
            ..Default::default()
        };
        assert_eq!(req.take_user_id().as_deref(), Some("nobody"));
        let event = req.into_event(&current).unwrap();
        assert!(event.user_id.is_none());

        let mut empty = UpdateBookingRequest {
            user_id: Some(String::new()),
            ..Default::default()
        };
        assert!(empty.take_user_id().is_none());
    }

    #[test]
    fn response_normalizes_clock_shape() {
        let body = serde_json::to_value(BookingResponse::from(stored_booking())).unwrap();
        assert_eq!(body["clockStart"], json!({ "hours": 9, "minutes": 0 }));
        assert_eq!(body["date"], json!("2024-01-01"));
        assert_eq!(body["user"]["username"], json!("budi"));
        assert!(body["user"].get("password").is_none());
    }
}
