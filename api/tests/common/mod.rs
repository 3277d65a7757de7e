#![allow(dead_code)]

use adapter::token::TokenService;
use api::{middleware::cors::CorsPolicy, route::build_router};
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use kernel::{
    model::{
        auth::{event::CreateToken, AccessToken},
        booking::{
            conflict::{has_conflict, BookingSlot, ROOM_ALREADY_BOOKED},
            event::{CreateBooking, DeleteBooking, UpdateBooking},
            Booking, BOOKING_NOT_FOUND,
        },
        id::{BookingId, UserId},
        user::{event::CreateUser, normalize_username, User},
    },
    repository::{
        auth::AuthRepository, booking::BookingRepository, health::HealthCheckRepository,
        user::UserRepository,
    },
};
use registry::AppRegistry;
use serde_json::Value;
use shared::error::{AppError, AppResult};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

pub const ALLOWED_ORIGIN: &str = "http://localhost:5173";
const TEST_SECRET: &str = "test-secret";

#[derive(Default)]
pub struct InMemoryUsers {
    rows: Mutex<Vec<(User, String)>>,
}

impl InMemoryUsers {
    fn get(&self, user_id: UserId) -> Option<User> {
        let rows = self.rows.lock().unwrap();
        rows.iter()
            .find(|(user, _)| user.id == user_id)
            .map(|(user, _)| user.clone())
    }
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<User>> {
        Ok(self.get(user_id))
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let username = normalize_username(username);
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .find(|(user, _)| user.username == username)
            .map(|(user, _)| user.clone()))
    }

    async fn create(&self, event: CreateUser) -> AppResult<User> {
        let hash = bcrypt::hash(&event.password, 4)?;
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|(user, _)| user.username == event.username) {
            return Err(AppError::Conflict("Username already exists".into()));
        }
        let now = Utc::now();
        let user = User {
            id: UserId::new(),
            username: event.username,
            created_at: now,
            updated_at: now,
        };
        rows.push((user.clone(), hash));
        Ok(user)
    }
}

pub struct InMemoryBookings {
    users: Arc<InMemoryUsers>,
    rows: Mutex<Vec<Booking>>,
}

#[async_trait]
impl BookingRepository for InMemoryBookings {
    async fn create(&self, event: CreateBooking) -> AppResult<Booking> {
        let owner = self
            .users
            .get(event.booked_by)
            .ok_or_else(|| AppError::EntityNotFound("User not found".into()))?;
        let mut rows = self.rows.lock().unwrap();
        let slots: Vec<_> = rows.iter().map(|b| (b.id, b.slot())).collect();
        if has_conflict(&event.slot, slots.iter().map(|(id, s)| (*id, s)), None) {
            return Err(AppError::Conflict(ROOM_ALREADY_BOOKED.into()));
        }
        let now = Utc::now();
        let booking = Booking {
            id: BookingId::new(),
            date: event.slot.date,
            event: event.event,
            time: event.slot.time,
            room: event.slot.room,
            pic: event.pic,
            kapasitas: event.kapasitas,
            rapat: event.rapat,
            catatan: event.catatan,
            created_at: now,
            updated_at: now,
            owner: owner.into(),
        };
        rows.push(booking.clone());
        Ok(booking)
    }

    async fn find_all(&self) -> AppResult<Vec<Booking>> {
        let mut bookings = self.rows.lock().unwrap().clone();
        bookings.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(bookings)
    }

    async fn find_by_id(&self, booking_id: BookingId) -> AppResult<Option<Booking>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().find(|b| b.id == booking_id).cloned())
    }

    async fn update(&self, event: UpdateBooking) -> AppResult<Booking> {
        let owner = match event.user_id {
            Some(user_id) => Some(
                self.users
                    .get(user_id)
                    .ok_or_else(|| AppError::EntityNotFound("User not found".into()))?,
            ),
            None => None,
        };
        let mut rows = self.rows.lock().unwrap();
        let booking = rows
            .iter_mut()
            .find(|b| b.id == event.booking_id)
            .ok_or_else(|| AppError::EntityNotFound(BOOKING_NOT_FOUND.into()))?;

        let slot = event.resolve_slot(&booking.slot());
        booking.room = slot.room;
        booking.date = slot.date;
        booking.time = slot.time;
        if let Some(owner) = owner {
            booking.owner = owner.into();
        }
        if let Some(value) = event.event {
            booking.event = value;
        }
        if let Some(value) = event.pic {
            booking.pic = value;
        }
        if let Some(value) = event.kapasitas {
            booking.kapasitas = value;
        }
        if let Some(value) = event.rapat {
            booking.rapat = value;
        }
        if let Some(value) = event.catatan {
            booking.catatan = value;
        }
        booking.updated_at = Utc::now();
        Ok(booking.clone())
    }

    async fn delete(&self, event: DeleteBooking) -> AppResult<()> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|b| b.id != event.booking_id);
        if rows.len() == before {
            return Err(AppError::EntityNotFound(BOOKING_NOT_FOUND.into()));
        }
        Ok(())
    }

    async fn has_conflict(
        &self,
        slot: &BookingSlot,
        exclude: Option<BookingId>,
    ) -> AppResult<bool> {
        let rows = self.rows.lock().unwrap();
        let slots: Vec<_> = rows.iter().map(|b| (b.id, b.slot())).collect();
        Ok(has_conflict(
            slot,
            slots.iter().map(|(id, s)| (*id, s)),
            exclude,
        ))
    }
}

pub struct InMemoryAuth {
    users: Arc<InMemoryUsers>,
    tokens: TokenService,
}

#[async_trait]
impl AuthRepository for InMemoryAuth {
    async fn verify_user(&self, username: &str, password: &str) -> AppResult<UserId> {
        let username = normalize_username(username);
        let found = {
            let rows = self.users.rows.lock().unwrap();
            rows.iter()
                .find(|(user, _)| user.username == username)
                .map(|(user, hash)| (user.id, hash.clone()))
        };
        match found {
            Some((user_id, hash)) if bcrypt::verify(password, &hash)? => Ok(user_id),
            _ => Err(AppError::UnauthenticatedError(
                "Invalid username or password".into(),
            )),
        }
    }

    fn fetch_user_id_from_token(&self, access_token: &AccessToken) -> AppResult<UserId> {
        self.tokens.verify(access_token)
    }

    fn create_token(&self, event: CreateToken) -> AppResult<AccessToken> {
        self.tokens.issue(event.user_id)
    }
}

pub struct StaticHealth(pub bool);

#[async_trait]
impl HealthCheckRepository for StaticHealth {
    async fn check_db(&self) -> bool {
        self.0
    }
}

pub fn registry_with(db_up: bool) -> AppRegistry {
    let users = Arc::new(InMemoryUsers::default());
    let bookings = Arc::new(InMemoryBookings {
        users: users.clone(),
        rows: Mutex::new(Vec::new()),
    });
    let auth = Arc::new(InMemoryAuth {
        users: users.clone(),
        tokens: TokenService::new(TEST_SECRET, Duration::hours(24)),
    });
    AppRegistry::from_parts(Arc::new(StaticHealth(db_up)), users, bookings, auth)
}

pub fn app() -> Router {
    app_with(registry_with(true))
}

pub fn app_with(registry: AppRegistry) -> Router {
    build_router(registry, CorsPolicy::new(vec![ALLOWED_ORIGIN.into()]))
}

/// A token signed with the test secret that has already expired.
pub fn expired_token(user_id: UserId) -> String {
    TokenService::new(TEST_SECRET, Duration::hours(-1))
        .issue(user_id)
        .unwrap()
        .0
}

pub fn json_request(method: Method, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn empty_request(method: Method, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

/// Sends the request and decodes the JSON body, or `Value::Null` for an empty one.
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

/// Registers `username` and signs in, returning the user id and bearer token.
pub async fn signup_and_signin(app: &Router, username: &str, password: &str) -> (String, String) {
    let credentials = serde_json::json!({ "username": username, "password": password });
    let (status, _) = send(
        app,
        json_request(Method::POST, "/api/users", None, credentials.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        app,
        json_request(Method::POST, "/api/users/signin", None, credentials),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    (
        body["user"]["id"].as_str().unwrap().to_string(),
        body["token"].as_str().unwrap().to_string(),
    )
}

pub fn booking_body(room: &str, start: (u8, u8), end: (u8, u8)) -> Value {
    serde_json::json!({
        "date": "2024-01-01",
        "event": "Meeting",
        "clockStart": { "hours": start.0, "minutes": start.1 },
        "clockEnd": { "hours": end.0, "minutes": end.1 },
        "room": room,
        "pic": "Budi",
        "kapasitas": 10,
        "rapat": "Weekly sync",
        "catatan": "-"
    })
}
