use crate::model::id::UserId;
use chrono::{DateTime, Utc};

pub mod event;

/// Longest accepted username, counted in characters.
pub const USERNAME_MAX_LENGTH: usize = 30;
/// Shortest accepted password, counted in characters.
pub const PASSWORD_MIN_LENGTH: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Owner summary embedded in every booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingOwner {
    pub user_id: UserId,
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for BookingOwner {
    fn from(value: User) -> Self {
        let User {
            id,
            username,
            created_at,
            updated_at,
        } = value;
        Self {
            user_id: id,
            username,
            created_at,
            updated_at,
        }
    }
}

/// Usernames are stored and compared in lowercase.
pub fn normalize_username(username: &str) -> String {
    username.to_lowercase()
}
