use chrono::{DateTime, Utc};
use garde::Validate;
use kernel::model::{
    id::UserId,
    user::{
        event::CreateUser, normalize_username, BookingOwner, User, PASSWORD_MIN_LENGTH,
        USERNAME_MAX_LENGTH,
    },
};
use serde::{Deserialize, Deserializer, Serialize};
use shared::error::{AppError, AppResult};

pub const CREDENTIALS_REQUIRED: &str = "Username and password are required";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: UserId,
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(value: User) -> Self {
        let User {
            id,
            username,
            created_at,
            updated_at,
        } = value;
        Self {
            id,
            username,
            created_at,
            updated_at,
        }
    }
}

impl From<BookingOwner> for UserResponse {
    fn from(value: BookingOwner) -> Self {
        let BookingOwner {
            user_id,
            username,
            created_at,
            updated_at,
        } = value;
        Self {
            id: user_id,
            username,
            created_at,
            updated_at,
        }
    }
}

/// Both fields must be non-empty before anything else is checked.
pub fn ensure_credentials(username: &str, password: &str) -> AppResult<()> {
    if username.is_empty() || password.is_empty() {
        return Err(AppError::ValidationError(CREDENTIALS_REQUIRED.into()));
    }
    Ok(())
}

/// Reads an absent or `null` credential field as an empty string, so both
/// end up rejected by [`ensure_credentials`].
pub fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[serde(default, deserialize_with = "null_as_empty")]
    #[garde(custom(username_length))]
    pub username: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    #[garde(custom(password_length))]
    pub password: String,
}

// Measured on the stored form; lowercasing can lengthen a name.
fn username_length(value: &str, _: &()) -> garde::Result {
    if normalize_username(value).chars().count() > USERNAME_MAX_LENGTH {
        return Err(garde::Error::new("Username must be 30 characters or less"));
    }
    Ok(())
}

fn password_length(value: &str, _: &()) -> garde::Result {
    if value.chars().count() < PASSWORD_MIN_LENGTH {
        return Err(garde::Error::new(
            "Password must be at least 4 characters long",
        ));
    }
    Ok(())
}

impl From<CreateUserRequest> for CreateUser {
    fn from(value: CreateUserRequest) -> Self {
        let CreateUserRequest { username, password } = value;
        CreateUser::new(&username, password)
    }
}
