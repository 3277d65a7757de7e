use kernel::model::{id::UserId, user::User};
use sqlx::types::chrono::{DateTime, Utc};

#[derive(sqlx::FromRow)]
pub struct UserRow {
    pub user_id: UserId,
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(value: UserRow) -> Self {
        let UserRow {
            user_id,
            username,
            created_at,
            updated_at,
        } = value;
        User {
            id: user_id,
            username,
            created_at,
            updated_at,
        }
    }
}

// Used only by sign-in, so the hash never leaves the adapter.
#[derive(sqlx::FromRow)]
pub struct UserCredentialRow {
    pub user_id: UserId,
    pub password_hash: String,
}
