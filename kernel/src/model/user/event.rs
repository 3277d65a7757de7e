use super::normalize_username;

pub struct CreateUser {
    pub username: String,
    pub password: String,
}

impl CreateUser {
    pub fn new(username: &str, password: String) -> Self {
        Self {
            username: normalize_username(username),
            password,
        }
    }
}
