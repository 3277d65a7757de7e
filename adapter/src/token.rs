use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use kernel::model::{auth::AccessToken, id::UserId};
use serde::{Deserialize, Serialize};
use shared::{
    config::AuthConfig,
    error::{AppError, AppResult},
};

pub const INVALID_TOKEN: &str = "Invalid or expired token";

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
}

/// Issues and verifies HS256 access tokens carrying the user id as subject.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn from_config(cfg: &AuthConfig) -> Self {
        let ttl = i64::try_from(cfg.ttl)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or(Duration::MAX);
        Self::new(&cfg.secret, ttl)
    }

    pub fn issue(&self, user_id: UserId) -> AppResult<AccessToken> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: now
                .checked_add_signed(self.ttl)
                .map_or(i64::MAX, |exp| exp.timestamp()),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        Ok(AccessToken(token))
    }

    pub fn verify(&self, access_token: &AccessToken) -> AppResult<UserId> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let data = decode::<Claims>(&access_token.0, &self.decoding_key, &validation)
            .map_err(|e| {
                tracing::debug!(error.message = %e, "rejected access token");
                AppError::UnauthenticatedError(INVALID_TOKEN.into())
            })?;

        data.claims
            .sub
            .parse::<UserId>()
            .map_err(|_| AppError::UnauthenticatedError(INVALID_TOKEN.into()))
    }
}
