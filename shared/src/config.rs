use crate::env::{which, Environment};
use anyhow::{bail, Result};

/// Token lifetime used when `AUTH_TOKEN_TTL` is not set: 24 hours.
pub const DEFAULT_TOKEN_TTL_SECONDS: u64 = 60 * 60 * 24;

const DEV_FALLBACK_SECRET: &str = "dev-secret-change-me";

const DEFAULT_ALLOWED_ORIGINS: [&str; 3] = [
    "https://bookingruangrapat.vercel.app",
    "http://localhost:5173",
    "http://localhost:4173",
];

pub struct AppConfig {
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub cors: CorsConfig,
    pub server: ServerConfig,
}

impl AppConfig {
    pub fn new() -> Result<Self> {
        let database = DatabaseConfig {
            host: std::env::var("DATABASE_HOST")?,
            port: std::env::var("DATABASE_PORT")?.parse::<u16>()?,
            username: std::env::var("DATABASE_USERNAME")?,
            password: std::env::var("DATABASE_PASSWORD")?,
            database: std::env::var("DATABASE_NAME")?,
        };
        let auth = AuthConfig::resolve(
            std::env::var("JWT_SECRET").ok(),
            std::env::var("AUTH_TOKEN_TTL").ok(),
            which(),
        )?;
        let cors = std::env::var("CORS_ALLOWED_ORIGINS")
            .map(|raw| CorsConfig::from_list(&raw))
            .unwrap_or_default();
        let server = ServerConfig {
            port: std::env::var("SERVER_PORT")
                .ok()
                .map(|v| v.parse::<u16>())
                .transpose()?
                .unwrap_or(8080),
        };
        Ok(Self {
            database,
            auth,
            cors,
            server,
        })
    }
}

pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: String,
}

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    /// Token lifetime in seconds.
    pub ttl: u64,
}

impl AuthConfig {
    /// Builds the token settings. A missing secret is only tolerated in
    /// development, where a well-known fallback is used and a warning logged.
    pub fn resolve(
        secret: Option<String>,
        ttl: Option<String>,
        env: Environment,
    ) -> Result<Self> {
        let secret = match (secret.filter(|s| !s.trim().is_empty()), env) {
            (Some(secret), _) => secret,
            (None, Environment::Development) => {
                tracing::warn!("JWT_SECRET is not set; using the development fallback secret");
                DEV_FALLBACK_SECRET.to_string()
            }
            (None, Environment::Production) => bail!("JWT_SECRET must be set in production"),
        };
        let ttl = match ttl {
            Some(raw) => raw.trim().parse::<u64>()?,
            None => DEFAULT_TOKEN_TTL_SECONDS,
        };
        Ok(Self { secret, ttl })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    pub fn from_list(raw: &str) -> Self {
        let allowed_origins = raw
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();
        Self { allowed_origins }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: DEFAULT_ALLOWED_ORIGINS.iter().map(|o| o.to_string()).collect(),
        }
    }
}

pub struct ServerConfig {
    pub port: u16,
}
