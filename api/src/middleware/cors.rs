//! Origin allow-list handling.
//!
//! Preflight requests are answered here and never reach a handler. Other
//! requests always run; the CORS headers are only attached when the origin is
//! allowed, leaving enforcement to the browser.

use axum::{
    extract::{Request, State},
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS,
            ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, ORIGIN,
        },
        HeaderMap, HeaderValue, Method, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use shared::config::CorsConfig;
use std::sync::Arc;

const ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
const ALLOW_HEADERS: &str = "Content-Type, Authorization";

#[derive(Clone)]
pub struct CorsPolicy {
    allowed_origins: Arc<[String]>,
}

impl CorsPolicy {
    pub fn new(allowed_origins: Vec<String>) -> Self {
        Self {
            allowed_origins: allowed_origins.into(),
        }
    }

    pub fn is_allowed(&self, origin: &str) -> bool {
        self.allowed_origins.iter().any(|allowed| allowed == origin)
    }

    fn allowed_origin(&self, headers: &HeaderMap) -> Option<HeaderValue> {
        headers
            .get(ORIGIN)
            .filter(|origin| origin.to_str().is_ok_and(|o| self.is_allowed(o)))
            .cloned()
    }
}

impl From<&CorsConfig> for CorsPolicy {
    fn from(value: &CorsConfig) -> Self {
        Self::new(value.allowed_origins.clone())
    }
}

pub async fn cors(State(policy): State<CorsPolicy>, request: Request, next: Next) -> Response {
    let origin = policy.allowed_origin(request.headers());

    if request.method() == Method::OPTIONS {
        return match origin {
            Some(origin) => {
                let mut response = StatusCode::NO_CONTENT.into_response();
                apply_headers(response.headers_mut(), origin);
                response
            }
            None => StatusCode::FORBIDDEN.into_response(),
        };
    }

    let mut response = next.run(request).await;
    if let Some(origin) = origin {
        apply_headers(response.headers_mut(), origin);
    }
    response
}

fn apply_headers(headers: &mut HeaderMap, origin: HeaderValue) {
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin);
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOW_METHODS),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOW_HEADERS),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_CREDENTIALS,
        HeaderValue::from_static("true"),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_exact_origins_only() {
        let policy = CorsPolicy::new(vec!["http://localhost:5173".into()]);
        assert!(policy.is_allowed("http://localhost:5173"));
        assert!(!policy.is_allowed("http://localhost:5173/"));
        assert!(!policy.is_allowed("http://evil.example"));
    }

    #[test]
    fn missing_origin_is_not_allowed() {
        let policy = CorsPolicy::from(&CorsConfig::default());
        assert!(policy.allowed_origin(&HeaderMap::new()).is_none());

        let mut headers = HeaderMap::new();
        headers.insert(ORIGIN, HeaderValue::from_static("https://bookingruangrapat.vercel.app"));
        assert_eq!(
            policy.allowed_origin(&headers),
            Some(HeaderValue::from_static("https://bookingruangrapat.vercel.app"))
        );
    }
}
