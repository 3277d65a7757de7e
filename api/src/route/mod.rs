use crate::middleware::cors::{cors, CorsPolicy};
use axum::{middleware, Router};
use registry::AppRegistry;

pub mod booking;
pub mod health;
pub mod user;
pub mod v1;

/// The full HTTP surface with the CORS policy applied in front of every route.
pub fn build_router(registry: AppRegistry, cors_policy: CorsPolicy) -> Router {
    v1::routes()
        .layer(middleware::from_fn_with_state(cors_policy, cors))
        .with_state(registry)
}
