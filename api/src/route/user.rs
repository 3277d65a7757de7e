use axum::{routing::post, Router};
use registry::AppRegistry;

use crate::handler::{auth::signin, user::register_user};

pub fn build_user_routers() -> Router<AppRegistry> {
    let routers = Router::new()
        .route("/", post(register_user))
        .route("/signin", post(signin));

    Router::new().nest("/users", routers)
}
