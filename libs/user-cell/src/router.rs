use std::sync::Arc;

use axum::{
    Router,
    routing::{get, put},
    middleware,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;
use crate::middleware::admin_middleware;

pub fn user_routes(state: Arc<AppConfig>) -> Router {
    let public_routes = Router::new()
        .route("/user/{email}", put(handlers::upsert_user))
        .route("/admin/{email}", get(handlers::check_admin));

    let protected_routes = Router::new()
        .route("/user", get(handlers::list_users))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Layers run outermost-last: authenticate, then check the role
    let admin_routes = Router::new()
        .route("/user/admin/{email}", put(handlers::make_admin))
        .layer(middleware::from_fn_with_state(state.clone(), admin_middleware))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(admin_routes)
        .with_state(state)
}
