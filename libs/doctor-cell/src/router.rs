use std::sync::Arc;

use axum::{
    Router,
    routing::{get, delete},
    middleware,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;
use user_cell::middleware::admin_middleware;

use crate::handlers;

pub fn doctor_routes(state: Arc<AppConfig>) -> Router {
    // Roster management is admin only
    let admin_routes = Router::new()
        .route("/doctor", get(handlers::list_doctors).post(handlers::add_doctor))
        .route("/doctor/{email}", delete(handlers::remove_doctor))
        .layer(middleware::from_fn_with_state(state.clone(), admin_middleware))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(admin_routes)
        .with_state(state)
}
