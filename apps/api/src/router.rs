use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use booking_cell::router::booking_routes;
use doctor_cell::router::doctor_routes;
use payment_cell::router::payment_routes;
use shared_config::AppConfig;
use user_cell::router::user_routes;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    // Cells own overlapping prefixes (/user, /booking), so they are merged rather than nested
    Router::new()
        .route("/", get(|| async { "Clinic booking API is running!" }))
        .merge(booking_routes(state.clone()))
        .merge(user_routes(state.clone()))
        .merge(doctor_routes(state.clone()))
        .merge(payment_routes(state))
}
