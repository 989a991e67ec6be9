use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
    middleware,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn booking_routes(state: Arc<AppConfig>) -> Router {
    // Catalog, availability and booking submission are open to visitors
    let public_routes = Router::new()
        .route("/service", get(handlers::list_services))
        .route("/available", get(handlers::get_available))
        .route("/booking", post(handlers::create_booking));

    let protected_routes = Router::new()
        .route("/booking", get(handlers::get_patient_bookings))
        .route("/booking/{id}", get(handlers::get_booking).patch(handlers::mark_booking_paid))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
