use std::sync::Arc;

use axum::{
    Router,
    routing::post,
    middleware,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn payment_routes(state: Arc<AppConfig>) -> Router {
    // Older clients still post to the misspelt path
    let protected_routes = Router::new()
        .route("/create-payment-intent", post(handlers::create_payment_intent))
        .route("/create-payment-intend", post(handlers::create_payment_intent))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(protected_routes)
        .with_state(state)
}
