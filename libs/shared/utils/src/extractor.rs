use std::sync::Arc;

use axum::{
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
    body::Body,
};

use shared_models::auth::User;
use shared_models::error::AppError;
use shared_config::AppConfig;

use crate::jwt::validate_token;

/// Reads the bearer token from an `Authorization` header value.
pub fn bearer_token(auth_value: &str) -> Option<&str> {
    auth_value.strip_prefix("Bearer ").map(str::trim).filter(|t| !t.is_empty())
}

// A missing header is 401; a present but unusable token is 403.
pub async fn auth_middleware(
    State(config): State<Arc<AppConfig>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .ok_or_else(|| AppError::Auth("unauthorized access".to_string()))?;

    let token = auth_header
        .to_str()
        .ok()
        .and_then(bearer_token)
        .ok_or_else(|| AppError::Forbidden("forbidden access".to_string()))?;

    let user = validate_token(token, &config.access_token_secret)
        .map_err(|e| {
            tracing::debug!("Rejecting bearer token: {}", e);
            AppError::Forbidden("forbidden access".to_string())
        })?;

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

pub async fn extract_user<B>(request: &Request<B>) -> Result<User, AppError> {
    request
        .extensions()
        .get::<User>()
        .cloned()
        .ok_or_else(|| AppError::Auth("User not found in request extensions".to_string()))
}
