use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use tracing::warn;

use shared_config::AppConfig;
use shared_models::error::AppError;
use shared_utils::extractor::extract_user;

use crate::services::UserService;

/// Must sit inside `auth_middleware`: it reads the verified user from the
/// request extensions and requires the `admin` role on that account.
pub async fn admin_middleware(
    State(config): State<Arc<AppConfig>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    // `Body` is not `Sync`, so borrow a body-less view across the await
    let (parts, body) = request.into_parts();
    let head = Request::from_parts(parts, ());
    let user = extract_user(&head).await?;
    let (parts, ()) = head.into_parts();
    let request = Request::from_parts(parts, body);

    let is_admin = UserService::new(&config).is_admin(&user.email).await?;
    if !is_admin {
        warn!("Non-admin {} attempted an admin operation", user.email);
        return Err(AppError::Forbidden("forbidden".to_string()));
    }

    Ok(next.run(request).await)
}
