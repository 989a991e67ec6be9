use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Duration;
use serde_json::{Map, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_models::error::AppError;
use shared_utils::jwt::issue_token;

use crate::models::{AdminStatus, LoginResponse, UserAccount, UserError};
use crate::services::UserService;

/// Called by the portal after every sign-in; returns a fresh access token.
pub async fn upsert_user(
    State(state): State<Arc<AppConfig>>,
    Path(email): Path<String>,
    Json(profile): Json<Map<String, Value>>,
) -> Result<Json<LoginResponse>, AppError> {
    debug!("Sign-in upsert for {}", email);

    let user_service = UserService::new(&state);
    let result = user_service.upsert_user(&email, profile).await?;

    let token = issue_token(
        &email,
        &state.access_token_secret,
        Duration::minutes(state.access_token_ttl_minutes),
    )
    .map_err(UserError::Token)?;

    Ok(Json(LoginResponse { result, token }))
}

pub async fn list_users(
    State(state): State<Arc<AppConfig>>,
) -> Result<Json<Vec<UserAccount>>, AppError> {
    let users = UserService::new(&state).list_users().await?;
    Ok(Json(users))
}

pub async fn check_admin(
    State(state): State<Arc<AppConfig>>,
    Path(email): Path<String>,
) -> Result<Json<AdminStatus>, AppError> {
    let admin = UserService::new(&state).is_admin(&email).await?;
    Ok(Json(AdminStatus { admin }))
}

pub async fn make_admin(
    State(state): State<Arc<AppConfig>>,
    Path(email): Path<String>,
) -> Result<Json<UserAccount>, AppError> {
    let account = UserService::new(&state).make_admin(&email).await?;
    Ok(Json(account))
}
