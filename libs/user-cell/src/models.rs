use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use shared_models::error::AppError;

pub const ADMIN_ROLE: &str = "admin";

/// A portal account keyed by email. Profile fields sent by the client are
/// kept as they arrive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(flatten)]
    pub profile: Map<String, Value>,
}

impl UserAccount {
    pub fn is_admin(&self) -> bool {
        self.role.as_deref() == Some(ADMIN_ROLE)
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub result: UserAccount,
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AdminStatus {
    pub admin: bool,
}

#[derive(Debug, Error)]
pub enum UserError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("User not found: {0}")]
    NotFound(String),

    #[error("Token error: {0}")]
    Token(String),
}

impl From<anyhow::Error> for UserError {
    fn from(err: anyhow::Error) -> Self {
        UserError::Database(err.to_string())
    }
}

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::Database(msg) => AppError::Database(msg),
            UserError::NotFound(msg) => AppError::NotFound(msg),
            UserError::Token(msg) => AppError::Internal(msg),
        }
    }
}
