use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use tracing::info;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{CreateDoctorRequest, Doctor};
use crate::services::DoctorService;

// Every handler here sits behind the admin guard.

pub async fn list_doctors(
    State(state): State<Arc<AppConfig>>,
) -> Result<Json<Vec<Doctor>>, AppError> {
    let doctors = DoctorService::new(&state).list_doctors().await?;
    Ok(Json(doctors))
}

pub async fn add_doctor(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateDoctorRequest>,
) -> Result<Json<Doctor>, AppError> {
    info!("Admin {} adding doctor {}", user.email, request.email);

    let doctor = DoctorService::new(&state).add_doctor(request).await?;
    Ok(Json(doctor))
}

pub async fn remove_doctor(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(email): Path<String>,
) -> Result<Json<Doctor>, AppError> {
    info!("Admin {} removing doctor {}", user.email, email);

    let doctor = DoctorService::new(&state).remove_doctor(&email).await?;
    Ok(Json(doctor))
}
