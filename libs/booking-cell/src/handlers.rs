use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{AdmissionResult, AvailabilityView, Booking, PaymentConfirmation, ServiceSummary};
use crate::services::{
    validate_booking_request, AvailabilityService, BookingAdmissionService, EmailNotifier,
    SupabaseBookingStore, SupabaseServiceCatalog,
};

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PatientBookingsQuery {
    pub patient: Option<String>,
}

fn booking_store(state: &AppConfig) -> Arc<SupabaseBookingStore> {
    Arc::new(SupabaseBookingStore::new(Arc::new(SupabaseClient::new(state))))
}

// ==============================================================================
// PUBLIC HANDLERS
// ==============================================================================

pub async fn list_services(
    State(state): State<Arc<AppConfig>>,
) -> Result<Json<Vec<ServiceSummary>>, AppError> {
    let catalog = SupabaseServiceCatalog::new(Arc::new(SupabaseClient::new(&state)));

    let services = catalog.list_service_summaries().await?;

    Ok(Json(services))
}

pub async fn get_available(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Vec<AvailabilityView>>, AppError> {
    let date = query.date.unwrap_or_default();
    debug!("Availability requested for {:?}", date);

    let supabase = Arc::new(SupabaseClient::new(&state));
    let availability_service = AvailabilityService::new(
        Arc::new(SupabaseServiceCatalog::new(Arc::clone(&supabase))),
        Arc::new(SupabaseBookingStore::new(supabase)),
    );

    let views = availability_service.available_on(&date).await?;

    Ok(Json(views))
}

pub async fn create_booking(
    State(state): State<Arc<AppConfig>>,
    Json(mut request): Json<Booking>,
) -> Result<Json<Value>, AppError> {
    // Identity and payment state belong to the store and the payment flow.
    request.id = None;
    request.paid = false;
    request.transaction_id = None;

    if state.strict_booking_validation {
        validate_booking_request(&request)?;
    }

    let admission_service = BookingAdmissionService::new(
        booking_store(&state),
        Arc::new(EmailNotifier::new(&state)),
    );

    let admission = admission_service.admit_booking(request).await?;

    let body = match admission.result {
        AdmissionResult::Rejected { existing } => json!({
            "success": false,
            "booking": existing
        }),
        AdmissionResult::Admitted { stored } => json!({
            "success": true,
            "result": stored
        }),
    };

    Ok(Json(body))
}

// ==============================================================================
// PROTECTED HANDLERS
// ==============================================================================

pub async fn get_patient_bookings(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Query(query): Query<PatientBookingsQuery>,
) -> Result<Json<Vec<Booking>>, AppError> {
    let patient = query.patient.unwrap_or_default();

    if patient != user.email {
        return Err(AppError::Forbidden("forbidden access".to_string()));
    }

    let bookings = booking_store(&state).find_bookings_by_patient(&patient).await?;

    Ok(Json(bookings))
}

pub async fn get_booking(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(booking_id): Path<String>,
) -> Result<Json<Booking>, AppError> {
    let booking = booking_store(&state)
        .get_booking(&booking_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

    if booking.patient != user.email {
        return Err(AppError::Forbidden("forbidden access".to_string()));
    }

    Ok(Json(booking))
}

pub async fn mark_booking_paid(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(booking_id): Path<String>,
    Json(confirmation): Json<PaymentConfirmation>,
) -> Result<Json<Booking>, AppError> {
    let store = booking_store(&state);

    let booking = store
        .get_booking(&booking_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

    if booking.patient != user.email {
        return Err(AppError::Forbidden("forbidden access".to_string()));
    }

    let updated = store.mark_paid(&booking_id, &confirmation).await?;
    info!("Payment recorded for booking {} by {}", booking_id, user.email);

    Ok(Json(updated))
}
