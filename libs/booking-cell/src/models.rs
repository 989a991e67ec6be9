use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use shared_models::error::AppError;

/// Reads an explicit `null` the same as a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A bookable treatment and its fixed catalog of slot labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub price: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub slots: Vec<String>,
}

/// The `/service` listing only exposes names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceSummary {
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
}

/// A service with `slots` narrowed to what is still free on one date.
/// Computed per request and never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityView {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub price: f64,
    pub slots: Vec<String>,
}

/// A patient's reservation of one slot of one service on one date.
///
/// Missing or `null` fields default to empty so that partial payloads reach
/// the admission logic unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub patient: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub patient_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub treatment: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub slot: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub paid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
}

impl Booking {
    /// True when both bookings share (treatment, date, patient).
    pub fn same_admission_key(&self, other: &Booking) -> bool {
        self.treatment == other.treatment
            && self.date == other.date
            && self.patient == other.patient
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AdmissionResult {
    Rejected { existing: Booking },
    Admitted { stored: Booking },
}

impl AdmissionResult {
    pub fn is_admitted(&self) -> bool {
        matches!(self, AdmissionResult::Admitted { .. })
    }
}

/// Body of `PATCH /booking/{id}`; any extra fields are kept on the
/// payment record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentConfirmation {
    pub transaction_id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Error)]
pub enum BookingError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Booking already exists for {treatment} on {date} for {patient}")]
    Duplicate {
        treatment: String,
        date: String,
        patient: String,
    },

    #[error("Booking not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Notification failed: {0}")]
    Notification(String),

    #[error("Email notifier is not configured")]
    NotificationNotConfigured,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<anyhow::Error> for BookingError {
    fn from(err: anyhow::Error) -> Self {
        BookingError::Database(err.to_string())
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::Database(msg) => AppError::Database(msg),
            BookingError::Duplicate { .. } => AppError::Conflict(err.to_string()),
            BookingError::NotFound(msg) => AppError::NotFound(msg),
            BookingError::Validation(msg) => AppError::ValidationError(msg),
            BookingError::Notification(_) | BookingError::NotificationNotConfigured => {
                AppError::ExternalService(err.to_string())
            }
            BookingError::Serialization(e) => AppError::Internal(e.to_string()),
        }
    }
}
