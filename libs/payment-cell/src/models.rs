use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared_models::error::AppError;

/// Checkout payload. Clients post the whole service record, only `price` is read.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentIntentRequest {
    pub price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntentResponse {
    #[serde(rename = "clientSecret")]
    pub client_secret: String,
}

/// Subset of the processor's payment intent object that we read back.
#[derive(Debug, Clone, Deserialize)]
pub struct StripePaymentIntent {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    pub client_secret: Option<String>,
}

pub const PAYMENT_CURRENCY: &str = "usd";

/// Convert a catalog price into the smallest currency unit.
pub fn amount_in_cents(price: f64) -> Result<i64, PaymentError> {
    if !price.is_finite() || price < 0.0 {
        return Err(PaymentError::InvalidAmount(price.to_string()));
    }
    Ok((price * 100.0).round() as i64)
}

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("Invalid payment amount: {0}")]
    InvalidAmount(String),

    #[error("Payment processor is not configured")]
    NotConfigured,

    #[error("Payment processor error: {message}")]
    Processor { message: String },
}

impl From<reqwest::Error> for PaymentError {
    fn from(err: reqwest::Error) -> Self {
        PaymentError::Processor {
            message: err.to_string(),
        }
    }
}

impl From<PaymentError> for AppError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::InvalidAmount(_) => AppError::BadRequest(err.to_string()),
            PaymentError::NotConfigured | PaymentError::Processor { .. } => {
                AppError::ExternalService(err.to_string())
            }
        }
    }
}
