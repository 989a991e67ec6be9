use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    Json,
};
use tracing::debug;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{amount_in_cents, PaymentError, PaymentIntentRequest, PaymentIntentResponse};
use crate::services::StripeClient;

pub async fn create_payment_intent(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Json(request): Json<PaymentIntentRequest>,
) -> Result<Json<PaymentIntentResponse>, AppError> {
    let amount = amount_in_cents(request.price)?;
    debug!("Payment intent of {} cents requested by {}", amount, user.email);

    let intent = StripeClient::new(&state)?
        .create_payment_intent(amount)
        .await?;

    let client_secret = intent.client_secret.ok_or_else(|| PaymentError::Processor {
        message: format!("payment intent {} has no client secret", intent.id),
    })?;

    Ok(Json(PaymentIntentResponse { client_secret }))
}
