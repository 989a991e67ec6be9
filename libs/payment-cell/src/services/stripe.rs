use reqwest::Client;
use tracing::{debug, error, info};

use shared_config::AppConfig;

use crate::models::{PaymentError, StripePaymentIntent, PAYMENT_CURRENCY};

/// Card processor client for payment intents
/// See: https://docs.stripe.com/api/payment_intents/create
pub struct StripeClient {
    client: Client,
    secret_key: String,
    base_url: String,
}

impl StripeClient {
    pub fn new(config: &AppConfig) -> Result<Self, PaymentError> {
        if !config.is_payment_configured() {
            return Err(PaymentError::NotConfigured);
        }

        Ok(Self {
            client: Client::new(),
            secret_key: config.stripe_secret_key.clone(),
            base_url: config.stripe_api_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// POST /v1/payment_intents
    pub async fn create_payment_intent(
        &self,
        amount_cents: i64,
    ) -> Result<StripePaymentIntent, PaymentError> {
        let url = format!("{}/v1/payment_intents", self.base_url);
        let amount = amount_cents.to_string();

        let form = [
            ("amount", amount.as_str()),
            ("currency", PAYMENT_CURRENCY),
            ("payment_method_types[]", "card"),
        ];

        debug!("Creating payment intent for {} cents", amount_cents);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.secret_key))
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;

        if !status.is_success() {
            error!("Payment intent creation failed: {} - {}", status, response_text);
            return Err(PaymentError::Processor {
                message: format!("HTTP {}: {}", status, response_text),
            });
        }

        let intent: StripePaymentIntent = serde_json::from_str(&response_text)
            .map_err(|e| PaymentError::Processor {
                message: format!("Failed to parse payment intent: {}", e),
            })?;

        info!("Created payment intent {}", intent.id);
        Ok(intent)
    }
}
