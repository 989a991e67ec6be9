use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use shared_config::AppConfig;

use crate::models::{Booking, BookingError};

/// Sends the patient-facing confirmation for an admitted booking.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_confirmation(&self, booking: &Booking) -> Result<(), BookingError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmationEmail {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

impl ConfirmationEmail {
    pub fn for_booking(booking: &Booking) -> Self {
        let summary = format!(
            "Your appointment for {} is on {} at {} is confirmed",
            booking.treatment, booking.date, booking.slot
        );
        let html = format!(
            "<div>\
             <p>Hello {},</p>\
             <h3>Your appointment for {} is confirmed</h3>\
             <p>Looking forward to seeing you on {} at {}.</p>\
             </div>",
            booking.patient_name, booking.treatment, booking.date, booking.slot
        );

        Self {
            to: booking.patient.clone(),
            subject: summary.clone(),
            text: summary,
            html,
        }
    }
}

/// SendGrid v3 mail client.
pub struct EmailNotifier {
    client: Client,
    base_url: String,
    api_key: String,
    sender: String,
    configured: bool,
}

impl EmailNotifier {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.email_api_base_url.trim_end_matches('/').to_string(),
            api_key: config.email_sender_key.clone(),
            sender: config.email_sender.clone(),
            configured: config.is_email_configured(),
        }
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn send_confirmation(&self, booking: &Booking) -> Result<(), BookingError> {
        if !self.configured {
            return Err(BookingError::NotificationNotConfigured);
        }

        let email = ConfirmationEmail::for_booking(booking);
        let url = format!("{}/v3/mail/send", self.base_url);
        debug!("Sending confirmation email to {} via {}", email.to, url);

        let body = json!({
            "personalizations": [{ "to": [{ "email": email.to }] }],
            "from": { "email": self.sender },
            "subject": email.subject,
            "content": [
                { "type": "text/plain", "value": email.text },
                { "type": "text/html", "value": email.html }
            ]
        });

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| BookingError::Notification(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(BookingError::Notification(format!("HTTP {}: {}", status, error_text)));
        }

        info!("Confirmation email sent to {}", email.to);
        Ok(())
    }
}

/// Runs the confirmation on its own task. Failures end in the log; the
/// caller may await the handle or drop it.
pub fn dispatch_confirmation(notifier: Arc<dyn Notifier>, booking: Booking) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = notifier.send_confirmation(&booking).await {
            warn!(
                "Confirmation for {} ({} on {}) was not delivered: {}",
                booking.patient, booking.treatment, booking.date, e
            );
        }
    })
}
