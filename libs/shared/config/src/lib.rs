use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_service_key: String,
    pub access_token_secret: String,
    pub access_token_ttl_minutes: i64,
    pub email_sender: String,
    pub email_sender_key: String,
    pub email_api_base_url: String,
    pub stripe_secret_key: String,
    pub stripe_api_base_url: String,
    pub port: u16,
    pub strict_booking_validation: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using empty value");
                    String::new()
                }),
            supabase_service_key: env::var("SUPABASE_SERVICE_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_SERVICE_KEY not set, using empty value");
                    String::new()
                }),
            access_token_secret: env::var("ACCESS_TOKEN_SECRET")
                .unwrap_or_else(|_| {
                    warn!("ACCESS_TOKEN_SECRET not set, using empty value");
                    String::new()
                }),
            access_token_ttl_minutes: parse_or("ACCESS_TOKEN_TTL_MINUTES", 60),
            email_sender: env::var("EMAIL_SENDER")
                .unwrap_or_else(|_| {
                    warn!("EMAIL_SENDER not set, using empty value");
                    String::new()
                }),
            email_sender_key: env::var("EMAIL_SENDER_KEY")
                .unwrap_or_else(|_| {
                    warn!("EMAIL_SENDER_KEY not set, using empty value");
                    String::new()
                }),
            email_api_base_url: env::var("EMAIL_API_BASE_URL")
                .unwrap_or_else(|_| "https://api.sendgrid.com".to_string()),
            stripe_secret_key: env::var("STRIPE_SECRET_KEY")
                .unwrap_or_else(|_| {
                    warn!("STRIPE_SECRET_KEY not set, using empty value");
                    String::new()
                }),
            stripe_api_base_url: env::var("STRIPE_API_BASE_URL")
                .unwrap_or_else(|_| "https://api.stripe.com".to_string()),
            port: parse_or("PORT", 5000),
            strict_booking_validation: parse_or("STRICT_BOOKING_VALIDATION", false),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty()
            && !self.supabase_service_key.is_empty()
            && !self.access_token_secret.is_empty()
    }

    pub fn is_email_configured(&self) -> bool {
        !self.email_sender.is_empty()
            && !self.email_sender_key.is_empty()
            && !self.email_api_base_url.is_empty()
    }

    pub fn is_payment_configured(&self) -> bool {
        !self.stripe_secret_key.is_empty() && !self.stripe_api_base_url.is_empty()
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("{} has an invalid value ({}), using default", key, raw);
            default
        }),
        Err(_) => default,
    }
}
