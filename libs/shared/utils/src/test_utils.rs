use std::sync::Arc;
use chrono::{Duration, Utc};
use serde_json::json;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;

use crate::jwt::issue_token;

pub struct TestConfig {
    pub jwt_secret: String,
    pub supabase_url: String,
    pub supabase_service_key: String,
    pub email_api_base_url: String,
    pub stripe_api_base_url: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            supabase_url: "http://localhost:54321".to_string(),
            supabase_service_key: "test-service-key".to_string(),
            email_api_base_url: "http://localhost:54322".to_string(),
            stripe_api_base_url: "http://localhost:54323".to_string(),
        }
    }
}

impl TestConfig {
    /// Points every outbound collaborator at the same mock server.
    pub fn with_mock_server(uri: &str) -> Self {
        Self {
            supabase_url: uri.to_string(),
            email_api_base_url: uri.to_string(),
            stripe_api_base_url: uri.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_service_key: self.supabase_service_key.clone(),
            access_token_secret: self.jwt_secret.clone(),
            access_token_ttl_minutes: 60,
            email_sender: "clinic@example.com".to_string(),
            email_sender_key: "test-email-key".to_string(),
            email_api_base_url: self.email_api_base_url.clone(),
            stripe_secret_key: "sk_test_key".to_string(),
            stripe_api_base_url: self.stripe_api_base_url.clone(),
            port: 5000,
            strict_booking_validation: false,
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestUser {
    pub email: String,
    pub role: String,
}

impl Default for TestUser {
    fn default() -> Self {
        Self {
            email: "test@example.com".to_string(),
            role: "patient".to_string(),
        }
    }
}

impl TestUser {
    pub fn new(email: &str, role: &str) -> Self {
        Self {
            email: email.to_string(),
            role: role.to_string(),
        }
    }

    pub fn patient(email: &str) -> Self {
        Self::new(email, "patient")
    }

    pub fn admin(email: &str) -> Self {
        Self::new(email, "admin")
    }

    pub fn to_user(&self) -> User {
        User {
            email: self.email.clone(),
            issued_at: Some(Utc::now()),
            expires_at: Some(Utc::now() + Duration::hours(1)),
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        issue_token(&user.email, secret, Duration::hours(exp_hours.unwrap_or(24)))
            .expect("test secret must not be empty")
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "wrong-secret", Some(24))
    }
}

pub struct MockSupabaseResponses;

impl MockSupabaseResponses {
    pub fn service_response(name: &str, slots: &[&str]) -> serde_json::Value {
        json!({
            "id": Uuid::new_v4(),
            "name": name,
            "price": 25.0,
            "slots": slots
        })
    }

    pub fn booking_response(treatment: &str, date: &str, patient: &str, slot: &str) -> serde_json::Value {
        json!({
            "id": Uuid::new_v4(),
            "treatment": treatment,
            "date": date,
            "slot": slot,
            "patient": patient,
            "patientName": "Test Patient",
            "price": 25.0,
            "paid": false
        })
    }

    pub fn user_response(email: &str, role: Option<&str>) -> serde_json::Value {
        json!({
            "id": Uuid::new_v4(),
            "email": email,
            "name": "Test User",
            "role": role
        })
    }

    pub fn doctor_response(email: &str, specialty: &str) -> serde_json::Value {
        json!({
            "id": Uuid::new_v4(),
            "name": "Dr. Test",
            "email": email,
            "specialty": specialty,
            "img": "https://example.com/doctor.png"
        })
    }
}
