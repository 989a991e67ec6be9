use reqwest::Method;
use serde_json::json;
use tracing::{debug, info};

use shared_config::AppConfig;
use shared_database::supabase::{eq_filter, SupabaseClient};

use crate::models::{CreateDoctorRequest, Doctor, DoctorError};

const DOCTORS_PATH: &str = "/rest/v1/doctors";

pub struct DoctorService {
    supabase: SupabaseClient,
}

impl DoctorService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn list_doctors(&self) -> Result<Vec<Doctor>, DoctorError> {
        let doctors: Vec<Doctor> = self.supabase.request(Method::GET, DOCTORS_PATH, None).await?;
        debug!("Loaded {} doctors", doctors.len());
        Ok(doctors)
    }

    /// Add a doctor to the roster
    pub async fn add_doctor(&self, request: CreateDoctorRequest) -> Result<Doctor, DoctorError> {
        debug!("Adding doctor: {}", request.email);

        for (field, value) in [("name", &request.name), ("email", &request.email), ("specialty", &request.specialty)] {
            if value.trim().is_empty() {
                return Err(DoctorError::ValidationError(format!("{} is required", field)));
            }
        }

        let existing_check_path = format!("{}?{}&limit=1", DOCTORS_PATH, eq_filter("email", &request.email));
        let existing: Vec<Doctor> = self.supabase.request(Method::GET, &existing_check_path, None).await?;
        if !existing.is_empty() {
            return Err(DoctorError::AlreadyExists(request.email));
        }

        let doctor_data = json!({
            "name": request.name,
            "email": request.email,
            "specialty": request.specialty,
            "img": request.img,
        });

        let headers = SupabaseClient::representation_headers("return=representation")?;
        let result: Vec<Doctor> = self.supabase.request_with_headers(
            Method::POST,
            DOCTORS_PATH,
            Some(doctor_data),
            Some(headers),
        ).await?;

        let doctor = result
            .into_iter()
            .next()
            .ok_or_else(|| DoctorError::Database("Failed to create doctor".to_string()))?;

        info!("Doctor {} added to roster", doctor.email);
        Ok(doctor)
    }

    pub async fn remove_doctor(&self, email: &str) -> Result<Doctor, DoctorError> {
        let path = format!("{}?{}", DOCTORS_PATH, eq_filter("email", email));
        let headers = SupabaseClient::representation_headers("return=representation")?;

        let removed: Vec<Doctor> = self.supabase.request_with_headers(
            Method::DELETE,
            &path,
            None,
            Some(headers),
        ).await?;

        let doctor = removed
            .into_iter()
            .next()
            .ok_or_else(|| DoctorError::NotFound(email.to_string()))?;

        info!("Doctor {} removed from roster", email);
        Ok(doctor)
    }
}
