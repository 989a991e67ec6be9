use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use shared_database::supabase::{eq_filter, SupabaseClient};

use crate::models::{Booking, BookingError, PaymentConfirmation, Service, ServiceSummary};

const BOOKINGS_PATH: &str = "/rest/v1/bookings";
const SERVICES_PATH: &str = "/rest/v1/services";
const PAYMENTS_PATH: &str = "/rest/v1/payments";

/// Read access to the service catalog.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ServiceCatalog: Send + Sync {
    async fn list_services(&self) -> Result<Vec<Service>, BookingError>;
}

/// The booking operations admission and availability depend on.
///
/// `insert_booking` must refuse a second booking with the same
/// (treatment, date, patient) by returning [`BookingError::Duplicate`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn find_booking(
        &self,
        treatment: &str,
        date: &str,
        patient: &str,
    ) -> Result<Option<Booking>, BookingError>;

    async fn find_bookings_by_date(&self, date: &str) -> Result<Vec<Booking>, BookingError>;

    async fn insert_booking(&self, booking: &Booking) -> Result<Booking, BookingError>;
}

pub struct SupabaseServiceCatalog {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseServiceCatalog {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    pub async fn list_service_summaries(&self) -> Result<Vec<ServiceSummary>, BookingError> {
        let path = format!("{}?select=id,name", SERVICES_PATH);
        let summaries: Vec<ServiceSummary> = self.supabase.request(Method::GET, &path, None).await?;
        Ok(summaries)
    }
}

#[async_trait]
impl ServiceCatalog for SupabaseServiceCatalog {
    async fn list_services(&self) -> Result<Vec<Service>, BookingError> {
        let path = format!("{}?select=*", SERVICES_PATH);
        let services: Vec<Service> = self.supabase.request(Method::GET, &path, None).await?;
        debug!("Loaded {} services from catalog", services.len());
        Ok(services)
    }
}

pub struct SupabaseBookingStore {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseBookingStore {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    pub async fn find_bookings_by_patient(&self, patient: &str) -> Result<Vec<Booking>, BookingError> {
        let path = format!("{}?{}", BOOKINGS_PATH, eq_filter("patient", patient));
        let bookings: Vec<Booking> = self.supabase.request(Method::GET, &path, None).await?;
        Ok(bookings)
    }

    pub async fn get_booking(&self, booking_id: &str) -> Result<Option<Booking>, BookingError> {
        let path = format!("{}?{}&limit=1", BOOKINGS_PATH, eq_filter("id", booking_id));
        let bookings: Vec<Booking> = self.supabase.request(Method::GET, &path, None).await?;
        Ok(bookings.into_iter().next())
    }

    /// Flags the booking as paid and files the payment record.
    pub async fn mark_paid(
        &self,
        booking_id: &str,
        confirmation: &PaymentConfirmation,
    ) -> Result<Booking, BookingError> {
        let path = format!("{}?{}", BOOKINGS_PATH, eq_filter("id", booking_id));
        let headers = SupabaseClient::representation_headers("return=representation")?;

        let updated: Vec<Booking> = self.supabase.request_with_headers(
            Method::PATCH,
            &path,
            Some(json!({
                "paid": true,
                "transactionId": confirmation.transaction_id,
            })),
            Some(headers),
        ).await?;

        let booking = updated
            .into_iter()
            .next()
            .ok_or_else(|| BookingError::NotFound(booking_id.to_string()))?;

        let mut record = confirmation.extra.clone();
        record.insert("booking".to_string(), json!(booking_id));
        record.insert("transactionId".to_string(), json!(confirmation.transaction_id));

        let headers = SupabaseClient::representation_headers("return=representation")?;
        let _: Vec<Value> = self.supabase.request_with_headers(
            Method::POST,
            PAYMENTS_PATH,
            Some(Value::Object(record)),
            Some(headers),
        ).await?;

        info!("Booking {} marked paid with transaction {}", booking_id, confirmation.transaction_id);
        Ok(booking)
    }
}

#[async_trait]
impl BookingStore for SupabaseBookingStore {
    async fn find_booking(
        &self,
        treatment: &str,
        date: &str,
        patient: &str,
    ) -> Result<Option<Booking>, BookingError> {
        let path = format!(
            "{}?{}&{}&{}&limit=1",
            BOOKINGS_PATH,
            eq_filter("treatment", treatment),
            eq_filter("date", date),
            eq_filter("patient", patient),
        );
        let bookings: Vec<Booking> = self.supabase.request(Method::GET, &path, None).await?;
        Ok(bookings.into_iter().next())
    }

    async fn find_bookings_by_date(&self, date: &str) -> Result<Vec<Booking>, BookingError> {
        let path = format!("{}?{}", BOOKINGS_PATH, eq_filter("date", date));
        let bookings: Vec<Booking> = self.supabase.request(Method::GET, &path, None).await?;
        Ok(bookings)
    }

    async fn insert_booking(&self, booking: &Booking) -> Result<Booking, BookingError> {
        // The unique index on (treatment, date, patient) turns a lost race
        // into an empty representation instead of a second row.
        let path = format!("{}?on_conflict=treatment,date,patient", BOOKINGS_PATH);
        let headers = SupabaseClient::representation_headers(
            "return=representation,resolution=ignore-duplicates",
        )?;

        let inserted: Vec<Booking> = self.supabase.request_with_headers(
            Method::POST,
            &path,
            Some(serde_json::to_value(booking)?),
            Some(headers),
        ).await?;

        match inserted.into_iter().next() {
            Some(stored) => Ok(stored),
            None => {
                warn!(
                    "Insert refused by uniqueness constraint for {} / {} / {}",
                    booking.treatment, booking.date, booking.patient
                );
                Err(BookingError::Duplicate {
                    treatment: booking.treatment.clone(),
                    date: booking.date.clone(),
                    patient: booking.patient.clone(),
                })
            }
        }
    }
}
