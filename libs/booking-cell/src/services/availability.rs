use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use crate::models::{AvailabilityView, Booking, BookingError, Service};
use crate::services::store::{BookingStore, ServiceCatalog};

/// Narrows every service's slot catalog to the slots not yet booked.
///
/// `bookings_on_date` must already be restricted to `date`; the date is
/// only an opaque key here and no further filtering happens. Catalog order
/// is preserved, and booked slots missing from a catalog are ignored.
pub fn compute_availability(
    date: &str,
    services: &[Service],
    bookings_on_date: &[Booking],
) -> Vec<AvailabilityView> {
    debug!(
        "Computing availability for {:?} across {} services and {} bookings",
        date,
        services.len(),
        bookings_on_date.len()
    );

    services
        .iter()
        .map(|service| {
            let booked: HashSet<&str> = bookings_on_date
                .iter()
                .filter(|booking| booking.treatment == service.name)
                .map(|booking| booking.slot.as_str())
                .collect();

            AvailabilityView {
                id: service.id.clone(),
                name: service.name.clone(),
                price: service.price,
                slots: service
                    .slots
                    .iter()
                    .filter(|slot| !booked.contains(slot.as_str()))
                    .cloned()
                    .collect(),
            }
        })
        .collect()
}

pub struct AvailabilityService {
    catalog: Arc<dyn ServiceCatalog>,
    store: Arc<dyn BookingStore>,
}

impl AvailabilityService {
    pub fn new(catalog: Arc<dyn ServiceCatalog>, store: Arc<dyn BookingStore>) -> Self {
        Self { catalog, store }
    }

    pub async fn available_on(&self, date: &str) -> Result<Vec<AvailabilityView>, BookingError> {
        let services = self.catalog.list_services().await?;
        let bookings = self.store.find_bookings_by_date(date).await?;

        Ok(compute_availability(date, &services, &bookings))
    }
}
