use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::models::{AdmissionResult, Booking, BookingError};
use crate::services::notifier::{dispatch_confirmation, Notifier};
use crate::services::store::BookingStore;

/// Outcome of one admission attempt plus the detached confirmation task,
/// which only exists on the admitted path.
#[derive(Debug)]
pub struct Admission {
    pub result: AdmissionResult,
    pub notification: Option<JoinHandle<()>>,
}

/// Accepts a booking unless one with the same (treatment, date, patient)
/// is already on file.
pub struct BookingAdmissionService {
    store: Arc<dyn BookingStore>,
    notifier: Arc<dyn Notifier>,
}

impl BookingAdmissionService {
    pub fn new(store: Arc<dyn BookingStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    pub async fn admit_booking(&self, request: Booking) -> Result<Admission, BookingError> {
        debug!(
            "Admitting booking for {} on {} for {}",
            request.treatment, request.date, request.patient
        );

        if let Some(existing) = self.lookup(&request).await? {
            info!(
                "Rejecting duplicate booking for {} on {} for {}",
                request.treatment, request.date, request.patient
            );
            return Ok(Admission {
                result: AdmissionResult::Rejected { existing },
                notification: None,
            });
        }

        let stored = match self.store.insert_booking(&request).await {
            Ok(stored) => stored,
            Err(BookingError::Duplicate { .. }) => {
                // Another request won the race between lookup and insert.
                let existing = self.lookup(&request).await?.ok_or_else(|| {
                    BookingError::Database(
                        "insert reported a duplicate but no booking was found".to_string(),
                    )
                })?;
                return Ok(Admission {
                    result: AdmissionResult::Rejected { existing },
                    notification: None,
                });
            }
            Err(e) => return Err(e),
        };

        info!(
            "Booking admitted for {} on {} at {} ({:?})",
            stored.treatment, stored.date, stored.slot, stored.id
        );

        let notification = dispatch_confirmation(Arc::clone(&self.notifier), stored.clone());

        Ok(Admission {
            result: AdmissionResult::Admitted { stored },
            notification: Some(notification),
        })
    }

    async fn lookup(&self, request: &Booking) -> Result<Option<Booking>, BookingError> {
        self.store
            .find_booking(&request.treatment, &request.date, &request.patient)
            .await
    }
}
