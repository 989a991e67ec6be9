pub mod availability;
pub mod admission;
pub mod notifier;
pub mod store;
pub mod validation;

pub use availability::{compute_availability, AvailabilityService};
pub use admission::{Admission, BookingAdmissionService};
pub use notifier::{dispatch_confirmation, ConfirmationEmail, EmailNotifier, Notifier};
pub use store::{BookingStore, ServiceCatalog, SupabaseBookingStore, SupabaseServiceCatalog};
pub use validation::validate_booking_request;
