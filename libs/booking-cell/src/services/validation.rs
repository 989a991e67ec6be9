use crate::models::{Booking, BookingError};

/// Optional gate in front of admission, enabled with
/// `STRICT_BOOKING_VALIDATION`. Admission itself trusts its input.
pub fn validate_booking_request(booking: &Booking) -> Result<(), BookingError> {
    let missing: Vec<&str> = [
        ("treatment", booking.treatment.as_str()),
        ("date", booking.date.as_str()),
        ("patient", booking.patient.as_str()),
        ("slot", booking.slot.as_str()),
    ]
    .into_iter()
    .filter(|(_, value)| value.trim().is_empty())
    .map(|(field, _)| field)
    .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(BookingError::Validation(format!("missing required fields: {}", missing.join(", "))))
    }
}
