use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;
use crate::booking::{Booking, NewBooking};

/// Persistence seam for booking records.
///
/// Implementations must reject a second booking that holds the same trip on
/// the same date, and a booking that reuses an existing confirmation code.
/// Both checks happen inside the same atomic write as the insert.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn create_booking(&self, booking: &NewBooking) -> Result<Booking, RepositoryError>;

    /// Id of a non-cancelled booking holding `trip_id` on `date`, if any.
    async fn find_active_booking(
        &self,
        trip_id: &str,
        date: NaiveDate,
    ) -> Result<Option<Uuid>, RepositoryError>;

    async fn get_booking(&self, id: Uuid) -> Result<Option<Booking>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Trip {trip_id} is already booked on {date}")]
    TripAlreadyBooked { trip_id: String, date: NaiveDate },

    #[error("Confirmation code {0} is already in use")]
    DuplicateConfirmationCode(String),

    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("Stored booking is malformed: {0}")]
    Corrupt(String),
}
