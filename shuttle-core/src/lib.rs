pub mod booking;
pub mod repository;
pub mod payment;
pub mod availability;

pub use availability::{AvailabilityCheck, AvailabilityChecker};
pub use booking::{
    Booking, BookingResult, BookingStatus, BookingSubmission, LuggageItem, NewBooking,
    PassengerInfo, TripSnapshot,
};
pub use repository::{BookingRepository, RepositoryError};
pub use payment::{PaymentIntent, PaymentIntentRequest, PaymentProvider, PaymentStatus, ProviderError};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Unknown booking status: {0}")]
    UnknownStatus(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
