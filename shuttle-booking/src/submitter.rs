use shuttle_catalog::TripCatalog;
use shuttle_core::booking::{BookingResult, BookingSubmission, NewBooking};
use shuttle_core::repository::{BookingRepository, RepositoryError};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;
use crate::confirmation::{CodeGenerator, RandomCodeGenerator};

const DEFAULT_CODE_ATTEMPTS: u32 = 5;

/// Turns a validated submission into a stored pending booking.
///
/// The (trip, date) uniqueness rule is enforced by the repository in the same
/// write that stores the booking, so there is no separate availability
/// re-check here.
pub struct BookingSubmitter {
    catalog: Arc<TripCatalog>,
    repository: Arc<dyn BookingRepository>,
    codes: Arc<dyn CodeGenerator>,
    max_code_attempts: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedBooking {
    pub booking_id: Uuid,
    pub confirmation_code: String,
}

impl SubmittedBooking {
    pub fn to_result(&self) -> BookingResult {
        BookingResult::confirmed(self.booking_id, self.confirmation_code.clone())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("invalid trip")]
    InvalidTrip { trip_id: String },

    #[error("trip is not currently offered")]
    TripNotOffered { trip_id: String },

    #[error("{0}")]
    Validation(String),

    #[error("already booked for this date")]
    AlreadyBooked,

    #[error("failed to submit booking")]
    Failed,
}

impl SubmitError {
    pub fn to_result(&self) -> BookingResult {
        BookingResult::failed(self.to_string())
    }
}

impl BookingSubmitter {
    pub fn new(catalog: Arc<TripCatalog>, repository: Arc<dyn BookingRepository>) -> Self {
        Self {
            catalog,
            repository,
            codes: Arc::new(RandomCodeGenerator),
            max_code_attempts: DEFAULT_CODE_ATTEMPTS,
        }
    }

    pub fn with_code_generator(mut self, codes: Arc<dyn CodeGenerator>) -> Self {
        self.codes = codes;
        self
    }

    pub fn with_max_code_attempts(mut self, attempts: u32) -> Self {
        self.max_code_attempts = attempts.max(1);
        self
    }

    pub async fn submit(&self, submission: &BookingSubmission) -> Result<SubmittedBooking, SubmitError> {
        let trip = self.catalog.get_by_id(&submission.trip_id).ok_or_else(|| {
            warn!("Rejected booking for unknown trip {}", submission.trip_id);
            SubmitError::InvalidTrip { trip_id: submission.trip_id.clone() }
        })?;

        if !trip.is_available {
            return Err(SubmitError::TripNotOffered { trip_id: trip.id.clone() });
        }

        submission
            .validate()
            .map_err(|e| SubmitError::Validation(e.to_string()))?;

        for attempt in 1..=self.max_code_attempts {
            let booking = NewBooking::for_trip(trip, submission, self.codes.generate());

            match self.repository.create_booking(&booking).await {
                Ok(stored) => {
                    info!(
                        "Booking {} created for trip {} on {} ({})",
                        stored.id, trip.id, stored.booking_date, stored.confirmation_code
                    );
                    return Ok(SubmittedBooking {
                        booking_id: stored.id,
                        confirmation_code: stored.confirmation_code,
                    });
                }
                Err(RepositoryError::DuplicateConfirmationCode(code)) => {
                    warn!("Confirmation code {} already taken (attempt {})", code, attempt);
                }
                Err(RepositoryError::TripAlreadyBooked { trip_id, date }) => {
                    info!("Trip {} on {} was booked concurrently", trip_id, date);
                    return Err(SubmitError::AlreadyBooked);
                }
                Err(e) => {
                    error!("Error submitting booking for trip {}: {}", trip.id, e);
                    return Err(SubmitError::Failed);
                }
            }
        }

        error!(
            "Gave up on trip {} after {} confirmation code collisions",
            trip.id, self.max_code_attempts
        );
        Err(SubmitError::Failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::availability::StoreAvailabilityChecker;
    use crate::confirmation::is_confirmation_code;
    use chrono::NaiveDate;
    use shuttle_catalog::{Direction, Trip};
    use shuttle_core::availability::{AvailabilityChecker, ALREADY_BOOKED};
    use shuttle_core::booking::{BookingStatus, PassengerInfo};
    use shuttle_store::InMemoryBookingRepository;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    const ROUTE: &str = "Thomasville → Tallahassee Airport";

    struct ScriptedCodes(Mutex<VecDeque<&'static str>>);

    impl ScriptedCodes {
        fn new(codes: &[&'static str]) -> Self {
            Self(Mutex::new(codes.iter().copied().collect()))
        }
    }

    impl CodeGenerator for ScriptedCodes {
        fn generate(&self) -> String {
            self.0.lock().unwrap().pop_front().unwrap_or("ZZZZZZ").to_string()
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn catalog() -> Arc<TripCatalog> {
        let mut retired = Trip::new("R", Direction::ToAirport, "10:00", "10:00 AM", 85, ROUTE);
        retired.is_available = false;
        Arc::new(
            TripCatalog::new(vec![
                Trip::new("A", Direction::ToAirport, "08:00", "8:00 AM", 85, ROUTE),
                Trip::new("B", Direction::ToAirport, "06:00", "6:00 AM", 95, ROUTE),
                retired,
            ])
            .unwrap(),
        )
    }

    fn submission(trip_id: &str) -> BookingSubmission {
        BookingSubmission {
            trip_id: trip_id.to_string(),
            date: date(),
            passenger_info: PassengerInfo {
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
                email: "ada@example.com".into(),
                phone: "555-0100".into(),
            },
            passenger_count: 2,
            luggage: vec![],
            comments: Some("Early flight".to_string()),
        }
    }

    #[tokio::test]
    async fn test_submit_then_trip_is_taken() {
        let repo = Arc::new(InMemoryBookingRepository::new());
        let checker = StoreAvailabilityChecker::new(repo.clone());
        let submitter = BookingSubmitter::new(catalog(), repo.clone());

        assert!(checker.check_availability("A", date()).await.is_available);

        let submitted = submitter.submit(&submission("A")).await.unwrap();
        assert!(is_confirmation_code(&submitted.confirmation_code));

        let check = checker.check_availability("A", date()).await;
        assert!(!check.is_available);
        assert_eq!(check.reason.as_deref(), Some(ALREADY_BOOKED));

        let stored = repo.get_booking(submitted.booking_id).await.unwrap().unwrap();
        assert_eq!(stored.status, BookingStatus::Pending);
        assert_eq!(stored.total_price, 85);
        assert_eq!(stored.trips[0].id, "A");
        assert_eq!(stored.passenger_count, 2);
    }

    #[tokio::test]
    async fn test_unknown_trip_writes_nothing() {
        let repo = Arc::new(InMemoryBookingRepository::new());
        let submitter = BookingSubmitter::new(catalog(), repo.clone());

        let err = submitter.submit(&submission("nope")).await.unwrap_err();
        assert!(matches!(err, SubmitError::InvalidTrip { .. }));
        assert_eq!(err.to_result(), BookingResult::failed("invalid trip"));
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn test_invalid_party_size_writes_nothing() {
        let repo = Arc::new(InMemoryBookingRepository::new());
        let submitter = BookingSubmitter::new(catalog(), repo.clone());
        let mut sub = submission("A");
        sub.passenger_count = 0;

        assert!(matches!(submitter.submit(&sub).await, Err(SubmitError::Validation(_))));
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn test_trip_not_offered() {
        let repo = Arc::new(InMemoryBookingRepository::new());
        let submitter = BookingSubmitter::new(catalog(), repo.clone());

        assert!(matches!(submitter.submit(&submission("R")).await, Err(SubmitError::TripNotOffered { .. })));
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn test_second_booking_same_trip_and_date_rejected() {
        let repo = Arc::new(InMemoryBookingRepository::new());
        let submitter = BookingSubmitter::new(catalog(), repo.clone());

        submitter.submit(&submission("A")).await.unwrap();
        let err = submitter.submit(&submission("A")).await.unwrap_err();

        assert!(matches!(err, SubmitError::AlreadyBooked));
        assert_eq!(err.to_string(), "already booked for this date");
        assert_eq!(repo.len().await, 1);

        // A different trip on the same date is still fine
        submitter.submit(&submission("B")).await.unwrap();
    }

    #[tokio::test]
    async fn test_code_collision_draws_a_new_code() {
        let repo = Arc::new(InMemoryBookingRepository::new());
        let submitter = BookingSubmitter::new(catalog(), repo.clone())
            .with_code_generator(Arc::new(ScriptedCodes::new(&["AAAAAA", "AAAAAA", "BBBBBB"])));

        let first = submitter.submit(&submission("A")).await.unwrap();
        let second = submitter.submit(&submission("B")).await.unwrap();

        assert_eq!(first.confirmation_code, "AAAAAA");
        assert_eq!(second.confirmation_code, "BBBBBB");
    }

    #[tokio::test]
    async fn test_gives_up_after_max_code_attempts() {
        let repo = Arc::new(InMemoryBookingRepository::new());
        let submitter = BookingSubmitter::new(catalog(), repo.clone())
            .with_code_generator(Arc::new(ScriptedCodes::new(&["AAAAAA", "AAAAAA", "AAAAAA", "AAAAAA"])))
            .with_max_code_attempts(3);

        submitter.submit(&submission("A")).await.unwrap();
        let err = submitter.submit(&submission("B")).await.unwrap_err();

        assert!(matches!(err, SubmitError::Failed));
        assert_eq!(err.to_result().error.as_deref(), Some("failed to submit booking"));
    }

    #[tokio::test]
    async fn test_concurrent_submissions_for_one_trip() {
        let repo = Arc::new(InMemoryBookingRepository::new());
        let submitter = Arc::new(BookingSubmitter::new(catalog(), repo.clone()));

        let handles: Vec<_> = (0..6)
            .map(|_| {
                let submitter = submitter.clone();
                tokio::spawn(async move { submitter.submit(&submission("A")).await })
            })
            .collect();

        let mut confirmed = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => confirmed += 1,
                Err(e) => assert!(matches!(e, SubmitError::AlreadyBooked)),
            }
        }
        assert_eq!(confirmed, 1);
    }
}
