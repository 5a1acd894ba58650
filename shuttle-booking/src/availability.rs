use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use shuttle_catalog::{is_valid_booking_date, Direction, Trip, TripCatalog};
use shuttle_core::availability::{
    AvailabilityCheck, AvailabilityChecker, ALREADY_BOOKED, CHECK_FAILED, NOT_OFFERED, PAST_DATE,
};
use shuttle_core::repository::BookingRepository;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::warn;

/// Availability backed by the booking store.
pub struct StoreAvailabilityChecker {
    repository: Arc<dyn BookingRepository>,
}

impl StoreAvailabilityChecker {
    pub fn new(repository: Arc<dyn BookingRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl AvailabilityChecker for StoreAvailabilityChecker {
    async fn check_availability(&self, trip_id: &str, date: NaiveDate) -> AvailabilityCheck {
        match self.repository.find_active_booking(trip_id, date).await {
            Ok(None) => AvailabilityCheck::available(trip_id),
            Ok(Some(_)) => AvailabilityCheck::unavailable(trip_id, ALREADY_BOOKED),
            Err(e) => {
                // Fail closed
                warn!("Availability check for {} on {} failed: {}", trip_id, date, e);
                AvailabilityCheck::unavailable(trip_id, CHECK_FAILED)
            }
        }
    }
}

/// Deterministic stand-in for [`StoreAvailabilityChecker`].
#[derive(Debug, Default, Clone)]
pub struct FakeAvailabilityChecker {
    booked: HashSet<(String, NaiveDate)>,
    failing: bool,
}

impl FakeAvailabilityChecker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_booked(mut self, trip_id: &str, date: NaiveDate) -> Self {
        self.booked.insert((trip_id.to_string(), date));
        self
    }

    /// Every check behaves as if the store were unreachable.
    pub fn failing() -> Self {
        Self {
            booked: HashSet::new(),
            failing: true,
        }
    }
}

#[async_trait]
impl AvailabilityChecker for FakeAvailabilityChecker {
    async fn check_availability(&self, trip_id: &str, date: NaiveDate) -> AvailabilityCheck {
        if self.failing {
            return AvailabilityCheck::unavailable(trip_id, CHECK_FAILED);
        }
        if self.booked.contains(&(trip_id.to_string(), date)) {
            AvailabilityCheck::unavailable(trip_id, ALREADY_BOOKED)
        } else {
            AvailabilityCheck::available(trip_id)
        }
    }
}

/// A catalog trip paired with whether it can be booked on a given date.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripAvailability {
    pub trip: Trip,
    pub is_available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Trips for `direction` in catalog order, each with its availability on `date`.
pub async fn trips_with_availability(
    catalog: &TripCatalog,
    checker: &dyn AvailabilityChecker,
    direction: Direction,
    date: NaiveDate,
) -> Vec<TripAvailability> {
    let trips = catalog.list_by_direction(direction);
    let ids: Vec<String> = trips.iter().map(|t| t.id.clone()).collect();
    let checks = checker.check_multiple(&ids, date).await;

    trips
        .into_iter()
        .zip(checks)
        .map(|(trip, check)| {
            if !trip.is_available {
                return TripAvailability {
                    trip: trip.clone(),
                    is_available: false,
                    reason: Some(NOT_OFFERED.to_string()),
                };
            }
            TripAvailability {
                trip: trip.clone(),
                is_available: check.is_available,
                reason: check.reason,
            }
        })
        .collect()
}

/// [`trips_with_availability`] for a client-chosen date. A date before `today`
/// reports every trip unavailable without consulting the store.
pub async fn bookable_trips(
    catalog: &TripCatalog,
    checker: &dyn AvailabilityChecker,
    direction: Direction,
    date: NaiveDate,
    today: NaiveDate,
) -> Vec<TripAvailability> {
    if is_valid_booking_date(date, today) {
        return trips_with_availability(catalog, checker, direction, date).await;
    }

    catalog
        .list_by_direction(direction)
        .into_iter()
        .map(|trip| TripAvailability {
            trip: trip.clone(),
            is_available: false,
            reason: Some(PAST_DATE.to_string()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use shuttle_core::booking::{BookingSubmission, NewBooking, PassengerInfo};
    use shuttle_core::repository::RepositoryError;
    use shuttle_store::InMemoryBookingRepository;
    use uuid::Uuid;

    const ROUTE: &str = "Thomasville → Tallahassee Airport";

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn trip(id: &str) -> Trip {
        Trip::new(id, Direction::ToAirport, "08:00", "8:00 AM", 85, ROUTE)
    }

    async fn book(repo: &InMemoryBookingRepository, trip_id: &str, code: &str) {
        let submission = BookingSubmission {
            trip_id: trip_id.to_string(),
            date: date(),
            passenger_info: PassengerInfo {
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
                email: "ada@example.com".into(),
                phone: "555-0100".into(),
            },
            passenger_count: 1,
            luggage: vec![],
            comments: None,
        };
        repo.create_booking(&NewBooking::for_trip(&trip(trip_id), &submission, code.to_string()))
            .await
            .unwrap();
    }

    struct BrokenRepository;

    #[async_trait]
    impl BookingRepository for BrokenRepository {
        async fn create_booking(&self, _booking: &NewBooking) -> Result<shuttle_core::Booking, RepositoryError> {
            Err(RepositoryError::Backend("connection refused".to_string()))
        }

        async fn find_active_booking(&self, _trip_id: &str, _date: NaiveDate) -> Result<Option<Uuid>, RepositoryError> {
            Err(RepositoryError::Backend("connection refused".to_string()))
        }

        async fn get_booking(&self, _id: Uuid) -> Result<Option<shuttle_core::Booking>, RepositoryError> {
            Err(RepositoryError::Backend("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn test_store_checker_reflects_bookings() {
        let repo = Arc::new(InMemoryBookingRepository::new());
        let checker = StoreAvailabilityChecker::new(repo.clone());

        assert_eq!(checker.check_availability("A", date()).await, AvailabilityCheck::available("A"));

        book(&repo, "A", "AAAAAA").await;

        let check = checker.check_availability("A", date()).await;
        assert!(!check.is_available);
        assert_eq!(check.reason.as_deref(), Some(ALREADY_BOOKED));

        // Other dates are unaffected
        assert!(checker.check_availability("A", date().succ_opt().unwrap()).await.is_available);
    }

    #[tokio::test]
    async fn test_store_failure_reads_as_unavailable() {
        let checker = StoreAvailabilityChecker::new(Arc::new(BrokenRepository));

        let check = checker.check_availability("A", date()).await;
        assert!(!check.is_available);
        assert_eq!(check.reason.as_deref(), Some(CHECK_FAILED));
    }

    #[tokio::test]
    async fn test_check_multiple_keeps_input_order() {
        let repo = Arc::new(InMemoryBookingRepository::new());
        book(&repo, "B", "BBBBBB").await;
        let checker = StoreAvailabilityChecker::new(repo);

        let ids = vec!["A".to_string(), "B".to_string(), "C".to_string()];
        let results = checker.check_multiple(&ids, date()).await;

        assert_eq!(results.len(), 3);
        assert_eq!(results.iter().map(|r| r.trip_id.as_str()).collect::<Vec<_>>(), vec!["A", "B", "C"]);
        assert_eq!(results.iter().map(|r| r.is_available).collect::<Vec<_>>(), vec![true, false, true]);
    }

    #[tokio::test]
    async fn test_fake_checker_is_deterministic() {
        let fake = FakeAvailabilityChecker::new().with_booked("A", date());

        for _ in 0..10 {
            assert!(!fake.check_availability("A", date()).await.is_available);
            assert!(fake.check_availability("B", date()).await.is_available);
        }

        let down = FakeAvailabilityChecker::failing();
        assert_eq!(down.check_availability("B", date()).await.reason.as_deref(), Some(CHECK_FAILED));
    }

    #[tokio::test]
    async fn test_trips_with_availability() {
        let mut retired = trip("B");
        retired.is_available = false;
        let catalog = TripCatalog::new(vec![
            trip("A"),
            retired,
            trip("C"),
            Trip::new("D", Direction::FromAirport, "12:00", "12:00 PM", 85, "Tallahassee Airport → Thomasville"),
        ])
        .unwrap();
        let checker = FakeAvailabilityChecker::new().with_booked("C", date());

        let listed = trips_with_availability(&catalog, &checker, Direction::ToAirport, date()).await;

        assert_eq!(listed.iter().map(|t| t.trip.id.as_str()).collect::<Vec<_>>(), vec!["A", "B", "C"]);
        assert!(listed[0].is_available);
        assert_eq!(listed[1].reason.as_deref(), Some(NOT_OFFERED));
        assert_eq!(listed[2].reason.as_deref(), Some(ALREADY_BOOKED));
    }

    #[tokio::test]
    async fn test_past_dates_are_never_bookable() {
        let catalog = TripCatalog::new(vec![trip("A"), trip("B")]).unwrap();
        let checker = FakeAvailabilityChecker::failing();
        let today = date().succ_opt().unwrap();

        let listed = bookable_trips(&catalog, &checker, Direction::ToAirport, date(), today).await;
        assert_eq!(listed.len(), 2);
        assert!(listed.iter().all(|t| !t.is_available && t.reason.as_deref() == Some(PAST_DATE)));

        // Today itself is still bookable
        let free = FakeAvailabilityChecker::new();
        let listed = bookable_trips(&catalog, &free, Direction::ToAirport, date(), date()).await;
        assert!(listed.iter().all(|t| t.is_available));
    }
}
