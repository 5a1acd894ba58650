use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use shuttle_core::booking::{Booking, NewBooking};
use shuttle_core::repository::{BookingRepository, RepositoryError};
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

/// Process-local booking store with the same uniqueness rules as Postgres.
///
/// Used when no database URL is configured, and by tests. The write lock is
/// held across check-and-insert, so concurrent submissions for the same
/// trip/date serialize and only one wins.
#[derive(Default)]
pub struct InMemoryBookingRepository {
    bookings: RwLock<Vec<Booking>>,
}

impl InMemoryBookingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.bookings.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.bookings.read().await.is_empty()
    }
}

fn holds(booking: &Booking, trip_id: &str, date: NaiveDate) -> bool {
    booking.status.holds_trip() && booking.booking_date == date && booking.includes_trip(trip_id)
}

#[async_trait]
impl BookingRepository for InMemoryBookingRepository {
    async fn create_booking(&self, booking: &NewBooking) -> Result<Booking, RepositoryError> {
        let mut bookings = self.bookings.write().await;

        if bookings.iter().any(|b| b.confirmation_code == booking.confirmation_code) {
            return Err(RepositoryError::DuplicateConfirmationCode(booking.confirmation_code.clone()));
        }

        if booking.status.holds_trip() {
            for trip_id in booking.trip_ids() {
                if bookings.iter().any(|b| holds(b, trip_id, booking.booking_date)) {
                    return Err(RepositoryError::TripAlreadyBooked {
                        trip_id: trip_id.to_string(),
                        date: booking.booking_date,
                    });
                }
            }
        }

        let stored = Booking::from_new(Uuid::new_v4(), booking.clone(), Utc::now());
        bookings.push(stored.clone());

        info!("Booking {} stored in memory for {}", stored.id, stored.booking_date);
        Ok(stored)
    }

    async fn find_active_booking(
        &self,
        trip_id: &str,
        date: NaiveDate,
    ) -> Result<Option<Uuid>, RepositoryError> {
        let bookings = self.bookings.read().await;
        Ok(bookings.iter().find(|b| holds(b, trip_id, date)).map(|b| b.id))
    }

    async fn get_booking(&self, id: Uuid) -> Result<Option<Booking>, RepositoryError> {
        let bookings = self.bookings.read().await;
        Ok(bookings.iter().find(|b| b.id == id).cloned())
    }
}
