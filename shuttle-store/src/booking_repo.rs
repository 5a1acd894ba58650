use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use shuttle_core::booking::{Booking, LuggageItem, NewBooking, PassengerInfo, TripSnapshot};
use shuttle_core::repository::{BookingRepository, RepositoryError};
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

/// Unique index on `booking_trips (trip_id, booking_date) WHERE active`.
const ACTIVE_TRIP_DATE_INDEX: &str = "booking_trips_active_trip_date_idx";
const CONFIRMATION_CODE_KEY: &str = "bookings_confirmation_code_key";

pub struct PgBookingRepository {
    pool: PgPool,
}

impl PgBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal struct for type-safe querying
#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    trip_combination_id: String,
    trips: Json<Vec<TripSnapshot>>,
    booking_date: NaiveDate,
    total_price: i32,
    passenger_info: Json<PassengerInfo>,
    passenger_count: i32,
    luggage: Json<Vec<LuggageItem>>,
    comments: Option<String>,
    status: String,
    confirmation_code: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = RepositoryError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse()
            .map_err(|e: shuttle_core::CoreError| RepositoryError::Corrupt(e.to_string()))?;

        Ok(Booking {
            id: row.id,
            trip_combination_id: row.trip_combination_id,
            trips: row.trips.0,
            booking_date: row.booking_date,
            total_price: row.total_price,
            passenger_info: row.passenger_info.0,
            passenger_count: row.passenger_count,
            luggage: row.luggage.0,
            comments: row.comments,
            status,
            confirmation_code: row.confirmation_code,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Turn unique violations on our two keys into typed conflicts.
fn map_write_error(err: sqlx::Error, booking: &NewBooking, trip_id: Option<&str>) -> RepositoryError {
    if let Some(db_err) = err.as_database_error() {
        if db_err.is_unique_violation() {
            match db_err.constraint() {
                Some(CONFIRMATION_CODE_KEY) => {
                    return RepositoryError::DuplicateConfirmationCode(booking.confirmation_code.clone());
                }
                Some(ACTIVE_TRIP_DATE_INDEX) => {
                    return RepositoryError::TripAlreadyBooked {
                        trip_id: trip_id.unwrap_or(&booking.trip_combination_id).to_string(),
                        date: booking.booking_date,
                    };
                }
                _ => {}
            }
        }
    }
    RepositoryError::Backend(err.to_string())
}

fn backend(err: sqlx::Error) -> RepositoryError {
    RepositoryError::Backend(err.to_string())
}

#[async_trait]
impl BookingRepository for PgBookingRepository {
    async fn create_booking(&self, booking: &NewBooking) -> Result<Booking, RepositoryError> {
        let booking_id = Uuid::new_v4();

        let mut tx = self.pool.begin().await.map_err(backend)?;

        let created_at: DateTime<Utc> = sqlx::query_scalar(
            r#"
            INSERT INTO bookings (id, trip_combination_id, trips, booking_date, total_price, passenger_info, passenger_count, luggage, comments, status, confirmation_code)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING created_at
            "#,
        )
        .bind(booking_id)
        .bind(&booking.trip_combination_id)
        .bind(Json(&booking.trips))
        .bind(booking.booking_date)
        .bind(booking.total_price)
        .bind(Json(&booking.passenger_info))
        .bind(booking.passenger_count)
        .bind(Json(&booking.luggage))
        .bind(&booking.comments)
        .bind(booking.status.as_str())
        .bind(&booking.confirmation_code)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, booking, None))?;

        for trip_id in booking.trip_ids() {
            sqlx::query(
                r#"
                INSERT INTO booking_trips (booking_id, trip_id, booking_date, active)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(booking_id)
            .bind(trip_id)
            .bind(booking.booking_date)
            .bind(booking.status.holds_trip())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_write_error(e, booking, Some(trip_id)))?;
        }

        tx.commit().await.map_err(backend)?;

        info!("Booking {} stored for {}", booking_id, booking.booking_date);
        Ok(Booking::from_new(booking_id, booking.clone(), created_at))
    }

    async fn find_active_booking(
        &self,
        trip_id: &str,
        date: NaiveDate,
    ) -> Result<Option<Uuid>, RepositoryError> {
        let booking_id: Option<Uuid> = sqlx::query_scalar(
            "SELECT booking_id FROM booking_trips WHERE trip_id = $1 AND booking_date = $2 AND active LIMIT 1",
        )
        .bind(trip_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        debug!("Availability lookup {} on {}: {:?}", trip_id, date, booking_id);
        Ok(booking_id)
    }

    async fn get_booking(&self, id: Uuid) -> Result<Option<Booking>, RepositoryError> {
        let row = sqlx::query_as::<_, BookingRow>(
            "SELECT id, trip_combination_id, trips, booking_date, total_price, passenger_info, passenger_count, luggage, comments, status, confirmation_code, created_at, updated_at FROM bookings WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        row.map(Booking::try_from).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DbClient;
    use shuttle_catalog::{Direction, Trip};
    use shuttle_core::booking::{BookingStatus, BookingSubmission};

    /// Connects and migrates when `DATABASE_URL` points at a scratch Postgres.
    async fn repository() -> Option<PgBookingRepository> {
        let url = std::env::var("DATABASE_URL").ok()?;
        let db = DbClient::new(&url, 2).await.expect("connect to DATABASE_URL");
        db.migrate().await.expect("run migrations");
        Some(PgBookingRepository::new(db.pool))
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    // Ids and codes are random so runs against a shared database don't collide.
    fn unique_trip_id() -> String {
        format!("trip-{}", Uuid::new_v4().simple())
    }

    fn unique_code() -> String {
        Uuid::new_v4().simple().to_string()[..6].to_uppercase()
    }

    fn new_booking(trip_id: &str, code: &str) -> NewBooking {
        let trip = Trip::new(trip_id, Direction::ToAirport, "08:00", "8:00 AM", 85, "Thomasville → Tallahassee Airport");
        let submission = BookingSubmission {
            trip_id: trip_id.to_string(),
            date: date(),
            passenger_info: PassengerInfo {
                first_name: "Grace".to_string(),
                last_name: "Hopper".to_string(),
                email: "grace@example.com".into(),
                phone: "555-0101".into(),
            },
            passenger_count: 2,
            luggage: vec![],
            comments: None,
        };
        NewBooking::for_trip(&trip, &submission, code.to_string())
    }

    #[tokio::test]
    async fn test_pg_round_trip() {
        let Some(repo) = repository().await else { return };
        let trip_id = unique_trip_id();

        let stored = repo.create_booking(&new_booking(&trip_id, &unique_code())).await.unwrap();

        assert_eq!(repo.find_active_booking(&trip_id, date()).await.unwrap(), Some(stored.id));
        let fetched = repo.get_booking(stored.id).await.unwrap().unwrap();
        assert_eq!(fetched.status, BookingStatus::Pending);
        assert_eq!(fetched.trips[0].id, trip_id);
        assert_eq!(fetched.passenger_info.email.expose(), "grace@example.com");
    }

    #[tokio::test]
    async fn test_pg_second_active_booking_is_rejected() {
        let Some(repo) = repository().await else { return };
        let trip_id = unique_trip_id();

        let first = repo.create_booking(&new_booking(&trip_id, &unique_code())).await.unwrap();
        let err = repo.create_booking(&new_booking(&trip_id, &unique_code())).await.unwrap_err();

        assert!(matches!(err, RepositoryError::TripAlreadyBooked { trip_id: ref t, .. } if t == &trip_id));
        // The losing transaction left nothing behind
        assert_eq!(repo.find_active_booking(&trip_id, date()).await.unwrap(), Some(first.id));
    }

    #[tokio::test]
    async fn test_pg_duplicate_code_is_rejected() {
        let Some(repo) = repository().await else { return };
        let code = unique_code();

        repo.create_booking(&new_booking(&unique_trip_id(), &code)).await.unwrap();
        let other_trip = unique_trip_id();
        let err = repo.create_booking(&new_booking(&other_trip, &code)).await.unwrap_err();

        assert!(matches!(err, RepositoryError::DuplicateConfirmationCode(ref c) if c == &code));
        assert_eq!(repo.find_active_booking(&other_trip, date()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_pg_cancelled_booking_does_not_hold_the_trip() {
        let Some(repo) = repository().await else { return };
        let trip_id = unique_trip_id();

        let mut cancelled = new_booking(&trip_id, &unique_code());
        cancelled.status = BookingStatus::Cancelled;
        repo.create_booking(&cancelled).await.unwrap();

        assert_eq!(repo.find_active_booking(&trip_id, date()).await.unwrap(), None);
        repo.create_booking(&new_booking(&trip_id, &unique_code())).await.unwrap();
    }
}
