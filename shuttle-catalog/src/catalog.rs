use std::collections::HashSet;
use chrono::NaiveDate;
use crate::trip::{Direction, Trip};

const TO_AIRPORT_ROUTE: &str = "Thomasville → Tallahassee Airport";
const FROM_AIRPORT_ROUTE: &str = "Tallahassee Airport → Thomasville";

/// Read-only set of trip templates, kept in deploy order.
#[derive(Debug, Clone)]
pub struct TripCatalog {
    trips: Vec<Trip>,
}

impl TripCatalog {
    /// Build a catalog from an explicit trip list. Ids must be unique.
    pub fn new(trips: Vec<Trip>) -> Result<Self, CatalogError> {
        if trips.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = HashSet::new();
        for trip in &trips {
            if trip.id.trim().is_empty() {
                return Err(CatalogError::InvalidTrip("trip id must not be blank".to_string()));
            }
            if trip.price <= 0 {
                return Err(CatalogError::InvalidTrip(format!("trip {} has a non-positive price", trip.id)));
            }
            if !seen.insert(trip.id.as_str()) {
                return Err(CatalogError::DuplicateTrip(trip.id.clone()));
            }
        }

        Ok(Self { trips })
    }

    /// The Thomasville ⇄ Tallahassee Airport schedule.
    pub fn standard() -> Self {
        Self {
            trips: vec![
                Trip::new("tville-to-tlh-4am", Direction::ToAirport, "04:00", "4:00 AM", 115, TO_AIRPORT_ROUTE),
                Trip::new("tville-to-tlh-6am", Direction::ToAirport, "06:00", "6:00 AM", 95, TO_AIRPORT_ROUTE),
                Trip::new("tville-to-tlh-8am", Direction::ToAirport, "08:00", "8:00 AM", 85, TO_AIRPORT_ROUTE),
                Trip::new("tlh-to-tville-12pm", Direction::FromAirport, "12:00", "12:00 PM", 85, FROM_AIRPORT_ROUTE),
                Trip::new("tlh-to-tville-2pm", Direction::FromAirport, "14:00", "2:00 PM", 85, FROM_AIRPORT_ROUTE),
                Trip::new("tlh-to-tville-6pm", Direction::FromAirport, "18:00", "6:00 PM", 85, FROM_AIRPORT_ROUTE),
            ],
        }
    }

    pub fn all(&self) -> &[Trip] {
        &self.trips
    }

    pub fn list_by_direction(&self, direction: Direction) -> Vec<&Trip> {
        self.trips.iter().filter(|t| t.direction == direction).collect()
    }

    pub fn get_by_id(&self, id: &str) -> Option<&Trip> {
        self.trips.iter().find(|t| t.id == id)
    }

    /// Trips whose base availability flag is set.
    pub fn available_trips(&self) -> Vec<&Trip> {
        self.trips.iter().filter(|t| t.is_available).collect()
    }

    pub fn available_by_direction(&self, direction: Direction) -> Vec<&Trip> {
        self.trips
            .iter()
            .filter(|t| t.direction == direction && t.is_available)
            .collect()
    }
}

impl Default for TripCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

/// A booking date is acceptable when it is not in the past.
pub fn is_valid_booking_date(date: NaiveDate, today: NaiveDate) -> bool {
    date >= today
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Catalog has no trips")]
    Empty,

    #[error("Duplicate trip id: {0}")]
    DuplicateTrip(String),

    #[error("Invalid trip: {0}")]
    InvalidTrip(String),
}
