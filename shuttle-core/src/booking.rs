use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use shuttle_catalog::{Direction, LuggageCategory, Trip};
use shuttle_shared::Masked;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use crate::{CoreError, CoreResult};

/// Booking lifecycle status. Only `Pending` is ever written by this service.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    /// Whether a booking in this status still holds its trip for the date.
    pub fn holds_trip(&self) -> bool {
        !matches!(self, BookingStatus::Cancelled)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            other => Err(CoreError::UnknownStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PassengerInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: Masked<String>,
    pub phone: Masked<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LuggageItem {
    pub id: String,
    #[serde(rename = "type")]
    pub category: LuggageCategory,
    pub description: String,
    pub count: u32,
}

/// Copy of the trip as it was priced when the booking was made.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TripSnapshot {
    pub id: String,
    pub direction: Direction,
    pub departure_time: String,
    pub route: String,
    pub price: i32,
}

impl From<&Trip> for TripSnapshot {
    fn from(trip: &Trip) -> Self {
        Self {
            id: trip.id.clone(),
            direction: trip.direction,
            departure_time: trip.departure_time.clone(),
            route: trip.route.clone(),
            price: trip.price,
        }
    }
}

/// Client request to reserve a trip on a date.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingSubmission {
    pub trip_id: String,
    pub date: NaiveDate,
    pub passenger_info: PassengerInfo,
    pub passenger_count: i32,
    #[serde(default)]
    pub luggage: Vec<LuggageItem>,
    #[serde(default)]
    pub comments: Option<String>,
}

impl BookingSubmission {
    pub fn validate(&self) -> CoreResult<()> {
        if self.passenger_count < 1 {
            return Err(CoreError::ValidationError(
                "passenger count must be at least 1".to_string(),
            ));
        }
        if let Some(item) = self.luggage.iter().find(|l| l.count == 0) {
            return Err(CoreError::ValidationError(format!(
                "luggage item {} has a zero count",
                item.id
            )));
        }
        Ok(())
    }
}

/// A booking ready to be written; the store assigns id and timestamps.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewBooking {
    pub trip_combination_id: String,
    pub trips: Vec<TripSnapshot>,
    pub booking_date: NaiveDate,
    pub total_price: i32,
    pub passenger_info: PassengerInfo,
    pub passenger_count: i32,
    pub luggage: Vec<LuggageItem>,
    pub comments: Option<String>,
    pub status: BookingStatus,
    pub confirmation_code: String,
}

impl NewBooking {
    /// Pending booking for a single one-way trip.
    pub fn for_trip(trip: &Trip, submission: &BookingSubmission, confirmation_code: String) -> Self {
        Self {
            trip_combination_id: trip.id.clone(),
            trips: vec![TripSnapshot::from(trip)],
            booking_date: submission.date,
            total_price: trip.price,
            passenger_info: submission.passenger_info.clone(),
            passenger_count: submission.passenger_count,
            luggage: submission.luggage.clone(),
            comments: submission.comments.clone(),
            status: BookingStatus::Pending,
            confirmation_code,
        }
    }

    pub fn trip_ids(&self) -> impl Iterator<Item = &str> {
        self.trips.iter().map(|t| t.id.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    pub trip_combination_id: String,
    pub trips: Vec<TripSnapshot>,
    pub booking_date: NaiveDate,
    pub total_price: i32,
    pub passenger_info: PassengerInfo,
    pub passenger_count: i32,
    pub luggage: Vec<LuggageItem>,
    pub comments: Option<String>,
    pub status: BookingStatus,
    pub confirmation_code: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn from_new(id: Uuid, booking: NewBooking, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            trip_combination_id: booking.trip_combination_id,
            trips: booking.trips,
            booking_date: booking.booking_date,
            total_price: booking.total_price,
            passenger_info: booking.passenger_info,
            passenger_count: booking.passenger_count,
            luggage: booking.luggage,
            comments: booking.comments,
            status: booking.status,
            confirmation_code: booking.confirmation_code,
            created_at,
            updated_at: created_at,
        }
    }

    pub fn includes_trip(&self, trip_id: &str) -> bool {
        self.trips.iter().any(|t| t.id == trip_id)
    }
}

/// Outcome of a submission as reported to the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BookingResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmation_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BookingResult {
    pub fn confirmed(booking_id: Uuid, confirmation_code: String) -> Self {
        Self {
            success: true,
            booking_id: Some(booking_id),
            confirmation_code: Some(confirmation_code),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            booking_id: None,
            confirmation_code: None,
            error: Some(error.into()),
        }
    }
}
