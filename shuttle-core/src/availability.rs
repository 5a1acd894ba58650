use async_trait::async_trait;
use chrono::NaiveDate;
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};

pub const ALREADY_BOOKED: &str = "already booked for this date";
pub const CHECK_FAILED: &str = "error checking availability";
pub const NOT_OFFERED: &str = "trip is not currently offered";
pub const PAST_DATE: &str = "date is in the past";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityCheck {
    pub trip_id: String,
    pub is_available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl AvailabilityCheck {
    pub fn available(trip_id: &str) -> Self {
        Self {
            trip_id: trip_id.to_string(),
            is_available: true,
            reason: None,
        }
    }

    pub fn unavailable(trip_id: &str, reason: &str) -> Self {
        Self {
            trip_id: trip_id.to_string(),
            is_available: false,
            reason: Some(reason.to_string()),
        }
    }
}

/// Answers "can this trip still be booked on this date?".
///
/// Checks never fail: an implementation that cannot reach its data source
/// reports the trip as unavailable.
#[async_trait]
pub trait AvailabilityChecker: Send + Sync {
    async fn check_availability(&self, trip_id: &str, date: NaiveDate) -> AvailabilityCheck;

    /// One check per id, run concurrently; output order matches `trip_ids`.
    async fn check_multiple(&self, trip_ids: &[String], date: NaiveDate) -> Vec<AvailabilityCheck> {
        join_all(trip_ids.iter().map(|id| self.check_availability(id, date))).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EvenIdsBooked;

    #[async_trait]
    impl AvailabilityChecker for EvenIdsBooked {
        async fn check_availability(&self, trip_id: &str, _date: NaiveDate) -> AvailabilityCheck {
            let n: u32 = trip_id.parse().unwrap_or(1);
            if n % 2 == 0 {
                AvailabilityCheck::unavailable(trip_id, ALREADY_BOOKED)
            } else {
                AvailabilityCheck::available(trip_id)
            }
        }
    }

    #[tokio::test]
    async fn test_check_multiple_preserves_order() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let ids: Vec<String> = ["3", "2", "1", "2"].iter().map(|s| s.to_string()).collect();

        let results = EvenIdsBooked.check_multiple(&ids, date).await;

        assert_eq!(results.len(), 4);
        let returned: Vec<&str> = results.iter().map(|r| r.trip_id.as_str()).collect();
        assert_eq!(returned, vec!["3", "2", "1", "2"]);
        assert!(results[0].is_available);
        assert_eq!(results[1].reason.as_deref(), Some(ALREADY_BOOKED));
    }

    #[test]
    fn test_available_serializes_without_reason() {
        let json = serde_json::to_value(AvailabilityCheck::available("A")).unwrap();
        assert_eq!(json, serde_json::json!({ "tripId": "A", "isAvailable": true }));
    }
}
