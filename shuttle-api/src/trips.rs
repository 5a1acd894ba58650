use axum::{
    extract::{Json, Path, State},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use shuttle_booking::bookable_trips;
use shuttle_catalog::{Direction, Trip};
use shuttle_core::AvailabilityCheck;
use crate::error::AppError;
use crate::extract::{ApiJson, ApiQuery};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TripsQuery {
    pub direction: Option<Direction>,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityRequest {
    pub trip_ids: Vec<String>,
    pub date: NaiveDate,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/trips", get(list_trips))
        .route("/trips/{id}", get(get_trip))
        .route("/availability", post(check_availability))
}

async fn list_trips(State(state): State<AppState>, ApiQuery(query): ApiQuery<TripsQuery>) -> Response {
    let Some(date) = query.date else {
        let trips: Vec<&Trip> = match query.direction {
            Some(direction) => state.catalog.available_by_direction(direction),
            None => state.catalog.available_trips(),
        };
        return Json(trips).into_response();
    };

    let directions = match query.direction {
        Some(direction) => vec![direction],
        None => vec![Direction::ToAirport, Direction::FromAirport],
    };

    let today = Utc::now().date_naive();
    let mut listed = Vec::new();
    for direction in directions {
        listed.extend(bookable_trips(&state.catalog, state.checker.as_ref(), direction, date, today).await);
    }
    Json(listed).into_response()
}

async fn get_trip(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Trip>, AppError> {
    state
        .catalog
        .get_by_id(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFoundError(format!("trip {} not found", id)))
}

async fn check_availability(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<AvailabilityRequest>,
) -> Json<Vec<AvailabilityCheck>> {
    Json(state.checker.check_multiple(&req.trip_ids, req.date).await)
}
