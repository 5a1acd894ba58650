use axum::{
    extract::{rejection::JsonRejection, Json, State},
    http::StatusCode,
    routing::post,
    Router,
};
use shuttle_booking::SubmitError;
use shuttle_core::booking::{BookingResult, BookingSubmission};
use tracing::info;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/bookings", post(submit_booking))
}

fn status_for(err: &SubmitError) -> StatusCode {
    match err {
        SubmitError::InvalidTrip { .. } | SubmitError::TripNotOffered { .. } | SubmitError::Validation(_) => {
            StatusCode::BAD_REQUEST
        }
        SubmitError::AlreadyBooked => StatusCode::CONFLICT,
        SubmitError::Failed => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

async fn submit_booking(
    State(state): State<AppState>,
    payload: Result<Json<BookingSubmission>, JsonRejection>,
) -> (StatusCode, Json<BookingResult>) {
    let submission = match payload {
        Ok(Json(submission)) => submission,
        Err(rejection) => {
            return (StatusCode::BAD_REQUEST, Json(BookingResult::failed(rejection.body_text())));
        }
    };

    info!("Booking requested for trip {} on {}", submission.trip_id, submission.date);

    match state.submitter.submit(&submission).await {
        Ok(submitted) => (StatusCode::CREATED, Json(submitted.to_result())),
        Err(e) => (status_for(&e), Json(e.to_result())),
    }
}
