use axum::{extract::Json, routing::get, Router};
use serde_json::{json, Value};
use shuttle_catalog::LuggageOption;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/luggage-options", get(luggage_options))
        .route("/health", get(health))
}

async fn luggage_options() -> Json<Vec<LuggageOption>> {
    Json(LuggageOption::all())
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
