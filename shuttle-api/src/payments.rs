use axum::{
    extract::{Json, State},
    response::{IntoResponse, Response},
    routing::post,
    Extension, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shuttle_booking::PaymentError;
use std::collections::BTreeMap;
use crate::error::AppError;
use crate::extract::ApiJson;
use crate::middleware::DependencyOutcome;
use crate::state::AppState;

/// Loosely typed so a bad amount gets our own 400 instead of an extractor rejection.
#[derive(Debug, Deserialize)]
pub struct CreatePaymentIntentRequest {
    pub amount: Option<Value>,
    pub currency: Option<String>,
    pub metadata: Option<BTreeMap<String, Value>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentIntentResponse {
    pub client_secret: String,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/payment-intents", post(create_payment_intent))
}

/// Minor units; only whole positive numbers count.
fn parse_amount(value: Option<&Value>) -> Option<i64> {
    let Value::Number(number) = value? else {
        return None;
    };
    let amount = match number.as_i64() {
        Some(n) => n,
        None => {
            let f = number.as_f64()?;
            if f.fract() != 0.0 || f > i64::MAX as f64 {
                return None;
            }
            f as i64
        }
    };
    (amount > 0).then_some(amount)
}

fn metadata_strings(metadata: BTreeMap<String, Value>) -> BTreeMap<String, String> {
    metadata
        .into_iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| match v {
            Value::String(s) => (k, s),
            other => (k, other.to_string()),
        })
        .collect()
}

/// How a failed issue should count against the provider's circuit breaker.
fn outcome_of(err: &PaymentError) -> Option<DependencyOutcome> {
    match err {
        PaymentError::InvalidAmount => None,
        PaymentError::Provider(e) if e.is_outage() => Some(DependencyOutcome::Failed),
        // The provider answered; it just refused this request.
        PaymentError::Provider(_) => Some(DependencyOutcome::Healthy),
        PaymentError::MissingClientSecret => Some(DependencyOutcome::Failed),
    }
}

fn error_response(err: PaymentError) -> AppError {
    match err {
        PaymentError::InvalidAmount => AppError::ValidationError(err.to_string()),
        PaymentError::Provider(p) => AppError::PaymentProviderError(p.to_string()),
        PaymentError::MissingClientSecret => AppError::InternalServerError(err.to_string()),
    }
}

async fn create_payment_intent(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreatePaymentIntentRequest>,
) -> Result<Response, AppError> {
    let amount = parse_amount(req.amount.as_ref())
        .ok_or_else(|| AppError::ValidationError(PaymentError::InvalidAmount.to_string()))?;

    let issued = state
        .payments
        .create_intent(amount, req.currency.as_deref(), metadata_strings(req.metadata.unwrap_or_default()))
        .await;

    let response = match issued {
        Ok(client_secret) => (
            Extension(DependencyOutcome::Healthy),
            Json(CreatePaymentIntentResponse { client_secret }),
        )
            .into_response(),
        Err(e) => match outcome_of(&e) {
            Some(outcome) => (Extension(outcome), error_response(e)).into_response(),
            None => error_response(e).into_response(),
        },
    };
    Ok(response)
}
