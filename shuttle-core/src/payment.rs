use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    RequiresPaymentMethod,
    RequiresConfirmation,
    RequiresAction,
    Processing,
    RequiresCapture,
    Succeeded,
    Canceled,
    #[serde(other)]
    Unknown,
}

/// What we ask the provider to authorize. `amount` is in minor units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntentRequest {
    pub amount: i64,
    pub currency: String,
    pub metadata: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String, // Provider's ID (e.g., pi_123)
    pub amount: i64,
    pub currency: String,
    pub status: PaymentStatus,
    pub client_secret: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Create a payment intent with the provider
    async fn create_intent(&self, request: &PaymentIntentRequest) -> Result<PaymentIntent, ProviderError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The provider answered and refused; the message is the provider's own.
    #[error("{0}")]
    Rejected(String),

    #[error("Payment provider unreachable: {0}")]
    Transport(String),

    /// The provider answered with a server-side failure.
    #[error("{0}")]
    Unavailable(String),

    #[error("Unexpected payment provider response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// True when the provider itself is failing, as opposed to refusing this request.
    pub fn is_outage(&self) -> bool {
        !matches!(self, ProviderError::Rejected(_))
    }
}
