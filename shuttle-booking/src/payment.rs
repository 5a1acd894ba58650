use async_trait::async_trait;
use shuttle_core::payment::{PaymentIntent, PaymentIntentRequest, PaymentProvider, PaymentStatus, ProviderError};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

/// Creates payment authorizations ahead of booking submission.
///
/// Holds no booking state: the amount and metadata come from the client
/// draft and are forwarded to the provider as-is once validated.
pub struct PaymentIntentIssuer {
    provider: Arc<dyn PaymentProvider>,
    default_currency: String,
}

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("Invalid amount")]
    InvalidAmount,

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("Payment provider returned no client secret")]
    MissingClientSecret,
}

impl PaymentIntentIssuer {
    pub fn new(provider: Arc<dyn PaymentProvider>, default_currency: &str) -> Self {
        Self {
            provider,
            default_currency: default_currency.to_lowercase(),
        }
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Returns the client secret of a new intent for `amount` minor units.
    pub async fn create_intent(
        &self,
        amount: i64,
        currency: Option<&str>,
        metadata: BTreeMap<String, String>,
    ) -> Result<String, PaymentError> {
        if amount <= 0 {
            return Err(PaymentError::InvalidAmount);
        }

        let currency = currency
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(&self.default_currency)
            .to_lowercase();

        let request = PaymentIntentRequest { amount, currency, metadata };

        let intent = self.provider.create_intent(&request).await.map_err(|e| {
            error!("{} failed to create payment intent: {}", self.provider.name(), e);
            PaymentError::Provider(e)
        })?;

        info!("Payment intent {} issued via {}", intent.id, self.provider.name());

        intent
            .client_secret
            .filter(|secret| !secret.is_empty())
            .ok_or(PaymentError::MissingClientSecret)
    }
}

/// Provider stand-in for local development; never talks to a real processor.
pub struct MockPaymentProvider;

#[async_trait]
impl PaymentProvider for MockPaymentProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn create_intent(&self, request: &PaymentIntentRequest) -> Result<PaymentIntent, ProviderError> {
        let id = format!("mock_pi_{}", Uuid::new_v4().simple());
        Ok(PaymentIntent {
            client_secret: Some(format!("{}_secret_mock", id)),
            id,
            amount: request.amount,
            currency: request.currency.clone(),
            status: PaymentStatus::RequiresPaymentMethod,
            created_at: chrono::Utc::now(),
        })
    }
}
