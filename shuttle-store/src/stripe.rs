use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use shuttle_core::payment::{PaymentIntent, PaymentIntentRequest, PaymentProvider, PaymentStatus, ProviderError};
use shuttle_shared::Masked;
use std::time::Duration;
use tracing::{error, info};

/// Stripe PaymentIntents over the plain REST API.
pub struct StripePaymentProvider {
    http: reqwest::Client,
    api_base: String,
    secret_key: Masked<String>,
}

#[derive(Debug, Deserialize)]
struct StripeIntent {
    id: String,
    amount: i64,
    currency: String,
    status: PaymentStatus,
    client_secret: Option<String>,
    created: i64,
}

#[derive(Debug, Deserialize)]
struct StripeErrorEnvelope {
    error: StripeErrorBody,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    message: Option<String>,
}

impl StripePaymentProvider {
    pub fn new(secret_key: Masked<String>, api_base: &str, timeout: Duration) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            secret_key,
        })
    }

    /// Stripe takes form fields; nested maps use bracket keys.
    fn form_params(request: &PaymentIntentRequest) -> Vec<(String, String)> {
        let mut params = vec![
            ("amount".to_string(), request.amount.to_string()),
            ("currency".to_string(), request.currency.clone()),
            ("automatic_payment_methods[enabled]".to_string(), "true".to_string()),
        ];
        for (key, value) in &request.metadata {
            params.push((format!("metadata[{}]", key), value.clone()));
        }
        params
    }
}

#[async_trait]
impl PaymentProvider for StripePaymentProvider {
    fn name(&self) -> &'static str {
        "stripe"
    }

    async fn create_intent(&self, request: &PaymentIntentRequest) -> Result<PaymentIntent, ProviderError> {
        let url = format!("{}/v1/payment_intents", self.api_base);

        let response = self
            .http
            .post(&url)
            .bearer_auth(self.secret_key.expose())
            .form(&Self::form_params(request))
            .send()
            .await
            .map_err(|e| {
                error!("Stripe request failed: {}", e);
                ProviderError::Transport(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<StripeErrorEnvelope>()
                .await
                .ok()
                .and_then(|envelope| envelope.error.message)
                .unwrap_or_else(|| format!("Payment provider returned {}", status));
            error!("Stripe rejected payment intent ({}): {}", status, message);
            if status.is_server_error() {
                return Err(ProviderError::Unavailable(message));
            }
            return Err(ProviderError::Rejected(message));
        }

        let intent: StripeIntent = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        info!("Created payment intent {} for {} {}", intent.id, intent.amount, intent.currency);

        Ok(PaymentIntent {
            id: intent.id,
            amount: intent.amount,
            currency: intent.currency,
            status: intent.status,
            client_secret: intent.client_secret,
            created_at: DateTime::<Utc>::from_timestamp(intent.created, 0).unwrap_or_else(Utc::now),
        })
    }
}
