use axum::{
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,   // Normal operation
    Open,     // Failing fast
    HalfOpen, // One probe allowed through
}

/// What a guarded handler learned about its dependency, attached to the
/// response as an extension. Responses without one leave the breaker as is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyOutcome {
    Healthy,
    Failed,
}

#[derive(Debug)]
struct Breaker {
    state: CircuitState,
    consecutive_failures: usize,
    opened_at: Option<Instant>,
    // Set while the half-open probe is out; a probe older than the reset
    // timeout is treated as lost.
    probe_started: Option<Instant>,
}

/// Consecutive-failure circuit breaker for an outbound dependency.
#[derive(Debug)]
pub struct CircuitBreaker {
    pub name: String,
    failure_threshold: usize,
    reset_timeout: Duration,
    inner: Mutex<Breaker>,
}

impl CircuitBreaker {
    pub fn new(name: &str, threshold: usize, timeout: Duration) -> Self {
        Self {
            name: name.to_string(),
            failure_threshold: threshold.max(1),
            reset_timeout: timeout,
            inner: Mutex::new(Breaker {
                state: CircuitState::Closed,
                consecutive_failures: 0,
                opened_at: None,
                probe_started: None,
            }),
        }
    }

    pub async fn state(&self) -> CircuitState {
        self.inner.lock().await.state
    }

    /// Whether a request may go through right now.
    pub async fn check(&self) -> bool {
        let mut b = self.inner.lock().await;
        match b.state {
            CircuitState::Closed => true,
            CircuitState::Open => {
                let cooled = b.opened_at.is_some_and(|at| at.elapsed() >= self.reset_timeout);
                if cooled {
                    b.state = CircuitState::HalfOpen;
                    b.probe_started = Some(Instant::now());
                    tracing::info!("Circuit Breaker [{}] moving to Half-Open", self.name);
                }
                cooled
            }
            CircuitState::HalfOpen => {
                let busy = b.probe_started.is_some_and(|at| at.elapsed() < self.reset_timeout);
                if busy {
                    return false;
                }
                if b.probe_started.is_some() {
                    tracing::warn!("Circuit Breaker [{}] probe never reported back, sending another", self.name);
                }
                b.probe_started = Some(Instant::now());
                true
            }
        }
    }

    pub async fn record_success(&self) {
        let mut b = self.inner.lock().await;
        if b.state == CircuitState::HalfOpen {
            tracing::info!("Circuit Breaker [{}] recovered to Closed", self.name);
        }
        b.state = CircuitState::Closed;
        b.consecutive_failures = 0;
        b.opened_at = None;
        b.probe_started = None;
    }

    /// Ends a request that said nothing about the dependency's health.
    pub async fn release(&self) {
        self.inner.lock().await.probe_started = None;
    }

    pub async fn record_failure(&self) {
        let mut b = self.inner.lock().await;
        b.consecutive_failures += 1;
        b.probe_started = None;

        if b.consecutive_failures >= self.failure_threshold || b.state == CircuitState::HalfOpen {
            if b.state != CircuitState::Open {
                tracing::error!(
                    "Circuit Breaker [{}] TRIPPED to Open. Failures: {}",
                    self.name,
                    b.consecutive_failures
                );
            }
            b.state = CircuitState::Open;
            b.opened_at = Some(Instant::now());
        }
    }
}

/// Breakers guarding outbound calls made on the request path.
#[derive(Debug)]
pub struct Resiliency {
    pub payment_cb: CircuitBreaker,
}

impl Resiliency {
    pub fn new(payment_failure_threshold: usize, payment_reset: Duration) -> Self {
        Self {
            payment_cb: CircuitBreaker::new("payment-provider", payment_failure_threshold, payment_reset),
        }
    }
}

pub async fn circuit_breaker_middleware(
    State(state): State<AppState>,
    req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    if !req.uri().path().starts_with("/payment-intents") {
        return next.run(req).await;
    }

    let cb = &state.resiliency.payment_cb;
    if !cb.check().await {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "error": format!("Circuit Breaker [{}] is OPEN", cb.name) })),
        )
            .into_response();
    }

    let response = next.run(req).await;

    match response.extensions().get::<DependencyOutcome>() {
        Some(DependencyOutcome::Failed) => cb.record_failure().await,
        Some(DependencyOutcome::Healthy) => cb.record_success().await,
        None => cb.release().await,
    }

    response
}
