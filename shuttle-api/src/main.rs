use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use anyhow::Context;
use shuttle_api::{app, middleware::Resiliency, AppState};
use shuttle_booking::{BookingSubmitter, MockPaymentProvider, PaymentIntentIssuer, StoreAvailabilityChecker};
use shuttle_core::{BookingRepository, PaymentProvider};
use shuttle_store::app_config::{Config, PaymentProviderKind};
use shuttle_store::{DbClient, InMemoryBookingRepository, PgBookingRepository, StripePaymentProvider};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shuttle_api=debug,shuttle_booking=debug,shuttle_store=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting Shuttle API on port {}", config.server.port);

    let catalog = Arc::new(config.catalog.build().context("Invalid trip catalog")?);
    tracing::info!("Trip catalog loaded with {} trips", catalog.all().len());

    let repository: Arc<dyn BookingRepository> = match &config.database.url {
        Some(url) => {
            let db = DbClient::new(url, config.database.max_connections)
                .await
                .context("Failed to connect to Postgres")?;
            if config.database.run_migrations {
                db.migrate().await.context("Failed to run migrations")?;
            }
            Arc::new(PgBookingRepository::new(db.pool.clone()))
        }
        None => {
            tracing::warn!("No database.url configured; bookings are kept in memory and lost on restart");
            Arc::new(InMemoryBookingRepository::new())
        }
    };

    let provider: Arc<dyn PaymentProvider> = match config.payment.provider {
        PaymentProviderKind::Stripe => {
            let secret_key = config
                .payment
                .secret_key
                .clone()
                .context("payment.secret_key is required for the stripe provider")?;
            Arc::new(StripePaymentProvider::new(
                secret_key,
                &config.payment.api_base,
                Duration::from_secs(config.payment.request_timeout_seconds),
            )?)
        }
        PaymentProviderKind::Mock => {
            tracing::warn!("Using the mock payment provider; no real charges will be authorized");
            Arc::new(MockPaymentProvider)
        }
    };

    let payments = PaymentIntentIssuer::new(provider, &config.payment.default_currency);
    tracing::info!("Payment intents issued via {}", payments.provider_name());

    let submitter = BookingSubmitter::new(catalog.clone(), repository.clone())
        .with_max_code_attempts(config.booking.confirmation_code_attempts);

    let app_state = AppState {
        catalog,
        checker: Arc::new(StoreAvailabilityChecker::new(repository)),
        submitter: Arc::new(submitter),
        payments: Arc::new(payments),
        resiliency: Arc::new(Resiliency::new(
            config.resiliency.payment_failure_threshold,
            Duration::from_secs(config.resiliency.payment_reset_seconds),
        )),
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
