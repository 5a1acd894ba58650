use serde::Deserialize;
use shuttle_catalog::{CatalogError, Direction, Trip, TripCatalog};
use shuttle_shared::Masked;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    pub payment: PaymentConfig,
    #[serde(default)]
    pub booking: BookingRules,
    #[serde(default)]
    pub resiliency: ResiliencyConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// Postgres URL. When absent bookings are kept in process memory.
    pub url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_true")]
    pub run_migrations: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
            run_migrations: true,
        }
    }
}

fn default_max_connections() -> u32 { 5 }
fn default_true() -> bool { true }

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentProviderKind {
    Stripe,
    Mock,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PaymentConfig {
    pub provider: PaymentProviderKind,
    pub secret_key: Option<Masked<String>>,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_currency")]
    pub default_currency: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

fn default_api_base() -> String { "https://api.stripe.com".to_string() }
fn default_currency() -> String { "usd".to_string() }
fn default_request_timeout() -> u64 { 10 }

#[derive(Debug, Deserialize, Clone)]
pub struct BookingRules {
    /// How many confirmation codes to draw before giving up on a submission.
    #[serde(default = "default_code_attempts")]
    pub confirmation_code_attempts: u32,
}

impl Default for BookingRules {
    fn default() -> Self {
        Self { confirmation_code_attempts: default_code_attempts() }
    }
}

fn default_code_attempts() -> u32 { 5 }

#[derive(Debug, Deserialize, Clone)]
pub struct ResiliencyConfig {
    #[serde(default = "default_failure_threshold")]
    pub payment_failure_threshold: usize,
    #[serde(default = "default_reset_seconds")]
    pub payment_reset_seconds: u64,
}

impl Default for ResiliencyConfig {
    fn default() -> Self {
        Self {
            payment_failure_threshold: default_failure_threshold(),
            payment_reset_seconds: default_reset_seconds(),
        }
    }
}

fn default_failure_threshold() -> usize { 5 }
fn default_reset_seconds() -> u64 { 30 }

/// Optional deploy-time override of the trip schedule.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct CatalogConfig {
    #[serde(default)]
    pub trips: Vec<TripConfig>,
}

// Keys stay snake_case: the config crate is not reliable with camelCase keys.
#[derive(Debug, Deserialize, Clone)]
pub struct TripConfig {
    pub id: String,
    pub direction: Direction,
    pub departure_time: String,
    pub departure_time_display: String,
    pub price: i32,
    pub route: String,
    #[serde(default = "default_duration")]
    pub duration: String,
    #[serde(default = "default_true")]
    pub is_available: bool,
}

fn default_duration() -> String { "45 minutes".to_string() }

impl From<TripConfig> for Trip {
    fn from(t: TripConfig) -> Self {
        Trip {
            id: t.id,
            direction: t.direction,
            departure_time: t.departure_time,
            departure_time_display: t.departure_time_display,
            price: t.price,
            route: t.route,
            duration: t.duration,
            is_available: t.is_available,
        }
    }
}

impl CatalogConfig {
    /// The configured schedule, or the standard one when none is configured.
    pub fn build(&self) -> Result<TripCatalog, CatalogError> {
        if self.trips.is_empty() {
            return Ok(TripCatalog::standard());
        }
        TripCatalog::new(self.trips.iter().cloned().map(Trip::from).collect())
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Per-environment overrides, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg.. `SHUTTLE__PAYMENT__SECRET_KEY=sk_live_...`
            .add_source(config::Environment::with_prefix("SHUTTLE").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
