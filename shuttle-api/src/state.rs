use std::sync::Arc;
use shuttle_booking::{BookingSubmitter, PaymentIntentIssuer};
use shuttle_catalog::TripCatalog;
use shuttle_core::AvailabilityChecker;
use crate::middleware::Resiliency;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<TripCatalog>,
    pub checker: Arc<dyn AvailabilityChecker>,
    pub submitter: Arc<BookingSubmitter>,
    pub payments: Arc<PaymentIntentIssuer>,
    pub resiliency: Arc<Resiliency>,
}
