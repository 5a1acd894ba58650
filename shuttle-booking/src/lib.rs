pub mod availability;
pub mod confirmation;
pub mod submitter;
pub mod payment;

pub use availability::{bookable_trips, trips_with_availability, FakeAvailabilityChecker, StoreAvailabilityChecker, TripAvailability};
pub use confirmation::{CodeGenerator, RandomCodeGenerator};
pub use submitter::{BookingSubmitter, SubmitError, SubmittedBooking};
pub use payment::{MockPaymentProvider, PaymentError, PaymentIntentIssuer};
