pub mod trip;
pub mod catalog;
pub mod luggage;

pub use trip::{Direction, Trip};
pub use catalog::{is_valid_booking_date, CatalogError, TripCatalog};
pub use luggage::{LuggageCategory, LuggageOption};
