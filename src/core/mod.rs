pub mod assistant;
pub mod hotels;
pub mod identity;
pub mod model;
pub mod planner;

pub use assistant::TravelAssistant;
pub use hotels::{HotelFinder, HotelSearch, DEFAULT_DEALS_LIMIT};
pub use identity::{IdentityProvider, StaticTokens};
pub use model::{GenerativeModel, DEFAULT_IMAGE_MIME};
pub use planner::{detect_trip_destination, Adoption, TripPlanner, AI_TASK_SOURCE};
