pub mod booking_client;
pub mod due_date;
pub mod extractor;
pub mod fallback;
pub mod gemini_client;
pub mod hotel_catalog;
pub mod prompts;

pub use booking_client::BookingClient;
pub use due_date::resolve_due_date;
pub use extractor::{extract, MIN_NARRATIVE_CHARS};
pub use fallback::{fallback_narrative, fallback_tasks};
pub use gemini_client::{GeminiClient, GenerationConfig};
pub use hotel_catalog::curated_hotels;
