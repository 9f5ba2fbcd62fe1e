//! travel-assistant-rs: turns free-form travel advice from a generative model
//! into a narrative for the user plus a list of actionable trip tasks.
//!
//! The model is prompted to reply with a `RESPONSE:` section and a `TASKS:`
//! JSON array, but nothing downstream depends on it doing so: [`extract`]
//! always returns a readable narrative, falling back to rule-based
//! suggestions keyed on the user's question. The task list can still be
//! empty when the reply has no usable tasks and the question matches no
//! travel rule.
//!
//! # Quick Start
//!
//! ```rust
//! use travel_assistant_rs::extract;
//!
//! let reply = "RESPONSE:\nBali is wonderful in the dry season, from April to October.\n\
//!              TASKS:\n[{\"title\": \"Book Flight to Bali\", \"description\": \"Round trip\"}]";
//! let result = extract(reply, "I want to visit Bali");
//!
//! assert!(result.narrative.starts_with("Bali is wonderful"));
//! assert_eq!(result.tasks[0].title, "Book Flight to Bali");
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod http;
pub mod services;
pub mod store;
pub mod types;

pub use config::AppConfig;
pub use crate::core::{
    detect_trip_destination, Adoption, GenerativeModel, HotelFinder, HotelSearch,
    IdentityProvider, StaticTokens, TravelAssistant, TripPlanner,
};
pub use error::{Result, TravelError};
pub use services::{curated_hotels, extract, resolve_due_date, BookingClient, GeminiClient};
pub use store::{SqliteStore, TaskRepository, TripRepository};
pub use types::{
    ExtractionResult, Hotel, HotelProvider, HotelQuery, HotelSearchResult, NewTask, NewTrip,
    SuggestionTask, Task, TaskCategory, TaskPatch, TaskPriority, TaskStatus, Trip, TripStatus,
};

#[cfg(feature = "cli")]
pub mod cli;
