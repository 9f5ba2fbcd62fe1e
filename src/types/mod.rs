pub mod hotel;
pub mod records;
pub mod suggestion;

pub use hotel::{Hotel, HotelProvider, HotelQuery, HotelSearchResult};
pub use records::{
    NewTask, NewTrip, Task, TaskId, TaskPatch, TaskStatus, Trip, TripId, TripStatus,
};
pub use suggestion::{ExtractionResult, SuggestionTask, TaskCategory, TaskPriority};
