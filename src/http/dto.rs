//! Request and response bodies for the HTTP API.

use std::str::FromStr;

use chrono::{NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    core::DEFAULT_DEALS_LIMIT,
    types::{
        hotel::{DEFAULT_ADULTS, DEFAULT_CURRENCY, DEFAULT_HOTEL_DESTINATION},
        ExtractionResult, Hotel, HotelQuery, HotelSearchResult, SuggestionTask, Task, Trip,
    },
};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantRequest {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    /// Persist the suggested tasks (and a trip) for the caller
    #[serde(default)]
    pub save_tasks: bool,
}

/// Body returned by both the text assistant and the image analysis endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantResponse {
    pub success: bool,
    /// Narrative shown to the user
    pub data: String,
    pub tasks: Vec<SuggestionTask>,
    pub session_id: Option<String>,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_tasks: Option<Vec<Task>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trip: Option<Trip>,
}

impl AssistantResponse {
    pub fn new(result: ExtractionResult, session_id: Option<String>) -> Self {
        Self {
            success: true,
            data: result.narrative,
            tasks: result.tasks,
            session_id,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            saved_tasks: None,
            trip: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResponse {
    pub success: bool,
    pub task: Task,
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self {
            success: true,
            task,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskListResponse {
    pub success: bool,
    pub tasks: Vec<Task>,
}

impl From<Vec<Task>> for TaskListResponse {
    fn from(tasks: Vec<Task>) -> Self {
        Self {
            success: true,
            tasks,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripResponse {
    pub success: bool,
    pub trip: Trip,
}

impl From<Trip> for TripResponse {
    fn from(trip: Trip) -> Self {
        Self {
            success: true,
            trip,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripListResponse {
    pub success: bool,
    pub trips: Vec<Trip>,
}

impl From<Vec<Trip>> for TripListResponse {
    fn from(trips: Vec<Trip>) -> Self {
        Self {
            success: true,
            trips,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Query string of the hotel endpoints.
///
/// Everything is taken as text: blank or unparsable values fall back to
/// their defaults rather than rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelSearchParams {
    pub destination: Option<String>,
    pub check_in: Option<String>,
    pub check_out: Option<String>,
    pub adults: Option<String>,
    pub children: Option<String>,
    pub page_number: Option<String>,
    pub currency: Option<String>,
    pub limit: Option<String>,
}

impl HotelSearchParams {
    pub fn to_query(&self) -> HotelQuery {
        HotelQuery {
            destination: text(&self.destination).unwrap_or(DEFAULT_HOTEL_DESTINATION).to_string(),
            check_in: date(&self.check_in),
            check_out: date(&self.check_out),
            adults: positive(&self.adults).unwrap_or(DEFAULT_ADULTS),
            children: number(&self.children).unwrap_or(0),
            page: positive(&self.page_number).unwrap_or(1),
            currency: text(&self.currency).unwrap_or(DEFAULT_CURRENCY).to_string(),
        }
    }

    pub fn limit(&self) -> usize {
        positive(&self.limit).unwrap_or(DEFAULT_DEALS_LIMIT)
    }
}

fn text(raw: &Option<String>) -> Option<&str> {
    raw.as_deref().map(str::trim).filter(|value| !value.is_empty())
}

fn number<T: FromStr>(raw: &Option<String>) -> Option<T> {
    text(raw)?.parse().ok()
}

fn positive<T: FromStr + PartialOrd + Default>(raw: &Option<String>) -> Option<T> {
    number(raw).filter(|value: &T| *value > T::default())
}

fn date(raw: &Option<String>) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text(raw)?, "%Y-%m-%d").ok()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelListResponse {
    pub success: bool,
    pub hotels: Vec<Hotel>,
    pub count: usize,
    pub data_source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<HotelSearchResult> for HotelListResponse {
    fn from(result: HotelSearchResult) -> Self {
        Self {
            success: true,
            count: result.hotels.len(),
            hotels: result.hotels,
            data_source: result.data_source,
            message: result.message,
        }
    }
}
