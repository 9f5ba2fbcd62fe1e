//! Turns suggested tasks into saved records: one trip for the detected
//! destination plus a task per suggestion.

use std::sync::{Arc, LazyLock};

use chrono::{Days, Months, NaiveDate};
use regex::Regex;
use tracing::{info, warn};

use crate::{
    services::due_date::resolve_due_date,
    store::{TaskRepository, TripRepository},
    types::{NewTask, NewTrip, SuggestionTask, Task, Trip, TripId, TripStatus},
};

/// Source recorded on tasks created from assistant suggestions
pub const AI_TASK_SOURCE: &str = "AI Travel Assistant";

const DEFAULT_TRIP_BUDGET: f64 = 2000.0;
const DEFAULT_TRAVELERS: u32 = 2;
const TRIP_LEAD_MONTHS: u32 = 2;
const TRIP_LENGTH_DAYS: u64 = 7;

const COMMON_DESTINATIONS: &[&str] = &[
    "New York",
    "Paris",
    "London",
    "Tokyo",
    "Bali",
    "Rome",
    "Barcelona",
    "Amsterdam",
    "Dubai",
    "Singapore",
    "Bangkok",
    "Sydney",
    "Los Angeles",
    "San Francisco",
    "Miami",
    "Las Vegas",
    "Hawaii",
    "Maldives",
    "Santorini",
    "Iceland",
];

// Capitalised words that follow "in"/"to" without naming a place.
const NOT_PLACES: &[&str] = &[
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December", "Monday", "Tuesday", "Wednesday", "Thursday", "Friday",
    "Saturday", "Sunday", "Spring", "Summer", "Autumn", "Fall", "Winter", "The", "Your", "My",
];

// The first word after the phrase may be lowercase ("visit bali"); any
// further words must be capitalised so trailing prose is not swallowed.
static TRAVEL_PHRASE_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(
        r"\b(?i:visit|go to|travel to|trip to|vacation in|holiday in)\s+([A-Za-z]+(?:[ \t]+[A-Z][A-Za-z]*)*)",
    )
    .expect("travel phrase regex")
});

static PREPOSITION_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"\b(?:in|to)\s+([A-Z][A-Za-z]*(?:[ \t]+[A-Z][A-Za-z]*)*)")
        .expect("preposition regex")
});

/// Best guess at the destination a conversation is about.
///
/// Tries "visit X" style phrases (in any case), then any capitalised name
/// after "in"/"to", then a list of well-known destinations. Names are
/// returned title-cased.
pub fn detect_trip_destination(text: &str) -> Option<String> {
    for pattern in [&*TRAVEL_PHRASE_RE, &*PREPOSITION_RE] {
        let found = pattern
            .captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .map(|name| place_name(&text[name.start()..], name.as_str()))
            .find(|name| is_plausible_place(name));
        if found.is_some() {
            return found;
        }
    }

    let lower = text.to_lowercase();
    COMMON_DESTINATIONS
        .iter()
        .find(|dest| lower.contains(&dest.to_lowercase()))
        .map(|dest| dest.to_string())
}

// `rest` is the text from the start of the captured name onwards, so a
// lowercase "new york" still resolves to the known two-word name.
fn place_name(rest: &str, captured: &str) -> String {
    let rest = rest.to_lowercase();
    let known = COMMON_DESTINATIONS.iter().find(|dest| {
        let dest = dest.to_lowercase();
        rest.strip_prefix(dest.as_str())
            .is_some_and(|after| !after.starts_with(|c: char| c.is_alphanumeric()))
    });
    match known {
        Some(dest) => dest.to_string(),
        None => title_case(captured.trim()),
    }
}

fn title_case(name: &str) -> String {
    name.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_plausible_place(name: &str) -> bool {
    let len = name.chars().count();
    if !(3..50).contains(&len) {
        return false;
    }
    let first_word = name.split_whitespace().next().unwrap_or_default();
    !NOT_PLACES.iter().any(|word| *word == first_word)
}

/// What [`TripPlanner::adopt`] saved
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Adoption {
    pub trip: Option<Trip>,
    pub tasks: Vec<Task>,
}

/// Saves assistant suggestions for a user
#[derive(Clone)]
pub struct TripPlanner {
    tasks: Arc<dyn TaskRepository>,
    trips: Arc<dyn TripRepository>,
}

impl TripPlanner {
    pub fn new(tasks: Arc<dyn TaskRepository>, trips: Arc<dyn TripRepository>) -> Self {
        Self { tasks, trips }
    }

    /// Save `suggestions` for `user_id`.
    ///
    /// Creates a trip when a destination can be read from the query (or,
    /// failing that, the narrative), then one task per suggestion linked to it. Storage failures
    /// are logged and skipped so one bad record does not lose the rest.
    pub async fn adopt(
        &self,
        user_id: &str,
        query: &str,
        narrative: &str,
        suggestions: &[SuggestionTask],
        today: NaiveDate,
    ) -> Adoption {
        if suggestions.is_empty() {
            return Adoption::default();
        }

        let destination =
            detect_trip_destination(query).or_else(|| detect_trip_destination(narrative));
        let trip = match destination {
            Some(destination) => {
                match self
                    .trips
                    .create_trip(user_id, default_trip(&destination, today))
                    .await
                {
                    Ok(trip) => Some(trip),
                    Err(err) => {
                        warn!(target: "travel::store", error = %err, destination = %destination, "failed to create trip");
                        None
                    }
                }
            }
            None => None,
        };
        let trip_id = trip.as_ref().map(|trip| trip.id);

        let mut tasks = Vec::with_capacity(suggestions.len());
        for suggestion in suggestions {
            match self
                .tasks
                .create_task(user_id, task_from_suggestion(suggestion, trip_id, today))
                .await
            {
                Ok(task) => tasks.push(task),
                Err(err) => {
                    warn!(target: "travel::store", error = %err, title = %suggestion.title, "failed to create task")
                }
            }
        }

        info!(
            target: "travel::store",
            user = %user_id,
            trip = ?trip_id,
            saved = tasks.len(),
            suggested = suggestions.len(),
            "adopted suggested tasks"
        );
        Adoption { trip, tasks }
    }
}

fn default_trip(destination: &str, today: NaiveDate) -> NewTrip {
    let start_date = today.checked_add_months(Months::new(TRIP_LEAD_MONTHS));
    let end_date = start_date.and_then(|start| start.checked_add_days(Days::new(TRIP_LENGTH_DAYS)));

    NewTrip {
        name: format!("{destination} Trip"),
        destination: destination.to_string(),
        start_date,
        end_date,
        status: TripStatus::Planning,
        budget: Some(DEFAULT_TRIP_BUDGET),
        travelers: Some(DEFAULT_TRAVELERS),
    }
}

fn task_from_suggestion(
    suggestion: &SuggestionTask,
    trip_id: Option<TripId>,
    today: NaiveDate,
) -> NewTask {
    NewTask {
        title: suggestion.title.clone(),
        description: suggestion.description.clone(),
        category: suggestion.category,
        priority: suggestion.priority,
        due_date: suggestion
            .suggested_due_date
            .as_deref()
            .and_then(|due| resolve_due_date(due, today)),
        trip_id,
        estimated_cost: suggestion.estimated_cost.clone(),
        tips: suggestion.tips.clone(),
        ai_generated: true,
        source: Some(AI_TASK_SOURCE.to_string()),
        ..Default::default()
    }
}
