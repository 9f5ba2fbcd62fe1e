//! Rule-based narrative and task generation used when the model reply is unusable.

use crate::types::{SuggestionTask, TaskCategory, TaskPriority};

/// Label used in task text when no destination could be recognised.
pub const UNKNOWN_DESTINATION: &str = "your destination";

/// Destination keywords (lowercase) and the name used in generated task titles.
/// Matching is by substring and the first hit in table order wins.
const DESTINATIONS: &[(&str, &str)] = &[
    ("bali", "Bali"),
    ("paris", "Paris"),
    ("new york", "New York"),
    ("tokyo", "Tokyo"),
    ("london", "London"),
    ("rome", "Rome"),
    ("barcelona", "Barcelona"),
    ("dubai", "Dubai"),
    ("thailand", "Thailand"),
    ("italy", "Italy"),
    ("france", "France"),
    ("japan", "Japan"),
    ("usa", "USA"),
    ("uk", "UK"),
    ("spain", "Spain"),
    ("germany", "Germany"),
    ("australia", "Australia"),
    ("canada", "Canada"),
    ("brazil", "Brazil"),
    ("india", "India"),
    ("china", "China"),
    ("mexico", "Mexico"),
];

const TRIP_INTENT_KEYWORDS: &[&str] = &["visit", "trip", "travel", "plan"];
const HOTEL_KEYWORDS: &[&str] = &["hotel", "accommodation"];
const ACTIVITY_KEYWORDS: &[&str] = &["activity", "things to do", "attractions"];
const DOCUMENT_KEYWORDS: &[&str] = &["visa", "passport"];

const BALI_NARRATIVE: &str = "Bali is an incredible destination! You'll love the beautiful beaches, ancient temples, and vibrant culture. The best time to visit is during the dry season (April-October). I recommend staying in Ubud for culture and rice terraces, or Seminyak for beaches and nightlife. Don't miss the sunrise at Mount Batur and the iconic Tanah Lot temple!";

const PARIS_NARRATIVE: &str = "Paris is the perfect destination for art, culture, and romance! The city offers world-class museums like the Louvre, iconic landmarks like the Eiffel Tower, and amazing cuisine. Spring (April-June) and fall (September-October) are ideal times to visit. Stay in the Marais or Saint-Germain for the best experience.";

const NEW_YORK_NARRATIVE: &str = "New York City is an amazing destination with endless possibilities! From Broadway shows to world-class museums, iconic landmarks like the Statue of Liberty and Empire State Building, and incredible food scenes. The best times to visit are spring and fall when the weather is pleasant.";

const TOKYO_NARRATIVE: &str = "Tokyo is a fascinating blend of traditional and modern culture! You'll experience everything from ancient temples to cutting-edge technology. Spring (cherry blossom season) and fall are the best times to visit. Don't miss areas like Shibuya, Harajuku, and traditional Asakusa.";

const GENERIC_NARRATIVE: &str = "That sounds like an exciting travel plan! I'd be happy to help you organize everything you need for a successful trip. Travel planning involves several important steps including research, bookings, documentation, and preparation. Let me help you break this down into manageable tasks.";

const CANNED_NARRATIVES: &[(&str, &str)] = &[
    ("bali", BALI_NARRATIVE),
    ("paris", PARIS_NARRATIVE),
    ("new york", NEW_YORK_NARRATIVE),
    ("tokyo", TOKYO_NARRATIVE),
];

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

/// Find the first known destination mentioned in `query`.
pub fn detect_destination(query: &str) -> Option<&'static str> {
    let lower = query.to_lowercase();
    DESTINATIONS
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .map(|(_, name)| *name)
}

/// Hand-written paragraph for the destination named in `query`, or a generic one.
pub fn fallback_narrative(query: &str) -> String {
    let lower = query.to_lowercase();
    CANNED_NARRATIVES
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .map(|(_, text)| *text)
        .unwrap_or(GENERIC_NARRATIVE)
        .to_string()
}

/// Generate tasks from the user's query alone.
///
/// Rule blocks are independent: a query can trigger the four standard trip
/// tasks and any number of the keyword-specific ones, in that order.
pub fn fallback_tasks(query: &str) -> Vec<SuggestionTask> {
    let lower = query.to_lowercase();
    let detected = detect_destination(&lower);
    let destination = detected.unwrap_or(UNKNOWN_DESTINATION);
    let mut tasks = Vec::new();

    if detected.is_some() || contains_any(&lower, TRIP_INTENT_KEYWORDS) {
        tasks.extend(standard_trip_tasks(destination));
    }

    if contains_any(&lower, HOTEL_KEYWORDS) {
        tasks.push(
            SuggestionTask::new(
                format!("Compare hotel options in {}", destination),
                "Research and compare different hotels based on location, amenities, and price.",
            )
            .with_category(TaskCategory::Booking)
            .with_priority(TaskPriority::Medium)
            .with_due("+7 days")
            .with_tips("Consider location, reviews, and included amenities"),
        );
    }

    if contains_any(&lower, ACTIVITY_KEYWORDS) {
        tasks.push(
            SuggestionTask::new(
                format!("Plan activities in {}", destination),
                "Research and book popular activities and attractions at your destination.",
            )
            .with_category(TaskCategory::Activities)
            .with_priority(TaskPriority::Low)
            .with_due("+45 days")
            .with_tips("Book popular attractions in advance to avoid disappointment"),
        );
    }

    if contains_any(&lower, DOCUMENT_KEYWORDS) {
        tasks.push(
            SuggestionTask::new(
                "Check visa requirements",
                format!(
                    "Verify if you need a visa for {} and apply if necessary.",
                    destination
                ),
            )
            .with_category(TaskCategory::Documents)
            .with_priority(TaskPriority::High)
            .with_due("+60 days")
            .with_tips("Visa processing can take several weeks, apply early"),
        );
    }

    tasks
}

fn standard_trip_tasks(destination: &str) -> [SuggestionTask; 4] {
    [
        SuggestionTask::new(
            format!("Research {} requirements", destination),
            format!(
                "Research visa requirements, weather, local customs, and travel advisories for {}.",
                destination
            ),
        )
        .with_category(TaskCategory::Preparation)
        .with_priority(TaskPriority::High)
        .with_due("+7 days")
        .with_tips("Check government travel websites for the most up-to-date information"),
        SuggestionTask::new(
            format!("Book flights to {}", destination),
            "Search and book round-trip flights. Book 2-3 months in advance for better prices.",
        )
        .with_category(TaskCategory::Transportation)
        .with_priority(TaskPriority::High)
        .with_due("+14 days")
        .with_cost("$400-1200")
        .with_tips("Use flight comparison websites and consider flexible dates"),
        SuggestionTask::new(
            format!("Reserve accommodation in {}", destination),
            "Book hotels or other accommodations for your stay.",
        )
        .with_category(TaskCategory::Booking)
        .with_priority(TaskPriority::Medium)
        .with_due("+21 days")
        .with_cost("$100-300 per night")
        .with_tips("Read reviews and check cancellation policies"),
        SuggestionTask::new(
            "Get travel insurance",
            "Purchase comprehensive travel insurance covering medical emergencies and trip cancellation.",
        )
        .with_category(TaskCategory::Preparation)
        .with_priority(TaskPriority::Medium)
        .with_due("+30 days")
        .with_cost("$50-150")
        .with_tips("Compare different providers and coverage options"),
    ]
}
