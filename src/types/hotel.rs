//! Hotel search queries and the listings handed back to callers.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

pub const DEFAULT_HOTEL_DESTINATION: &str = "New York";
pub const DEFAULT_CURRENCY: &str = "USD";
pub const DEFAULT_ADULTS: u32 = 2;

/// Where a listing came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HotelProvider {
    /// The Booking.com search API
    Booking,
    /// Built locally from the hotel chain catalog
    Curated,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelQuery {
    pub destination: String,
    pub check_in: Option<NaiveDate>,
    pub check_out: Option<NaiveDate>,
    pub adults: u32,
    pub children: u32,
    pub page: u32,
    pub currency: String,
}

impl Default for HotelQuery {
    fn default() -> Self {
        Self {
            destination: DEFAULT_HOTEL_DESTINATION.to_string(),
            check_in: None,
            check_out: None,
            adults: DEFAULT_ADULTS,
            children: 0,
            page: 1,
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }
}

impl HotelQuery {
    pub fn new(destination: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
            ..Default::default()
        }
    }

    pub fn with_dates(mut self, check_in: Option<NaiveDate>, check_out: Option<NaiveDate>) -> Self {
        self.check_in = check_in;
        self.check_out = check_out;
        self
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    /// Arrival and departure dates. Arrival defaults to `today`; departure
    /// defaults to the night after arrival.
    pub fn stay(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let arrival = self.check_in.unwrap_or(today);
        let departure = self
            .check_out
            .filter(|departure| *departure > arrival)
            .or_else(|| arrival.checked_add_days(Days::new(1)))
            .unwrap_or(arrival);
        (arrival, departure)
    }
}

/// A bookable property as shown in search results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hotel {
    pub id: String,
    pub name: String,
    pub location: String,
    /// Nightly price in `currency`
    pub price: f64,
    pub rating: f64,
    pub review_count: u32,
    pub description: String,
    pub amenities: Vec<String>,
    pub provider: HotelProvider,
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hotel_class: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_from_center: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_in_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_out_time: Option<String>,
}

/// Listings plus a note on where they came from
#[derive(Debug, Clone, PartialEq)]
pub struct HotelSearchResult {
    pub hotels: Vec<Hotel>,
    pub data_source: String,
    /// Set when the listings are not live API results
    pub message: Option<String>,
}
