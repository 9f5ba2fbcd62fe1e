use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use tracing::debug;

use crate::{
    core::hotels::HotelSearch,
    error::{Result, TravelError},
    types::{Hotel, HotelProvider, HotelQuery},
};

pub const DEFAULT_BOOKING_BASE_URL: &str = "https://booking-com15.p.rapidapi.com";
pub const DEFAULT_HOTEL_TIMEOUT: Duration = Duration::from_secs(8);

const RAPIDAPI_HOST: &str = "booking-com15.p.rapidapi.com";
const DEFAULT_DESCRIPTION: &str = "Comfortable accommodation with modern amenities";
const DEFAULT_AMENITIES: &[&str] = &["WiFi", "Air Conditioning"];
const DEFAULT_RATING: f64 = 4.0;

/// Client for the Booking.com hotel search API, served through RapidAPI
#[derive(Clone, Debug)]
pub struct BookingClient {
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl BookingClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BOOKING_BASE_URL.to_string(),
            timeout: DEFAULT_HOTEL_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn search_params(query: &HotelQuery) -> Vec<(&'static str, String)> {
        let (arrival, departure) = query.stay(Utc::now().date_naive());
        vec![
            ("dest_id", query.destination.clone()),
            ("search_type", "city".to_string()),
            ("arrival_date", arrival.format("%Y-%m-%d").to_string()),
            ("departure_date", departure.format("%Y-%m-%d").to_string()),
            ("adults", query.adults.to_string()),
            ("children", query.children.to_string()),
            ("room_qty", "1".to_string()),
            ("page_number", query.page.to_string()),
            ("languagecode", "en-us".to_string()),
            ("currency_code", query.currency.clone()),
        ]
    }
}

#[async_trait]
impl HotelSearch for BookingClient {
    fn name(&self) -> &str {
        "booking"
    }

    async fn search_hotels(&self, query: &HotelQuery) -> Result<Vec<Hotel>> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|err| TravelError::Unknown(format!("Failed to build HTTP client: {err}")))?;

        let request_url = format!(
            "{}/api/v1/hotels/searchHotels",
            self.base_url.trim_end_matches('/')
        );
        let response = client
            .get(&request_url)
            .header("X-RapidAPI-Key", self.api_key.as_str())
            .header("X-RapidAPI-Host", RAPIDAPI_HOST)
            .query(&Self::search_params(query))
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    TravelError::Timeout(format!(
                        "hotel search did not answer within {}s",
                        self.timeout.as_secs()
                    ))
                } else {
                    TravelError::Http(err)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TravelError::HotelApi(format!("HTTP {} error: {}", status, body)));
        }

        let response_text = response.text().await?;
        let response_json: Value = serde_json::from_str(&response_text)?;

        let hotels: Vec<Hotel> = response_json
            .pointer("/data/hotels")
            .and_then(|hotels| hotels.as_array())
            .map(|hotels| {
                hotels
                    .iter()
                    .filter_map(|hotel| hotel_from_api(hotel, query))
                    .collect()
            })
            .unwrap_or_default();

        debug!(target: "travel::hotels", destination = %query.destination, count = hotels.len(), "hotel search answered");
        Ok(hotels)
    }
}

/// Map one API listing. Entries without an id are skipped.
fn hotel_from_api(raw: &Value, query: &HotelQuery) -> Option<Hotel> {
    let hotel = raw.as_object()?;
    let id = first_text(hotel, &["hotel_id", "id"])?;

    let images = match hotel.get("photos").and_then(|photos| photos.as_array()) {
        Some(photos) => photos
            .iter()
            .filter_map(|photo| match photo {
                Value::String(url) => Some(url.clone()),
                Value::Object(photo) => first_text(photo, &["url_original", "url_max300", "url"]),
                _ => None,
            })
            .collect(),
        None => first_text(hotel, &["main_photo_url"]).into_iter().collect(),
    };

    let amenities = ["facilities", "amenities"]
        .iter()
        .find_map(|key| hotel.get(*key).and_then(|value| value.as_array()))
        .map(|facilities| {
            facilities
                .iter()
                .filter_map(|facility| match facility {
                    Value::String(name) => Some(name.clone()),
                    Value::Object(facility) => first_text(facility, &["name", "facility_name"]),
                    _ => None,
                })
                .collect::<Vec<_>>()
        })
        .filter(|amenities| !amenities.is_empty())
        .unwrap_or_else(|| DEFAULT_AMENITIES.iter().map(|a| a.to_string()).collect());

    Some(Hotel {
        id,
        name: first_text(hotel, &["hotel_name", "name"]).unwrap_or_else(|| "Hotel".to_string()),
        location: first_text(hotel, &["address", "location"])
            .unwrap_or_else(|| query.destination.clone()),
        price: first_number(hotel, &["min_total_price", "price"]).unwrap_or(0.0),
        rating: first_number(hotel, &["review_score", "rating"]).unwrap_or(DEFAULT_RATING),
        review_count: first_number(hotel, &["review_nr", "reviewCount"])
            .map(|count| count.max(0.0) as u32)
            .unwrap_or(0),
        description: first_text(hotel, &["hotel_description", "description"])
            .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
        amenities,
        provider: HotelProvider::Booking,
        currency: first_text(hotel, &["currency_code"]).unwrap_or_else(|| query.currency.clone()),
        hotel_class: first_number(hotel, &["class", "hotel_class"])
            .filter(|class| (1.0..=5.0).contains(class))
            .map(|class| class as u8),
        distance_from_center: first_text(hotel, &["distance_to_cc"]),
        images,
        check_in_time: None,
        check_out_time: None,
    })
}

/// First non-blank string (or number, as text) among `keys`
fn first_text(object: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match object.get(*key)? {
        Value::String(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    })
}

/// First non-zero number (or numeric string) among `keys`
fn first_number(object: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|key| {
        let number = match object.get(*key)? {
            Value::Number(number) => number.as_f64(),
            Value::String(text) => text.trim().parse().ok(),
            _ => None,
        }?;
        (number != 0.0).then_some(number)
    })
}
