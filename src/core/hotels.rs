use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::{
    config::AppConfig,
    error::Result,
    services::{
        booking_client::BookingClient,
        hotel_catalog::{curated_hotels, CURATED_MESSAGE, CURATED_SOURCE},
    },
    types::{Hotel, HotelQuery, HotelSearchResult},
};

pub const LIVE_SOURCE: &str = "Booking.com API";
pub const DEFAULT_DEALS_LIMIT: usize = 12;

/// A live hotel search backend
#[async_trait]
pub trait HotelSearch: Send + Sync + std::fmt::Debug {
    /// Backend identifier, for logs
    fn name(&self) -> &str;

    async fn search_hotels(&self, query: &HotelQuery) -> Result<Vec<Hotel>>;
}

/// Hotel search that never fails: live results when the backend answers
/// with listings, curated chain listings otherwise.
#[derive(Debug, Clone, Default)]
pub struct HotelFinder {
    backend: Option<Arc<dyn HotelSearch>>,
}

impl HotelFinder {
    pub fn new(backend: Arc<dyn HotelSearch>) -> Self {
        Self {
            backend: Some(backend),
        }
    }

    /// Curated listings only
    pub fn offline() -> Self {
        Self::default()
    }

    /// Booking.com backend when `RAPID_API_KEY` is set, curated listings otherwise
    pub fn from_config(config: &AppConfig) -> Self {
        if config.rapid_api_key.trim().is_empty() {
            warn!(target: "travel::hotels", "RAPID_API_KEY is not set, hotel search serves curated listings");
            return Self::offline();
        }
        let client = BookingClient::new(config.rapid_api_key.clone())
            .with_base_url(config.rapid_api_base_url.clone());
        Self::new(Arc::new(client))
    }

    pub fn is_live(&self) -> bool {
        self.backend.is_some()
    }

    pub async fn search(&self, query: &HotelQuery) -> HotelSearchResult {
        if let Some(backend) = &self.backend {
            match backend.search_hotels(query).await {
                Ok(hotels) if !hotels.is_empty() => {
                    info!(target: "travel::hotels", backend = backend.name(), destination = %query.destination, count = hotels.len(), "live hotel results");
                    return HotelSearchResult {
                        hotels,
                        data_source: LIVE_SOURCE.to_string(),
                        message: None,
                    };
                }
                Ok(_) => {
                    info!(target: "travel::hotels", backend = backend.name(), destination = %query.destination, "no live hotel results, using curated listings")
                }
                Err(err) => {
                    warn!(target: "travel::hotels", backend = backend.name(), error = %err, destination = %query.destination, "hotel search failed, using curated listings")
                }
            }
        }

        HotelSearchResult {
            hotels: curated_hotels(query),
            data_source: CURATED_SOURCE.to_string(),
            message: Some(CURATED_MESSAGE.to_string()),
        }
    }

    /// The `limit` best rated listings for `query`
    pub async fn best_deals(&self, query: &HotelQuery, limit: usize) -> HotelSearchResult {
        let mut result = self.search(query).await;
        result
            .hotels
            .sort_by(|a, b| b.rating.total_cmp(&a.rating));
        result.hotels.truncate(limit);
        result
    }
}
