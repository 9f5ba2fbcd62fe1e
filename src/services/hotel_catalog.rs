//! Curated hotel listings, used when the hotel search API is unavailable.
//!
//! Listings are derived from a fixed table of hotel chains and the
//! destination name, so the same query always yields the same hotels.

use crate::types::{hotel::DEFAULT_HOTEL_DESTINATION, Hotel, HotelProvider, HotelQuery};

pub const CURATED_SOURCE: &str = "Curated hotel chains";
pub const CURATED_MESSAGE: &str = "Showing curated hotels while live hotel search is unavailable";

struct HotelChain {
    name: &'static str,
    brand: &'static str,
    price: (u32, u32),
    rating: (f64, f64),
    class: u8,
    amenities: &'static [&'static str],
}

const CHAINS: &[HotelChain] = &[
    HotelChain {
        name: "The Westin",
        brand: "westin",
        price: (300, 500),
        rating: (4.5, 4.8),
        class: 4,
        amenities: &["Spa", "Fitness Center", "Pool", "Restaurant", "Room Service", "WiFi", "Business Center"],
    },
    HotelChain {
        name: "Marriott",
        brand: "marriott",
        price: (250, 400),
        rating: (4.3, 4.7),
        class: 4,
        amenities: &["Pool", "Fitness Center", "Restaurant", "WiFi", "Business Center", "Parking"],
    },
    HotelChain {
        name: "Hilton",
        brand: "hilton",
        price: (280, 450),
        rating: (4.4, 4.8),
        class: 4,
        amenities: &["Pool", "Spa", "Restaurant", "WiFi", "Fitness Center", "Room Service"],
    },
    HotelChain {
        name: "Hyatt",
        brand: "hyatt",
        price: (320, 480),
        rating: (4.5, 4.9),
        class: 4,
        amenities: &["Spa", "Pool", "Restaurant", "WiFi", "Fitness Center", "Concierge"],
    },
    HotelChain {
        name: "InterContinental",
        brand: "intercontinental",
        price: (350, 550),
        rating: (4.6, 4.9),
        class: 4,
        amenities: &["Spa", "Pool", "Fine Dining", "WiFi", "Butler Service", "Business Center"],
    },
    HotelChain {
        name: "Radisson",
        brand: "radisson",
        price: (200, 350),
        rating: (4.2, 4.6),
        class: 4,
        amenities: &["Pool", "Restaurant", "WiFi", "Fitness Center", "Business Center"],
    },
    HotelChain {
        name: "Sheraton",
        brand: "sheraton",
        price: (240, 380),
        rating: (4.3, 4.7),
        class: 4,
        amenities: &["Pool", "Restaurant", "WiFi", "Fitness Center", "Meeting Rooms"],
    },
    HotelChain {
        name: "Four Seasons",
        brand: "four-seasons",
        price: (500, 800),
        rating: (4.8, 5.0),
        class: 5,
        amenities: &["Luxury Spa", "Fine Dining", "Pool", "WiFi", "Concierge", "Butler Service"],
    },
];

const LOCATION_VARIANTS: &[&str] = &[
    "City Center",
    "Downtown",
    "Grand",
    "Plaza",
    "International",
    "Luxury",
    "Business District",
    "Waterfront",
];

/// One listing per chain in the catalog, placed in `query.destination`.
pub fn curated_hotels(query: &HotelQuery) -> Vec<Hotel> {
    let destination = match query.destination.trim() {
        "" => DEFAULT_HOTEL_DESTINATION,
        name => name,
    };
    let slug: String = destination
        .to_lowercase()
        .split_whitespace()
        .collect();

    CHAINS
        .iter()
        .zip(LOCATION_VARIANTS)
        .enumerate()
        .map(|(index, (chain, variant))| {
            let name = format!("{} {} {}", chain.name, destination, variant);
            let seed = fnv1a(&format!("{slug}|{}", chain.brand));

            let price_span = u64::from(chain.price.1 - chain.price.0);
            let price = u64::from(chain.price.0) + seed % price_span;

            let rating_steps = ((chain.rating.1 - chain.rating.0) * 10.0).round() as u64;
            let rating_tenths = (chain.rating.0 * 10.0).round() as u64 + (seed >> 8) % (rating_steps + 1);

            let street = 1 + (seed >> 24) % 999;
            let distance_tenths = 5 + (seed >> 32) % 50;

            Hotel {
                id: format!("{}_{}_{}", chain.brand, slug, index + 1),
                location: format!("{street} {destination} Street, {destination}"),
                price: price as f64,
                rating: rating_tenths as f64 / 10.0,
                review_count: 500 + ((seed >> 16) % 2000) as u32,
                description: format!(
                    "Experience luxury and comfort at {name}. Located in the heart of {destination}, this {} property offers world-class amenities and exceptional service.",
                    chain.name
                ),
                amenities: chain.amenities.iter().map(|a| a.to_string()).collect(),
                provider: HotelProvider::Curated,
                currency: query.currency.clone(),
                hotel_class: Some(chain.class),
                distance_from_center: Some(format!("{:.1} km", distance_tenths as f64 / 10.0)),
                images: Vec::new(),
                check_in_time: Some("15:00".to_string()),
                check_out_time: Some("11:00".to_string()),
                name,
            }
        })
        .collect()
}

// FNV-1a; `DefaultHasher` output may change between Rust releases.
fn fnv1a(text: &str) -> u64 {
    text.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_listing_per_chain() {
        let hotels = curated_hotels(&HotelQuery::new("Bali"));

        assert_eq!(hotels.len(), CHAINS.len());
        assert_eq!(hotels[0].name, "The Westin Bali City Center");
        assert_eq!(hotels[0].id, "westin_bali_1");
        assert_eq!(hotels[7].name, "Four Seasons Bali Waterfront");
        assert_eq!(hotels[7].hotel_class, Some(5));
        assert!(hotels.iter().all(|h| h.provider == HotelProvider::Curated));
    }

    #[test]
    fn test_listings_are_stable_per_destination() {
        let query = HotelQuery::new("New York");

        assert_eq!(curated_hotels(&query), curated_hotels(&query));
        assert_eq!(curated_hotels(&query)[1].id, "marriott_newyork_2");

        let prices = |destination: &str| -> Vec<f64> {
            curated_hotels(&HotelQuery::new(destination))
                .iter()
                .map(|hotel| hotel.price)
                .collect()
        };
        assert_ne!(prices("New York"), prices("Tokyo"));
    }

    #[test]
    fn test_prices_and_ratings_stay_in_chain_ranges() {
        for destination in ["Paris", "Tokyo", "Reykjavik", "San Francisco"] {
            for (hotel, chain) in curated_hotels(&HotelQuery::new(destination)).iter().zip(CHAINS) {
                assert!(hotel.price >= f64::from(chain.price.0) && hotel.price < f64::from(chain.price.1));
                assert!(hotel.rating >= chain.rating.0 - 1e-9 && hotel.rating <= chain.rating.1 + 1e-9);
                assert!((500..2500).contains(&hotel.review_count));
            }
        }
    }

    #[test]
    fn test_currency_and_blank_destination() {
        let hotels = curated_hotels(&HotelQuery::new("  ").with_currency("EUR"));

        assert!(hotels[0].name.contains("New York"));
        assert!(hotels.iter().all(|h| h.currency == "EUR"));
    }
}
