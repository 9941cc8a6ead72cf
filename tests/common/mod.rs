//! Common test utilities and helpers.

#![allow(dead_code)]

use azsearch_client::hotels::{Address, GeoPoint, Hotel};
use azsearch_client::SearchServiceConfig;
use serde_json::{json, Value};
use std::env;

pub const TEST_INDEX: &str = "hotels-test";
pub const TEST_ADMIN_KEY: &str = "test-admin-key";
pub const TEST_QUERY_KEY: &str = "test-query-key";
pub const TEST_API_VERSION: &str = "2024-07-01";

/// Service configuration pointing at a mock server
pub fn mock_config(server_url: &str) -> SearchServiceConfig {
    SearchServiceConfig::from_lookup(|key| match key {
        "AZURE_SEARCH_ENDPOINT" => Some(server_url.to_string()),
        "AZURE_SEARCH_INDEX" => Some(TEST_INDEX.to_string()),
        "AZURE_SEARCH_API_KEY" => Some(TEST_ADMIN_KEY.to_string()),
        "AZURE_SEARCH_QUERY_KEY" => Some(TEST_QUERY_KEY.to_string()),
        _ => None,
    })
    .expect("mock configuration is complete")
}

/// Sample hotels used across tests
pub fn create_test_hotels() -> Vec<Hotel> {
    vec![
        Hotel {
            hotel_id: "1".to_string(),
            hotel_name: Some("Stay-Kay City Hotel".to_string()),
            description: Some("This classic hotel is fully-refurbished and ideally located on the main commercial artery of the city in the heart of New York.".to_string()),
            category: Some("Boutique".to_string()),
            tags: vec!["view".to_string(), "air conditioning".to_string(), "concierge".to_string()],
            parking_included: Some(false),
            rating: Some(3.6),
            address: Some(Address {
                street_address: Some("677 5th Ave".to_string()),
                city: Some("New York".to_string()),
                state_province: Some("NY".to_string()),
                postal_code: Some("10022".to_string()),
                country: Some("USA".to_string()),
            }),
            location: Some(GeoPoint::new(-73.975403, 40.760586)),
            ..Default::default()
        },
        Hotel {
            hotel_id: "2".to_string(),
            hotel_name: Some("Old Century Hotel".to_string()),
            description: Some("The hotel is situated in a nineteenth century plaza, which has been expanded and renovated to the highest architectural standards.".to_string()),
            category: Some("Boutique".to_string()),
            tags: vec!["pool".to_string(), "free wifi".to_string(), "concierge".to_string()],
            rating: Some(3.6),
            ..Default::default()
        },
        Hotel {
            hotel_id: "24".to_string(),
            hotel_name: Some("Uptown Chic Hotel".to_string()),
            description: Some("Chic hotel near the city. High-rise hotel in downtown, within walking distance to theaters, art galleries, restaurants and shops.".to_string()),
            category: Some("Suite".to_string()),
            tags: vec!["view".to_string(), "pool".to_string(), "restaurant".to_string()],
            rating: Some(4.2),
            ..Default::default()
        },
    ]
}

/// Search response item for a hotel projected to name and description
pub fn search_item(hotel: &Hotel, score: f64) -> Value {
    json!({
        "@search.score": score,
        "HotelName": hotel.hotel_name,
        "Description": hotel.description,
    })
}

/// Check if tests against a live service should run
pub fn should_run_live_tests() -> bool {
    env::var("TEST_LIVE_SEARCH").is_ok() && env::var("AZURE_SEARCH_ENDPOINT").is_ok()
}

/// Generate a unique index name
pub fn generate_test_index_name() -> String {
    format!("test-{}", uuid::Uuid::new_v4().simple())
}

/// Setup test logging (useful for debugging tests)
pub fn setup_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("azsearch_client=debug")
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_test_hotels() {
        let hotels = create_test_hotels();
        assert_eq!(hotels.len(), 3);
        assert_eq!(hotels[0].hotel_id, "1");
        assert!(hotels[2].description.as_deref().unwrap().contains("restaurants"));
    }

    #[test]
    fn test_generate_test_index_name() {
        let a = generate_test_index_name();
        let b = generate_test_index_name();
        assert!(a.starts_with("test-"));
        assert_ne!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
    }

    #[test]
    fn test_mock_config() {
        let config = mock_config("http://127.0.0.1:1234");
        assert_eq!(config.index_name, TEST_INDEX);
        assert_eq!(config.api_version, TEST_API_VERSION);
    }
}
