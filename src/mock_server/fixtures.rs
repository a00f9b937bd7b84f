//! Test data fixtures for the mock server.
//!
//! Provides factory functions for creating realistic test data.

use serde_json::{json, Value};

/// API key accepted by the default scenario's Flickr endpoint.
pub const TEST_API_KEY: &str = "test-api-key";

/// Collection of fixture factories for test data.
pub struct Fixtures;

impl Fixtures {
    // =========================================================================
    // Item Fixtures
    // =========================================================================

    /// A numbered item as served from `/items`.
    pub fn item(id: u32) -> Value {
        json!({
            "id": id,
            "name": format!("item-{id}"),
            "active": id % 2 == 0,
        })
    }

    /// Items numbered `1..=count`.
    pub fn items(count: u32) -> Vec<Value> {
        (1..=count).map(Self::item).collect()
    }

    // =========================================================================
    // Photo Fixtures
    // =========================================================================

    /// A photo in Flickr's wire format, with every extra present.
    pub fn flickr_photo(id: u32) -> Value {
        json!({
            "id": format!("{}", 40_000_000_000u64 + u64::from(id)),
            "owner": format!("{id}@N0{}", id % 8),
            "secret": format!("{:08x}", id.wrapping_mul(2_654_435_761)),
            "server": "65535",
            "farm": 66,
            "title": format!("Interesting photo #{id}"),
            "ispublic": 1,
            "isfriend": 0,
            "isfamily": 0,
            "ownername": format!("photographer {id}"),
            "datetaken": "2018-05-01 09:30:00",
            "datetakengranularity": "0",
            "description": { "_content": format!("Description of photo {id}") },
        })
    }

    /// A photo missing its extras, as Flickr returns when none are requested.
    pub fn bare_flickr_photo(id: u32) -> Value {
        json!({
            "id": id.to_string(),
            "owner": "1@N01",
            "secret": "abc",
            "server": "1",
            "farm": 1,
            "title": "",
            "ispublic": 1,
            "isfriend": 0,
            "isfamily": 0,
        })
    }

    /// Photos numbered `1..=count`.
    pub fn flickr_photos(count: u32) -> Vec<Value> {
        (1..=count).map(Self::flickr_photo).collect()
    }

    // =========================================================================
    // Scenario Builders
    // =========================================================================

    /// Create a default set of test data for common scenarios.
    pub fn default_scenario() -> DefaultScenario {
        DefaultScenario::new()
    }
}

/// A complete test scenario.
pub struct DefaultScenario {
    /// 45 items: five pages at the default page size.
    pub items: Vec<Value>,
    /// 250 photos: three pages at Flickr's default page size of 100.
    pub photos: Vec<Value>,
    pub api_key: String,
}

impl DefaultScenario {
    fn new() -> Self {
        Self {
            items: Fixtures::items(45),
            photos: Fixtures::flickr_photos(250),
            api_key: TEST_API_KEY.to_string(),
        }
    }
}
