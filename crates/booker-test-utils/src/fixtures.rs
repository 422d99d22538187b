//! Static JSON fixtures loaded from the data directory.

use std::fs;
use std::path::Path;

use serde_json::{Map, Value};
use tracing::{debug, warn};

pub const BOOKING_DATA_FILE: &str = "booking_data.json";
pub const INVALID_DATA_FILE: &str = "invalid_data.json";
pub const SCHEMAS_FILE: &str = "test_schemas.json";

/// Named payloads and schemas. A missing or unreadable file leaves its set empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FixtureSet {
    pub booking_data: Map<String, Value>,
    pub invalid_data: Map<String, Value>,
    pub schemas: Map<String, Value>,
}

impl FixtureSet {
    pub fn load(data_dir: &Path) -> Self {
        Self {
            booking_data: load_object(&data_dir.join(BOOKING_DATA_FILE)),
            invalid_data: load_object(&data_dir.join(INVALID_DATA_FILE)),
            schemas: load_object(&data_dir.join(SCHEMAS_FILE)),
        }
    }

    pub fn booking_template(&self, name: &str) -> Option<&Value> {
        self.booking_data.get(name)
    }

    pub fn invalid_payload(&self, name: &str) -> Option<&Value> {
        self.invalid_data.get(name)
    }

    pub fn schema(&self, name: &str) -> Option<&Value> {
        self.schemas.get(name)
    }
}

fn load_object(path: &Path) -> Map<String, Value> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            debug!("Fixture {} not loaded: {}", path.display(), e);
            return Map::new();
        }
    };

    match serde_json::from_str(&content) {
        Ok(Value::Object(map)) => map,
        Ok(_) => {
            warn!("Fixture {} is not a JSON object", path.display());
            Map::new()
        }
        Err(e) => {
            warn!("Fixture {} is not valid JSON: {}", path.display(), e);
            Map::new()
        }
    }
}
