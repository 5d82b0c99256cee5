use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::Coordinates;

/// One fix from a geolocation source.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PositionSample {
    pub coordinates: Coordinates,
    pub timestamp: DateTime<Utc>,
}

/// Options passed to a geolocation source when subscribing.
#[derive(Clone, Copy, Debug)]
pub struct WatchOptions {
    pub high_accuracy: bool,
    pub maximum_age_ms: u64,
    pub timeout_ms: u64,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            maximum_age_ms: 5_000,
            timeout_ms: 10_000,
        }
    }
}
