use chrono::Duration;

use crate::entities::WatchOptions;

/// Tunables of the navigation core. Thresholds are per-engine so a host can
/// size them to the travel mode; the defaults match walking-scale use.
#[derive(Clone, Copy, Debug)]
pub struct NavigationConfig {
    /// Distance to the destination below which the traveler has "arrived".
    pub proximity_threshold_m: f64,
    /// Distance from the current step's end beyond which a reroute is due.
    pub deviation_threshold_m: f64,
    /// Distance to a step's end at which that maneuver counts as completed.
    pub step_arrival_threshold_m: f64,
    /// Minimum spacing between reroute requests.
    pub reroute_cooldown: Duration,
    /// Default radius for nearby-place searches.
    pub search_radius_m: f64,
    pub high_accuracy: bool,
    /// Position fixes cached longer than this are rejected as stale.
    pub maximum_age_ms: u64,
    /// How long to wait for the next position fix before complaining.
    pub timeout_ms: u64,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            proximity_threshold_m: 100.0,
            deviation_threshold_m: 200.0,
            step_arrival_threshold_m: 30.0,
            reroute_cooldown: Duration::seconds(8),
            search_radius_m: 5_000.0,
            high_accuracy: true,
            maximum_age_ms: 5_000,
            timeout_ms: 10_000,
        }
    }
}

impl NavigationConfig {
    pub fn watch_options(&self) -> WatchOptions {
        WatchOptions {
            high_accuracy: self.high_accuracy,
            maximum_age_ms: self.maximum_age_ms,
            timeout_ms: self.timeout_ms,
        }
    }
}
