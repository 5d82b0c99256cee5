use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::Coordinates;

/// One maneuver within a leg. Never mutated once the route is computed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteStep {
    pub start: Coordinates,
    pub end: Coordinates,
    pub instruction: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteLeg {
    pub steps: Vec<RouteStep>,
}

/// The active plan. Replaced wholesale on reroute, never patched in place.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub id: Uuid,
    pub origin: Coordinates,
    pub destination: Coordinates,
    pub waypoints: Vec<Coordinates>,
    pub legs: Vec<RouteLeg>,
}

impl Route {
    pub fn new(
        origin: Coordinates,
        destination: Coordinates,
        waypoints: Vec<Coordinates>,
        legs: Vec<RouteLeg>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            origin,
            destination,
            waypoints,
            legs,
        }
    }

    /// Steps of every leg, flattened in travel order.
    pub fn steps(&self) -> impl Iterator<Item = &RouteStep> {
        self.legs.iter().flat_map(|leg| leg.steps.iter())
    }

    pub fn step(&self, index: usize) -> Option<&RouteStep> {
        self.steps().nth(index)
    }

    pub fn step_count(&self) -> usize {
        self.legs.iter().map(|leg| leg.steps.len()).sum()
    }
}
