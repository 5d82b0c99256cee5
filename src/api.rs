use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::entities::{
    Coordinates, Notification, PositionSample, Route, Stop, WatchOptions,
};
use crate::error::Error;

/// Ordered stream of position fixes from a geolocation source. Closing it
/// releases the subscription: the source stops delivering and `next`
/// returns `None` once the buffer drains.
#[derive(Clone, Debug)]
pub struct PositionStream {
    samples: async_channel::Receiver<PositionSample>,
}

impl PositionStream {
    pub fn new(samples: async_channel::Receiver<PositionSample>) -> Self {
        Self { samples }
    }

    pub async fn next(&self) -> Option<PositionSample> {
        self.samples.recv().await.ok()
    }

    pub fn close(&self) -> bool {
        self.samples.close()
    }
}

/// Computes routes and stop orderings. The optimization heuristics are
/// owned entirely by the provider; callers consume the result verbatim.
#[async_trait]
pub trait RoutePlanner {
    async fn route(
        &self,
        origin: Coordinates,
        destination: Coordinates,
        waypoints: &[Coordinates],
    ) -> Result<Route, Error>;

    /// Returns `stops` permuted into travel order, the last element being
    /// the final destination.
    async fn reoptimize(&self, origin: Coordinates, stops: &[Stop]) -> Result<Vec<Stop>, Error>;
}

#[async_trait]
pub trait LocationSource {
    async fn subscribe(&self, options: WatchOptions) -> Result<PositionStream, Error>;
}

/// Speaks instruction text. Implementations interrupt any in-progress
/// utterance before starting a new one.
#[async_trait]
pub trait Announcer {
    async fn speak(&self, text: &str) -> Result<(), Error>;
}

/// Delivers notifications through the host platform's persistent surface,
/// so they outlive the view that triggered them.
#[async_trait]
pub trait Presenter {
    async fn present(&self, notification: Notification) -> Result<(), Error>;
}

pub type DynRoutePlanner = Arc<dyn RoutePlanner + Send + Sync>;
pub type DynLocationSource = Arc<dyn LocationSource + Send + Sync>;
pub type DynAnnouncer = Arc<dyn Announcer + Send + Sync>;
pub type DynPresenter = Arc<dyn Presenter + Send + Sync>;

#[async_trait]
pub trait NavigationAPI {
    async fn start_navigation(
        &self,
        origin: Coordinates,
        destination: Coordinates,
        waypoints: Vec<Coordinates>,
        task_id: Option<Uuid>,
    ) -> Result<Uuid, Error>;

    async fn end_navigation(&self) -> Result<(), Error>;

    async fn confirm_arrival(&self) -> Result<(), Error>;

    async fn reoptimize_stops(
        &self,
        origin: Coordinates,
        stops: Vec<Stop>,
    ) -> Result<Vec<Stop>, Error>;
}

#[async_trait]
pub trait PlacesAPI {
    async fn find_nearby_places(
        &self,
        keyword: String,
        location: Coordinates,
        radius: Option<f64>,
    ) -> Result<Vec<Stop>, Error>;
}

pub trait API: NavigationAPI + PlacesAPI {}

pub type DynAPI = Arc<dyn API + Send + Sync>;
