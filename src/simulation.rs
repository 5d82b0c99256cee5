use async_trait::async_trait;
use chrono::Utc;
use rand_distr::{Distribution, Normal};
use std::time::Duration;

use crate::api::{Announcer, LocationSource, PositionStream, Presenter};
use crate::entities::{Coordinates, Notification, PositionSample, Route, WatchOptions};
use crate::error::Error;

/// Walks a fixed path, delivering one fix per tick with optional Gaussian
/// jitter. Stands in for a device geolocation watch in demos and tests.
pub struct SimulatedLocationSource {
    path: Vec<Coordinates>,
    interval: Duration,
    jitter_m: f64,
}

impl SimulatedLocationSource {
    pub fn new(path: Vec<Coordinates>, interval: Duration, jitter_m: f64) -> Self {
        Self {
            path,
            interval,
            jitter_m,
        }
    }

    /// A path through the route's origin and every step end, in order.
    pub fn along_route(route: &Route, interval: Duration, jitter_m: f64) -> Self {
        let mut path = vec![route.origin];
        path.extend(route.steps().map(|step| step.end));

        Self::new(path, interval, jitter_m)
    }

    fn jittered_path(&self) -> Vec<Coordinates> {
        if self.jitter_m <= 0.0 {
            return self.path.clone();
        }

        // meters to degrees, close enough at city scale
        let sigma = self.jitter_m / 111_195.0;
        let Ok(noise) = Normal::new(0.0, sigma) else {
            return self.path.clone();
        };

        let mut rng = rand::thread_rng();
        self.path
            .iter()
            .map(|point| {
                Coordinates::new(
                    point.latitude + noise.sample(&mut rng),
                    point.longitude + noise.sample(&mut rng),
                )
            })
            .collect()
    }
}

#[async_trait]
impl LocationSource for SimulatedLocationSource {
    #[tracing::instrument(skip(self))]
    async fn subscribe(&self, _options: WatchOptions) -> Result<PositionStream, Error> {
        let (tx, rx) = async_channel::unbounded();
        let path = self.jittered_path();
        let interval = self.interval;

        tokio::spawn(async move {
            for coordinates in path {
                let sample = PositionSample {
                    coordinates,
                    timestamp: Utc::now(),
                };

                // a failed send means the subscriber closed the stream
                if tx.send(sample).await.is_err() {
                    break;
                }

                tokio::time::sleep(interval).await;
            }
        });

        Ok(PositionStream::new(rx))
    }
}

pub struct LogAnnouncer;

#[async_trait]
impl Announcer for LogAnnouncer {
    async fn speak(&self, text: &str) -> Result<(), Error> {
        tracing::info!(%text, "announcing");
        Ok(())
    }
}

pub struct LogPresenter;

#[async_trait]
impl Presenter for LogPresenter {
    async fn present(&self, notification: Notification) -> Result<(), Error> {
        tracing::info!(
            title = %notification.title,
            body = %notification.body,
            actions = notification.actions.len(),
            "presenting notification"
        );
        Ok(())
    }
}
