use super::{Engine, PumpHandle};

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::api::{DynAnnouncer, DynRoutePlanner, NavigationAPI, PositionStream};
use crate::config::NavigationConfig;
use crate::entities::{Coordinates, NavigationSession, SessionEvent, Stop};
use crate::error::{invalid_input_error, invalid_invocation_error, Error};
use crate::events::{EventBus, ProximityEvent};

#[async_trait]
impl NavigationAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn start_navigation(
        &self,
        origin: Coordinates,
        destination: Coordinates,
        waypoints: Vec<Coordinates>,
        task_id: Option<Uuid>,
    ) -> Result<Uuid, Error> {
        if !origin.is_valid()
            || !destination.is_valid()
            || waypoints.iter().any(|waypoint| !waypoint.is_valid())
        {
            return Err(invalid_input_error());
        }

        // the slot stays locked while the route is planned so overlapping
        // calls cannot both pass the occupancy check
        let mut slot = self.session.lock().await;
        if slot.is_some() {
            return Err(invalid_invocation_error());
        }

        let route = self.planner.route(origin, destination, &waypoints).await?;
        let session = NavigationSession::new(route, task_id, self.config);
        let session_id = session.id;

        *slot = Some(session);
        drop(slot);

        match self.locations.subscribe(self.config.watch_options()).await {
            Ok(stream) => {
                let task = spawn_pump(
                    stream.clone(),
                    self.session.clone(),
                    self.planner.clone(),
                    self.announcer.clone(),
                    self.bus.clone(),
                    self.config,
                );

                *self.pump.lock().await = Some(PumpHandle { stream, task });
            }
            Err(err) if err.is_permission_denied() => {
                // the rest of navigation still works from the planned route
                tracing::warn!("location permission denied, proximity tracking disabled");
            }
            Err(err) => {
                *self.session.lock().await = None;
                return Err(err);
            }
        }

        Ok(session_id)
    }

    #[tracing::instrument(skip(self))]
    async fn end_navigation(&self) -> Result<(), Error> {
        // clear the session first so any sample already in flight becomes a
        // no-op, then release the subscription
        let existed = self.session.lock().await.take().is_some();

        if let Some(handle) = self.pump.lock().await.take() {
            handle.stream.close();
        }

        if !existed {
            return Err(invalid_invocation_error());
        }

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn confirm_arrival(&self) -> Result<(), Error> {
        let mut guard = self.session.lock().await;
        let session = guard.as_mut().ok_or_else(invalid_invocation_error)?;

        session.confirm_arrival();
        Ok(())
    }

    #[tracing::instrument(skip(self, stops))]
    async fn reoptimize_stops(
        &self,
        origin: Coordinates,
        stops: Vec<Stop>,
    ) -> Result<Vec<Stop>, Error> {
        if stops.is_empty() || !origin.is_valid() {
            return Err(invalid_input_error());
        }

        match self.planner.reoptimize(origin, &stops).await {
            Ok(ordered) if is_same_stops(&ordered, &stops) => Ok(ordered),
            Ok(_) => {
                tracing::warn!("provider returned a malformed stop order, keeping original");
                Ok(stops)
            }
            Err(err) => {
                tracing::warn!(code = err.code, "reoptimization failed, keeping original order");
                Ok(stops)
            }
        }
    }
}

fn is_same_stops(ordered: &[Stop], original: &[Stop]) -> bool {
    if ordered.len() != original.len() {
        return false;
    }

    let mut a: Vec<&str> = ordered.iter().map(|stop| stop.place_id.as_str()).collect();
    let mut b: Vec<&str> = original.iter().map(|stop| stop.place_id.as_str()).collect();
    a.sort_unstable();
    b.sort_unstable();

    a == b
}

/// Consumes position samples in arrival order and turns session events into
/// announcements, bus publications and reroute requests. Exits when the
/// stream closes or the session is cleared.
fn spawn_pump(
    stream: PositionStream,
    session: Arc<Mutex<Option<NavigationSession>>>,
    planner: DynRoutePlanner,
    announcer: DynAnnouncer,
    bus: Arc<EventBus>,
    config: NavigationConfig,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let timeout = Duration::from_millis(config.timeout_ms);

        loop {
            let sample = match tokio::time::timeout(timeout, stream.next()).await {
                Ok(Some(sample)) => sample,
                Ok(None) => break,
                Err(_) => {
                    tracing::warn!("no position fix within the timeout");
                    continue;
                }
            };

            let events = {
                let mut guard = session.lock().await;
                let Some(active) = guard.as_mut() else {
                    break;
                };
                active.observe(&sample, Utc::now())
            };

            for event in events {
                match event {
                    SessionEvent::StepChanged { index, step } => {
                        tracing::info!(index, instruction = %step.instruction, "step changed");

                        if let Err(err) = announcer.speak(&step.instruction).await {
                            tracing::warn!(code = err.code, "announcement failed");
                        }
                    }
                    SessionEvent::NearDestination { distance_meters } => {
                        bus.publish(ProximityEvent::NearDestination { distance_meters });
                    }
                    SessionEvent::ExitedWithoutConfirmation { task_id } => {
                        bus.publish(ProximityEvent::ExitedWithoutConfirmation { task_id });
                    }
                    SessionEvent::RerouteRequired { position } => {
                        let target = {
                            let guard = session.lock().await;
                            guard.as_ref().map(|active| {
                                (
                                    active.route().destination,
                                    active.route().waypoints.clone(),
                                )
                            })
                        };
                        let Some((destination, waypoints)) = target else {
                            break;
                        };

                        // replan in the background; samples keep flowing
                        // against the previous route meanwhile
                        let planner = planner.clone();
                        let session = session.clone();
                        tokio::spawn(async move {
                            match planner.route(position, destination, &waypoints).await {
                                Ok(route) => {
                                    if let Some(active) = session.lock().await.as_mut() {
                                        tracing::info!(route_id = %route.id, "route replaced");
                                        active.apply_route(route);
                                    }
                                }
                                Err(err) => {
                                    tracing::warn!(
                                        code = err.code,
                                        "reroute failed, keeping last known route"
                                    );
                                }
                            }
                        });
                    }
                }
            }
        }

        tracing::debug!("position pump stopped");
    })
}
