use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::config::NavigationConfig;
use crate::entities::{Coordinates, PositionSample, Route, RouteStep};

/// Cooldown gate in front of the route planner. Expires by time alone;
/// a completed (or failed) reroute does not re-arm it early.
#[derive(Clone, Copy, Debug, PartialEq)]
enum ThrottleState {
    Idle,
    CoolingDown { until: DateTime<Utc> },
}

#[derive(Clone, Debug)]
pub struct RerouteThrottle {
    state: ThrottleState,
    window: Duration,
}

impl RerouteThrottle {
    pub fn new(window: Duration) -> Self {
        Self {
            state: ThrottleState::Idle,
            window,
        }
    }

    /// True at most once per rolling window.
    pub fn try_acquire(&mut self, now: DateTime<Utc>) -> bool {
        match self.state {
            ThrottleState::CoolingDown { until } if now < until => false,
            _ => {
                self.state = ThrottleState::CoolingDown {
                    until: now + self.window,
                };
                true
            }
        }
    }

    pub fn reset(&mut self) {
        self.state = ThrottleState::Idle;
    }
}

/// What a processed position sample asks the engine to do.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    StepChanged { index: usize, step: RouteStep },
    NearDestination { distance_meters: f64 },
    ExitedWithoutConfirmation { task_id: Uuid },
    RerouteRequired { position: Coordinates },
}

/// Live state of one navigation run: the active route, the step being
/// tracked and the arrival bookkeeping. `current_step` of `None` means
/// navigation has not started yet; once set it is always a valid index
/// into the active route.
#[derive(Clone, Debug)]
pub struct NavigationSession {
    pub id: Uuid,
    route: Route,
    current_step: Option<usize>,
    last_processed: Option<DateTime<Utc>>,
    near_emitted: bool,
    exit_emitted: bool,
    confirmed: bool,
    task_id: Option<Uuid>,
    throttle: RerouteThrottle,
    config: NavigationConfig,
}

impl NavigationSession {
    pub fn new(route: Route, task_id: Option<Uuid>, config: NavigationConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            route,
            current_step: None,
            last_processed: None,
            near_emitted: false,
            exit_emitted: false,
            confirmed: false,
            task_id,
            throttle: RerouteThrottle::new(config.reroute_cooldown),
            config,
        }
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn current_step_index(&self) -> Option<usize> {
        self.current_step
    }

    pub fn current_step(&self) -> Option<&RouteStep> {
        self.current_step.and_then(|index| self.route.step(index))
    }

    /// Replace the active route wholesale after a successful reroute.
    /// The step index and arrival bookkeeping restart against the new plan.
    #[tracing::instrument(skip(self, route))]
    pub fn apply_route(&mut self, route: Route) {
        self.route = route;
        self.current_step = None;
        self.near_emitted = false;
        self.exit_emitted = false;
        self.confirmed = false;
        self.throttle.reset();
    }

    /// The user confirmed completion at the destination; leaving the
    /// proximity radius afterwards is no longer worth an alert.
    pub fn confirm_arrival(&mut self) {
        self.confirmed = true;
    }

    /// Process one position sample against the active route. Time is a
    /// parameter so staleness and throttling are deterministic under test.
    #[tracing::instrument(skip(self))]
    pub fn observe(&mut self, sample: &PositionSample, now: DateTime<Utc>) -> Vec<SessionEvent> {
        let mut events = Vec::new();

        let max_age = Duration::milliseconds(self.config.maximum_age_ms as i64);
        if now - sample.timestamp > max_age {
            tracing::debug!("discarding stale position sample");
            return events;
        }

        if let Some(last) = self.last_processed {
            if sample.timestamp <= last {
                tracing::debug!("discarding out-of-order position sample");
                return events;
            }
        }
        self.last_processed = Some(sample.timestamp);

        if self.route.step_count() == 0 {
            return events;
        }

        let position = sample.coordinates;

        // closest step by end coordinate; ties resolve to the lowest index
        let mut closest_index = 0;
        let mut closest_distance = f64::INFINITY;
        for (index, step) in self.route.steps().enumerate() {
            let distance = position.distance_meters(&step.end);
            if distance < closest_distance {
                closest_index = index;
                closest_distance = distance;
            }
        }

        let arrival_distance = position.distance_meters(&self.route.destination);
        if arrival_distance <= self.config.proximity_threshold_m {
            if !self.near_emitted {
                self.near_emitted = true;
                events.push(SessionEvent::NearDestination {
                    distance_meters: arrival_distance,
                });
            }
        } else if self.near_emitted && !self.confirmed && !self.exit_emitted {
            if let Some(task_id) = self.task_id {
                self.exit_emitted = true;
                events.push(SessionEvent::ExitedWithoutConfirmation { task_id });
            }
        }

        // off-route check is against the step the session was last tracking,
        // not the closest one
        if let Some(current) = self.current_step {
            if let Some(step) = self.route.step(current) {
                if position.distance_meters(&step.end) > self.config.deviation_threshold_m {
                    if self.throttle.try_acquire(now) {
                        events.push(SessionEvent::RerouteRequired { position });
                    }
                    return events;
                }
            }
        }

        // reaching a step's end completes that maneuver, so tracking moves
        // to the one after it
        let mut candidate = closest_index;
        if closest_distance <= self.config.step_arrival_threshold_m {
            candidate += 1;
        }
        let last_index = self.route.step_count() - 1;
        let candidate = candidate.min(last_index);

        let started = self.current_step.is_some();
        match self.current_step {
            // never regress the step index backward
            Some(current) if candidate <= current => {}
            _ => {
                self.current_step = Some(candidate);
                if let Some(step) = self.route.step(candidate) {
                    tracing::info!(index = candidate, started, "tracking step");
                    events.push(SessionEvent::StepChanged {
                        index: candidate,
                        step: step.clone(),
                    });
                }
            }
        }

        events
    }
}
