mod navigation_api;
mod places_api;

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::api::{
    DynAnnouncer, DynLocationSource, DynPresenter, DynRoutePlanner, PositionStream, API,
};
use crate::config::NavigationConfig;
use crate::entities::{NavigationSession, Notification};
use crate::events::{EventBus, EventKind};

pub(crate) struct PumpHandle {
    pub(crate) stream: PositionStream,
    #[allow(dead_code)]
    pub(crate) task: JoinHandle<()>,
}

pub struct Engine {
    planner: DynRoutePlanner,
    locations: DynLocationSource,
    announcer: DynAnnouncer,
    config: NavigationConfig,
    bus: Arc<EventBus>,
    session: Arc<Mutex<Option<NavigationSession>>>,
    pump: Mutex<Option<PumpHandle>>,
}

impl Engine {
    #[tracing::instrument(name = "Engine::new", skip_all)]
    pub async fn new(
        planner: DynRoutePlanner,
        locations: DynLocationSource,
        announcer: DynAnnouncer,
        presenter: DynPresenter,
        config: NavigationConfig,
    ) -> Self {
        let bus = Arc::new(EventBus::new());

        // bridge proximity events to the presenter
        for kind in [
            EventKind::NearDestination,
            EventKind::ExitedWithoutConfirmation,
        ] {
            let rx = bus.subscribe(kind);
            let presenter = presenter.clone();

            tokio::spawn(async move {
                while let Ok(event) = rx.recv().await {
                    let notification = Notification::from(&event);

                    if let Err(err) = presenter.present(notification).await {
                        tracing::warn!(code = err.code, "failed to present notification");
                    }
                }
            });
        }

        Self {
            planner,
            locations,
            announcer,
            config,
            bus,
            session: Arc::new(Mutex::new(None)),
            pump: Mutex::new(None),
        }
    }

    /// Bus handle for host-side listeners (UI badges, haptics, tests).
    pub fn events(&self) -> Arc<EventBus> {
        self.bus.clone()
    }

    /// Snapshot of the active session, if navigation is running.
    pub async fn current_session(&self) -> Option<NavigationSession> {
        self.session.lock().await.clone()
    }
}

impl API for Engine {}
