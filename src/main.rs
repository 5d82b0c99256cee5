use std::sync::Arc;
use std::time::Duration;

use viator::api::{DynLocationSource, DynRoutePlanner, NavigationAPI};
use viator::config::NavigationConfig;
use viator::engine::Engine;
use viator::entities::Coordinates;
use viator::external::google_maps::GoogleMaps;
use viator::simulation::{LogAnnouncer, LogPresenter, SimulatedLocationSource};

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    let origin = Coordinates::new(37.4220, -122.0840);
    let destination = Coordinates::new(37.4300, -122.0900);
    let waypoints = vec![Coordinates::new(37.4260, -122.0870)];

    let planner: DynRoutePlanner = Arc::new(GoogleMaps::new());

    // plan once up front so the simulated device can follow the route
    let route = planner.route(origin, destination, &waypoints).await.unwrap();

    let source: DynLocationSource = Arc::new(SimulatedLocationSource::along_route(
        &route,
        Duration::from_secs(2),
        10.0,
    ));

    let engine = Engine::new(
        planner,
        source,
        Arc::new(LogAnnouncer),
        Arc::new(LogPresenter),
        NavigationConfig::default(),
    )
    .await;

    engine
        .start_navigation(origin, destination, waypoints, None)
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_secs(60)).await;

    engine.end_navigation().await.unwrap();
}
