use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::env;

use crate::api::RoutePlanner;
use crate::entities::{Coordinates, Route, RouteLeg, RouteStep, Stop};
use crate::error::{invalid_input_error, upstream_error, Error};

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

impl From<LatLng> for Coordinates {
    fn from(value: LatLng) -> Self {
        Coordinates::new(value.lat, value.lng)
    }
}

#[derive(Clone, Debug, Deserialize)]
struct DirectionsStep {
    start_location: LatLng,
    end_location: LatLng,
    html_instructions: String,
}

#[derive(Clone, Debug, Deserialize)]
struct DirectionsLeg {
    steps: Vec<DirectionsStep>,
}

#[derive(Clone, Debug, Deserialize)]
struct DirectionsRoute {
    legs: Vec<DirectionsLeg>,
    #[serde(default)]
    waypoint_order: Vec<usize>,
}

#[derive(Clone, Debug, Deserialize)]
struct DirectionsResponse {
    status: String,
    routes: Vec<DirectionsRoute>,
}

#[derive(Clone, Debug, Deserialize)]
struct PlaceGeometry {
    location: LatLng,
}

#[derive(Clone, Debug, Deserialize)]
struct NearbyPlace {
    name: String,
    geometry: PlaceGeometry,
    place_id: String,
    vicinity: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
struct NearbyResponse {
    status: String,
    results: Option<Vec<NearbyPlace>>,
}

#[tracing::instrument(skip(waypoints))]
async fn fetch_directions(
    origin: Coordinates,
    destination: Coordinates,
    waypoints: &[Coordinates],
    optimize: bool,
) -> Result<DirectionsRoute, Error> {
    let api_base = env::var("GOOGLE_MAPS_API_BASE")?;
    let url = format!("https://{}/maps/api/directions/json", api_base);
    let key = env::var("GOOGLE_MAPS_API_KEY")?;

    let origin: String = origin.into();
    let destination: String = destination.into();

    let mut request = reqwest::Client::new()
        .get(url)
        .query(&[("key", key)])
        .query(&[("origin", origin)])
        .query(&[("destination", destination)]);

    if !waypoints.is_empty() {
        let stops = waypoints
            .iter()
            .map(|&waypoint| String::from(waypoint))
            .collect::<Vec<String>>()
            .join("|");

        let waypoints = if optimize {
            format!("optimize:true|{}", stops)
        } else {
            stops
        };

        request = request.query(&[("waypoints", waypoints)]);
    }

    let res = request.send().await?;

    let status_code = res.status().as_u16();

    if status_code >= 400 && status_code < 500 {
        return Err(invalid_input_error());
    } else if status_code != 200 {
        return Err(upstream_error());
    }

    let data: DirectionsResponse = res.json().await?;

    if data.status != "OK" {
        return Err(upstream_error());
    }

    data.routes.into_iter().next().ok_or_else(upstream_error)
}

#[tracing::instrument]
pub async fn find_nearby_places(
    keyword: String,
    location: Coordinates,
    radius: f64,
) -> Result<Vec<Stop>, Error> {
    let location: String = location.into();

    let api_base = env::var("GOOGLE_MAPS_API_BASE")?;
    let url = format!("https://{}/maps/api/place/nearbysearch/json", api_base);
    let key = env::var("GOOGLE_MAPS_API_KEY")?;

    let res = reqwest::Client::new()
        .get(url)
        .query(&[("key", key)])
        .query(&[("keyword", keyword)])
        .query(&[("location", location)])
        .query(&[("radius", radius)])
        .send()
        .await?;

    let status_code = res.status().as_u16();

    if status_code >= 400 && status_code < 500 {
        return Err(invalid_input_error());
    } else if status_code != 200 {
        return Err(upstream_error());
    }

    let data: NearbyResponse = res.json().await?;

    if !(data.status == "OK" || data.status == "ZERO_RESULTS") {
        return Err(upstream_error());
    }

    Ok(data
        .results
        .unwrap_or_default()
        .into_iter()
        .map(|place| Stop {
            name: place.name,
            coordinates: place.geometry.location.into(),
            place_id: place.place_id,
            vicinity: place.vicinity,
        })
        .collect())
}

fn strip_html(text: &str) -> String {
    let mut plain = String::with_capacity(text.len());
    let mut in_tag = false;

    for c in text.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => plain.push(c),
            _ => {}
        }
    }

    plain
}

fn route_from_directions(
    origin: Coordinates,
    destination: Coordinates,
    waypoints: Vec<Coordinates>,
    planned: DirectionsRoute,
) -> Route {
    let legs = planned
        .legs
        .into_iter()
        .map(|leg| RouteLeg {
            steps: leg
                .steps
                .into_iter()
                .map(|step| RouteStep {
                    start: step.start_location.into(),
                    end: step.end_location.into(),
                    instruction: strip_html(&step.html_instructions),
                })
                .collect(),
        })
        .collect();

    Route::new(origin, destination, waypoints, legs)
}

fn reorder_stops(
    intermediates: &[Stop],
    destination: &Stop,
    order: &[usize],
) -> Result<Vec<Stop>, Error> {
    if order.len() != intermediates.len() {
        return Err(upstream_error());
    }

    let mut seen = vec![false; intermediates.len()];
    let mut ordered = Vec::with_capacity(intermediates.len() + 1);

    for &index in order {
        let stop = intermediates.get(index).ok_or_else(upstream_error)?;
        if seen[index] {
            return Err(upstream_error());
        }
        seen[index] = true;
        ordered.push(stop.clone());
    }

    ordered.push(destination.clone());
    Ok(ordered)
}

#[derive(Clone, Copy, Debug, Default)]
pub struct GoogleMaps;

impl GoogleMaps {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RoutePlanner for GoogleMaps {
    #[tracing::instrument(skip(self, waypoints))]
    async fn route(
        &self,
        origin: Coordinates,
        destination: Coordinates,
        waypoints: &[Coordinates],
    ) -> Result<Route, Error> {
        let planned = fetch_directions(origin, destination, waypoints, false).await?;

        Ok(route_from_directions(
            origin,
            destination,
            waypoints.to_vec(),
            planned,
        ))
    }

    #[tracing::instrument(skip(self, stops))]
    async fn reoptimize(&self, origin: Coordinates, stops: &[Stop]) -> Result<Vec<Stop>, Error> {
        let (destination, intermediates) = stops.split_last().ok_or_else(invalid_input_error)?;

        if intermediates.is_empty() {
            return Ok(stops.to_vec());
        }

        let coordinates: Vec<Coordinates> =
            intermediates.iter().map(|stop| stop.coordinates).collect();

        let planned =
            fetch_directions(origin, destination.coordinates, &coordinates, true).await?;

        reorder_stops(intermediates, destination, &planned.waypoint_order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stop(name: &str, lat: f64) -> Stop {
        Stop {
            name: name.into(),
            coordinates: Coordinates::new(lat, 0.0),
            place_id: format!("place-{}", name),
            vicinity: None,
        }
    }

    #[test]
    fn strips_markup_from_instructions() {
        assert_eq!(
            strip_html("Turn <b>left</b> onto <div style=\"x\">Main St</div>"),
            "Turn left onto Main St"
        );
        assert_eq!(strip_html("plain"), "plain");
    }

    #[test]
    fn maps_directions_into_a_route() {
        let planned = DirectionsRoute {
            waypoint_order: vec![],
            legs: vec![DirectionsLeg {
                steps: vec![DirectionsStep {
                    start_location: LatLng {
                        lat: 37.4220,
                        lng: -122.0840,
                    },
                    end_location: LatLng {
                        lat: 37.4260,
                        lng: -122.0870,
                    },
                    html_instructions: "Head <b>northwest</b>".into(),
                }],
            }],
        };

        let origin = Coordinates::new(37.4220, -122.0840);
        let destination = Coordinates::new(37.4260, -122.0870);
        let route = route_from_directions(origin, destination, vec![], planned);

        assert_eq!(route.step_count(), 1);
        let step = route.step(0).unwrap();
        assert_eq!(step.instruction, "Head northwest");
        assert_eq!(step.end, destination);
    }

    #[test]
    fn reorders_stops_by_waypoint_order() {
        let a = stop("a", 1.0);
        let b = stop("b", 2.0);
        let c = stop("c", 3.0);

        let ordered = reorder_stops(&[a.clone(), b.clone()], &c, &[1, 0]).unwrap();
        assert_eq!(ordered, vec![b, a, c]);
    }

    #[test]
    fn rejects_malformed_waypoint_orders() {
        let a = stop("a", 1.0);
        let b = stop("b", 2.0);
        let c = stop("c", 3.0);

        // wrong length
        assert!(reorder_stops(&[a.clone(), b.clone()], &c, &[0]).is_err());
        // index out of range
        assert!(reorder_stops(&[a.clone(), b.clone()], &c, &[0, 2]).is_err());
        // duplicate index
        assert!(reorder_stops(&[a, b], &c, &[1, 1]).is_err());
    }
}
