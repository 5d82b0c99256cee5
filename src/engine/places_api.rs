use super::Engine;

use async_trait::async_trait;

use crate::api::PlacesAPI;
use crate::entities::{Coordinates, Stop};
use crate::error::{invalid_input_error, Error};
use crate::external::google_maps;

#[async_trait]
impl PlacesAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn find_nearby_places(
        &self,
        keyword: String,
        location: Coordinates,
        radius: Option<f64>,
    ) -> Result<Vec<Stop>, Error> {
        if keyword.trim().is_empty() || !location.is_valid() {
            return Err(invalid_input_error());
        }

        let radius = radius.unwrap_or(self.config.search_radius_m);

        google_maps::find_nearby_places(keyword, location, radius).await
    }
}
