use serde::{Deserialize, Serialize};

use crate::entities::Coordinates;

/// A named place, either a remaining stop of a multi-stop trip or a
/// nearby-search result from the places provider.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub name: String,
    pub coordinates: Coordinates,
    pub place_id: String,
    pub vicinity: Option<String>,
}
