use serde::{Deserialize, Serialize};

const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude.abs() <= 90.0
            && self.longitude.abs() <= 180.0
    }

    /// Great-circle distance to `other` in meters, by the haversine formula.
    pub fn distance_meters(&self, other: &Coordinates) -> f64 {
        let lat_a = self.latitude.to_radians();
        let lat_b = other.latitude.to_radians();
        let d_lat = (other.latitude - self.latitude).to_radians();
        let d_lng = (other.longitude - self.longitude).to_radians();

        let sin_lat = (d_lat * 0.5).sin();
        let sin_lng = (d_lng * 0.5).sin();
        let h = sin_lat * sin_lat + lat_a.cos() * lat_b.cos() * sin_lng * sin_lng;

        2.0 * EARTH_RADIUS_METERS * h.sqrt().atan2((1.0 - h).sqrt())
    }
}

// "lat,lng" form used as a query parameter by the maps provider
impl From<Coordinates> for String {
    fn from(coordinates: Coordinates) -> Self {
        format!("{},{}", coordinates.latitude, coordinates.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_zero_for_equal_points() {
        let a = Coordinates::new(37.4220, -122.0840);
        assert_eq!(a.distance_meters(&a), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = Coordinates::new(37.4220, -122.0840);
        let b = Coordinates::new(37.4300, -122.0900);
        assert_eq!(a.distance_meters(&b), b.distance_meters(&a));
    }

    #[test]
    fn one_degree_of_longitude_at_the_equator() {
        let a = Coordinates::new(0.0, 0.0);
        let b = Coordinates::new(0.0, 1.0);

        // R * 1 degree in radians
        let expected = EARTH_RADIUS_METERS * 1.0_f64.to_radians();
        assert!((a.distance_meters(&b) - expected).abs() < 1.0);
    }

    #[test]
    fn short_hop_is_about_a_kilometer() {
        let a = Coordinates::new(37.4220, -122.0840);
        let b = Coordinates::new(37.4300, -122.0900);

        let d = a.distance_meters(&b);
        assert!(d > 1_000.0 && d < 1_100.0, "unexpected distance {}", d);
    }

    #[test]
    fn validates_ranges() {
        assert!(Coordinates::new(37.4220, -122.0840).is_valid());
        assert!(!Coordinates::new(91.0, 0.0).is_valid());
        assert!(!Coordinates::new(0.0, -181.0).is_valid());
        assert!(!Coordinates::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn formats_as_query_parameter() {
        let formatted: String = Coordinates::new(37.4220, -122.0840).into();
        assert_eq!(formatted, "37.422,-122.084");
    }
}
