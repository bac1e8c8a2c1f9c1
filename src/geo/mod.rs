use serde::{Deserialize, Serialize};

use crate::error::AppError;

const EARTH_RADIUS_KM: f64 = 6_371.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn validate(&self) -> Result<(), AppError> {
        let lat_ok = self.lat.is_finite() && (-90.0..=90.0).contains(&self.lat);
        let lng_ok = self.lng.is_finite() && (-180.0..=180.0).contains(&self.lng);

        if lat_ok && lng_ok {
            Ok(())
        } else {
            Err(AppError::InvalidCoordinate {
                lat: self.lat,
                lng: self.lng,
            })
        }
    }
}

pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lng = (b.lng - a.lng).to_radians();

    let sin_lat = (delta_lat / 2.0).sin();
    let sin_lng = (delta_lng / 2.0).sin();

    let haversine = sin_lat * sin_lat + lat1.cos() * lat2.cos() * sin_lng * sin_lng;
    let central_angle = 2.0 * haversine.sqrt().asin();

    EARTH_RADIUS_KM * central_angle
}

#[cfg(test)]
mod tests {
    use super::{Coordinate, haversine_km};

    #[test]
    fn zero_distance_for_same_point() {
        let p = Coordinate {
            lat: 40.7128,
            lng: -74.0060,
        };
        let distance = haversine_km(p, p);
        assert!(distance < 1e-9);
    }

    #[test]
    fn london_to_paris_is_around_343_km() {
        let london = Coordinate {
            lat: 51.5074,
            lng: -0.1278,
        };
        let paris = Coordinate {
            lat: 48.8566,
            lng: 2.3522,
        };
        let distance = haversine_km(london, paris);
        assert!((distance - 343.0).abs() < 5.0);
    }

    #[test]
    fn lower_manhattan_to_midtown_is_around_5_km() {
        let downtown = Coordinate {
            lat: 40.7128,
            lng: -74.0060,
        };
        let midtown = Coordinate {
            lat: 40.7580,
            lng: -73.9855,
        };
        let distance = haversine_km(downtown, midtown);
        assert!((distance - 5.31).abs() < 0.1);
    }

    #[test]
    fn poles_and_antimeridian_are_valid() {
        for (lat, lng) in [(90.0, 0.0), (-90.0, 0.0), (0.0, 180.0), (0.0, -180.0)] {
            assert!(Coordinate { lat, lng }.validate().is_ok());
        }
    }

    #[test]
    fn out_of_range_coordinates_are_rejected() {
        for (lat, lng) in [
            (90.01, 0.0),
            (-90.01, 0.0),
            (0.0, 180.01),
            (0.0, -180.01),
            (f64::NAN, 0.0),
            (0.0, f64::INFINITY),
        ] {
            assert!(Coordinate { lat, lng }.validate().is_err());
        }
    }
}
