use crate::geo::{Coordinate, haversine_km};

pub const BASE_FARE: f64 = 5.0;

pub const PER_KM_RATE: f64 = 1.5;

pub fn fare_for(pickup: Coordinate, dropoff: Coordinate) -> f64 {
    let distance_km = haversine_km(pickup, dropoff);
    round_cents(BASE_FARE + distance_km * PER_KM_RATE)
}

fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
