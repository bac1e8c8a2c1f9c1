use chrono::Utc;
use dashmap::DashMap;
use tracing::warn;
use uuid::Uuid;

use crate::error::AppError;
use crate::geo::{Coordinate, haversine_km};
use crate::models::driver::Driver;

pub struct DriverRegistry {
    drivers: DashMap<Uuid, Driver>,
}

impl DriverRegistry {
    pub fn new() -> Self {
        Self {
            drivers: DashMap::new(),
        }
    }

    pub fn register(&self, name: String, car_model: String, car_plate: String) -> Driver {
        let driver = Driver {
            id: Uuid::new_v4(),
            name,
            car_model,
            car_plate,
            location: None,
            available: true,
            updated_at: Utc::now(),
        };

        self.drivers.insert(driver.id, driver.clone());
        driver
    }

    pub fn get(&self, id: Uuid) -> Option<Driver> {
        self.drivers.get(&id).map(|entry| entry.value().clone())
    }

    pub fn list(&self) -> Vec<Driver> {
        self.drivers
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.drivers.len()
    }

    pub fn available_count(&self) -> usize {
        self.drivers
            .iter()
            .filter(|entry| entry.value().available)
            .count()
    }

    pub fn upsert_location(&self, id: Uuid, location: Coordinate) -> Result<Driver, AppError> {
        location.validate()?;

        let mut driver = self
            .drivers
            .get_mut(&id)
            .ok_or(AppError::DriverNotFound(id))?;

        driver.location = Some(location);
        driver.updated_at = Utc::now();

        Ok(driver.clone())
    }

    pub fn set_available(&self, id: Uuid, available: bool) -> Result<Driver, AppError> {
        let mut driver = self
            .drivers
            .get_mut(&id)
            .ok_or(AppError::DriverNotFound(id))?;

        driver.available = available;
        driver.updated_at = Utc::now();

        Ok(driver.clone())
    }

    pub fn find_nearest_available(
        &self,
        pickup: Coordinate,
        exclude: &[Uuid],
    ) -> Option<(Uuid, f64)> {
        self.drivers
            .iter()
            .filter_map(|entry| {
                let driver = entry.value();
                if !driver.available || exclude.contains(&driver.id) {
                    return None;
                }
                let location = driver.location?;
                Some((driver.id, haversine_km(pickup, location)))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)))
    }

    pub fn try_claim(&self, id: Uuid) -> bool {
        match self.drivers.get_mut(&id) {
            Some(mut driver) => {
                if driver.available {
                    driver.available = false;
                    driver.updated_at = Utc::now();
                    true
                } else {
                    false
                }
            }
            None => false,
        }
    }

    pub fn release(&self, id: Uuid) {
        match self.drivers.get_mut(&id) {
            Some(mut driver) => {
                driver.available = true;
                driver.updated_at = Utc::now();
            }
            None => warn!(driver_id = %id, "release requested for unknown driver"),
        }
    }

    #[cfg(test)]
    fn insert(&self, driver: Driver) {
        self.drivers.insert(driver.id, driver);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn driver(id_seed: u128, lat: f64, lng: f64) -> Driver {
        Driver {
            id: Uuid::from_u128(id_seed),
            name: "test-driver".to_string(),
            car_model: "Toyota Camry".to_string(),
            car_plate: "ABC123".to_string(),
            location: Some(Coordinate { lat, lng }),
            available: true,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn nearest_prefers_closer_driver() {
        let registry = DriverRegistry::new();
        registry.insert(driver(1, 40.7128, -74.0060));
        registry.insert(driver(2, 41.0, -75.0));

        let pickup = Coordinate {
            lat: 40.7128,
            lng: -74.0060,
        };

        let (id, distance) = registry.find_nearest_available(pickup, &[]).unwrap();
        assert_eq!(id, Uuid::from_u128(1));
        assert!(distance < 1e-9);
    }

    #[test]
    fn nearest_breaks_ties_by_lower_id() {
        let registry = DriverRegistry::new();
        registry.insert(driver(7, 52.52, 13.405));
        registry.insert(driver(3, 52.52, 13.405));

        let pickup = Coordinate {
            lat: 52.53,
            lng: 13.41,
        };

        let (id, _) = registry.find_nearest_available(pickup, &[]).unwrap();
        assert_eq!(id, Uuid::from_u128(3));
    }

    #[test]
    fn nearest_skips_unavailable_unlocated_and_excluded() {
        let registry = DriverRegistry::new();

        let mut busy = driver(1, 52.52, 13.405);
        busy.available = false;
        registry.insert(busy);

        let mut unlocated = driver(2, 0.0, 0.0);
        unlocated.location = None;
        registry.insert(unlocated);

        registry.insert(driver(3, 52.52, 13.405));
        registry.insert(driver(4, 52.60, 13.50));

        let pickup = Coordinate {
            lat: 52.52,
            lng: 13.405,
        };

        let (id, _) = registry
            .find_nearest_available(pickup, &[Uuid::from_u128(3)])
            .unwrap();
        assert_eq!(id, Uuid::from_u128(4));
    }

    #[test]
    fn nearest_is_none_when_pool_is_empty() {
        let registry = DriverRegistry::new();

        let mut unlocated = driver(1, 0.0, 0.0);
        unlocated.location = None;
        registry.insert(unlocated);

        let pickup = Coordinate { lat: 0.0, lng: 0.0 };
        assert!(registry.find_nearest_available(pickup, &[]).is_none());
    }

    #[test]
    fn claim_succeeds_once_until_released() {
        let registry = DriverRegistry::new();
        let id = Uuid::from_u128(1);
        registry.insert(driver(1, 52.52, 13.405));

        assert!(registry.try_claim(id));
        assert!(!registry.try_claim(id));

        registry.release(id);
        assert!(registry.try_claim(id));
    }

    #[test]
    fn claim_of_unknown_driver_fails() {
        let registry = DriverRegistry::new();
        assert!(!registry.try_claim(Uuid::from_u128(99)));
    }

    #[test]
    fn concurrent_claims_admit_exactly_one_winner() {
        let registry = DriverRegistry::new();
        let id = Uuid::from_u128(1);
        registry.insert(driver(1, 52.52, 13.405));

        let mut wins = 0;
        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| registry.try_claim(id)))
                .collect();
            wins = handles
                .into_iter()
                .map(|handle| handle.join().unwrap())
                .filter(|won| *won)
                .count();
        });

        assert_eq!(wins, 1);
    }

    #[test]
    fn set_available_is_idempotent() {
        let registry = DriverRegistry::new();
        let id = Uuid::from_u128(1);
        registry.insert(driver(1, 52.52, 13.405));

        assert!(!registry.set_available(id, false).unwrap().available);
        assert!(!registry.set_available(id, false).unwrap().available);
        assert!(registry.set_available(id, true).unwrap().available);
    }

    #[test]
    fn set_available_for_unknown_driver_is_not_found() {
        let registry = DriverRegistry::new();
        let err = registry.set_available(Uuid::from_u128(1), true).unwrap_err();
        assert!(matches!(err, AppError::DriverNotFound(_)));
    }

    #[test]
    fn upsert_location_rejects_out_of_range() {
        let registry = DriverRegistry::new();
        let registered = registry.register(
            "Dana".to_string(),
            "VW Golf".to_string(),
            "B-XY 1234".to_string(),
        );

        let err = registry
            .upsert_location(registered.id, Coordinate { lat: 91.0, lng: 0.0 })
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidCoordinate { .. }));

        let updated = registry
            .upsert_location(
                registered.id,
                Coordinate {
                    lat: 52.52,
                    lng: 13.405,
                },
            )
            .unwrap();
        assert_eq!(
            updated.location,
            Some(Coordinate {
                lat: 52.52,
                lng: 13.405,
            })
        );
    }
}
