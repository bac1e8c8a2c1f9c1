use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::engine::fare;
use crate::error::AppError;
use crate::events::{EventKind, RideEvent};
use crate::geo::{Coordinate, haversine_km};
use crate::models::ride::{Ride, RideStatus, Role};
use crate::state::AppState;

pub const MIN_RIDE_KM: f64 = 0.1;
pub const MAX_RIDE_KM: f64 = 500.0;

pub fn allowed(from: RideStatus, role: Role, to: RideStatus) -> bool {
    use RideStatus::*;

    match (role, from, to) {
        (Role::Passenger, Requested | Assigned | Accepted, Cancelled) => true,
        (Role::Driver, Assigned, Accepted | Cancelled) => true,
        (Role::Driver, Accepted, InProgress | Cancelled) => true,
        (Role::Driver, InProgress, Completed | Cancelled) => true,
        _ => false,
    }
}

pub fn validate_geometry(pickup: Coordinate, dropoff: Coordinate) -> Result<f64, AppError> {
    pickup.validate()?;
    dropoff.validate()?;

    if pickup == dropoff {
        return Err(AppError::InvalidRideGeometry(
            "pickup and dropoff are the same point".to_string(),
        ));
    }

    let distance_km = haversine_km(pickup, dropoff);
    if !(MIN_RIDE_KM..=MAX_RIDE_KM).contains(&distance_km) {
        return Err(AppError::InvalidRideGeometry(format!(
            "trip of {distance_km:.2} km is outside the allowed {MIN_RIDE_KM}-{MAX_RIDE_KM} km range"
        )));
    }

    Ok(distance_km)
}

pub fn transition_ride(
    state: &AppState,
    ride_id: Uuid,
    actor_id: Uuid,
    role: Role,
    target: RideStatus,
) -> Result<Ride, AppError> {
    let mut released_driver = None;

    let (updated, from, kind) = {
        let mut entry = state
            .rides
            .get_mut(&ride_id)
            .ok_or(AppError::RideNotFound(ride_id))?;
        let ride = entry.value_mut();

        authorize(ride, actor_id, role)?;

        if !allowed(ride.status, role, target) {
            return Err(AppError::IllegalTransition {
                from: ride.status,
                to: target,
                role,
            });
        }

        let kind = match target {
            RideStatus::Accepted => EventKind::RideAccepted,
            RideStatus::InProgress => EventKind::RideStarted,
            RideStatus::Completed => EventKind::RideCompleted,
            RideStatus::Cancelled => EventKind::RideCancelled,
            RideStatus::Requested | RideStatus::Assigned => {
                return Err(AppError::IllegalTransition {
                    from: ride.status,
                    to: target,
                    role,
                });
            }
        };

        let from = ride.status;
        match target {
            RideStatus::Completed => {
                ride.fare = Some(fare::fare_for(ride.pickup, ride.dropoff));
                ride.completed_at = Some(Utc::now());
                released_driver = ride.driver_id;
            }
            RideStatus::Cancelled => {
                released_driver = ride.driver_id;
            }
            _ => {}
        }
        ride.status = target;

        (ride.clone(), from, kind)
    };

    if let Some(driver_id) = released_driver {
        state.drivers.release(driver_id);
        state
            .metrics
            .drivers_available
            .set(state.drivers.available_count() as i64);
    }

    if target.is_terminal() {
        state
            .active_rides
            .remove_if(&updated.passenger_id, |_, active| *active == ride_id);
    }

    state.events.emit(RideEvent::new(kind, &updated));
    state
        .metrics
        .ride_transitions_total
        .with_label_values(&[target.as_str()])
        .inc();

    info!(
        ride_id = %updated.id,
        from = %from,
        to = %target,
        role = %role,
        "ride transition applied"
    );

    Ok(updated)
}

fn authorize(ride: &Ride, actor_id: Uuid, role: Role) -> Result<(), AppError> {
    let bound = match role {
        Role::Passenger => Some(ride.passenger_id),
        Role::Driver => ride.driver_id,
    };

    if bound == Some(actor_id) {
        Ok(())
    } else {
        Err(AppError::NotAuthorized(format!(
            "{role} {actor_id} is not bound to ride {}",
            ride.id
        )))
    }
}
