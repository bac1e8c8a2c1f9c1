use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use dashmap::mapref::entry::Entry;
use tokio::sync::mpsc;
use tokio::time::{sleep, Duration};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::engine::lifecycle;
use crate::engine::queue::enqueue_pending;
use crate::error::AppError;
use crate::events::{EventKind, RideEvent};
use crate::geo::Coordinate;
use crate::models::ride::{Ride, RideStatus};
use crate::state::AppState;

pub const REMATCH_DELAY: Duration = Duration::from_millis(250);

pub enum MatchOutcome {
    Assigned(Ride),
    NoDriver,
    NoLongerPending,
}

pub async fn create_and_match(
    state: &AppState,
    passenger_id: Uuid,
    pickup: Coordinate,
    dropoff: Coordinate,
) -> Result<Ride, AppError> {
    lifecycle::validate_geometry(pickup, dropoff)?;

    let ride = Ride {
        id: Uuid::new_v4(),
        passenger_id,
        driver_id: None,
        pickup,
        dropoff,
        status: RideStatus::Requested,
        fare: None,
        created_at: Utc::now(),
        completed_at: None,
    };

    match state.active_rides.entry(passenger_id) {
        Entry::Occupied(_) => return Err(AppError::ActiveRideExists(passenger_id)),
        Entry::Vacant(slot) => {
            slot.insert(ride.id);
        }
    }

    state.rides.insert(ride.id, ride.clone());
    info!(ride_id = %ride.id, passenger_id = %passenger_id, "ride requested");

    let start = Instant::now();
    match match_ride(state, &ride) {
        MatchOutcome::Assigned(updated) => {
            observe_match(state, "assigned", start);
            state
                .metrics
                .drivers_available
                .set(state.drivers.available_count() as i64);
            Ok(updated)
        }
        MatchOutcome::NoDriver => {
            observe_match(state, "no_driver", start);
            state
                .events
                .emit(RideEvent::new(EventKind::NoDriverAvailable, &ride));
            warn!(ride_id = %ride.id, "no driver available; parking ride for rematch");
            enqueue_pending(state, ride.id).await?;
            Ok(ride)
        }
        MatchOutcome::NoLongerPending => {
            state
                .rides
                .get(&ride.id)
                .map(|entry| entry.value().clone())
                .ok_or(AppError::RideNotFound(ride.id))
        }
    }
}

pub fn match_ride(state: &AppState, ride: &Ride) -> MatchOutcome {
    let mut skipped: Vec<Uuid> = Vec::new();

    loop {
        let Some((driver_id, distance_km)) =
            state.drivers.find_nearest_available(ride.pickup, &skipped)
        else {
            return MatchOutcome::NoDriver;
        };

        if !state.drivers.try_claim(driver_id) {
            skipped.push(driver_id);
            continue;
        }

        return match bind_driver(state, ride.id, driver_id) {
            BindResult::Bound(updated) => {
                state
                    .events
                    .emit(RideEvent::new(EventKind::RideAssigned, &updated));
                info!(
                    ride_id = %updated.id,
                    driver_id = %driver_id,
                    distance_km,
                    "ride assigned"
                );
                MatchOutcome::Assigned(updated)
            }
            BindResult::Stale => {
                state.drivers.release(driver_id);
                MatchOutcome::NoLongerPending
            }
        };
    }
}

enum BindResult {
    Bound(Ride),
    Stale,
}

fn bind_driver(state: &AppState, ride_id: Uuid, driver_id: Uuid) -> BindResult {
    let Some(mut entry) = state.rides.get_mut(&ride_id) else {
        return BindResult::Stale;
    };
    let ride = entry.value_mut();

    if ride.status != RideStatus::Requested {
        return BindResult::Stale;
    }

    ride.driver_id = Some(driver_id);
    ride.status = RideStatus::Assigned;
    BindResult::Bound(ride.clone())
}

pub async fn run_match_worker(state: Arc<AppState>, mut pending_rx: mpsc::Receiver<Uuid>) {
    info!("match worker started");

    while let Some(ride_id) = pending_rx.recv().await {
        state.metrics.rides_pending.dec();

        let Some(ride) = state.rides.get(&ride_id).map(|entry| entry.value().clone()) else {
            warn!(ride_id = %ride_id, "pending ride vanished; dropping");
            continue;
        };
        if ride.status != RideStatus::Requested {
            continue;
        }

        let start = Instant::now();
        match match_ride(&state, &ride) {
            MatchOutcome::Assigned(_) => {
                observe_match(&state, "assigned", start);
                state
                    .metrics
                    .drivers_available
                    .set(state.drivers.available_count() as i64);
            }
            MatchOutcome::NoDriver => {
                observe_match(&state, "no_driver", start);
                sleep(REMATCH_DELAY).await;
                if let Err(err) = enqueue_pending(&state, ride_id).await {
                    error!(error = %err, ride_id = %ride_id, "failed to re-queue pending ride");
                }
            }
            MatchOutcome::NoLongerPending => {}
        }
    }

    warn!("match worker stopped: queue channel closed");
}

fn observe_match(state: &AppState, outcome: &str, start: Instant) {
    let elapsed = start.elapsed().as_secs_f64();
    state
        .metrics
        .match_latency_seconds
        .with_label_values(&[outcome])
        .observe(elapsed);
    state
        .metrics
        .matches_total
        .with_label_values(&[outcome])
        .inc();
}
