use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::{get, patch, post};
use axum::Json;
use axum::Router;
use serde::Deserialize;
use uuid::Uuid;

use crate::engine::lifecycle::transition_ride;
use crate::engine::matching::create_and_match;
use crate::error::AppError;
use crate::geo::Coordinate;
use crate::models::ride::{Ride, RideStatus, Role};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/rides", post(request_ride).get(list_rides))
        .route("/rides/:id", get(get_ride))
        .route("/rides/:id/status", patch(update_ride_status))
}

#[derive(Deserialize)]
pub struct RequestRideRequest {
    pub passenger_id: Uuid,
    pub pickup: Coordinate,
    pub dropoff: Coordinate,
}

#[derive(Deserialize)]
pub struct RideFilter {
    pub passenger_id: Option<Uuid>,
    pub driver_id: Option<Uuid>,
}

#[derive(Deserialize)]
pub struct UpdateRideStatusRequest {
    pub actor_id: Uuid,
    pub role: Role,
    pub status: RideStatus,
}

async fn request_ride(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RequestRideRequest>,
) -> Result<Json<Ride>, AppError> {
    let ride = create_and_match(
        &state,
        payload.passenger_id,
        payload.pickup,
        payload.dropoff,
    )
    .await?;

    Ok(Json(ride))
}

async fn get_ride(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Ride>, AppError> {
    let ride = state.rides.get(&id).ok_or(AppError::RideNotFound(id))?;

    Ok(Json(ride.value().clone()))
}

async fn list_rides(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<RideFilter>,
) -> Json<Vec<Ride>> {
    let rides = state
        .rides
        .iter()
        .filter(|entry| {
            let ride = entry.value();
            filter
                .passenger_id
                .map_or(true, |id| ride.passenger_id == id)
                && filter.driver_id.map_or(true, |id| ride.driver_id == Some(id))
        })
        .map(|entry| entry.value().clone())
        .collect();

    Json(rides)
}

async fn update_ride_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRideStatusRequest>,
) -> Result<Json<Ride>, AppError> {
    let ride = transition_ride(&state, id, payload.actor_id, payload.role, payload.status)?;

    Ok(Json(ride))
}
