use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, patch, post};
use axum::Json;
use axum::Router;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::geo::Coordinate;
use crate::models::driver::Driver;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/drivers", post(register_driver).get(list_drivers))
        .route("/drivers/:id", get(get_driver))
        .route("/drivers/:id/location", patch(update_driver_location))
        .route(
            "/drivers/:id/availability",
            patch(update_driver_availability),
        )
}

#[derive(Deserialize)]
pub struct RegisterDriverRequest {
    pub name: String,
    pub car_model: String,
    pub car_plate: String,
}

#[derive(Deserialize)]
pub struct UpdateLocationRequest {
    pub location: Coordinate,
}

#[derive(Deserialize)]
pub struct UpdateAvailabilityRequest {
    pub available: bool,
}

async fn register_driver(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterDriverRequest>,
) -> Result<Json<Driver>, AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::BadRequest("name cannot be empty".to_string()));
    }

    if payload.car_model.trim().is_empty() {
        return Err(AppError::BadRequest(
            "car_model cannot be empty".to_string(),
        ));
    }

    if payload.car_plate.trim().is_empty() {
        return Err(AppError::BadRequest(
            "car_plate cannot be empty".to_string(),
        ));
    }

    let driver = state
        .drivers
        .register(payload.name, payload.car_model, payload.car_plate);
    state
        .metrics
        .drivers_available
        .set(state.drivers.available_count() as i64);

    Ok(Json(driver))
}

async fn list_drivers(State(state): State<Arc<AppState>>) -> Json<Vec<Driver>> {
    Json(state.drivers.list())
}

async fn get_driver(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Driver>, AppError> {
    let driver = state.drivers.get(id).ok_or(AppError::DriverNotFound(id))?;
    Ok(Json(driver))
}

async fn update_driver_location(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateLocationRequest>,
) -> Result<Json<Driver>, AppError> {
    let driver = state.drivers.upsert_location(id, payload.location)?;
    Ok(Json(driver))
}

async fn update_driver_availability(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAvailabilityRequest>,
) -> Result<Json<Driver>, AppError> {
    let driver = state.drivers.set_available(id, payload.available)?;
    state
        .metrics
        .drivers_available
        .set(state.drivers.available_count() as i64);

    Ok(Json(driver))
}
