use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::models::ride::{RideStatus, Role};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("coordinate out of range: lat {lat}, lng {lng}")]
    InvalidCoordinate { lat: f64, lng: f64 },

    #[error("invalid ride geometry: {0}")]
    InvalidRideGeometry(String),

    #[error("passenger {0} already has an ongoing ride")]
    ActiveRideExists(Uuid),

    #[error("illegal transition: {role} may not move ride from {from} to {to}")]
    IllegalTransition {
        from: RideStatus,
        to: RideStatus,
        role: Role,
    },

    #[error("not authorized: {0}")]
    NotAuthorized(String),

    #[error("ride {0} not found")]
    RideNotFound(Uuid),

    #[error("driver {0} not found")]
    DriverNotFound(Uuid),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::InvalidCoordinate { .. }
            | AppError::InvalidRideGeometry(_)
            | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::ActiveRideExists(_) | AppError::IllegalTransition { .. } => {
                StatusCode::CONFLICT
            }
            AppError::NotAuthorized(_) => StatusCode::FORBIDDEN,
            AppError::RideNotFound(_) | AppError::DriverNotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}
