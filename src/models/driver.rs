use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geo::Coordinate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Driver {
    pub id: Uuid,
    pub name: String,
    pub car_model: String,
    pub car_plate: String,
    pub location: Option<Coordinate>,
    pub available: bool,
    pub updated_at: DateTime<Utc>,
}
