use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::models::ride::Ride;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    RideAssigned,
    NoDriverAvailable,
    RideAccepted,
    RideStarted,
    RideCompleted,
    RideCancelled,
}

#[derive(Debug, Clone, Serialize)]
pub struct RideEvent {
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub ride_id: Uuid,
    pub driver_id: Option<Uuid>,
    #[serde(rename = "payload")]
    pub ride: Ride,
}

impl RideEvent {
    pub fn new(kind: EventKind, ride: &Ride) -> Self {
        Self {
            kind,
            ride_id: ride.id,
            driver_id: ride.driver_id,
            ride: ride.clone(),
        }
    }
}

#[derive(Clone)]
pub struct EventSink {
    tx: broadcast::Sender<RideEvent>,
}

impl EventSink {
    pub fn new(buffer: usize) -> Self {
        let (tx, _unused_rx) = broadcast::channel(buffer);
        Self { tx }
    }

    pub fn emit(&self, event: RideEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RideEvent> {
        self.tx.subscribe()
    }
}
