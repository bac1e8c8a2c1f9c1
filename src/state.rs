use dashmap::DashMap;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::events::EventSink;
use crate::models::ride::Ride;
use crate::observability::metrics::Metrics;
use crate::registry::DriverRegistry;

pub struct AppState {
    pub rides: DashMap<Uuid, Ride>,
    pub active_rides: DashMap<Uuid, Uuid>,
    pub drivers: DriverRegistry,
    pub pending_tx: mpsc::Sender<Uuid>,
    pub events: EventSink,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(match_queue_size: usize, event_buffer_size: usize) -> (Self, mpsc::Receiver<Uuid>) {
        let (pending_tx, pending_rx) = mpsc::channel(match_queue_size);

        (
            Self {
                rides: DashMap::new(),
                active_rides: DashMap::new(),
                drivers: DriverRegistry::new(),
                pending_tx,
                events: EventSink::new(event_buffer_size),
                metrics: Metrics::new(),
            },
            pending_rx,
        )
    }
}
