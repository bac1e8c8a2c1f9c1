use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

pub async fn enqueue_pending(state: &AppState, ride_id: Uuid) -> Result<(), AppError> {
    state
        .pending_tx
        .send(ride_id)
        .await
        .map_err(|err| AppError::Internal(format!("match queue send failed: {err}")))?;

    state.metrics.rides_pending.inc();
    Ok(())
}
