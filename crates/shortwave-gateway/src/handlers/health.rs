use axum::extract::State;
use axum::Json;

use crate::error::Result;
use crate::model::HealthResponse;
use crate::state::AppState;

/// Probes the storage backend; a real round-trip for the database.
pub async fn ping_handler(State(state): State<AppState>) -> Result<Json<HealthResponse>> {
    state.store.ping().await?;
    Ok(Json(HealthResponse { status: "ok" }))
}
