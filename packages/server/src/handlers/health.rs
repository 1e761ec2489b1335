use axum::Json;
use axum::extract::State;

use crate::error::{AppError, ErrorBody};
use crate::models::health::HealthResponse;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    operation_id = "health",
    summary = "Check that the receipt store is reachable",
    responses(
        (status = 200, description = "Store reachable", body = HealthResponse),
        (status = 500, description = "Store unreachable", body = ErrorBody),
    ),
)]
pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, AppError> {
    state.store.ping().await?;
    Ok(Json(HealthResponse { status: "ok" }))
}
