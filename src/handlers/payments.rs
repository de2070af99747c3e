use axum::extract::{Path, State};
use axum::response::IntoResponse;
use uuid::Uuid;

use crate::state::AppState;
use crate::utils::auth::AuthParticipant;
use crate::utils::error::AppError;
use crate::utils::response::ok;

/// GET /api/v1/payments/:organizerId — payment methods an organizer accepts.
pub async fn list_by_organizer(
    State(state): State<AppState>,
    _participant: AuthParticipant,
    Path(organizer_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let result = state.store.list_payment_methods(organizer_id).await?;
    Ok(ok(result))
}
