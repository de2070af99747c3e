use axum::extract::{Query, State};
use axum::response::IntoResponse;

use crate::services::checkout::{self, CheckoutRequest};
use crate::services::orders::{self, OrderListQuery, OrderScope};
use crate::state::AppState;
use crate::utils::auth::{AuthParticipant, AuthUser};
use crate::utils::error::AppError;
use crate::utils::json::Json;
use crate::utils::response::{created, ok};

/// POST /api/v1/checkout — reserve tickets and create the order.
pub async fn checkout(
    State(state): State<AppState>,
    participant: AuthParticipant,
    Json(request): Json<CheckoutRequest>,
) -> Result<impl IntoResponse, AppError> {
    let order = checkout::checkout(state.store.as_ref(), participant.id, request).await?;
    Ok(created(order))
}

/// GET /api/v1/orders — the caller's own orders, newest first.
pub async fn my_orders(
    State(state): State<AppState>,
    participant: AuthParticipant,
) -> Result<impl IntoResponse, AppError> {
    let result = orders::orders_for_participant(state.store.as_ref(), participant.id).await?;
    Ok(ok(result))
}

/// GET /api/v1/cms/orders — paged listing, newest first. Owners see every
/// organizer's orders, organizers only their own.
pub async fn cms_list(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<OrderListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let page = orders::list_orders(
        state.store.as_ref(),
        OrderScope {
            organizer_id: user.organizer_id,
            role: user.role,
        },
        query,
    )
    .await?;

    // wire shape: {"data": [...], "pages": n, "total": n}
    Ok(axum::Json(page))
}
