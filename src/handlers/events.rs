use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use serde::Deserialize;
use uuid::Uuid;

use crate::models::EventDraft;
use crate::services::events;
use crate::services::events::EventListQuery;
use crate::state::AppState;
use crate::utils::auth::AuthUser;
use crate::utils::error::AppError;
use crate::utils::json::Json;
use crate::utils::response::{created, ok};

// participant-facing

pub async fn list_published(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let result = events::published_events(state.store.as_ref()).await?;
    Ok(ok(result))
}

pub async fn get_published(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let result = events::published_event(state.store.as_ref(), id).await?;
    Ok(ok(result))
}

// organizer CMS

pub async fn cms_list(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<EventListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let result = events::list_events(state.store.as_ref(), user.organizer_id, query).await?;
    Ok(ok(result))
}

pub async fn cms_create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(draft): Json<EventDraft>,
) -> Result<impl IntoResponse, AppError> {
    let result = events::create_event(state.store.as_ref(), user.organizer_id, draft).await?;
    Ok(created(result))
}

pub async fn cms_get(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let result = events::get_event(state.store.as_ref(), user.organizer_id, id).await?;
    Ok(ok(result))
}

pub async fn cms_update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(draft): Json<EventDraft>,
) -> Result<impl IntoResponse, AppError> {
    let result = events::update_event(state.store.as_ref(), user.organizer_id, id, draft).await?;
    Ok(ok(result))
}

pub async fn cms_delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let result = events::delete_event(state.store.as_ref(), user.organizer_id, id).await?;
    Ok(ok(result))
}

#[derive(Deserialize)]
pub struct StatusBody {
    pub status: String,
}

pub async fn cms_change_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<StatusBody>,
) -> Result<impl IntoResponse, AppError> {
    let result =
        events::change_event_status(state.store.as_ref(), user.organizer_id, id, &body.status)
            .await?;
    Ok(ok(result))
}
