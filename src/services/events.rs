//! Organizer event management and the participant-facing catalog views.

use std::collections::HashSet;

use serde::Deserialize;
use uuid::Uuid;

use crate::models::{Event, EventDraft, EventStatus};
use crate::store::{EventFilter, Store};
use crate::utils::error::AppError;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventListQuery {
    pub keyword: Option<String>,
    pub status: Option<String>,
}

fn validate_draft(draft: &EventDraft) -> Result<(), AppError> {
    if draft.title.trim().is_empty() {
        return Err(AppError::ValidationError("title is required".to_string()));
    }
    if draft.venue_name.trim().is_empty() {
        return Err(AppError::ValidationError("venueName is required".to_string()));
    }

    let mut labels = HashSet::new();
    for ticket in &draft.tickets {
        if ticket.kind.trim().is_empty() {
            return Err(AppError::ValidationError(
                "ticket category type is required".to_string(),
            ));
        }
        if !labels.insert(ticket.kind.as_str()) {
            return Err(AppError::ValidationError(format!(
                "duplicate ticket category label '{}'",
                ticket.kind
            )));
        }
        if ticket.price.is_sign_negative() {
            return Err(AppError::ValidationError(format!(
                "ticket category '{}' has a negative price",
                ticket.kind
            )));
        }
        if ticket.stock < 0 {
            return Err(AppError::ValidationError(format!(
                "ticket category '{}' has a negative stock",
                ticket.kind
            )));
        }
    }

    Ok(())
}

pub async fn create_event(
    store: &dyn Store,
    organizer_id: Uuid,
    draft: EventDraft,
) -> Result<Event, AppError> {
    validate_draft(&draft)?;

    if store
        .find_event_by_title(organizer_id, &draft.title, None)
        .await?
        .is_some()
    {
        return Err(AppError::ValidationError("duplicate event title".to_string()));
    }

    store.insert_event(organizer_id, draft).await
}

pub async fn list_events(
    store: &dyn Store,
    organizer_id: Uuid,
    query: EventListQuery,
) -> Result<Vec<Event>, AppError> {
    // an unrecognized status string simply applies no status filter
    let status = query.status.as_deref().and_then(|s| s.parse().ok());

    store
        .list_events(&EventFilter {
            organizer_id: Some(organizer_id),
            status,
            keyword: query.keyword,
        })
        .await
}

pub async fn get_event(store: &dyn Store, organizer_id: Uuid, id: Uuid) -> Result<Event, AppError> {
    store
        .find_event(id)
        .await?
        .filter(|event| event.organizer_id == organizer_id)
        .ok_or_else(|| AppError::NotFound(format!("no event with id {}", id)))
}

pub async fn update_event(
    store: &dyn Store,
    organizer_id: Uuid,
    id: Uuid,
    draft: EventDraft,
) -> Result<Event, AppError> {
    validate_draft(&draft)?;

    if store
        .find_event_by_title(organizer_id, &draft.title, Some(id))
        .await?
        .is_some()
    {
        return Err(AppError::ValidationError("duplicate event title".to_string()));
    }

    store
        .update_event(id, organizer_id, draft)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("no event with id {}", id)))
}

pub async fn delete_event(
    store: &dyn Store,
    organizer_id: Uuid,
    id: Uuid,
) -> Result<Event, AppError> {
    let event = get_event(store, organizer_id, id).await?;
    store.delete_event(id, organizer_id).await?;
    Ok(event)
}

pub async fn change_event_status(
    store: &dyn Store,
    organizer_id: Uuid,
    id: Uuid,
    status: &str,
) -> Result<Event, AppError> {
    let status: EventStatus = status.parse().map_err(|_| {
        AppError::ValidationError("status must be Draft or Published".to_string())
    })?;

    store
        .set_event_status(id, organizer_id, status)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("no event with id {}", id)))
}

/// Published events, for the participant-facing landing page.
pub async fn published_events(store: &dyn Store) -> Result<Vec<Event>, AppError> {
    store
        .list_events(&EventFilter {
            organizer_id: None,
            status: Some(EventStatus::Published),
            keyword: None,
        })
        .await
}

/// One published event. Drafts are invisible to participants.
pub async fn published_event(store: &dyn Store, id: Uuid) -> Result<Event, AppError> {
    store
        .find_event(id)
        .await?
        .filter(|event| event.status == EventStatus::Published)
        .ok_or_else(|| AppError::NotFound(format!("no event with id {}", id)))
}
