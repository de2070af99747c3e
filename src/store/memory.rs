//! In-memory store.
//!
//! Backs the test suite and local development without Postgres. State lives
//! behind one `RwLock`; `commit_checkout` holds the write lock across the
//! whole check-decrement-append sequence, so checkouts against the same
//! store are serialized and can never oversell a category.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::models::{Event, EventDraft, EventStatus, NewOrder, Order, PaymentMethod};
use crate::store::{EventFilter, OrderFilter, Store};
use crate::utils::error::AppError;

#[derive(Default)]
struct Inner {
    events: HashMap<Uuid, Event>,
    payment_methods: HashMap<Uuid, PaymentMethod>,
    orders: Vec<Order>,
}

#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a payment method. Payment-method management is handled by
    /// out-of-scope admin flows, so the trait has no write path for them.
    pub fn add_payment_method(&self, method: PaymentMethod) {
        let mut inner = self.inner.write().expect("lock poisoned");
        inner.payment_methods.insert(method.id, method);
    }
}

fn matches_order(filter: &OrderFilter, order: &Order) -> bool {
    if let Some(organizer_id) = filter.organizer_id {
        if order.history_event.organizer_id != organizer_id {
            return false;
        }
    }
    if let Some(from) = filter.from {
        if order.date < from {
            return false;
        }
    }
    if let Some(until) = filter.until {
        if order.date >= until {
            return false;
        }
    }
    true
}

#[async_trait]
impl Store for InMemoryStore {
    async fn insert_event(&self, organizer_id: Uuid, draft: EventDraft) -> Result<Event, AppError> {
        let mut inner = self.inner.write().expect("lock poisoned");

        // same constraint the schema carries as UNIQUE (organizer_id, title)
        if inner
            .events
            .values()
            .any(|event| event.organizer_id == organizer_id && event.title == draft.title)
        {
            return Err(AppError::ValidationError(
                "duplicate event title".to_string(),
            ));
        }

        let now = Utc::now();
        let event = Event {
            id: Uuid::new_v4(),
            organizer_id,
            title: draft.title,
            date: draft.date,
            about: draft.about,
            tagline: draft.tagline,
            key_point: draft.key_point,
            venue_name: draft.venue_name,
            status: draft.status,
            tickets: draft.tickets,
            image_id: draft.image_id,
            category_id: draft.category_id,
            talent_id: draft.talent_id,
            created_at: now,
            updated_at: now,
        };

        inner.events.insert(event.id, event.clone());
        Ok(event)
    }

    async fn list_events(&self, filter: &EventFilter) -> Result<Vec<Event>, AppError> {
        let inner = self.inner.read().expect("lock poisoned");

        let mut events: Vec<Event> = inner
            .events
            .values()
            .filter(|event| {
                filter
                    .organizer_id
                    .map_or(true, |org| event.organizer_id == org)
                    && filter.status.map_or(true, |status| event.status == status)
                    && filter.keyword.as_deref().map_or(true, |keyword| {
                        event.title.to_lowercase().contains(&keyword.to_lowercase())
                    })
            })
            .cloned()
            .collect();

        events.sort_by_key(|event| event.date);
        Ok(events)
    }

    async fn find_event(&self, id: Uuid) -> Result<Option<Event>, AppError> {
        let inner = self.inner.read().expect("lock poisoned");
        Ok(inner.events.get(&id).cloned())
    }

    async fn find_event_by_title(
        &self,
        organizer_id: Uuid,
        title: &str,
        exclude: Option<Uuid>,
    ) -> Result<Option<Uuid>, AppError> {
        let inner = self.inner.read().expect("lock poisoned");

        Ok(inner
            .events
            .values()
            .find(|event| {
                event.organizer_id == organizer_id
                    && event.title == title
                    && Some(event.id) != exclude
            })
            .map(|event| event.id))
    }

    async fn update_event(
        &self,
        id: Uuid,
        organizer_id: Uuid,
        draft: EventDraft,
    ) -> Result<Option<Event>, AppError> {
        let mut inner = self.inner.write().expect("lock poisoned");

        if inner.events.values().any(|event| {
            event.id != id && event.organizer_id == organizer_id && event.title == draft.title
        }) {
            return Err(AppError::ValidationError(
                "duplicate event title".to_string(),
            ));
        }

        let Some(event) = inner.events.get_mut(&id) else {
            return Ok(None);
        };
        if event.organizer_id != organizer_id {
            return Ok(None);
        }

        event.title = draft.title;
        event.date = draft.date;
        event.about = draft.about;
        event.tagline = draft.tagline;
        event.key_point = draft.key_point;
        event.venue_name = draft.venue_name;
        event.status = draft.status;
        event.tickets = draft.tickets;
        event.image_id = draft.image_id;
        event.category_id = draft.category_id;
        event.talent_id = draft.talent_id;
        event.updated_at = Utc::now();

        Ok(Some(event.clone()))
    }

    async fn delete_event(&self, id: Uuid, organizer_id: Uuid) -> Result<bool, AppError> {
        let mut inner = self.inner.write().expect("lock poisoned");

        let owned = inner
            .events
            .get(&id)
            .is_some_and(|event| event.organizer_id == organizer_id);
        if owned {
            inner.events.remove(&id);
        }
        Ok(owned)
    }

    async fn set_event_status(
        &self,
        id: Uuid,
        organizer_id: Uuid,
        status: EventStatus,
    ) -> Result<Option<Event>, AppError> {
        let mut inner = self.inner.write().expect("lock poisoned");

        let Some(event) = inner.events.get_mut(&id) else {
            return Ok(None);
        };
        if event.organizer_id != organizer_id {
            return Ok(None);
        }

        event.status = status;
        event.updated_at = Utc::now();
        Ok(Some(event.clone()))
    }

    async fn find_payment_method(&self, id: Uuid) -> Result<Option<PaymentMethod>, AppError> {
        let inner = self.inner.read().expect("lock poisoned");
        Ok(inner.payment_methods.get(&id).cloned())
    }

    async fn list_payment_methods(
        &self,
        organizer_id: Uuid,
    ) -> Result<Vec<PaymentMethod>, AppError> {
        let inner = self.inner.read().expect("lock poisoned");

        let mut methods: Vec<PaymentMethod> = inner
            .payment_methods
            .values()
            .filter(|method| method.organizer_id == organizer_id)
            .cloned()
            .collect();

        methods.sort_by(|a, b| a.kind.cmp(&b.kind));
        Ok(methods)
    }

    async fn commit_checkout(&self, order: NewOrder) -> Result<Order, AppError> {
        // Single critical section: check every line, then decrement every
        // line, then append the order. Nothing is visible halfway through.
        let mut inner = self.inner.write().expect("lock poisoned");

        let event = inner
            .events
            .get_mut(&order.event_id)
            .ok_or_else(|| AppError::NotFound(format!("no event with id {}", order.event_id)))?;

        for item in &order.order_items {
            let available = event
                .tickets
                .iter()
                .find(|ticket| ticket.kind == item.kind)
                .map(|ticket| ticket.stock);

            match available {
                Some(stock) if stock >= item.quantity => {}
                _ => {
                    return Err(AppError::Conflict(format!(
                        "insufficient stock for ticket category '{}'",
                        item.kind
                    )));
                }
            }
        }

        for item in &order.order_items {
            if let Some(ticket) = event.tickets.iter_mut().find(|t| t.kind == item.kind) {
                ticket.stock -= item.quantity;
            }
        }

        let committed = Order {
            id: Uuid::new_v4(),
            date: Utc::now(),
            participant_id: order.participant_id,
            event_id: order.event_id,
            payment_method_id: order.payment_method_id,
            personal_detail: order.personal_detail,
            order_items: order.order_items,
            total_pay: order.total_pay,
            total_order_ticket: order.total_order_ticket,
            history_event: order.history_event,
        };

        inner.orders.push(committed.clone());
        Ok(committed)
    }

    async fn list_orders(&self, filter: &OrderFilter) -> Result<(Vec<Order>, u64), AppError> {
        let inner = self.inner.read().expect("lock poisoned");

        let mut matched: Vec<Order> = inner
            .orders
            .iter()
            .filter(|order| matches_order(filter, order))
            .cloned()
            .collect();

        matched.sort_by(|a, b| b.date.cmp(&a.date));

        let total = matched.len() as u64;
        let page: Vec<Order> = matched
            .into_iter()
            .skip(filter.offset.max(0) as usize)
            .take(filter.limit.max(0) as usize)
            .collect();

        Ok((page, total))
    }

    async fn list_orders_for_participant(
        &self,
        participant_id: Uuid,
    ) -> Result<Vec<Order>, AppError> {
        let inner = self.inner.read().expect("lock poisoned");

        let mut orders: Vec<Order> = inner
            .orders
            .iter()
            .filter(|order| order.participant_id == participant_id)
            .cloned()
            .collect();

        orders.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(orders)
    }
}
