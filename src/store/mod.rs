//! Persistence seam.
//!
//! Handlers and services talk to a [`Store`] trait object so the checkout
//! engine and its invariants are testable without a running database.
//! [`postgres::PgStore`] is the production backend; [`memory::InMemoryStore`]
//! backs the test suite.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{Event, EventDraft, EventStatus, NewOrder, Order, PaymentMethod};
use crate::utils::error::AppError;

pub mod memory;
pub mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub organizer_id: Option<Uuid>,
    pub status: Option<EventStatus>,
    pub keyword: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OrderFilter {
    pub organizer_id: Option<Uuid>,
    pub from: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub limit: i64,
    pub offset: i64,
}

#[async_trait]
pub trait Store: Send + Sync {
    async fn insert_event(&self, organizer_id: Uuid, draft: EventDraft) -> Result<Event, AppError>;

    /// Events matching the filter, oldest schedule date first.
    async fn list_events(&self, filter: &EventFilter) -> Result<Vec<Event>, AppError>;

    async fn find_event(&self, id: Uuid) -> Result<Option<Event>, AppError>;

    /// Id of the event with this title owned by this organizer, if any.
    /// `exclude` skips one event id (used when updating an event in place).
    async fn find_event_by_title(
        &self,
        organizer_id: Uuid,
        title: &str,
        exclude: Option<Uuid>,
    ) -> Result<Option<Uuid>, AppError>;

    /// Replace an event's fields and ticket categories. `None` when the
    /// event does not exist or belongs to another organizer.
    async fn update_event(
        &self,
        id: Uuid,
        organizer_id: Uuid,
        draft: EventDraft,
    ) -> Result<Option<Event>, AppError>;

    /// Whether an event was deleted.
    async fn delete_event(&self, id: Uuid, organizer_id: Uuid) -> Result<bool, AppError>;

    async fn set_event_status(
        &self,
        id: Uuid,
        organizer_id: Uuid,
        status: EventStatus,
    ) -> Result<Option<Event>, AppError>;

    async fn find_payment_method(&self, id: Uuid) -> Result<Option<PaymentMethod>, AppError>;

    async fn list_payment_methods(&self, organizer_id: Uuid)
        -> Result<Vec<PaymentMethod>, AppError>;

    /// Atomically decrement stock for every line item of `order` and append
    /// the order. Either all decrements and the order commit together, or
    /// nothing is written and the first failing category is reported as
    /// [`AppError::Conflict`]. The sum of committed decrements for one
    /// category never exceeds the stock a single committed state held.
    async fn commit_checkout(&self, order: NewOrder) -> Result<Order, AppError>;

    /// One page of orders plus the total number of matches, newest first.
    async fn list_orders(&self, filter: &OrderFilter) -> Result<(Vec<Order>, u64), AppError>;

    /// All orders placed by one participant, newest first.
    async fn list_orders_for_participant(
        &self,
        participant_id: Uuid,
    ) -> Result<Vec<Order>, AppError>;
}
