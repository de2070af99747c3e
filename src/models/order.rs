use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::event::{Event, TicketCategory};

/// One accepted line of a checkout: a ticket-category label, the catalog
/// unit price at purchase time, and the quantity bought.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(rename = "type")]
    pub kind: String,
    pub price: Decimal,
    pub quantity: i32,
}

/// Point-in-time copy of the event a ticket was bought for. Taken before any
/// stock decrement is applied, so later edits to the live event never show
/// through on a past order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSnapshot {
    pub title: String,
    pub date: DateTime<Utc>,
    pub about: String,
    pub tagline: String,
    pub key_point: Vec<String>,
    pub venue_name: String,
    pub tickets: Vec<TicketCategory>,
    pub image_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub talent_id: Option<Uuid>,
    pub organizer_id: Uuid,
}

impl EventSnapshot {
    /// Value copy of an event's descriptive fields, including its full
    /// ticket-category list as it stands right now.
    pub fn of(event: &Event) -> Self {
        Self {
            title: event.title.clone(),
            date: event.date,
            about: event.about.clone(),
            tagline: event.tagline.clone(),
            key_point: event.key_point.clone(),
            venue_name: event.venue_name.clone(),
            tickets: event.tickets.clone(),
            image_id: event.image_id,
            category_id: event.category_id,
            talent_id: event.talent_id,
            organizer_id: event.organizer_id,
        }
    }
}

/// A finalized checkout. Created exactly once and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub participant_id: Uuid,
    pub event_id: Uuid,
    pub payment_method_id: Uuid,
    pub personal_detail: Value,
    pub order_items: Vec<OrderItem>,
    pub total_pay: Decimal,
    pub total_order_ticket: i32,
    pub history_event: EventSnapshot,
}

/// Everything the store needs to commit a checkout. The store assigns the id
/// and the creation timestamp at commit time.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub participant_id: Uuid,
    pub event_id: Uuid,
    pub payment_method_id: Uuid,
    pub personal_detail: Value,
    pub order_items: Vec<OrderItem>,
    pub total_pay: Decimal,
    pub total_order_ticket: i32,
    pub history_event: EventSnapshot,
}
