use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of an event. Only `Published` events are visible to
/// participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventStatus {
    Draft,
    Published,
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventStatus::Draft => f.write_str("Draft"),
            EventStatus::Published => f.write_str("Published"),
        }
    }
}

impl FromStr for EventStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Draft" => Ok(EventStatus::Draft),
            "Published" => Ok(EventStatus::Published),
            _ => Err(()),
        }
    }
}

/// One fungible class of tickets for an event: a label, a unit price and a
/// remaining stock counter. Labels are unique within one event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TicketCategory {
    #[serde(rename = "type")]
    pub kind: String,
    pub price: Decimal,
    pub stock: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    pub organizer_id: Uuid,
    pub title: String,
    pub date: DateTime<Utc>,
    pub about: String,
    pub tagline: String,
    pub key_point: Vec<String>,
    pub venue_name: String,
    pub status: EventStatus,
    pub tickets: Vec<TicketCategory>,
    pub image_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub talent_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Field set accepted when creating or replacing an event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDraft {
    pub title: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub about: String,
    #[serde(default)]
    pub tagline: String,
    #[serde(default)]
    pub key_point: Vec<String>,
    pub venue_name: String,
    pub status: EventStatus,
    pub tickets: Vec<TicketCategory>,
    pub image_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub talent_id: Option<Uuid>,
}
