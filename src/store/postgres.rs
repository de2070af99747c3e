use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::models::order::{EventSnapshot, OrderItem};
use crate::models::{Event, EventDraft, EventStatus, NewOrder, Order, PaymentMethod, TicketCategory};
use crate::store::{EventFilter, OrderFilter, Store};
use crate::utils::error::AppError;

/// Postgres-backed store.
///
/// Checkout runs as a single transaction: one conditional decrement per
/// ticket category, then the order insert. A decrement that matches no row
/// means the stock was insufficient (or the category vanished under a
/// concurrent edit) and rolls the whole commit back, so committed decrements
/// can never oversell a category.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct EventRow {
    id: Uuid,
    organizer_id: Uuid,
    title: String,
    date: DateTime<Utc>,
    about: String,
    tagline: String,
    key_point: Vec<String>,
    venue_name: String,
    status: String,
    image_id: Option<Uuid>,
    category_id: Option<Uuid>,
    talent_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl EventRow {
    fn into_event(self, tickets: Vec<TicketCategory>) -> Result<Event, AppError> {
        let status = self
            .status
            .parse::<EventStatus>()
            .map_err(|_| AppError::InternalServerError("invalid event status in database".into()))?;

        Ok(Event {
            id: self.id,
            organizer_id: self.organizer_id,
            title: self.title,
            date: self.date,
            about: self.about,
            tagline: self.tagline,
            key_point: self.key_point,
            venue_name: self.venue_name,
            status,
            tickets,
            image_id: self.image_id,
            category_id: self.category_id,
            talent_id: self.talent_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(FromRow)]
struct CategoryRow {
    event_id: Uuid,
    kind: String,
    price: Decimal,
    stock: i32,
}

#[derive(FromRow)]
struct OrderRow {
    id: Uuid,
    date: DateTime<Utc>,
    participant_id: Uuid,
    event_id: Uuid,
    payment_method_id: Uuid,
    personal_detail: Value,
    order_items: Json<Vec<OrderItem>>,
    total_pay: Decimal,
    total_order_ticket: i32,
    history_event: Json<EventSnapshot>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Order {
            id: row.id,
            date: row.date,
            participant_id: row.participant_id,
            event_id: row.event_id,
            payment_method_id: row.payment_method_id,
            personal_detail: row.personal_detail,
            order_items: row.order_items.0,
            total_pay: row.total_pay,
            total_order_ticket: row.total_order_ticket,
            history_event: row.history_event.0,
        }
    }
}

const EVENT_COLUMNS: &str = "id, organizer_id, title, date, about, tagline, key_point, venue_name, \
                             status, image_id, category_id, talent_id, created_at, updated_at";

const ORDER_COLUMNS: &str = "id, date, participant_id, event_id, payment_method_id, \
                             personal_detail, order_items, total_pay, total_order_ticket, \
                             history_event";

/// Events carry `UNIQUE (organizer_id, title)`. Two requests can both pass
/// the pre-insert title lookup; the loser of that race lands here.
fn title_conflict(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::ValidationError("duplicate event title".to_string())
        }
        _ => AppError::DatabaseError(err),
    }
}

async fn replace_categories(
    tx: &mut Transaction<'_, Postgres>,
    event_id: Uuid,
    tickets: &[TicketCategory],
) -> Result<(), AppError> {
    sqlx::query("DELETE FROM ticket_categories WHERE event_id = $1")
        .bind(event_id)
        .execute(&mut **tx)
        .await?;

    for (position, ticket) in tickets.iter().enumerate() {
        sqlx::query(
            "INSERT INTO ticket_categories (event_id, position, kind, price, stock) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(event_id)
        .bind(position as i32)
        .bind(&ticket.kind)
        .bind(ticket.price)
        .bind(ticket.stock)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

impl PgStore {
    async fn categories_for(&self, event_id: Uuid) -> Result<Vec<TicketCategory>, AppError> {
        let tickets = sqlx::query_as::<_, TicketCategory>(
            "SELECT kind, price, stock FROM ticket_categories \
             WHERE event_id = $1 ORDER BY position",
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tickets)
    }

    async fn assemble(&self, row: EventRow) -> Result<Event, AppError> {
        let tickets = self.categories_for(row.id).await?;
        row.into_event(tickets)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn insert_event(&self, organizer_id: Uuid, draft: EventDraft) -> Result<Event, AppError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, EventRow>(&format!(
            "INSERT INTO events (organizer_id, title, date, about, tagline, key_point, \
             venue_name, status, image_id, category_id, talent_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {EVENT_COLUMNS}"
        ))
        .bind(organizer_id)
        .bind(&draft.title)
        .bind(draft.date)
        .bind(&draft.about)
        .bind(&draft.tagline)
        .bind(&draft.key_point)
        .bind(&draft.venue_name)
        .bind(draft.status.to_string())
        .bind(draft.image_id)
        .bind(draft.category_id)
        .bind(draft.talent_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(title_conflict)?;

        replace_categories(&mut tx, row.id, &draft.tickets).await?;
        tx.commit().await?;

        row.into_event(draft.tickets)
    }

    async fn list_events(&self, filter: &EventFilter) -> Result<Vec<Event>, AppError> {
        let rows = sqlx::query_as::<_, EventRow>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events \
             WHERE ($1::uuid IS NULL OR organizer_id = $1) \
               AND ($2::text IS NULL OR status = $2) \
               AND ($3::text IS NULL OR title ILIKE '%' || $3 || '%') \
             ORDER BY date"
        ))
        .bind(filter.organizer_id)
        .bind(filter.status.map(|s| s.to_string()))
        .bind(filter.keyword.as_deref())
        .fetch_all(&self.pool)
        .await?;

        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let cat_rows = sqlx::query_as::<_, CategoryRow>(
            "SELECT event_id, kind, price, stock FROM ticket_categories \
             WHERE event_id = ANY($1) ORDER BY event_id, position",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<Uuid, Vec<TicketCategory>> = HashMap::new();
        for cat in cat_rows {
            grouped.entry(cat.event_id).or_default().push(TicketCategory {
                kind: cat.kind,
                price: cat.price,
                stock: cat.stock,
            });
        }

        rows.into_iter()
            .map(|row| {
                let tickets = grouped.remove(&row.id).unwrap_or_default();
                row.into_event(tickets)
            })
            .collect()
    }

    async fn find_event(&self, id: Uuid) -> Result<Option<Event>, AppError> {
        let row = sqlx::query_as::<_, EventRow>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.assemble(row).await?)),
            None => Ok(None),
        }
    }

    async fn find_event_by_title(
        &self,
        organizer_id: Uuid,
        title: &str,
        exclude: Option<Uuid>,
    ) -> Result<Option<Uuid>, AppError> {
        let id = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM events \
             WHERE organizer_id = $1 AND title = $2 AND ($3::uuid IS NULL OR id <> $3)",
        )
        .bind(organizer_id)
        .bind(title)
        .bind(exclude)
        .fetch_optional(&self.pool)
        .await?;

        Ok(id)
    }

    async fn update_event(
        &self,
        id: Uuid,
        organizer_id: Uuid,
        draft: EventDraft,
    ) -> Result<Option<Event>, AppError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, EventRow>(&format!(
            "UPDATE events SET title = $3, date = $4, about = $5, tagline = $6, \
             key_point = $7, venue_name = $8, status = $9, image_id = $10, \
             category_id = $11, talent_id = $12, updated_at = now() \
             WHERE id = $1 AND organizer_id = $2 \
             RETURNING {EVENT_COLUMNS}"
        ))
        .bind(id)
        .bind(organizer_id)
        .bind(&draft.title)
        .bind(draft.date)
        .bind(&draft.about)
        .bind(&draft.tagline)
        .bind(&draft.key_point)
        .bind(&draft.venue_name)
        .bind(draft.status.to_string())
        .bind(draft.image_id)
        .bind(draft.category_id)
        .bind(draft.talent_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(title_conflict)?;

        let Some(row) = row else {
            return Ok(None);
        };

        replace_categories(&mut tx, id, &draft.tickets).await?;
        tx.commit().await?;

        row.into_event(draft.tickets).map(Some)
    }

    async fn delete_event(&self, id: Uuid, organizer_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1 AND organizer_id = $2")
            .bind(id)
            .bind(organizer_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_event_status(
        &self,
        id: Uuid,
        organizer_id: Uuid,
        status: EventStatus,
    ) -> Result<Option<Event>, AppError> {
        let row = sqlx::query_as::<_, EventRow>(&format!(
            "UPDATE events SET status = $3, updated_at = now() \
             WHERE id = $1 AND organizer_id = $2 \
             RETURNING {EVENT_COLUMNS}"
        ))
        .bind(id)
        .bind(organizer_id)
        .bind(status.to_string())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.assemble(row).await?)),
            None => Ok(None),
        }
    }

    async fn find_payment_method(&self, id: Uuid) -> Result<Option<PaymentMethod>, AppError> {
        let method = sqlx::query_as::<_, PaymentMethod>(
            "SELECT id, organizer_id, kind, status, image_id, created_at, updated_at \
             FROM payment_methods WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(method)
    }

    async fn list_payment_methods(
        &self,
        organizer_id: Uuid,
    ) -> Result<Vec<PaymentMethod>, AppError> {
        let methods = sqlx::query_as::<_, PaymentMethod>(
            "SELECT id, organizer_id, kind, status, image_id, created_at, updated_at \
             FROM payment_methods WHERE organizer_id = $1 ORDER BY kind",
        )
        .bind(organizer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(methods)
    }

    async fn commit_checkout(&self, order: NewOrder) -> Result<Order, AppError> {
        let mut tx = self.pool.begin().await?;

        for item in &order.order_items {
            let result = sqlx::query(
                "UPDATE ticket_categories SET stock = stock - $3 \
                 WHERE event_id = $1 AND kind = $2 AND stock >= $3",
            )
            .bind(order.event_id)
            .bind(&item.kind)
            .bind(item.quantity)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                // dropping the transaction rolls every decrement back
                return Err(AppError::Conflict(format!(
                    "insufficient stock for ticket category '{}'",
                    item.kind
                )));
            }
        }

        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "INSERT INTO orders (participant_id, event_id, payment_method_id, organizer_id, \
             personal_detail, order_items, total_pay, total_order_ticket, history_event) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(order.participant_id)
        .bind(order.event_id)
        .bind(order.payment_method_id)
        .bind(order.history_event.organizer_id)
        .bind(&order.personal_detail)
        .bind(Json(&order.order_items))
        .bind(order.total_pay)
        .bind(order.total_order_ticket)
        .bind(Json(&order.history_event))
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(row.into())
    }

    async fn list_orders(&self, filter: &OrderFilter) -> Result<(Vec<Order>, u64), AppError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders \
             WHERE ($1::uuid IS NULL OR organizer_id = $1) \
               AND ($2::timestamptz IS NULL OR date >= $2) \
               AND ($3::timestamptz IS NULL OR date < $3) \
             ORDER BY date DESC \
             LIMIT $4 OFFSET $5"
        ))
        .bind(filter.organizer_id)
        .bind(filter.from)
        .bind(filter.until)
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM orders \
             WHERE ($1::uuid IS NULL OR organizer_id = $1) \
               AND ($2::timestamptz IS NULL OR date >= $2) \
               AND ($3::timestamptz IS NULL OR date < $3)",
        )
        .bind(filter.organizer_id)
        .bind(filter.from)
        .bind(filter.until)
        .fetch_one(&self.pool)
        .await?;

        Ok((rows.into_iter().map(Order::from).collect(), total as u64))
    }

    async fn list_orders_for_participant(
        &self,
        participant_id: Uuid,
    ) -> Result<Vec<Order>, AppError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE participant_id = $1 ORDER BY date DESC"
        ))
        .bind(participant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Order::from).collect())
    }
}
