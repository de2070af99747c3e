//! Checkout orchestrator.
//!
//! Converts a participant's cart into a committed order: validates the
//! request shape, resolves the event and payment method, matches every line
//! against the event's ticket categories, computes totals from catalog
//! prices and hands a fully-built order to the store, which applies the
//! stock decrements and the order append atomically. On any failure nothing
//! is written.

use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::models::order::EventSnapshot;
use crate::models::{NewOrder, Order, OrderItem};
use crate::store::Store;
use crate::utils::error::AppError;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    /// Event id.
    pub event: Uuid,
    /// Payment method id.
    pub payment: Uuid,
    /// Opaque contact data, copied verbatim onto the order. Validated
    /// upstream.
    #[serde(default)]
    pub personal_detail: Value,
    pub tickets: Vec<TicketSelection>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketSelection {
    pub ticket_categories: TicketCategoryRef,
    pub sum_ticket: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TicketCategoryRef {
    #[serde(rename = "type")]
    pub kind: String,
    /// Advisory only. Totals always use the catalog price.
    #[serde(default)]
    pub price: Option<Decimal>,
}

fn validate(request: &CheckoutRequest) -> Result<(), AppError> {
    if request.tickets.is_empty() {
        return Err(AppError::ValidationError(
            "at least one ticket must be requested".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for selection in &request.tickets {
        if selection.sum_ticket <= 0 {
            return Err(AppError::ValidationError(
                "ticket quantity must be a positive integer".to_string(),
            ));
        }
        if !seen.insert(selection.ticket_categories.kind.as_str()) {
            return Err(AppError::ValidationError(format!(
                "duplicate ticket category '{}' in request",
                selection.ticket_categories.kind
            )));
        }
    }

    Ok(())
}

pub async fn checkout(
    store: &dyn Store,
    participant_id: Uuid,
    request: CheckoutRequest,
) -> Result<Order, AppError> {
    validate(&request)?;

    let event = store
        .find_event(request.event)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("no event with id {}", request.event)))?;

    store
        .find_payment_method(request.payment)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("no payment method with id {}", request.payment)))?;

    // Snapshot before any stock mutation so later edits to the live event
    // never show through on this order.
    let history_event = EventSnapshot::of(&event);

    let mut order_items = Vec::with_capacity(request.tickets.len());
    let mut total_pay = Decimal::ZERO;
    let mut total_order_ticket = 0;

    for selection in &request.tickets {
        let kind = &selection.ticket_categories.kind;
        let category = event
            .tickets
            .iter()
            .find(|ticket| &ticket.kind == kind)
            .ok_or_else(|| {
                AppError::NotFound(format!("no ticket category '{}' for this event", kind))
            })?;

        // Optimistic pre-check against the loaded copy. It reports the first
        // failing category deterministically; the conditional decrement in
        // the store remains the authoritative guard under concurrency.
        if selection.sum_ticket > category.stock {
            return Err(AppError::Conflict(format!(
                "insufficient stock for ticket category '{}'",
                category.kind
            )));
        }

        total_pay += category.price * Decimal::from(selection.sum_ticket);
        total_order_ticket += selection.sum_ticket;
        order_items.push(OrderItem {
            kind: category.kind.clone(),
            price: category.price,
            quantity: selection.sum_ticket,
        });
    }

    store
        .commit_checkout(NewOrder {
            participant_id,
            event_id: event.id,
            payment_method_id: request.payment,
            personal_detail: request.personal_detail,
            order_items,
            total_pay,
            total_order_ticket,
            history_event,
        })
        .await
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::json;

    use super::*;
    use crate::models::{Event, EventDraft, EventStatus, PaymentMethod, TicketCategory};
    use crate::store::InMemoryStore;

    fn selection(kind: &str, quantity: i32) -> TicketSelection {
        TicketSelection {
            ticket_categories: TicketCategoryRef {
                kind: kind.to_string(),
                price: None,
            },
            sum_ticket: quantity,
        }
    }

    fn payment_method(organizer_id: Uuid) -> PaymentMethod {
        let now = Utc::now();
        PaymentMethod {
            id: Uuid::new_v4(),
            organizer_id,
            kind: "Bank transfer".to_string(),
            status: "active".to_string(),
            image_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    async fn seeded_store() -> (InMemoryStore, Event, PaymentMethod) {
        let store = InMemoryStore::new();
        let organizer_id = Uuid::new_v4();

        let event = store
            .insert_event(
                organizer_id,
                EventDraft {
                    title: "Product design summit".to_string(),
                    date: Utc::now(),
                    about: "Two days of talks".to_string(),
                    tagline: "Design better".to_string(),
                    key_point: vec!["Talks".to_string(), "Workshops".to_string()],
                    venue_name: "Grand hall".to_string(),
                    status: EventStatus::Published,
                    tickets: vec![
                        TicketCategory {
                            kind: "Regular".to_string(),
                            price: Decimal::from(100_000),
                            stock: 5,
                        },
                        TicketCategory {
                            kind: "VIP".to_string(),
                            price: Decimal::from(250_000),
                            stock: 2,
                        },
                    ],
                    image_id: None,
                    category_id: None,
                    talent_id: None,
                },
            )
            .await
            .unwrap();

        let method = payment_method(organizer_id);
        store.add_payment_method(method.clone());

        (store, event, method)
    }

    fn request(event: &Event, method: &PaymentMethod, tickets: Vec<TicketSelection>) -> CheckoutRequest {
        CheckoutRequest {
            event: event.id,
            payment: method.id,
            personal_detail: json!({"firstName": "Ayu", "email": "ayu@example.com"}),
            tickets,
        }
    }

    #[tokio::test]
    async fn checkout_decrements_stock_and_computes_totals() {
        let (store, event, method) = seeded_store().await;
        let participant = Uuid::new_v4();

        let order = checkout(
            &store,
            participant,
            request(&event, &method, vec![selection("Regular", 3)]),
        )
        .await
        .unwrap();

        assert_eq!(order.total_pay, Decimal::from(300_000));
        assert_eq!(order.total_order_ticket, 3);
        assert_eq!(order.participant_id, participant);

        let after = store.find_event(event.id).await.unwrap().unwrap();
        assert_eq!(after.tickets[0].stock, 2);
    }

    #[tokio::test]
    async fn second_checkout_beyond_remaining_stock_conflicts() {
        let (store, event, method) = seeded_store().await;

        checkout(
            &store,
            Uuid::new_v4(),
            request(&event, &method, vec![selection("Regular", 3)]),
        )
        .await
        .unwrap();

        let loser = Uuid::new_v4();
        let err = checkout(
            &store,
            loser,
            request(&event, &method, vec![selection("Regular", 3)]),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));

        let after = store.find_event(event.id).await.unwrap().unwrap();
        assert_eq!(after.tickets[0].stock, 2);

        let orders = store.list_orders_for_participant(loser).await.unwrap();
        assert!(orders.is_empty());
    }

    #[tokio::test]
    async fn totals_cover_every_line_item() {
        let (store, event, method) = seeded_store().await;

        let order = checkout(
            &store,
            Uuid::new_v4(),
            request(
                &event,
                &method,
                vec![selection("Regular", 2), selection("VIP", 1)],
            ),
        )
        .await
        .unwrap();

        let expected_pay: Decimal = order
            .order_items
            .iter()
            .map(|item| item.price * Decimal::from(item.quantity))
            .sum();
        let expected_count: i32 = order.order_items.iter().map(|item| item.quantity).sum();

        assert_eq!(order.total_pay, expected_pay);
        assert_eq!(order.total_pay, Decimal::from(450_000));
        assert_eq!(order.total_order_ticket, expected_count);
        assert_eq!(order.total_order_ticket, 3);
    }

    #[tokio::test]
    async fn unknown_event_is_not_found() {
        let (store, _event, method) = seeded_store().await;

        let err = checkout(
            &store,
            Uuid::new_v4(),
            CheckoutRequest {
                event: Uuid::new_v4(),
                payment: method.id,
                personal_detail: json!({}),
                tickets: vec![selection("Regular", 1)],
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn unknown_payment_method_leaves_stock_unchanged() {
        let (store, event, _method) = seeded_store().await;

        let err = checkout(
            &store,
            Uuid::new_v4(),
            CheckoutRequest {
                event: event.id,
                payment: Uuid::new_v4(),
                personal_detail: json!({}),
                tickets: vec![selection("Regular", 1)],
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));

        let after = store.find_event(event.id).await.unwrap().unwrap();
        assert_eq!(after.tickets[0].stock, 5);
    }

    #[tokio::test]
    async fn unmatched_ticket_category_is_rejected() {
        let (store, event, method) = seeded_store().await;

        let err = checkout(
            &store,
            Uuid::new_v4(),
            request(&event, &method, vec![selection("Backstage", 1)]),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));

        let after = store.find_event(event.id).await.unwrap().unwrap();
        assert_eq!(after.tickets[0].stock, 5);
        assert_eq!(after.tickets[1].stock, 2);
    }

    #[tokio::test]
    async fn empty_and_nonpositive_requests_are_invalid() {
        let (store, event, method) = seeded_store().await;

        let err = checkout(
            &store,
            Uuid::new_v4(),
            request(&event, &method, vec![]),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        let err = checkout(
            &store,
            Uuid::new_v4(),
            request(&event, &method, vec![selection("Regular", 0)]),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn duplicate_categories_in_one_request_are_invalid() {
        let (store, event, method) = seeded_store().await;

        let err = checkout(
            &store,
            Uuid::new_v4(),
            request(
                &event,
                &method,
                vec![selection("Regular", 1), selection("Regular", 2)],
            ),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn client_supplied_price_does_not_affect_totals() {
        let (store, event, method) = seeded_store().await;

        let mut req = request(&event, &method, vec![selection("Regular", 2)]);
        req.tickets[0].ticket_categories.price = Some(Decimal::ONE);

        let order = checkout(&store, Uuid::new_v4(), req).await.unwrap();
        assert_eq!(order.total_pay, Decimal::from(200_000));
        assert_eq!(order.order_items[0].price, Decimal::from(100_000));
    }

    #[tokio::test]
    async fn snapshot_survives_later_event_edits() {
        let (store, event, method) = seeded_store().await;
        let participant = Uuid::new_v4();

        checkout(
            &store,
            participant,
            request(&event, &method, vec![selection("Regular", 1)]),
        )
        .await
        .unwrap();

        let mut edited = EventDraft {
            title: "Renamed summit".to_string(),
            date: event.date,
            about: event.about.clone(),
            tagline: event.tagline.clone(),
            key_point: event.key_point.clone(),
            venue_name: "Moved venue".to_string(),
            status: event.status,
            tickets: event.tickets.clone(),
            image_id: None,
            category_id: None,
            talent_id: None,
        };
        edited.tickets[0].stock = 0;
        store
            .update_event(event.id, event.organizer_id, edited)
            .await
            .unwrap()
            .unwrap();

        let orders = store.list_orders_for_participant(participant).await.unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].history_event.title, "Product design summit");
        assert_eq!(orders[0].history_event.venue_name, "Grand hall");
        // the snapshot keeps the pre-checkout category list
        assert_eq!(orders[0].history_event.tickets[0].stock, 5);
    }
}
