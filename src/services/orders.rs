//! Read-only order queries for the CMS and for participants.
//!
//! Listing is always newest first. The caller's role is an explicit
//! parameter: owners see every organizer's orders, organizers only orders
//! whose event snapshot carries their own organizer id.

use chrono::{Days, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Order;
use crate::store::{OrderFilter, Store};
use crate::utils::auth::Role;
use crate::utils::error::AppError;

const DEFAULT_PAGE_SIZE: i64 = 10;
const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderListQuery {
    pub limit: Option<i64>,
    pub page: Option<i64>,
    /// `YYYY-MM-DD`, inclusive of the whole calendar day.
    pub start_date: Option<NaiveDate>,
    /// `YYYY-MM-DD`, inclusive of the whole calendar day.
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy)]
pub struct OrderScope {
    pub organizer_id: Uuid,
    pub role: Role,
}

#[derive(Debug, Serialize)]
pub struct OrderPage {
    pub data: Vec<Order>,
    pub pages: u64,
    pub total: u64,
}

pub async fn list_orders(
    store: &dyn Store,
    scope: OrderScope,
    query: OrderListQuery,
) -> Result<OrderPage, AppError> {
    // both values come straight off the query string; clamp before doing
    // arithmetic on them
    let limit = query
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    let page = query.page.unwrap_or(1).max(1);
    let offset = limit.saturating_mul(page.saturating_sub(1));

    let organizer_id = match scope.role {
        Role::Owner => None,
        Role::Organizer => Some(scope.organizer_id),
    };

    let from = query
        .start_date
        .map(|date| date.and_time(NaiveTime::MIN).and_utc());
    let until = query
        .end_date
        .and_then(|date| date.checked_add_days(Days::new(1)))
        .map(|date| date.and_time(NaiveTime::MIN).and_utc());

    let (data, total) = store
        .list_orders(&OrderFilter {
            organizer_id,
            from,
            until,
            limit,
            offset,
        })
        .await?;

    Ok(OrderPage {
        data,
        pages: total.div_ceil(limit as u64),
        total,
    })
}

pub async fn orders_for_participant(
    store: &dyn Store,
    participant_id: Uuid,
) -> Result<Vec<Order>, AppError> {
    store.list_orders_for_participant(participant_id).await
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;
    use serde_json::json;

    use super::*;
    use crate::models::order::EventSnapshot;
    use crate::models::{EventDraft, EventStatus, NewOrder, OrderItem, TicketCategory};
    use crate::store::InMemoryStore;

    async fn store_with_orders(per_organizer: &[(Uuid, usize)]) -> InMemoryStore {
        let store = InMemoryStore::new();

        for (organizer_id, count) in per_organizer {
            let event = store
                .insert_event(
                    *organizer_id,
                    EventDraft {
                        title: format!("Event of {}", organizer_id),
                        date: Utc::now(),
                        about: String::new(),
                        tagline: String::new(),
                        key_point: vec![],
                        venue_name: "Hall".to_string(),
                        status: EventStatus::Published,
                        tickets: vec![TicketCategory {
                            kind: "Regular".to_string(),
                            price: Decimal::from(50_000),
                            stock: 1_000,
                        }],
                        image_id: None,
                        category_id: None,
                        talent_id: None,
                    },
                )
                .await
                .unwrap();

            for _ in 0..*count {
                store
                    .commit_checkout(NewOrder {
                        participant_id: Uuid::new_v4(),
                        event_id: event.id,
                        payment_method_id: Uuid::new_v4(),
                        personal_detail: json!({}),
                        order_items: vec![OrderItem {
                            kind: "Regular".to_string(),
                            price: Decimal::from(50_000),
                            quantity: 1,
                        }],
                        total_pay: Decimal::from(50_000),
                        total_order_ticket: 1,
                        history_event: EventSnapshot::of(&event),
                    })
                    .await
                    .unwrap();
            }
        }

        store
    }

    fn query() -> OrderListQuery {
        OrderListQuery {
            limit: None,
            page: None,
            start_date: None,
            end_date: None,
        }
    }

    #[tokio::test]
    async fn pagination_reports_pages_and_total() {
        let organizer = Uuid::new_v4();
        let store = store_with_orders(&[(organizer, 5)]).await;
        let scope = OrderScope {
            organizer_id: organizer,
            role: Role::Organizer,
        };

        let page = list_orders(
            &store,
            scope,
            OrderListQuery {
                limit: Some(2),
                page: Some(1),
                ..query()
            },
        )
        .await
        .unwrap();

        assert_eq!(page.data.len(), 2);
        assert_eq!(page.total, 5);
        assert_eq!(page.pages, 3);

        let last = list_orders(
            &store,
            scope,
            OrderListQuery {
                limit: Some(2),
                page: Some(3),
                ..query()
            },
        )
        .await
        .unwrap();

        assert_eq!(last.data.len(), 1);
    }

    #[tokio::test]
    async fn listing_is_newest_first() {
        let organizer = Uuid::new_v4();
        let store = store_with_orders(&[(organizer, 3)]).await;

        let page = list_orders(
            &store,
            OrderScope {
                organizer_id: organizer,
                role: Role::Organizer,
            },
            query(),
        )
        .await
        .unwrap();

        for pair in page.data.windows(2) {
            assert!(pair[0].date >= pair[1].date);
        }
    }

    #[tokio::test]
    async fn organizers_only_see_their_own_orders() {
        let mine = Uuid::new_v4();
        let theirs = Uuid::new_v4();
        let store = store_with_orders(&[(mine, 2), (theirs, 3)]).await;

        let page = list_orders(
            &store,
            OrderScope {
                organizer_id: mine,
                role: Role::Organizer,
            },
            query(),
        )
        .await
        .unwrap();

        assert_eq!(page.total, 2);
        assert!(page
            .data
            .iter()
            .all(|order| order.history_event.organizer_id == mine));
    }

    #[tokio::test]
    async fn owners_see_everything() {
        let store = store_with_orders(&[(Uuid::new_v4(), 2), (Uuid::new_v4(), 3)]).await;

        let page = list_orders(
            &store,
            OrderScope {
                organizer_id: Uuid::new_v4(),
                role: Role::Owner,
            },
            query(),
        )
        .await
        .unwrap();

        assert_eq!(page.total, 5);
    }

    #[tokio::test]
    async fn date_range_covers_the_whole_day() {
        let organizer = Uuid::new_v4();
        let store = store_with_orders(&[(organizer, 2)]).await;
        let scope = OrderScope {
            organizer_id: organizer,
            role: Role::Organizer,
        };
        let today = Utc::now().date_naive();

        let page = list_orders(
            &store,
            scope,
            OrderListQuery {
                start_date: Some(today),
                end_date: Some(today),
                ..query()
            },
        )
        .await
        .unwrap();
        assert_eq!(page.total, 2);

        let yesterday = today.checked_sub_days(Days::new(1)).unwrap();
        let empty = list_orders(
            &store,
            scope,
            OrderListQuery {
                start_date: Some(yesterday),
                end_date: Some(yesterday),
                ..query()
            },
        )
        .await
        .unwrap();
        assert_eq!(empty.total, 0);
        assert_eq!(empty.pages, 0);
    }

    #[tokio::test]
    async fn extreme_limit_and_page_values_are_clamped() {
        let organizer = Uuid::new_v4();
        let store = store_with_orders(&[(organizer, 5)]).await;
        let scope = OrderScope {
            organizer_id: organizer,
            role: Role::Organizer,
        };

        let page = list_orders(
            &store,
            scope,
            OrderListQuery {
                limit: Some(i64::MAX),
                page: Some(3),
                ..query()
            },
        )
        .await
        .unwrap();

        // limit is capped, so page 3 is past the end of five orders
        assert!(page.data.is_empty());
        assert_eq!(page.total, 5);
        assert_eq!(page.pages, 1);

        let page = list_orders(
            &store,
            scope,
            OrderListQuery {
                limit: Some(i64::MAX),
                page: Some(i64::MAX),
                ..query()
            },
        )
        .await
        .unwrap();
        assert!(page.data.is_empty());
        assert_eq!(page.total, 5);

        let page = list_orders(
            &store,
            scope,
            OrderListQuery {
                limit: Some(-7),
                page: Some(-2),
                ..query()
            },
        )
        .await
        .unwrap();
        // negative values fall back to the smallest page
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.total, 5);
        assert_eq!(page.pages, 5);
    }

    #[tokio::test]
    async fn repeated_reads_are_identical() {
        let organizer = Uuid::new_v4();
        let store = store_with_orders(&[(organizer, 4)]).await;
        let scope = OrderScope {
            organizer_id: organizer,
            role: Role::Organizer,
        };

        let first = list_orders(&store, scope, query()).await.unwrap();
        let second = list_orders(&store, scope, query()).await.unwrap();

        assert_eq!(first.total, second.total);
        assert_eq!(first.pages, second.pages);
        let ids: Vec<Uuid> = first.data.iter().map(|o| o.id).collect();
        let ids_again: Vec<Uuid> = second.data.iter().map(|o| o.id).collect();
        assert_eq!(ids, ids_again);
    }
}
