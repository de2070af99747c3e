use axum::routing::{get, post, put};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, create_security_headers_layer};
use crate::handlers::{events, health_check, orders, payments};
use crate::state::AppState;

pub fn create_routes(state: AppState) -> Router {
    let participant = Router::new()
        .route("/events", get(events::list_published))
        .route("/events/:id", get(events::get_published))
        .route("/payments/:organizerId", get(payments::list_by_organizer))
        .route("/orders", get(orders::my_orders))
        .route("/checkout", post(orders::checkout));

    let cms = Router::new()
        .route("/events", get(events::cms_list).post(events::cms_create))
        .route(
            "/events/:id",
            get(events::cms_get)
                .put(events::cms_update)
                .delete(events::cms_delete),
        )
        .route("/events/:id/status", put(events::cms_change_status))
        .route("/orders", get(orders::cms_list));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", participant)
        .nest("/api/v1/cms", cms)
        .layer(TraceLayer::new_for_http())
        .layer(create_security_headers_layer())
        .layer(create_cors_layer())
        .with_state(state)
}
