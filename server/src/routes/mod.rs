use axum::{
    routing::{get, patch, put},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, HttpSettings, SecurityHeadersLayer};
use crate::handlers::{comments, events, health_check, ical, roles, signups, slots};
use crate::state::AppState;

pub fn create_routes(state: AppState, http: &HttpSettings) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes())
        .with_state(state)
        .layer(SecurityHeadersLayer::new(http.production))
        .layer(create_cors_layer(&http.allowed_origins))
        .layer(TraceLayer::new_for_http())
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/me/role", get(roles::my_role))
        .route("/users/:user_id/role", put(roles::set_user_role))
        .route("/users/:user_id/signups", get(signups::list_user_signups))
        .route("/events", get(events::list_events).post(events::create_event))
        .route(
            "/events/:id",
            get(events::get_event)
                .patch(events::update_event)
                .delete(events::delete_event),
        )
        .route(
            "/events/:id/slots",
            get(slots::list_slots).post(slots::create_slot),
        )
        .route(
            "/events/:id/comments",
            get(comments::list_comments).post(comments::create_comment),
        )
        .route(
            "/slots/:id",
            patch(slots::update_slot).delete(slots::delete_slot),
        )
        .route(
            "/slots/:id/signups",
            get(signups::list_slot_signups).post(signups::create_signup),
        )
        .route(
            "/signups/:id",
            patch(signups::update_signup).delete(signups::delete_signup),
        )
        .route(
            "/comments/:id",
            patch(comments::update_comment).delete(comments::delete_comment),
        )
        .route("/ical", get(ical::export_event))
}
