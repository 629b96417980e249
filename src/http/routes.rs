use axum::{routing::get, routing::post, Router};

use crate::http::handlers;
use crate::AppState;

pub fn health() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health))
}

pub fn volunteers() -> Router<AppState> {
    Router::new().route("/api/volunteers/match", post(handlers::match_volunteers))
}

pub fn assignments() -> Router<AppState> {
    Router::new()
        .route("/api/assignments/assign", post(handlers::assign_volunteers))
        .route("/api/assignments/notify", post(handlers::notify_volunteers))
}

pub fn notifications() -> Router<AppState> {
    Router::new()
        .route("/api/notifications", get(handlers::list_notifications))
        .route(
            "/api/notifications/:id/read",
            post(handlers::mark_notification_read),
        )
}
