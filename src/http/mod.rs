use axum::Router;

use crate::AppState;

mod auth;
mod error;
mod handlers;
mod routes;

pub use auth::AdminToken;
pub use error::AppError;

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(routes::health())
        .merge(routes::volunteers())
        .merge(routes::assignments())
        .merge(routes::notifications())
        .with_state(state)
}
