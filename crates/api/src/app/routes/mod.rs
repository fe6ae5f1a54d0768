use axum::Router;

pub mod bookings;
pub mod common;
pub mod items;
pub mod requests;
pub mod system;
pub mod users;

/// Endpoints that act on behalf of the `X-Sharer-User-Id` caller.
pub fn caller_router() -> Router {
    Router::new()
        .nest("/items", items::router())
        .nest("/requests", requests::router())
        .nest("/bookings", bookings::router())
}

/// Directory endpoints; no caller identity required.
pub fn public_router() -> Router {
    Router::new().nest("/users", users::router())
}
