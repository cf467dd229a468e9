use axum::Router;

pub mod reservations;
pub mod search;
pub mod system;
pub mod users;

/// Router for all API endpoints except `/health`.
pub fn router() -> Router {
    Router::new()
        .nest("/search", search::router())
        .nest("/reservations", reservations::router())
        .nest("/users", users::router())
}
