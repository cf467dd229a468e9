use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use stockfinder_core::UserId;

use crate::app::{dto, errors};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/:id/history", get(recent_history))
        .route("/:id/reservations", get(list_reservations))
}

/// Most recent searches for a user, newest first.
pub async fn recent_history(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Query(params): Query<dto::LimitParams>,
) -> axum::response::Response {
    let user_id: UserId = match dto::parse_id(&id, "user") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let limit = params.limit.unwrap_or(services.config.recent_limit);

    match services.history.recent(user_id, limit).await {
        Ok(entries) => Json(
            entries
                .into_iter()
                .map(dto::HistoryEntryResponse::from)
                .collect::<Vec<_>>(),
        )
        .into_response(),
        Err(e) => errors::history_error_to_response(e),
    }
}

/// A user's reservations, newest first, with item and seller display fields.
pub async fn list_reservations(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Query(params): Query<dto::LimitParams>,
) -> axum::response::Response {
    let user_id: UserId = match dto::parse_id(&id, "user") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let limit = params.limit.unwrap_or(services.config.recent_limit);

    match services.reservations.list_for_user(user_id, limit) {
        Ok(list) => Json(
            list.into_iter()
                .map(dto::ReservationSummaryResponse::from)
                .collect::<Vec<_>>(),
        )
        .into_response(),
        Err(e) => errors::reservation_error_to_response(e),
    }
}
