use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use stockfinder_core::{InventoryRecordId, ReservationId, UserId};
use stockfinder_infra::ReservationError;
use stockfinder_reservations::Reservation;

use crate::app::{dto, errors};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_reservation))
        .route("/:id", get(get_reservation))
        .route("/:id/confirm", post(confirm_reservation))
        .route("/:id/cancel", post(cancel_reservation))
        .route("/:id/complete", post(complete_reservation))
}

pub async fn create_reservation(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateReservationRequest>,
) -> axum::response::Response {
    let user_id: UserId = match dto::parse_id(&body.user_id, "user") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let record_id: InventoryRecordId = match dto::parse_id(&body.record_id, "record") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.reservations.create(user_id, record_id, body.quantity) {
        Ok(r) => (StatusCode::CREATED, Json(dto::ReservationResponse::from(&r))).into_response(),
        Err(e) => errors::reservation_error_to_response(e),
    }
}

pub async fn get_reservation(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    with_reservation_id(&id, |id| services.reservations.get(id))
}

pub async fn confirm_reservation(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    with_reservation_id(&id, |id| services.reservations.confirm(id))
}

pub async fn cancel_reservation(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    with_reservation_id(&id, |id| services.reservations.cancel(id))
}

pub async fn complete_reservation(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    with_reservation_id(&id, |id| services.reservations.complete(id))
}

fn with_reservation_id(
    raw: &str,
    op: impl FnOnce(ReservationId) -> Result<Reservation, ReservationError>,
) -> axum::response::Response {
    let id: ReservationId = match dto::parse_id(raw, "reservation") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match op(id) {
        Ok(r) => (StatusCode::OK, Json(dto::ReservationResponse::from(&r))).into_response(),
        Err(e) => errors::reservation_error_to_response(e),
    }
}
