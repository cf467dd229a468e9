use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use stockfinder_catalog::GatewayError;
use stockfinder_core::DomainError;
use stockfinder_infra::ReservationError;
use stockfinder_search::{HistoryError, SearchError};

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "validation_error", msg)
        }
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        e @ DomainError::InsufficientStock { .. } => {
            json_error(StatusCode::CONFLICT, "insufficient_stock", e.to_string())
        }
        e @ DomainError::InvalidTransition { .. } => {
            json_error(StatusCode::CONFLICT, "invalid_transition", e.to_string())
        }
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
    }
}

pub fn gateway_error_to_response(err: GatewayError) -> axum::response::Response {
    json_error(StatusCode::SERVICE_UNAVAILABLE, "store_unavailable", err.to_string())
}

pub fn reservation_error_to_response(err: ReservationError) -> axum::response::Response {
    match err {
        ReservationError::Domain(e) => domain_error_to_response(e),
        ReservationError::Store(e) => gateway_error_to_response(e),
    }
}

pub fn search_error_to_response(err: SearchError) -> axum::response::Response {
    json_error(StatusCode::SERVICE_UNAVAILABLE, "search_failed", err.to_string())
}

pub fn history_error_to_response(err: HistoryError) -> axum::response::Response {
    json_error(StatusCode::SERVICE_UNAVAILABLE, "store_unavailable", err.to_string())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
