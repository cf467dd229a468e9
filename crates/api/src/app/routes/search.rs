use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use stockfinder_core::UserId;
use stockfinder_search::SearchOutcome;

use crate::app::{dto, errors};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(search))
        .route("/visible", get(visible))
}

/// `GET /search?q=&filter=&sort=&user_id=`
///
/// `status` in the body is `applied`, `skipped` (blank query) or `superseded`
/// (a newer search from the same user was issued while this one was in flight).
pub async fn search(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<dto::SearchParams>,
) -> axum::response::Response {
    let user = match dto::parse_user(params.user_id.as_deref()) {
        Ok(u) => u,
        Err(resp) => return resp,
    };
    let query = match dto::parse_search_query(&params) {
        Ok(q) => q,
        Err(resp) => return resp,
    };

    let engine = services.engine_for(user);
    let body = match engine.search(user, &query).await {
        Ok(SearchOutcome::Skipped) => serde_json::json!({
            "status": "skipped",
            "generation": engine.latest_generation(),
            "results": [],
        }),
        Ok(SearchOutcome::Applied { generation, rows }) => serde_json::json!({
            "status": "applied",
            "generation": generation,
            "results": dto::rows_json(&rows),
        }),
        Ok(SearchOutcome::Superseded { generation, latest }) => serde_json::json!({
            "status": "superseded",
            "generation": generation,
            "latest": latest,
        }),
        Err(e) => return errors::search_error_to_response(e),
    };

    (StatusCode::OK, Json(body)).into_response()
}

/// `GET /search/visible?user_id=`: the results currently on display for a user.
pub async fn visible(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<dto::VisibleParams>,
) -> axum::response::Response {
    let user_id: UserId = match dto::parse_id(&params.user_id, "user") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let Some(engine) = services.existing_engine(user_id) else {
        return errors::json_error(StatusCode::NOT_FOUND, "not_found", "no search session for user");
    };

    let visible = engine.visible();
    Json(serde_json::json!({
        "generation": visible.generation,
        "query": visible.query,
        "results": dto::rows_json(&visible.rows),
    }))
    .into_response()
}
