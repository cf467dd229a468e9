use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockfinder_core::{InventoryRecordId, ReservationId, UserId};
use stockfinder_infra::ReservationSummary;
use stockfinder_reservations::Reservation;
use stockfinder_search::{HistoryEntry, SearchQuery, SearchResultRow, SortCriterion, StockFilter};

use crate::app::errors;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    pub filter: Option<String>,
    pub sort: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VisibleParams {
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
pub struct LimitParams {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct CreateReservationRequest {
    pub user_id: String,
    pub record_id: String,
    pub quantity: u32,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct SearchRowResponse {
    pub record_id: InventoryRecordId,
    pub item_name: String,
    pub generic_name: String,
    pub seller_name: String,
    pub seller_address: String,
    pub seller_phone: String,
    pub rating: f64,
    pub review_count: u32,
    pub unit_price: String,
    pub quantity: u32,
    pub stock_state: &'static str,
    pub stock_label: &'static str,
    pub distance_km: Option<f64>,
}

impl From<&SearchResultRow> for SearchRowResponse {
    fn from(row: &SearchResultRow) -> Self {
        Self {
            record_id: row.record.id,
            item_name: row.item.name.clone(),
            generic_name: row.item.generic_name.clone(),
            seller_name: row.seller.name.clone(),
            seller_address: row.seller.address.clone(),
            seller_phone: row.seller.phone.clone(),
            rating: row.seller.rating,
            review_count: row.seller.review_count,
            unit_price: row.record.unit_price.to_string(),
            quantity: row.record.quantity,
            stock_state: row.stock_state.as_str(),
            stock_label: row.stock_state.label(),
            distance_km: row.distance_km,
        }
    }
}

pub fn rows_json(rows: &[SearchResultRow]) -> Vec<SearchRowResponse> {
    rows.iter().map(SearchRowResponse::from).collect()
}

#[derive(Debug, Serialize)]
pub struct ReservationResponse {
    pub id: ReservationId,
    pub user_id: Option<UserId>,
    pub record_id: Option<InventoryRecordId>,
    pub status: &'static str,
    pub quantity: u32,
    pub total_price: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<&Reservation> for ReservationResponse {
    fn from(r: &Reservation) -> Self {
        Self {
            id: r.id_typed(),
            user_id: r.user_id(),
            record_id: r.record_id(),
            status: r.status().as_str(),
            quantity: r.quantity(),
            total_price: r.total_price().to_string(),
            created_at: r.created_at(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReservationSummaryResponse {
    pub id: ReservationId,
    pub record_id: Option<InventoryRecordId>,
    pub status: &'static str,
    pub quantity: u32,
    pub total_price: String,
    pub created_at: Option<DateTime<Utc>>,
    pub item_name: Option<String>,
    pub seller_name: Option<String>,
    pub seller_address: Option<String>,
}

impl From<ReservationSummary> for ReservationSummaryResponse {
    fn from(s: ReservationSummary) -> Self {
        Self {
            id: s.id,
            record_id: s.record_id,
            status: s.status.as_str(),
            quantity: s.quantity,
            total_price: s.total_price.to_string(),
            created_at: s.created_at,
            item_name: s.item_name,
            seller_name: s.seller_name,
            seller_address: s.seller_address,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HistoryEntryResponse {
    pub query: String,
    pub created_at: DateTime<Utc>,
}

impl From<HistoryEntry> for HistoryEntryResponse {
    fn from(e: HistoryEntry) -> Self {
        Self {
            query: e.query,
            created_at: e.created_at,
        }
    }
}

// -------------------------
// Parsing helpers
// -------------------------

pub fn parse_id<T: std::str::FromStr>(raw: &str, what: &str) -> Result<T, axum::response::Response> {
    raw.trim().parse().map_err(|_| {
        errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", format!("invalid {what} id"))
    })
}

pub fn parse_user(raw: Option<&str>) -> Result<Option<UserId>, axum::response::Response> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => parse_id(s, "user").map(Some),
        None => Ok(None),
    }
}

pub fn parse_search_query(params: &SearchParams) -> Result<SearchQuery, axum::response::Response> {
    let mut query = SearchQuery::new(params.q.clone());
    if let Some(raw) = params.filter.as_deref() {
        query = query.with_filter(
            raw.parse::<StockFilter>()
                .map_err(|e| errors::json_error(StatusCode::BAD_REQUEST, "invalid_filter", e.to_string()))?,
        );
    }
    if let Some(raw) = params.sort.as_deref() {
        query = query.with_sort(
            raw.parse::<SortCriterion>()
                .map_err(|e| errors::json_error(StatusCode::BAD_REQUEST, "invalid_sort", e.to_string()))?,
        );
    }
    Ok(query)
}
