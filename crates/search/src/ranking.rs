//! Deterministic ordering of search results.
//!
//! Every criterion is a total order and the sort is stable, so equal keys keep
//! their input order.

use std::cmp::Ordering;

use stockfinder_core::SellerId;

use crate::query::{SearchResultRow, SortCriterion};

/// Supplies a per-seller distance metric. Computing it is the caller's concern.
pub trait DistanceSource: Send + Sync {
    fn distance_km(&self, seller: SellerId) -> Option<f64>;
}

/// Order `rows` by `criterion`.
///
/// - `ByPrice`: ascending unit price.
/// - `ByRating`: descending seller rating.
/// - `ByDistance`: ascending supplied distance; rows without one go last.
///   Without any distances this is the input order.
pub fn rank(mut rows: Vec<SearchResultRow>, criterion: SortCriterion) -> Vec<SearchResultRow> {
    match criterion {
        SortCriterion::ByPrice => rows.sort_by_key(|r| r.record.unit_price),
        SortCriterion::ByRating => rows.sort_by(|a, b| b.seller.rating.total_cmp(&a.seller.rating)),
        SortCriterion::ByDistance => rows.sort_by(|a, b| by_distance(a.distance_km, b.distance_km)),
    }
    rows
}

fn by_distance(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
