use stockfinder_catalog::{CatalogRow, InventoryRecord, Item, Seller, StockThresholds};
use stockfinder_core::{InventoryRecordId, ItemId, Money, SellerId};

use crate::query::SearchResultRow;

pub fn catalog_row(item_name: &str, seller_name: &str, cents: u64, rating: f64, quantity: u32) -> CatalogRow {
    let item = Item::named(ItemId::new(), item_name);
    let seller = Seller::new(SellerId::new(), seller_name, "1 Main St", "555-0100", rating, 12)
        .expect("valid seller");
    CatalogRow {
        record: InventoryRecord {
            id: InventoryRecordId::new(),
            item_id: item.id,
            seller_id: seller.id,
            unit_price: Money::from_cents(cents),
            quantity,
        },
        item: Some(item),
        seller: Some(seller),
    }
}

pub fn result_row(cents: u64, rating: f64, distance_km: Option<f64>) -> SearchResultRow {
    let (record, item, seller) = catalog_row("Item", "Seller", cents, rating, 10)
        .resolved()
        .expect("resolved row");
    SearchResultRow {
        stock_state: record.stock_state(&StockThresholds::default()),
        record,
        item,
        seller,
        distance_km,
    }
}
