//! Catalog reference data: items, sellers, and the inventory records linking them.

use serde::{Deserialize, Serialize};

use stockfinder_core::{
    DomainError, DomainResult, Entity, InventoryRecordId, ItemId, Money, SellerId,
};

use crate::stock::{StockState, StockThresholds};

/// A sellable item (reference data, maintained by catalog administration).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    #[serde(default)]
    pub generic_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub manufacturer: String,
    #[serde(default)]
    pub category: String,
}

impl Item {
    /// Item with only a display name; descriptive fields start empty.
    pub fn named(id: ItemId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            generic_name: String::new(),
            description: String::new(),
            manufacturer: String::new(),
            category: String::new(),
        }
    }

    /// Case-insensitive substring match on the display name.
    pub fn name_matches(&self, needle_lower: &str) -> bool {
        self.name.to_lowercase().contains(needle_lower)
    }
}

impl Entity for Item {
    type Id = ItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// A seller stocking items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seller {
    pub id: SellerId,
    pub name: String,
    pub address: String,
    pub phone: String,
    /// Aggregate rating in `[0, 5]`.
    pub rating: f64,
    pub review_count: u32,
}

impl Seller {
    pub const MAX_RATING: f64 = 5.0;

    pub fn new(
        id: SellerId,
        name: impl Into<String>,
        address: impl Into<String>,
        phone: impl Into<String>,
        rating: f64,
        review_count: u32,
    ) -> DomainResult<Self> {
        if !rating.is_finite() || !(0.0..=Self::MAX_RATING).contains(&rating) {
            return Err(DomainError::validation(format!(
                "rating must be within 0..=5, got {rating}"
            )));
        }
        Ok(Self {
            id,
            name: name.into(),
            address: address.into(),
            phone: phone.into(),
            rating,
            review_count,
        })
    }
}

impl Entity for Seller {
    type Id = SellerId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// One item stocked by one seller, at a price, with a quantity on hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub id: InventoryRecordId,
    pub item_id: ItemId,
    pub seller_id: SellerId,
    pub unit_price: Money,
    pub quantity: u32,
}

impl InventoryRecord {
    pub fn stock_state(&self, thresholds: &StockThresholds) -> StockState {
        thresholds.classify(self.quantity)
    }

    /// Take `quantity` units off the shelf.
    pub fn hold(&mut self, quantity: u32) -> DomainResult<()> {
        if quantity > self.quantity {
            return Err(DomainError::insufficient_stock(quantity, self.quantity));
        }
        self.quantity -= quantity;
        Ok(())
    }

    /// Put `quantity` previously held units back.
    pub fn release(&mut self, quantity: u32) -> DomainResult<()> {
        self.quantity = self
            .quantity
            .checked_add(quantity)
            .ok_or_else(|| DomainError::validation("quantity overflow on release"))?;
        Ok(())
    }
}

impl Entity for InventoryRecord {
    type Id = InventoryRecordId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Raw join output: an inventory record with its references, if they resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogRow {
    pub record: InventoryRecord,
    pub item: Option<Item>,
    pub seller: Option<Seller>,
}

impl CatalogRow {
    /// Both references resolved; `None` for dangling rows.
    pub fn resolved(self) -> Option<(InventoryRecord, Item, Seller)> {
        match (self.item, self.seller) {
            (Some(item), Some(seller)) => Some((self.record, item, seller)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(quantity: u32) -> InventoryRecord {
        InventoryRecord {
            id: InventoryRecordId::new(),
            item_id: ItemId::new(),
            seller_id: SellerId::new(),
            unit_price: Money::from_cents(450),
            quantity,
        }
    }

    #[test]
    fn name_match_is_case_insensitive_substring() {
        let item = Item::named(ItemId::new(), "Acetaminophen");
        assert!(item.name_matches("acet"));
        assert!(item.name_matches("phen"));
        assert!(!item.name_matches("ibu"));
    }

    #[test]
    fn seller_rating_is_bounded() {
        assert!(Seller::new(SellerId::new(), "A", "", "", 4.5, 10).is_ok());
        assert!(Seller::new(SellerId::new(), "A", "", "", 5.1, 10).is_err());
        assert!(Seller::new(SellerId::new(), "A", "", "", -0.1, 10).is_err());
        assert!(Seller::new(SellerId::new(), "A", "", "", f64::NAN, 10).is_err());
    }

    #[test]
    fn hold_and_release_track_quantity() {
        let mut r = record(3);
        r.hold(3).unwrap();
        assert_eq!(r.quantity, 0);
        assert_eq!(r.stock_state(&StockThresholds::default()), StockState::OutOfStock);
        r.release(3).unwrap();
        assert_eq!(r.quantity, 3);
    }

    #[test]
    fn hold_beyond_quantity_is_rejected_without_change() {
        let mut r = record(2);
        let err = r.hold(3).unwrap_err();
        assert_eq!(err, DomainError::insufficient_stock(3, 2));
        assert_eq!(r.quantity, 2);
    }

    #[test]
    fn dangling_rows_do_not_resolve() {
        let r = record(1);
        let row = CatalogRow {
            item: Some(Item::named(r.item_id, "X")),
            seller: None,
            record: r,
        };
        assert!(row.resolved().is_none());
    }
}
