//! # Offer Catalog Records
//!
//! Read-only [`Offer`] and [`OfferItem`] records supplied by the external
//! catalog collaborator. A deal references specific offer items by id; the
//! core never mutates them, it only validates that referenced items belong
//! to the deal's offer and that requested quantities fit what the item still
//! offers.

use crate::domain::value_objects::{Money, OfferId, OfferItemId, TraderId, Volume};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Publication status of an offer, as reported by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OfferStatus {
    /// Visible and referenceable by new deals.
    Published,
    /// No longer referenceable by new deals.
    Withdrawn,
}

impl fmt::Display for OfferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Published => write!(f, "PUBLISHED"),
            Self::Withdrawn => write!(f, "WITHDRAWN"),
        }
    }
}

/// A line item within an offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferItem {
    /// Unique identifier for this item.
    pub id: OfferItemId,
    /// The offer this item belongs to.
    pub offer_id: OfferId,
    /// Price per unit.
    pub unit_price: Money,
    /// ISO currency code.
    pub currency: String,
    /// Units still offerable.
    pub quantity: u32,
    /// Carton count for the full quantity.
    pub cartons: u32,
    /// Cargo volume for the full quantity.
    pub total_cbm: Volume,
}

/// An offer published by a trader, referenced read-only by deals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offer {
    /// Unique identifier for this offer.
    pub id: OfferId,
    /// The trader who published the offer.
    pub trader_id: TraderId,
    /// Publication status.
    pub status: OfferStatus,
    /// The offer's line items.
    pub items: Vec<OfferItem>,
}

impl Offer {
    /// Looks up an item of this offer by id.
    #[must_use]
    pub fn item(&self, id: OfferItemId) -> Option<&OfferItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Returns true if the given item id belongs to this offer.
    #[must_use]
    pub fn contains_item(&self, id: OfferItemId) -> bool {
        self.item(id).is_some()
    }
}

impl fmt::Display for Offer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Offer[{}] trader={} status={} items={}",
            self.id,
            self.trader_id,
            self.status,
            self.items.len()
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_offer() -> Offer {
        let offer_id = OfferId::new_v4();
        Offer {
            id: offer_id,
            trader_id: TraderId::new_v4(),
            status: OfferStatus::Published,
            items: vec![OfferItem {
                id: OfferItemId::new_v4(),
                offer_id,
                unit_price: Money::from_decimal(dec!(12.50)).unwrap(),
                currency: "USD".to_string(),
                quantity: 1000,
                cartons: 50,
                total_cbm: Volume::new(dec!(8.4)).unwrap(),
            }],
        }
    }

    #[test]
    fn item_lookup_by_id() {
        let offer = sample_offer();
        let id = offer.items[0].id;
        assert!(offer.contains_item(id));
        assert_eq!(offer.item(id).unwrap().quantity, 1000);
        assert!(!offer.contains_item(OfferItemId::new_v4()));
    }

    #[test]
    fn display_summarizes() {
        let offer = sample_offer();
        let text = offer.to_string();
        assert!(text.contains("PUBLISHED"));
        assert!(text.contains("items=1"));
    }
}
