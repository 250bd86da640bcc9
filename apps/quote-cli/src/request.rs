//! JSON shapes accepted and produced by `hako-quote`.
//!
//! ## Request
//! ```json
//! {
//!   "products": [ { "id": "jam", "seller_id": "farm", ... } ],
//!   "items": [ { "product_id": "jam", "quantity": 5 } ],
//!   "region": 13,
//!   "discount": 500
//! }
//! ```
//!
//! `baskets` may be sent instead of (or alongside) `items` to repack a cart
//! that was packed earlier. `experience` switches the summary to an
//! experience booking.

use std::collections::HashMap;
use std::path::Path;

use hako_core::shipping::prefecture_name;
use hako_core::{
    BasketShippingFee, CartBasket, CartItem, ExperienceHeadcount, ExperiencePrices, Money,
    OrderPaymentSummary, Product, Promotion, RegionCode,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{QuoteError, QuoteResult};

// =============================================================================
// Request
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct QuoteRequest {
    /// Live catalog rows for every product the cart mentions.
    #[serde(default)]
    pub products: Vec<Product>,

    #[serde(default)]
    pub items: Vec<CartItem>,

    #[serde(default)]
    pub baskets: Vec<CartBasket>,

    /// Destination prefecture code.
    #[serde(default)]
    pub region: Option<RegionCode>,

    /// Fixed amount taken off the order.
    #[serde(default)]
    pub discount: Money,

    #[serde(default)]
    pub experience: Option<ExperienceRequest>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExperienceRequest {
    #[serde(default)]
    pub headcount: ExperienceHeadcount,
    #[serde(default)]
    pub prices: ExperiencePrices,
}

impl QuoteRequest {
    pub fn from_file(path: &Path) -> QuoteResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| QuoteError::ReadRequest {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> QuoteResult<Self> {
        Ok(serde_json::from_str(contents)?)
    }

    /// Catalog keyed by product ID. Later rows win on duplicate IDs.
    pub fn catalog(&self) -> HashMap<String, Product> {
        self.products
            .iter()
            .map(|p| (p.id.clone(), p.clone()))
            .collect()
    }

    /// Every cart line, loose items first, then the contents of any baskets.
    pub fn cart_items(&self) -> Vec<CartItem> {
        self.items
            .iter()
            .chain(self.baskets.iter().flat_map(|b| b.items.iter()))
            .cloned()
            .collect()
    }

    /// The destination, or `None` when it is missing or not a known prefecture.
    pub fn destination(&self) -> Option<RegionCode> {
        let region = self.region?;
        if prefecture_name(region).is_none() {
            warn!(region, "Unknown destination region, shipping will not be charged");
            return None;
        }
        Some(region)
    }

    pub fn promotion(&self) -> FixedDiscount {
        FixedDiscount(self.discount)
    }
}

// =============================================================================
// Promotion
// =============================================================================

/// Takes the same amount off every order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixedDiscount(pub Money);

impl Promotion for FixedDiscount {
    fn calc_discount(&self, _subtotal: Money, _shipping_fee: Money) -> Money {
        self.0
    }
}

// =============================================================================
// Response
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct QuoteResponse {
    pub baskets: Vec<CartBasket>,
    pub shipping_fees: Vec<BasketShippingFee>,
    pub summary: OrderPaymentSummary,
}

/// Result of `hako-quote card`.
#[derive(Debug, Clone, Serialize)]
pub struct CardCheck {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const REQUEST: &str = r#"{
        "products": [
            {
                "id": "jam", "seller_id": "farm",
                "weight": { "value": 2500, "unit": "gram" },
                "box60_rate": 50, "box80_rate": 30, "box100_rate": 20,
                "inventory": 9, "price": 1200
            }
        ],
        "items": [ { "product_id": "jam", "quantity": 2 } ],
        "baskets": [
            {
                "box_number": 1, "delivery_type": "normal", "box_size": 60,
                "seller_id": "farm",
                "items": [ { "product_id": "jam", "quantity": 1 } ]
            }
        ],
        "region": 13,
        "discount": 300
    }"#;

    #[test]
    fn test_parse_request() {
        let request = QuoteRequest::from_json(REQUEST).unwrap();

        assert_eq!(request.catalog()["jam"].price.yen(), 1200);
        assert_eq!(
            request.cart_items(),
            vec![CartItem::new("jam", 2), CartItem::new("jam", 1)]
        );
        assert_eq!(request.destination(), Some(13));
        assert_eq!(request.promotion(), FixedDiscount(Money::from_yen(300)));
        assert!(request.experience.is_none());
    }

    #[test]
    fn test_minimal_request() {
        let request = QuoteRequest::from_json("{}").unwrap();
        assert!(request.cart_items().is_empty());
        assert_eq!(request.destination(), None);
        assert!(request.discount.is_zero());
    }

    #[rstest]
    #[case(Some(0), None)]
    #[case(Some(1), Some(1))]
    #[case(Some(47), Some(47))]
    #[case(Some(48), None)]
    #[case(None, None)]
    fn test_destination(#[case] region: Option<RegionCode>, #[case] expected: Option<RegionCode>) {
        let request = QuoteRequest {
            region,
            ..QuoteRequest::from_json("{}").unwrap()
        };
        assert_eq!(request.destination(), expected);
    }

    #[test]
    fn test_malformed_request() {
        let err = QuoteRequest::from_json(r#"{ "items": 5 }"#).unwrap_err();
        assert!(matches!(err, QuoteError::MalformedRequest(_)));
    }

    #[test]
    fn test_fixed_discount_ignores_amounts() {
        let promo = FixedDiscount(Money::from_yen(500));
        assert_eq!(
            promo.calc_discount(Money::from_yen(100), Money::zero()),
            Money::from_yen(500)
        );
    }
}
