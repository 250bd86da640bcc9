//! # Domain Types
//!
//! Core domain types used throughout Hako.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │    CartItem     │   │   CartBasket    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id, seller_id  │   │  product_id     │   │  box_number     │       │
//! │  │  delivery_type  │   │  quantity       │   │  box_size       │       │
//! │  │  weight + unit  │   └─────────────────┘   │  delivery_type  │       │
//! │  │  box rates      │                         │  items, seller  │       │
//! │  │  inventory      │                         └─────────────────┘       │
//! │  │  price          │                                                    │
//! │  └─────────────────┘                                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────────┐   │
//! │  │    TaxRate      │   │  DeliveryType   │   │ OrderPaymentSummary │   │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────────  │   │
//! │  │  percent (u32)  │   │  Normal         │   │  subtotal, discount │   │
//! │  │  10 = 10%       │   │  Refrigerated   │   │  shipping_fee, tax  │   │
//! │  └─────────────────┘   │  Frozen         │   │  tax_rate, total    │   │
//! │                        │  Pickup         │   └─────────────────────┘   │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Consumption tax rate in whole percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Standard consumption tax (10%).
    pub const STANDARD: TaxRate = TaxRate(10);

    /// Reduced rate for food and beverages (8%).
    pub const REDUCED: TaxRate = TaxRate(8);

    /// Creates a tax rate from a whole percentage.
    #[inline]
    pub const fn from_percent(percent: u32) -> Self {
        TaxRate(percent)
    }

    /// Returns the rate in whole percent.
    #[inline]
    pub const fn percent(&self) -> u32 {
        self.0
    }

    /// Returns the rate as an exact decimal fraction (10% → 0.10).
    pub fn as_decimal(&self) -> Decimal {
        Decimal::new(i64::from(self.0), 2)
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::STANDARD
    }
}

// =============================================================================
// Delivery Type
// =============================================================================

/// How a product travels to the shopper.
///
/// Units of different delivery types never share a box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryType {
    Normal,
    Refrigerated,
    Frozen,
    Pickup,
}

impl DeliveryType {
    /// Numeric code used by the storefront and rate sheets.
    pub const fn code(&self) -> u8 {
        match self {
            DeliveryType::Normal => 1,
            DeliveryType::Refrigerated => 2,
            DeliveryType::Frozen => 3,
            DeliveryType::Pickup => 4,
        }
    }

    /// Returns true if the carrier charges a cold-chain surcharge.
    pub const fn requires_cold_chain(&self) -> bool {
        matches!(self, DeliveryType::Refrigerated | DeliveryType::Frozen)
    }
}

impl Default for DeliveryType {
    fn default() -> Self {
        DeliveryType::Normal
    }
}

impl fmt::Display for DeliveryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryType::Normal => write!(f, "normal"),
            DeliveryType::Refrigerated => write!(f, "refrigerated"),
            DeliveryType::Frozen => write!(f, "frozen"),
            DeliveryType::Pickup => write!(f, "pickup"),
        }
    }
}

// =============================================================================
// Box Size
// =============================================================================

/// Shipping box tier, named after the carrier's size class (sum of edges in cm).
///
/// ## Tiers
/// ```text
/// ┌──────────┬──────────────────┬──────────────────────────┐
/// │  Tier    │  Default weight  │  Occupancy rate source   │
/// ├──────────┼──────────────────┼──────────────────────────┤
/// │  60      │   2,000 g        │  Product.box60_rate      │
/// │  80      │   5,000 g        │  Product.box80_rate      │
/// │  100     │  10,000 g        │  Product.box100_rate     │
/// └──────────┴──────────────────┴──────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum BoxSize {
    Size60,
    Size80,
    Size100,
}

impl BoxSize {
    /// All tiers from smallest to largest.
    pub const ALL: [BoxSize; 3] = [BoxSize::Size60, BoxSize::Size80, BoxSize::Size100];

    /// Size class in centimetres.
    pub const fn cm(&self) -> u32 {
        match self {
            BoxSize::Size60 => 60,
            BoxSize::Size80 => 80,
            BoxSize::Size100 => 100,
        }
    }
}

impl From<BoxSize> for u32 {
    fn from(size: BoxSize) -> Self {
        size.cm()
    }
}

impl TryFrom<u32> for BoxSize {
    type Error = String;

    fn try_from(cm: u32) -> Result<Self, Self::Error> {
        match cm {
            60 => Ok(BoxSize::Size60),
            80 => Ok(BoxSize::Size80),
            100 => Ok(BoxSize::Size100),
            other => Err(format!("unknown box size {other}, expected 60, 80 or 100")),
        }
    }
}

impl fmt::Display for BoxSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.cm())
    }
}

// =============================================================================
// Weight
// =============================================================================

/// Unit a vendor declared a product's weight in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightUnit {
    Gram,
    Kilogram,
}

/// A product weight tagged with its unit.
///
/// Packing only ever looks at [`Weight::grams`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weight {
    pub value: u64,
    pub unit: WeightUnit,
}

impl Weight {
    pub const fn grams(value: u64) -> Self {
        Weight {
            value,
            unit: WeightUnit::Gram,
        }
    }

    pub const fn kilograms(value: u64) -> Self {
        Weight {
            value,
            unit: WeightUnit::Kilogram,
        }
    }

    /// Normalises to grams.
    pub const fn in_grams(&self) -> u64 {
        match self.unit {
            WeightUnit::Gram => self.value,
            WeightUnit::Kilogram => self.value * 1000,
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product as the checkout engine sees it.
///
/// `price` is the price captured at `revision`; order history keeps pointing
/// at the revision, so a later price change never rewrites a placed order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: String,

    pub seller_id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub delivery_type: DeliveryType,

    pub weight: Weight,

    /// Percentage of a size-60 box one unit occupies (0-100).
    pub box60_rate: u8,

    /// Percentage of a size-80 box one unit occupies (0-100).
    pub box80_rate: u8,

    /// Percentage of a size-100 box one unit occupies (0-100).
    pub box100_rate: u8,

    /// Units currently in stock.
    pub inventory: u32,

    /// Unit price at the current revision.
    pub price: Money,

    /// Price revision the `price` was read from.
    #[serde(default)]
    pub revision: u32,
}

impl Product {
    /// Occupancy rate of one unit for the given tier.
    #[inline]
    pub fn rate_for(&self, size: BoxSize) -> u8 {
        match size {
            BoxSize::Size60 => self.box60_rate,
            BoxSize::Size80 => self.box80_rate,
            BoxSize::Size100 => self.box100_rate,
        }
    }

    /// Weight of one unit in grams.
    #[inline]
    pub fn weight_grams(&self) -> u64 {
        self.weight.in_grams()
    }
}

// =============================================================================
// Cart Item & Basket
// =============================================================================

/// One line of a shopper's cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: String,
    pub quantity: u32,
}

impl CartItem {
    pub fn new(product_id: impl Into<String>, quantity: u32) -> Self {
        CartItem {
            product_id: product_id.into(),
            quantity,
        }
    }
}

/// One physical shipment: a numbered box holding items from a single seller
/// and delivery type.
///
/// Baskets are rebuilt from scratch on every repack, never edited in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartBasket {
    pub box_number: u32,
    pub delivery_type: DeliveryType,
    pub box_size: BoxSize,
    pub items: Vec<CartItem>,
    pub seller_id: String,
}

impl CartBasket {
    /// Total number of units in the box.
    pub fn unit_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}

// =============================================================================
// Order Payment Summary
// =============================================================================

/// Final money breakdown of an order, all values in yen.
///
/// `total` is tax-inclusive; `tax` is the portion of `total` that is tax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPaymentSummary {
    pub subtotal: Money,
    pub discount: Money,
    pub shipping_fee: Money,
    pub tax: Money,
    /// Tax rate in whole percent.
    pub tax_rate: u32,
    pub total: Money,
}

impl OrderPaymentSummary {
    /// A summary with every amount zero, carrying only the tax rate.
    pub const fn empty(tax_rate: TaxRate) -> Self {
        OrderPaymentSummary {
            subtotal: Money::zero(),
            discount: Money::zero(),
            shipping_fee: Money::zero(),
            tax: Money::zero(),
            tax_rate: tax_rate.percent(),
            total: Money::zero(),
        }
    }
}

// =============================================================================
// Experience Orders
// =============================================================================

/// Participant counts for a bookable experience, one field per price category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceHeadcount {
    #[serde(default)]
    pub adult: u32,
    #[serde(default)]
    pub junior_high_school: u32,
    #[serde(default)]
    pub elementary_school: u32,
    #[serde(default)]
    pub preschool: u32,
    #[serde(default)]
    pub senior: u32,
}

impl ExperienceHeadcount {
    pub fn total(&self) -> u32 {
        self.adult + self.junior_high_school + self.elementary_school + self.preschool + self.senior
    }
}

/// Per-person price for each experience category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperiencePrices {
    #[serde(default)]
    pub adult: Money,
    #[serde(default)]
    pub junior_high_school: Money,
    #[serde(default)]
    pub elementary_school: Money,
    #[serde(default)]
    pub preschool: Money,
    #[serde(default)]
    pub senior: Money,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tax_rate_decimal() {
        assert_eq!(TaxRate::STANDARD.percent(), 10);
        assert_eq!(TaxRate::STANDARD.as_decimal(), Decimal::new(10, 2));
        assert_eq!(TaxRate::default(), TaxRate::STANDARD);
    }

    #[test]
    fn test_box_size_serde_as_integer() {
        assert_eq!(serde_json::to_string(&BoxSize::Size80).unwrap(), "80");
        let size: BoxSize = serde_json::from_str("100").unwrap();
        assert_eq!(size, BoxSize::Size100);
        assert!(serde_json::from_str::<BoxSize>("120").is_err());
    }

    #[test]
    fn test_box_size_order() {
        assert!(BoxSize::Size60 < BoxSize::Size80);
        assert!(BoxSize::Size80 < BoxSize::Size100);
    }

    #[test]
    fn test_weight_normalisation() {
        assert_eq!(Weight::grams(2500).in_grams(), 2500);
        assert_eq!(Weight::kilograms(3).in_grams(), 3000);
    }

    #[test]
    fn test_delivery_type_cold_chain() {
        assert!(!DeliveryType::Normal.requires_cold_chain());
        assert!(DeliveryType::Refrigerated.requires_cold_chain());
        assert!(DeliveryType::Frozen.requires_cold_chain());
        assert!(!DeliveryType::Pickup.requires_cold_chain());
        assert_eq!(DeliveryType::Frozen.code(), 3);
    }

    #[test]
    fn test_empty_summary() {
        let summary = OrderPaymentSummary::empty(TaxRate::STANDARD);
        assert_eq!(summary.tax_rate, 10);
        assert!(summary.total.is_zero());
        assert!(summary.subtotal.is_zero());
    }

    #[test]
    fn test_headcount_total() {
        let heads = ExperienceHeadcount {
            adult: 2,
            elementary_school: 1,
            senior: 1,
            ..Default::default()
        };
        assert_eq!(heads.total(), 4);
    }
}
