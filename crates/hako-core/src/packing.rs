//! # Basket Packing
//!
//! Repacks a shopper's cart into numbered shipping boxes.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Basket Packer Pipeline                           │
//! │                                                                         │
//! │  existing baskets / cart items                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  1. Merge & clamp ── sum per product, drop missing, clamp to inventory │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  2. Expand ───────── one record per unit                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  3. Group ────────── by (seller_id, delivery_type)                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  4. Sort ─────────── box-100 rate descending (stable)                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  5. Greedy fill ──── 100% occupancy + size-100 weight budget per box   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  6. Classify ─────── smallest tier (60 → 80 → 100) that still fits     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  7. Number ───────── 1, 2, 3 … across groups in key order              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Pack Large, Classify Small
//! Every box is filled against the size-100 budget, even when it is later
//! classified as a 60 or 80. Which units end up together depends on this, so
//! it must stay as is: changing it changes shoppers' shipping costs.
//!
//! ## Usage
//! ```rust
//! use std::collections::HashMap;
//! use hako_core::packing::BasketPacker;
//! use hako_core::types::{BoxSize, CartItem, DeliveryType, Product, Weight};
//! use hako_core::Money;
//!
//! let rice = Product {
//!     id: "rice-5kg".into(),
//!     seller_id: "farm-1".into(),
//!     name: "Rice 2.5kg".into(),
//!     delivery_type: DeliveryType::Normal,
//!     weight: Weight::grams(2500),
//!     box60_rate: 20,
//!     box80_rate: 10,
//!     box100_rate: 5,
//!     inventory: 10,
//!     price: Money::from_yen(1800),
//!     revision: 1,
//! };
//! let catalog = HashMap::from([(rice.id.clone(), rice)]);
//!
//! let baskets = BasketPacker::default()
//!     .pack_items(&[CartItem::new("rice-5kg", 5)], &catalog)
//!     .unwrap();
//!
//! assert_eq!(baskets.len(), 2);
//! assert_eq!(baskets[0].box_size, BoxSize::Size100);
//! assert_eq!(baskets[1].box_size, BoxSize::Size80);
//! ```

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{BoxSize, CartBasket, CartItem, DeliveryType, Product};
use crate::validation::{validate_box_limits, validate_product};

/// Occupancy budget of an empty box, in percent.
pub const FULL_OCCUPANCY: u32 = 100;

// =============================================================================
// Box Size Limits
// =============================================================================

/// Weight caps per box tier, in grams.
///
/// The size-100 cap doubles as the packing budget for every box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxSizeLimits {
    #[serde(default = "default_box60_grams")]
    pub box60_grams: u64,

    #[serde(default = "default_box80_grams")]
    pub box80_grams: u64,

    #[serde(default = "default_box100_grams")]
    pub box100_grams: u64,
}

fn default_box60_grams() -> u64 {
    2_000
}

fn default_box80_grams() -> u64 {
    5_000
}

fn default_box100_grams() -> u64 {
    10_000
}

impl Default for BoxSizeLimits {
    fn default() -> Self {
        BoxSizeLimits {
            box60_grams: default_box60_grams(),
            box80_grams: default_box80_grams(),
            box100_grams: default_box100_grams(),
        }
    }
}

impl BoxSizeLimits {
    /// Weight cap of a tier.
    pub fn limit(&self, size: BoxSize) -> u64 {
        match size {
            BoxSize::Size60 => self.box60_grams,
            BoxSize::Size80 => self.box80_grams,
            BoxSize::Size100 => self.box100_grams,
        }
    }

    /// Weight budget a box is filled against, whatever tier it ends up in.
    pub fn packing_budget(&self) -> u64 {
        self.box100_grams
    }

    /// Checks the caps are positive and grow with the tier.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_box_limits(self)
    }
}

// =============================================================================
// Product Catalog
// =============================================================================

/// Read access to the live product catalog.
pub trait ProductCatalog {
    fn product(&self, product_id: &str) -> Option<&Product>;
}

impl ProductCatalog for HashMap<String, Product> {
    fn product(&self, product_id: &str) -> Option<&Product> {
        self.get(product_id)
    }
}

impl ProductCatalog for BTreeMap<String, Product> {
    fn product(&self, product_id: &str) -> Option<&Product> {
        self.get(product_id)
    }
}

impl ProductCatalog for [Product] {
    fn product(&self, product_id: &str) -> Option<&Product> {
        self.iter().find(|p| p.id == product_id)
    }
}

impl ProductCatalog for Vec<Product> {
    fn product(&self, product_id: &str) -> Option<&Product> {
        self.as_slice().product(product_id)
    }
}

// =============================================================================
// Shipment Group
// =============================================================================

/// Units sharing a seller and delivery type ship together.
///
/// Field order defines box numbering order: seller first, then delivery type.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct ShipmentKey {
    seller_id: String,
    delivery_type: DeliveryType,
}

// =============================================================================
// Basket Packer
// =============================================================================

/// Greedy largest-occupancy-first, first-fit box packer.
///
/// Stateless apart from its limits; safe to share across threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasketPacker {
    limits: BoxSizeLimits,
}

impl BasketPacker {
    pub fn new(limits: BoxSizeLimits) -> Self {
        BasketPacker { limits }
    }

    pub fn limits(&self) -> &BoxSizeLimits {
        &self.limits
    }

    /// Repacks existing baskets into a fresh set of baskets.
    pub fn pack<C>(&self, baskets: &[CartBasket], catalog: &C) -> CoreResult<Vec<CartBasket>>
    where
        C: ProductCatalog + ?Sized,
    {
        let items: Vec<CartItem> = baskets
            .iter()
            .flat_map(|basket| basket.items.iter().cloned())
            .collect();
        self.pack_items(&items, catalog)
    }

    /// Packs cart items into numbered baskets.
    ///
    /// ## Errors
    /// - [`CoreError::InvalidProduct`] if a referenced product declares an
    ///   occupancy rate above 100
    ///
    /// Items whose product is missing from the catalog are dropped silently.
    pub fn pack_items<C>(&self, items: &[CartItem], catalog: &C) -> CoreResult<Vec<CartBasket>>
    where
        C: ProductCatalog + ?Sized,
    {
        let lines = merge_and_clamp(items, catalog)?;

        let mut groups: BTreeMap<ShipmentKey, Vec<&Product>> = BTreeMap::new();
        for (product, quantity) in lines {
            let key = ShipmentKey {
                seller_id: product.seller_id.clone(),
                delivery_type: product.delivery_type,
            };
            let units = groups.entry(key).or_default();
            units.extend(std::iter::repeat(product).take(quantity as usize));
        }

        let mut baskets = Vec::new();
        let mut box_number = 0u32;
        for (key, mut units) in groups {
            // sort_by is stable: equal rates keep cart order
            units.sort_by(|a, b| b.box100_rate.cmp(&a.box100_rate));

            for contents in self.fill_boxes(units) {
                box_number += 1;
                let box_size = self.classify(&contents);
                debug!(
                    box_number,
                    seller_id = %key.seller_id,
                    delivery_type = %key.delivery_type,
                    %box_size,
                    units = contents.len(),
                    "Box closed"
                );
                baskets.push(CartBasket {
                    box_number,
                    delivery_type: key.delivery_type,
                    box_size,
                    items: collapse_units(&contents),
                    seller_id: key.seller_id.clone(),
                });
            }
        }

        Ok(baskets)
    }

    /// Splits sorted units into boxes, first-fit against the size-100 budget.
    fn fill_boxes<'a>(&self, mut pending: Vec<&'a Product>) -> Vec<Vec<&'a Product>> {
        let mut boxes = Vec::new();

        while !pending.is_empty() {
            let mut occupancy_left = FULL_OCCUPANCY;
            let mut weight_left = self.limits.packing_budget();
            let mut packed = Vec::new();
            let mut deferred = Vec::new();

            for unit in pending {
                let rate = u32::from(unit.box100_rate);
                let weight = unit.weight_grams();
                if rate <= occupancy_left && weight <= weight_left {
                    occupancy_left -= rate;
                    weight_left -= weight;
                    packed.push(unit);
                } else {
                    deferred.push(unit);
                }
            }

            // An empty box rejected the heaviest remaining unit: it can never fit,
            // so it ships alone.
            if packed.is_empty() && !deferred.is_empty() {
                let unit = deferred.remove(0);
                warn!(
                    product_id = %unit.id,
                    weight_grams = unit.weight_grams(),
                    budget_grams = self.limits.packing_budget(),
                    "Unit exceeds the box budget, packing it alone"
                );
                packed.push(unit);
            }

            boxes.push(packed);
            pending = deferred;
        }

        boxes
    }

    /// Smallest tier whose occupancy and weight caps both hold.
    pub fn classify(&self, units: &[&Product]) -> BoxSize {
        let weight: u64 = units.iter().map(|u| u.weight_grams()).sum();

        BoxSize::ALL
            .into_iter()
            .find(|&size| {
                let occupancy: u32 = units.iter().map(|u| u32::from(u.rate_for(size))).sum();
                occupancy <= FULL_OCCUPANCY && weight <= self.limits.limit(size)
            })
            .unwrap_or(BoxSize::Size100)
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Sums quantities per product in first-seen order, drops products the
/// catalog no longer has and clamps to inventory.
fn merge_and_clamp<'a, C>(items: &[CartItem], catalog: &'a C) -> CoreResult<Vec<(&'a Product, u32)>>
where
    C: ProductCatalog + ?Sized,
{
    let mut order: Vec<&str> = Vec::new();
    let mut totals: HashMap<&str, u32> = HashMap::new();
    for item in items {
        let total = totals.entry(item.product_id.as_str()).or_insert_with(|| {
            order.push(item.product_id.as_str());
            0
        });
        *total = total.saturating_add(item.quantity);
    }

    let mut lines = Vec::with_capacity(order.len());
    for product_id in order {
        let requested = totals.get(product_id).copied().unwrap_or_default();

        let Some(product) = catalog.product(product_id) else {
            debug!(product_id, "Product no longer in catalog, dropping from cart");
            continue;
        };

        validate_product(product).map_err(|e| CoreError::InvalidProduct {
            product_id: product.id.clone(),
            reason: e.to_string(),
        })?;

        let quantity = requested.min(product.inventory);
        if quantity < requested {
            debug!(
                product_id,
                requested,
                inventory = product.inventory,
                "Clamping quantity to inventory"
            );
        }
        if quantity == 0 {
            continue;
        }

        lines.push((product, quantity));
    }

    Ok(lines)
}

/// Folds a box's units back into cart lines, in first-seen order.
fn collapse_units(units: &[&Product]) -> Vec<CartItem> {
    let mut items: Vec<CartItem> = Vec::new();
    for unit in units {
        match items.iter_mut().find(|item| item.product_id == unit.id) {
            Some(item) => item.quantity += 1,
            None => items.push(CartItem::new(unit.id.clone(), 1)),
        }
    }
    items
}

// =============================================================================
// Unit Tests
// =============================================================================
