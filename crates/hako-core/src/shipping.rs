//! # Shipping Rates
//!
//! One seller's shipping rate configuration and fee lookups.
//!
//! ## Structure
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    ShippingRevision (one seller)                        │
//! │                                                                         │
//! │   box60  ──► BoxShipping { rates: [ShippingRate…], cold_surcharge }    │
//! │   box80  ──► BoxShipping { rates: [ShippingRate…], cold_surcharge }    │
//! │   box100 ──► BoxShipping { rates: [ShippingRate…], cold_surcharge }    │
//! │   free_shipping_threshold: Option<Money>                                │
//! │                                                                         │
//! │   ShippingRate { number: 1, name: "Kanto", price: ¥800,                 │
//! │                  regions: [8, 9, 10, 11, 12, 13, 14] }                  │
//! │                                                                         │
//! │   Invariant per box size: the rates' regions partition the 47          │
//! │   prefectures exactly. No gaps, no overlaps.                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Fee Lookup
//! ```text
//! calc_shipping_fee(box_size, delivery_type, total_amount, region)
//!      │
//!      ├── free shipping enabled and total_amount >= threshold ──► ¥0
//!      │
//!      └── base rate (box_size, region)
//!            + cold_surcharge   if refrigerated / frozen
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CoreError, CoreResult, RateTableError};
use crate::money::Money;
use crate::types::{BoxSize, DeliveryType};

/// Region code; prefectures are numbered 1-47 (JIS X 0401).
pub type RegionCode = u8;

/// Prefecture names indexed by `code - 1`.
pub const PREFECTURES: [&str; 47] = [
    "Hokkaido", "Aomori", "Iwate", "Miyagi", "Akita", "Yamagata", "Fukushima",
    "Ibaraki", "Tochigi", "Gunma", "Saitama", "Chiba", "Tokyo", "Kanagawa",
    "Niigata", "Toyama", "Ishikawa", "Fukui", "Yamanashi", "Nagano", "Gifu",
    "Shizuoka", "Aichi", "Mie", "Shiga", "Kyoto", "Osaka", "Hyogo", "Nara",
    "Wakayama", "Tottori", "Shimane", "Okayama", "Hiroshima", "Yamaguchi",
    "Tokushima", "Kagawa", "Ehime", "Kochi", "Fukuoka", "Saga", "Nagasaki",
    "Kumamoto", "Oita", "Miyazaki", "Kagoshima", "Okinawa",
];

/// The full known region set: every prefecture code.
pub fn known_regions() -> BTreeSet<RegionCode> {
    (1..=PREFECTURES.len() as RegionCode).collect()
}

/// Prefecture name for a region code.
pub fn prefecture_name(code: RegionCode) -> Option<&'static str> {
    PREFECTURES.get(usize::from(code).checked_sub(1)?).copied()
}

// =============================================================================
// Shipping Rate
// =============================================================================

/// One price tier covering a set of regions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingRate {
    /// Unique within its box size, starting at 1.
    pub number: i64,
    pub name: String,
    pub price: Money,
    pub regions: Vec<RegionCode>,
}

impl ShippingRate {
    pub fn new(
        number: i64,
        name: impl Into<String>,
        price: Money,
        regions: impl IntoIterator<Item = RegionCode>,
    ) -> Self {
        ShippingRate {
            number,
            name: name.into(),
            price,
            regions: regions.into_iter().collect(),
        }
    }

    pub fn covers(&self, region: RegionCode) -> bool {
        self.regions.contains(&region)
    }
}

// =============================================================================
// Box Shipping
// =============================================================================

/// Rates and cold-chain surcharge for one box size.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxShipping {
    pub rates: Vec<ShippingRate>,

    /// Added to the base rate for refrigerated and frozen boxes.
    #[serde(default)]
    pub cold_surcharge: Money,
}

impl BoxShipping {
    pub fn new(rates: Vec<ShippingRate>, cold_surcharge: Money) -> Self {
        BoxShipping {
            rates,
            cold_surcharge,
        }
    }

    /// Checks the rates partition `known` exactly.
    ///
    /// ## Checks (first failure wins)
    /// 1. at least one rate
    /// 2. per rate: number >= 1, number unique, price >= 0,
    ///    every region known, no region claimed twice
    /// 3. surcharge >= 0
    /// 4. every known region covered
    pub fn validate_against(
        &self,
        box_size: BoxSize,
        known: &BTreeSet<RegionCode>,
    ) -> Result<(), RateTableError> {
        if self.rates.is_empty() {
            return Err(RateTableError::EmptyRates { box_size });
        }

        let mut numbers = BTreeSet::new();
        let mut covered = BTreeSet::new();

        for rate in &self.rates {
            if rate.number < 1 {
                return Err(RateTableError::InvalidNumber {
                    box_size,
                    number: rate.number,
                });
            }
            if !numbers.insert(rate.number) {
                return Err(RateTableError::DuplicateNumber {
                    box_size,
                    number: rate.number,
                });
            }
            if rate.price.is_negative() {
                return Err(RateTableError::NegativePrice {
                    box_size,
                    number: rate.number,
                    price: rate.price.yen(),
                });
            }
            for &region in &rate.regions {
                if !known.contains(&region) {
                    return Err(RateTableError::UnknownRegion {
                        box_size,
                        number: rate.number,
                        region,
                    });
                }
                if !covered.insert(region) {
                    return Err(RateTableError::OverlappingRegion { box_size, region });
                }
            }
        }

        if self.cold_surcharge.is_negative() {
            return Err(RateTableError::NegativeSurcharge {
                box_size,
                surcharge: self.cold_surcharge.yen(),
            });
        }

        let missing: Vec<RegionCode> = known.difference(&covered).copied().collect();
        if !missing.is_empty() {
            return Err(RateTableError::MissingRegions { box_size, missing });
        }

        Ok(())
    }

    /// The rate covering `region`.
    ///
    /// Unreachable after validation, but a hand-built table may still miss.
    pub fn find(&self, region: RegionCode) -> CoreResult<&ShippingRate> {
        self.rates
            .iter()
            .find(|rate| rate.covers(region))
            .ok_or(CoreError::ShippingRateNotFound { region })
    }
}

// =============================================================================
// Shipping Revision
// =============================================================================

/// A seller's shipping configuration at one revision.
///
/// Orders keep the revision they were priced with, so editing rates never
/// changes the shipping fee of an order already placed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingRevision {
    #[serde(default)]
    pub revision: u32,

    pub box60: BoxShipping,
    pub box80: BoxShipping,
    pub box100: BoxShipping,

    /// Orders at or above this amount ship free. `None` disables free shipping.
    #[serde(default)]
    pub free_shipping_threshold: Option<Money>,
}

impl ShippingRevision {
    /// Rates for one box size.
    pub fn box_shipping(&self, size: BoxSize) -> &BoxShipping {
        match size {
            BoxSize::Size60 => &self.box60,
            BoxSize::Size80 => &self.box80,
            BoxSize::Size100 => &self.box100,
        }
    }

    /// Validates against the 47 prefectures.
    pub fn validate(&self) -> Result<(), RateTableError> {
        self.validate_against(&known_regions())
    }

    /// Validates every box size against an explicit region set.
    pub fn validate_against(&self, known: &BTreeSet<RegionCode>) -> Result<(), RateTableError> {
        for size in BoxSize::ALL {
            self.box_shipping(size).validate_against(size, known)?;
        }

        if let Some(threshold) = self.free_shipping_threshold {
            if threshold.is_negative() {
                return Err(RateTableError::InvalidFreeShippingThreshold(threshold.yen()));
            }
        }

        debug!(revision = self.revision, "Shipping revision validated");
        Ok(())
    }

    /// The base rate for a box size and region.
    pub fn find(&self, size: BoxSize, region: RegionCode) -> CoreResult<&ShippingRate> {
        self.box_shipping(size).find(region)
    }

    /// Returns true if `total_amount` qualifies for free shipping.
    pub fn ships_free(&self, total_amount: Money) -> bool {
        self.free_shipping_threshold
            .is_some_and(|threshold| total_amount >= threshold)
    }

    /// Fee for one box.
    ///
    /// ## Errors
    /// - [`CoreError::ShippingRateNotFoundForSize`] if no rate covers the region
    ///   and the order does not ship free
    pub fn calc_shipping_fee(
        &self,
        box_size: BoxSize,
        delivery_type: DeliveryType,
        total_amount: Money,
        region: RegionCode,
    ) -> CoreResult<Money> {
        if self.ships_free(total_amount) {
            return Ok(Money::zero());
        }

        let shipping = self.box_shipping(box_size);
        let rate = shipping
            .find(region)
            .map_err(|_| CoreError::ShippingRateNotFoundForSize { box_size, region })?;

        let surcharge = if delivery_type.requires_cold_chain() {
            shipping.cold_surcharge
        } else {
            Money::zero()
        };

        Ok(rate.price + surcharge)
    }
}

// =============================================================================
// Seller Lookup
// =============================================================================

/// Finds the shipping revision a seller currently prices with.
///
/// A seller without a revision ships for free.
pub trait SellerShipping {
    fn revision_for(&self, seller_id: &str) -> Option<&ShippingRevision>;
}

impl SellerShipping for HashMap<String, ShippingRevision> {
    fn revision_for(&self, seller_id: &str) -> Option<&ShippingRevision> {
        self.get(seller_id)
    }
}

impl SellerShipping for BTreeMap<String, ShippingRevision> {
    fn revision_for(&self, seller_id: &str) -> Option<&ShippingRevision> {
        self.get(seller_id)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
