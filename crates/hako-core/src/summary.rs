//! # Order Payment Summary
//!
//! Computes the final money breakdown for product and experience orders.
//!
//! ## Product Order Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Product Order Summary                                │
//! │                                                                         │
//! │  packed baskets + catalog                                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  subtotal = Σ price × quantity ──── unknown product? ──► ProductNotFound│
//! │       │                                                                 │
//! │       ├── subtotal == 0 ──► empty summary (tax rate only)              │
//! │       ▼                                                                 │
//! │  shipping_fee = Σ per-box fee ──── region unknown? ──► 0               │
//! │       │                          no rate?        ──► ShippingRateNotFound│
//! │       ▼                                                                 │
//! │  discount = Promotion::calc_discount(subtotal, shipping_fee)            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  total = subtotal + shipping_fee − discount                             │
//! │  tax   = floor(total / 1.10 × 0.10)                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every error is raised before a summary is built; there are no partial
//! summaries.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::packing::ProductCatalog;
use crate::shipping::{RegionCode, SellerShipping};
use crate::types::{
    CartBasket, ExperienceHeadcount, ExperiencePrices, OrderPaymentSummary, TaxRate,
};

// =============================================================================
// Promotion
// =============================================================================

/// A discount policy applied to an order.
///
/// The policy itself (fixed amount, percentage, free shipping) lives outside
/// this crate; the calculator only asks for the resulting discount.
pub trait Promotion {
    fn calc_discount(&self, subtotal: Money, shipping_fee: Money) -> Money;
}

/// No discount.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPromotion;

impl Promotion for NoPromotion {
    fn calc_discount(&self, _subtotal: Money, _shipping_fee: Money) -> Money {
        Money::zero()
    }
}

impl<F> Promotion for F
where
    F: Fn(Money, Money) -> Money,
{
    fn calc_discount(&self, subtotal: Money, shipping_fee: Money) -> Money {
        self(subtotal, shipping_fee)
    }
}

// =============================================================================
// Shipping Breakdown
// =============================================================================

/// Shipping fee charged for one box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasketShippingFee {
    pub box_number: u32,
    pub fee: Money,
}

// =============================================================================
// Calculator
// =============================================================================

/// Builds [`OrderPaymentSummary`] values.
///
/// ## Example
/// ```rust
/// use hako_core::summary::PaymentSummaryCalculator;
/// use hako_core::types::{ExperienceHeadcount, ExperiencePrices, TaxRate};
/// use hako_core::Money;
///
/// let heads = ExperienceHeadcount { adult: 2, preschool: 1, ..Default::default() };
/// let prices = ExperiencePrices {
///     adult: Money::from_yen(5500),
///     preschool: Money::from_yen(1100),
///     ..Default::default()
/// };
///
/// let calculator = PaymentSummaryCalculator::new(TaxRate::STANDARD)
///     .with_promotion(|_subtotal: Money, _shipping: Money| Money::from_yen(1100));
/// let summary = calculator.experience_summary(&heads, &prices);
///
/// assert_eq!(summary.subtotal.yen(), 12100);
/// assert_eq!(summary.total.yen(), 11000);
/// assert_eq!(summary.tax.yen(), 1000);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PaymentSummaryCalculator<P = NoPromotion> {
    tax_rate: TaxRate,
    promotion: P,
}

impl Default for PaymentSummaryCalculator {
    fn default() -> Self {
        PaymentSummaryCalculator::new(TaxRate::STANDARD)
    }
}

impl PaymentSummaryCalculator {
    pub fn new(tax_rate: TaxRate) -> Self {
        PaymentSummaryCalculator {
            tax_rate,
            promotion: NoPromotion,
        }
    }
}

impl<P: Promotion> PaymentSummaryCalculator<P> {
    /// Replaces the promotion applied to every summary.
    pub fn with_promotion<Q: Promotion>(self, promotion: Q) -> PaymentSummaryCalculator<Q> {
        PaymentSummaryCalculator {
            tax_rate: self.tax_rate,
            promotion,
        }
    }

    pub fn tax_rate(&self) -> TaxRate {
        self.tax_rate
    }

    /// Summary for a product order.
    ///
    /// `region` is the destination prefecture; `None` leaves shipping at zero.
    ///
    /// ## Errors
    /// - [`CoreError::ProductNotFound`] if a basket item is missing from `catalog`
    /// - [`CoreError::ShippingRateNotFoundForSize`] if a box's region has no rate
    pub fn product_summary<C, S>(
        &self,
        baskets: &[CartBasket],
        catalog: &C,
        shipping: &S,
        region: Option<RegionCode>,
    ) -> CoreResult<OrderPaymentSummary>
    where
        C: ProductCatalog + ?Sized,
        S: SellerShipping + ?Sized,
    {
        let (subtotal, seller_subtotals) = price_baskets(baskets, catalog)?;
        if subtotal.is_zero() {
            return Ok(OrderPaymentSummary::empty(self.tax_rate));
        }

        let shipping_fee = match region {
            Some(region) => self
                .fees_for(baskets, &seller_subtotals, shipping, region)?
                .into_iter()
                .map(|f| f.fee)
                .sum(),
            None => {
                debug!("Destination region unknown, skipping shipping fee");
                Money::zero()
            }
        };

        Ok(self.finish(subtotal, shipping_fee))
    }

    /// Per-box shipping fees for a product order.
    pub fn shipping_fees<C, S>(
        &self,
        baskets: &[CartBasket],
        catalog: &C,
        shipping: &S,
        region: RegionCode,
    ) -> CoreResult<Vec<BasketShippingFee>>
    where
        C: ProductCatalog + ?Sized,
        S: SellerShipping + ?Sized,
    {
        let (_, seller_subtotals) = price_baskets(baskets, catalog)?;
        self.fees_for(baskets, &seller_subtotals, shipping, region)
    }

    /// Summary for an experience booking. Experiences never ship.
    pub fn experience_summary(
        &self,
        headcount: &ExperienceHeadcount,
        prices: &ExperiencePrices,
    ) -> OrderPaymentSummary {
        let subtotal = prices.adult * headcount.adult
            + prices.junior_high_school * headcount.junior_high_school
            + prices.elementary_school * headcount.elementary_school
            + prices.preschool * headcount.preschool
            + prices.senior * headcount.senior;

        if subtotal.is_zero() {
            return OrderPaymentSummary::empty(self.tax_rate);
        }

        self.finish(subtotal, Money::zero())
    }

    fn fees_for<S>(
        &self,
        baskets: &[CartBasket],
        seller_subtotals: &HashMap<&str, Money>,
        shipping: &S,
        region: RegionCode,
    ) -> CoreResult<Vec<BasketShippingFee>>
    where
        S: SellerShipping + ?Sized,
    {
        let mut fees = Vec::with_capacity(baskets.len());
        for basket in baskets {
            let fee = match shipping.revision_for(&basket.seller_id) {
                Some(revision) => {
                    let seller_total = seller_subtotals
                        .get(basket.seller_id.as_str())
                        .copied()
                        .unwrap_or_default();
                    revision.calc_shipping_fee(
                        basket.box_size,
                        basket.delivery_type,
                        seller_total,
                        region,
                    )?
                }
                None => Money::zero(),
            };
            fees.push(BasketShippingFee {
                box_number: basket.box_number,
                fee,
            });
        }
        Ok(fees)
    }

    fn finish(&self, subtotal: Money, shipping_fee: Money) -> OrderPaymentSummary {
        let discount = self.promotion.calc_discount(subtotal, shipping_fee);
        let total = subtotal + shipping_fee - discount;
        let tax = total.extract_inclusive_tax(self.tax_rate);

        debug!(
            subtotal = subtotal.yen(),
            shipping_fee = shipping_fee.yen(),
            discount = discount.yen(),
            total = total.yen(),
            tax = tax.yen(),
            "Payment summary calculated"
        );

        OrderPaymentSummary {
            subtotal,
            discount,
            shipping_fee,
            tax,
            tax_rate: self.tax_rate.percent(),
            total,
        }
    }
}

/// Order subtotal plus the subtotal of each seller's items.
fn price_baskets<'b, C>(
    baskets: &'b [CartBasket],
    catalog: &C,
) -> CoreResult<(Money, HashMap<&'b str, Money>)>
where
    C: ProductCatalog + ?Sized,
{
    let mut subtotal = Money::zero();
    let mut per_seller: HashMap<&str, Money> = HashMap::new();

    for basket in baskets {
        for item in &basket.items {
            let product = catalog
                .product(&item.product_id)
                .ok_or_else(|| CoreError::ProductNotFound(item.product_id.clone()))?;
            let line = product.price * item.quantity;
            subtotal += line;
            *per_seller.entry(basket.seller_id.as_str()).or_default() += line;
        }
    }

    Ok((subtotal, per_seller))
}

// =============================================================================
// Unit Tests
// =============================================================================
