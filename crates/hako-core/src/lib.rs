//! # hako-core: Checkout Pricing and Basket Packing
//!
//! This crate turns a shopping cart into shipping boxes and a payment
//! summary. It contains the business logic only, as pure functions with no
//! I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Hako Checkout Engine                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  hako-quote (CLI / host service)                │   │
//! │  │     loads catalog, seller rate tables, request JSON, config     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ hako-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  packing  │  │ shipping  │  │  summary  │  │ validation│  │   │
//! │  │   │  Basket   │  │   Rate    │  │  Payment  │  │   Credit  │  │   │
//! │  │   │  Packer   │  │  Tables   │  │  Summary  │  │   Card    │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐                  │   │
//! │  │   │   types   │  │   money   │  │   error   │                  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘                  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, CartBasket, OrderPaymentSummary, etc.)
//! - [`money`] - Integer yen with tax-inclusive extraction
//! - [`packing`] - Greedy basket packer and box size classification
//! - [`shipping`] - Seller shipping rate tables per box size and region
//! - [`summary`] - Order payment summary calculator
//! - [`validation`] - Credit card and product rule checks
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same cart, catalog and rate table give the same boxes
//! 2. **No I/O**: catalogs and rate tables are passed in through traits
//! 3. **Integer Money**: all amounts are whole yen (i64)
//! 4. **Explicit Errors**: all errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use std::collections::HashMap;
//!
//! use hako_core::{BasketPacker, CartItem, DeliveryType, Money, Product, Weight};
//!
//! let jam = Product {
//!     id: "jam".into(),
//!     seller_id: "farm".into(),
//!     name: "Strawberry jam".into(),
//!     delivery_type: DeliveryType::Normal,
//!     weight: Weight::grams(2500),
//!     box60_rate: 50,
//!     box80_rate: 30,
//!     box100_rate: 20,
//!     inventory: 10,
//!     price: Money::from_yen(1200),
//!     revision: 1,
//! };
//! let catalog = HashMap::from([(jam.id.clone(), jam)]);
//!
//! let boxes = BasketPacker::default()
//!     .pack_items(&[CartItem::new("jam", 5)], &catalog)
//!     .unwrap();
//!
//! // 10kg fits four jars; the fifth goes in a second box.
//! assert_eq!(boxes.len(), 2);
//! assert_eq!(boxes[0].unit_count(), 4);
//! assert_eq!(boxes[1].unit_count(), 1);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod packing;
pub mod shipping;
pub mod summary;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CardError, CoreError, CoreResult, RateTableError, ValidationError};
pub use money::Money;
pub use packing::{BasketPacker, BoxSizeLimits, ProductCatalog};
pub use shipping::{BoxShipping, RegionCode, SellerShipping, ShippingRate, ShippingRevision};
pub use summary::{BasketShippingFee, NoPromotion, PaymentSummaryCalculator, Promotion};
pub use types::*;
pub use validation::CreditCard;
