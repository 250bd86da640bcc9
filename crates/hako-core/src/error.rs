//! # Error Types
//!
//! Domain-specific error types for hako-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  CoreError             - Umbrella for every engine operation            │
//! │  ├── ProductNotFound / ShippingRateNotFound   (caller refreshes data)   │
//! │  ├── RateTableError    - Invalid shipping configuration (fatal)         │
//! │  ├── CardError         - Payment instrument rejected (user-actionable)  │
//! │  └── ValidationError   - Generic field validation failures              │
//! │                                                                         │
//! │  Flow: RateTableError ──► rejected at config-load time                 │
//! │        CardError ───────► shown to the shopper as-is                   │
//! │        NotFound ────────► caller re-fetches catalog/rates, retries     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product ID, region, box size)
//! 3. Errors are enum variants, never String
//! 4. No partial results: an error means nothing was computed

use thiserror::Error;

use crate::types::BoxSize;

// =============================================================================
// Core Error
// =============================================================================

/// Core checkout engine errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A basket item references a product absent from the supplied catalog.
    ///
    /// ## When This Occurs
    /// - Product was removed between packing and summary calculation
    /// - Caller passed a catalog slice that doesn't cover the baskets
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// No shipping rate covers the destination region.
    #[error("Shipping rate not found for region {region}")]
    ShippingRateNotFound { region: u8 },

    /// No shipping rate covers the destination region for a given box size.
    #[error("Shipping rate not found for box size {box_size} in region {region}")]
    ShippingRateNotFoundForSize { box_size: BoxSize, region: u8 },

    /// Product data is unusable for packing (e.g., occupancy rate over 100).
    #[error("Invalid product {product_id}: {reason}")]
    InvalidProduct { product_id: String, reason: String },

    /// Shipping rate configuration is invalid.
    #[error("Invalid shipping rate table: {0}")]
    InvalidRateTable(#[from] RateTableError),

    /// Credit card rejected.
    #[error("Invalid credit card: {0}")]
    InvalidCard(#[from] CardError),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Returns true for lookups the caller can fix by refreshing catalog or rate data.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CoreError::ProductNotFound(_)
                | CoreError::ShippingRateNotFound { .. }
                | CoreError::ShippingRateNotFoundForSize { .. }
        )
    }
}

// =============================================================================
// Rate Table Error
// =============================================================================

/// Shipping rate configuration errors.
///
/// These are configuration errors: fatal at load time and never auto-repaired.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RateTableError {
    /// The table has no rates at all.
    #[error("box size {box_size}: rate list is empty")]
    EmptyRates { box_size: BoxSize },

    /// Two rates share the same number.
    #[error("box size {box_size}: duplicate rate number {number}")]
    DuplicateNumber { box_size: BoxSize, number: i64 },

    /// A rate number is below 1.
    #[error("box size {box_size}: rate number {number} must be at least 1")]
    InvalidNumber { box_size: BoxSize, number: i64 },

    /// A rate has a negative price.
    #[error("box size {box_size}: rate {number} has negative price {price}")]
    NegativePrice {
        box_size: BoxSize,
        number: i64,
        price: i64,
    },

    /// A refrigerated/frozen surcharge is negative.
    #[error("box size {box_size}: negative cold-chain surcharge {surcharge}")]
    NegativeSurcharge { box_size: BoxSize, surcharge: i64 },

    /// A rate references a region outside the known region set.
    #[error("box size {box_size}: rate {number} references unknown region {region}")]
    UnknownRegion {
        box_size: BoxSize,
        number: i64,
        region: u8,
    },

    /// A region is claimed by more than one rate.
    #[error("box size {box_size}: region {region} is covered by more than one rate")]
    OverlappingRegion { box_size: BoxSize, region: u8 },

    /// Some known regions are not covered by any rate.
    #[error("box size {box_size}: regions not covered: {missing:?}")]
    MissingRegions { box_size: BoxSize, missing: Vec<u8> },

    /// Free shipping is enabled without a usable threshold.
    #[error("free shipping threshold must be non-negative, got {0}")]
    InvalidFreeShippingThreshold(i64),
}

// =============================================================================
// Card Error
// =============================================================================

/// Credit card validation failures.
///
/// Each variant names exactly one rule so the caller can tell the shopper
/// which field to fix.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CardError {
    /// Cardholder name is blank.
    #[error("cardholder name is required")]
    EmptyName,

    /// Card number contains something other than digits.
    #[error("card number must contain only digits")]
    NumberNotNumeric,

    /// Card number is not 13-16 digits long.
    #[error("card number must be 13 to 16 digits, got {0}")]
    InvalidNumberLength(usize),

    /// Card number failed the Luhn checksum.
    #[error("card number failed checksum")]
    ChecksumFailed,

    /// CVV contains something other than digits.
    #[error("security code must contain only digits")]
    CvvNotNumeric,

    /// CVV is not 3 or 4 digits long.
    #[error("security code must be 3 or 4 digits, got {0}")]
    InvalidCvvLength(usize),

    /// Expiry month is not 1-12.
    #[error("expiry month must be between 1 and 12, got {0}")]
    InvalidExpiryMonth(u32),

    /// Expiry year/month cannot form a date.
    #[error("expiry year {0} is out of range")]
    InvalidExpiryYear(i32),

    /// Card has expired.
    #[error("card expired at the end of {year}-{month:02}")]
    Expired { year: i32, month: u32 },
}

impl CardError {
    /// Stable machine-readable code for the failed rule.
    ///
    /// ## Example
    /// ```rust
    /// use hako_core::CardError;
    ///
    /// assert_eq!(CardError::ChecksumFailed.kind(), "invalid_number");
    /// assert_eq!(CardError::Expired { year: 2020, month: 1 }.kind(), "expired");
    /// ```
    pub fn kind(&self) -> &'static str {
        match self {
            CardError::EmptyName => "invalid_name",
            CardError::NumberNotNumeric
            | CardError::InvalidNumberLength(_)
            | CardError::ChecksumFailed => "invalid_number",
            CardError::CvvNotNumeric | CardError::InvalidCvvLength(_) => "invalid_cvv",
            CardError::InvalidExpiryMonth(_) | CardError::InvalidExpiryYear(_) => {
                "invalid_expiry"
            }
            CardError::Expired { .. } => "expired",
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Used for early validation of catalog and cart values before packing runs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::ShippingRateNotFoundForSize {
            box_size: BoxSize::Size80,
            region: 13,
        };
        assert_eq!(
            err.to_string(),
            "Shipping rate not found for box size 80 in region 13"
        );

        let err = CoreError::ProductNotFound("p-1".to_string());
        assert_eq!(err.to_string(), "Product not found: p-1");
    }

    #[test]
    fn test_rate_table_error_messages() {
        let err = RateTableError::MissingRegions {
            box_size: BoxSize::Size60,
            missing: vec![46, 47],
        };
        assert_eq!(
            err.to_string(),
            "box size 60: regions not covered: [46, 47]"
        );
    }

    #[test]
    fn test_card_error_kinds() {
        assert_eq!(CardError::NumberNotNumeric.kind(), "invalid_number");
        assert_eq!(CardError::InvalidNumberLength(12).kind(), "invalid_number");
        assert_eq!(CardError::InvalidCvvLength(5).kind(), "invalid_cvv");
        assert_eq!(CardError::InvalidExpiryMonth(13).kind(), "invalid_expiry");
        assert_eq!(CardError::EmptyName.kind(), "invalid_name");
    }

    #[test]
    fn test_conversions_into_core_error() {
        let core_err: CoreError = CardError::ChecksumFailed.into();
        assert!(matches!(core_err, CoreError::InvalidCard(_)));

        let core_err: CoreError = RateTableError::InvalidFreeShippingThreshold(-1).into();
        assert!(matches!(core_err, CoreError::InvalidRateTable(_)));

        let core_err: CoreError = ValidationError::Required {
            field: "id".to_string(),
        }
        .into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }

    #[test]
    fn test_is_not_found() {
        assert!(CoreError::ProductNotFound("x".into()).is_not_found());
        assert!(CoreError::ShippingRateNotFound { region: 1 }.is_not_found());
        assert!(!CoreError::InvalidCard(CardError::ChecksumFailed).is_not_found());
    }
}
