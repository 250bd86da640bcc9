//! # Validation Module
//!
//! Input validation for catalog data and payment instruments.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Catalog values (before packing)                                        │
//! │  ├── occupancy rates within 0-100                                       │
//! │  ├── prices non-negative                                                │
//! │  └── box weight caps positive and increasing                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Credit card (before any charge attempt)                                │
//! │  ├── 1. number: digits only, 13-16 long, Luhn checksum                 │
//! │  ├── 2. CVV: digits only, 3 or 4 long                                  │
//! │  ├── 3. expiry: month 1-12, month-end not in the past                  │
//! │  └── 4. cardholder name: present after half-width normalisation        │
//! │                                                                         │
//! │  The first failing rule is returned, so the shopper sees one           │
//! │  actionable message at a time.                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use hako_core::validation::CreditCard;
//!
//! let card = CreditCard {
//!     name: "ＴＡＲＯ ＹＡＭＡＤＡ".to_string(),
//!     number: "4242 4242 4242 4242".to_string(),
//!     month: 12,
//!     year: 2030,
//!     cvv: "123".to_string(),
//! };
//!
//! let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
//! assert!(card.validate_at(&now).is_ok());
//! assert_eq!(card.normalized_name(), "TARO YAMADA");
//! ```

use chrono::{DateTime, Duration, Local, TimeZone};
use serde::{Deserialize, Serialize};

use crate::error::{CardError, ValidationError};
use crate::packing::BoxSizeLimits;
use crate::types::Product;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Shortest accepted card number.
pub const CARD_NUMBER_MIN_DIGITS: usize = 13;

/// Longest accepted card number.
pub const CARD_NUMBER_MAX_DIGITS: usize = 16;

// =============================================================================
// Catalog Validators
// =============================================================================

/// Validates a vendor-declared occupancy rate.
///
/// ## Rules
/// - Must be between 0 and 100 (percent of one box)
pub fn validate_occupancy_rate(field: &str, rate: u8) -> ValidationResult<()> {
    if rate > 100 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: 100,
        });
    }

    Ok(())
}

/// Validates a price in yen.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (free items)
pub fn validate_price_yen(field: &str, yen: i64) -> ValidationResult<()> {
    if yen < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates the product fields packing and pricing depend on.
pub fn validate_product(product: &Product) -> ValidationResult<()> {
    if product.id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "product id".to_string(),
        });
    }

    validate_occupancy_rate("box60_rate", product.box60_rate)?;
    validate_occupancy_rate("box80_rate", product.box80_rate)?;
    validate_occupancy_rate("box100_rate", product.box100_rate)?;
    validate_price_yen("price", product.price.yen())?;

    Ok(())
}

/// Validates box weight caps.
///
/// ## Rules
/// - Every cap must be positive
/// - Caps must not shrink as the tier grows (60 <= 80 <= 100)
pub fn validate_box_limits(limits: &BoxSizeLimits) -> ValidationResult<()> {
    for (field, grams) in [
        ("box60_grams", limits.box60_grams),
        ("box80_grams", limits.box80_grams),
        ("box100_grams", limits.box100_grams),
    ] {
        if grams == 0 {
            return Err(ValidationError::MustBePositive {
                field: field.to_string(),
            });
        }
    }

    if limits.box60_grams > limits.box80_grams {
        return Err(ValidationError::OutOfRange {
            field: "box60_grams".to_string(),
            min: 1,
            max: limits.box80_grams as i64,
        });
    }

    if limits.box80_grams > limits.box100_grams {
        return Err(ValidationError::OutOfRange {
            field: "box80_grams".to_string(),
            min: 1,
            max: limits.box100_grams as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Credit Card
// =============================================================================

/// A payment instrument as entered by the shopper.
///
/// Transient: validated here, then handed to the payment provider for
/// tokenisation. Never stored.
#[derive(Clone, Serialize, Deserialize)]
pub struct CreditCard {
    pub name: String,
    pub number: String,
    pub month: u32,
    pub year: i32,
    pub cvv: String,
}

impl std::fmt::Debug for CreditCard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let digits = normalize_digits(&self.number);
        let last4 = digits.get(digits.len().saturating_sub(4)..).unwrap_or_default();
        f.debug_struct("CreditCard")
            .field("name", &self.name)
            .field("number", &format_args!("****{last4}"))
            .field("month", &self.month)
            .field("year", &self.year)
            .field("cvv", &"***")
            .finish()
    }
}

impl CreditCard {
    /// Cardholder name folded to half-width and upper case.
    pub fn normalized_name(&self) -> String {
        to_half_width(self.name.trim()).to_uppercase()
    }

    /// Card number with separators removed and full-width digits folded.
    pub fn normalized_number(&self) -> String {
        normalize_digits(&self.number)
    }

    /// Validates against the current local time.
    pub fn validate(&self) -> Result<(), CardError> {
        self.validate_at(&Local::now())
    }

    /// Validates against `now`; the month-end is taken in `now`'s timezone.
    ///
    /// ## Rule Order
    /// number → CVV → expiry → name. The first failure is returned.
    pub fn validate_at<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Result<(), CardError> {
        validate_card_number(&self.number)?;
        validate_cvv(&self.cvv)?;
        validate_expiry(self.year, self.month, now)?;

        if self.normalized_name().is_empty() {
            return Err(CardError::EmptyName);
        }

        Ok(())
    }
}

/// Validates a card number: digits only, 13-16 long, Luhn checksum.
pub fn validate_card_number(number: &str) -> Result<(), CardError> {
    let digits = normalize_digits(number);

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CardError::NumberNotNumeric);
    }

    if !(CARD_NUMBER_MIN_DIGITS..=CARD_NUMBER_MAX_DIGITS).contains(&digits.len()) {
        return Err(CardError::InvalidNumberLength(digits.len()));
    }

    if !luhn_check(&digits) {
        return Err(CardError::ChecksumFailed);
    }

    Ok(())
}

/// Validates a card security code: digits only, 3 or 4 long.
pub fn validate_cvv(cvv: &str) -> Result<(), CardError> {
    let digits = normalize_digits(cvv);

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CardError::CvvNotNumeric);
    }

    if !(3..=4).contains(&digits.len()) {
        return Err(CardError::InvalidCvvLength(digits.len()));
    }

    Ok(())
}

/// Validates that the card's month-end has not passed.
///
/// A card is good through 23:59:59 on the last day of its expiry month;
/// one second later it is expired.
pub fn validate_expiry<Tz: TimeZone>(
    year: i32,
    month: u32,
    now: &DateTime<Tz>,
) -> Result<(), CardError> {
    let expires_at = card_expires_at(year, month, &now.timezone())?;

    if expires_at < *now {
        return Err(CardError::Expired { year, month });
    }

    Ok(())
}

/// The last second of the expiry month in the given timezone.
pub fn card_expires_at<Tz: TimeZone>(
    year: i32,
    month: u32,
    tz: &Tz,
) -> Result<DateTime<Tz>, CardError> {
    if !(1..=12).contains(&month) {
        return Err(CardError::InvalidExpiryMonth(month));
    }

    let (next_year, next_month) = if month == 12 {
        (year.checked_add(1).ok_or(CardError::InvalidExpiryYear(year))?, 1)
    } else {
        (year, month + 1)
    };

    let next_month_start = tz
        .with_ymd_and_hms(next_year, next_month, 1, 0, 0, 0)
        .earliest()
        .ok_or(CardError::InvalidExpiryYear(year))?;

    Ok(next_month_start - Duration::seconds(1))
}

/// Luhn checksum over ASCII digits.
///
/// Every second digit from the right is doubled; two-digit results are
/// folded by digit sum.
pub fn luhn_check(digits: &str) -> bool {
    let mut sum = 0u32;
    for (index, byte) in digits.bytes().rev().enumerate() {
        if !byte.is_ascii_digit() {
            return false;
        }
        let mut digit = u32::from(byte - b'0');
        if index % 2 == 1 {
            digit *= 2;
            if digit > 9 {
                digit -= 9;
            }
        }
        sum += digit;
    }
    sum % 10 == 0
}

/// Folds full-width ASCII (U+FF01-U+FF5E) and the ideographic space to
/// their half-width forms.
pub fn to_half_width(input: &str) -> String {
    input
        .chars()
        .map(|c| match c {
            '\u{3000}' => ' ',
            '\u{FF01}'..='\u{FF5E}' => char::from_u32(c as u32 - 0xFEE0).unwrap_or(c),
            _ => c,
        })
        .collect()
}

fn normalize_digits(input: &str) -> String {
    to_half_width(input)
        .chars()
        .filter(|c| !matches!(c, ' ' | '-'))
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::types::{DeliveryType, Weight};
    use chrono::{FixedOffset, Utc};
    use rstest::rstest;

    const VALID_NUMBER: &str = "4242424242424242";

    fn card() -> CreditCard {
        CreditCard {
            name: "Taro Yamada".to_string(),
            number: VALID_NUMBER.to_string(),
            month: 6,
            year: 2030,
            cvv: "123".to_string(),
        }
    }

    #[test]
    fn test_luhn_known_number() {
        assert!(luhn_check(VALID_NUMBER));
        assert!(validate_card_number(VALID_NUMBER).is_ok());
    }

    #[rstest]
    fn test_luhn_single_digit_change_fails(#[values(0, 3, 7, 10, 15)] position: usize) {
        for delta in 1..=9u8 {
            let mut bytes = VALID_NUMBER.as_bytes().to_vec();
            bytes[position] = b'0' + (bytes[position] - b'0' + delta) % 10;
            let mutated = String::from_utf8(bytes).unwrap();
            assert_eq!(
                validate_card_number(&mutated),
                Err(CardError::ChecksumFailed),
                "{mutated} should fail"
            );
        }
    }

    #[test]
    fn test_every_position_detects_change() {
        for position in 0..VALID_NUMBER.len() {
            let mut bytes = VALID_NUMBER.as_bytes().to_vec();
            bytes[position] = b'0' + (bytes[position] - b'0' + 1) % 10;
            assert!(!luhn_check(std::str::from_utf8(&bytes).unwrap()));
        }
    }

    #[rstest]
    #[case("424242424242", CardError::InvalidNumberLength(12))]
    #[case("42424242424242424", CardError::InvalidNumberLength(17))]
    #[case("4242x42424242424", CardError::NumberNotNumeric)]
    #[case("", CardError::NumberNotNumeric)]
    fn test_card_number_rejections(#[case] number: &str, #[case] expected: CardError) {
        assert_eq!(validate_card_number(number), Err(expected));
    }

    #[test]
    fn test_card_number_separators_and_full_width() {
        assert!(validate_card_number("4242-4242-4242-4242").is_ok());
        assert!(validate_card_number("４２４２４２４２４２４２４２４２").is_ok());
        // 13-digit Visa test number
        assert!(validate_card_number("4222222222222").is_ok());
    }

    #[rstest]
    #[case("1", false)]
    #[case("12", false)]
    #[case("123", true)]
    #[case("1234", true)]
    #[case("12345", false)]
    fn test_cvv_length(#[case] cvv: &str, #[case] ok: bool) {
        assert_eq!(validate_cvv(cvv).is_ok(), ok);
    }

    #[test]
    fn test_cvv_must_be_numeric() {
        assert_eq!(validate_cvv("12a"), Err(CardError::CvvNotNumeric));
    }

    #[test]
    fn test_expiry_boundary() {
        let last_second = Utc.with_ymd_and_hms(2030, 6, 30, 23, 59, 59).unwrap();
        assert!(validate_expiry(2030, 6, &last_second).is_ok());

        let one_second_later = last_second + Duration::seconds(1);
        assert_eq!(
            validate_expiry(2030, 6, &one_second_later),
            Err(CardError::Expired {
                year: 2030,
                month: 6
            })
        );
    }

    #[test]
    fn test_expiry_december_rolls_year() {
        let tz = FixedOffset::east_opt(9 * 3600).unwrap();
        let expires = card_expires_at(2029, 12, &tz).unwrap();
        assert_eq!(
            expires,
            tz.with_ymd_and_hms(2029, 12, 31, 23, 59, 59).unwrap()
        );
    }

    #[test]
    fn test_expiry_uses_callers_timezone() {
        let jst = FixedOffset::east_opt(9 * 3600).unwrap();
        // 2030-07-01 00:30 JST is still 2030-06-30 in UTC
        let now = jst.with_ymd_and_hms(2030, 7, 1, 0, 30, 0).unwrap();
        assert!(validate_expiry(2030, 6, &now).is_err());
        assert!(validate_expiry(2030, 6, &now.with_timezone(&Utc)).is_ok());
    }

    #[rstest]
    #[case(0)]
    #[case(13)]
    fn test_expiry_month_out_of_range(#[case] month: u32) {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(
            validate_expiry(2030, month, &now),
            Err(CardError::InvalidExpiryMonth(month))
        );
    }

    #[test]
    fn test_rule_order_reports_first_failure() {
        let now = Utc.with_ymd_and_hms(2031, 1, 1, 0, 0, 0).unwrap();
        let mut card = card();
        card.cvv = "1".to_string();
        card.number = "4242424242424241".to_string();

        // number, cvv and expiry all fail: number wins
        assert_eq!(card.validate_at(&now), Err(CardError::ChecksumFailed));

        card.number = VALID_NUMBER.to_string();
        assert_eq!(card.validate_at(&now), Err(CardError::InvalidCvvLength(1)));

        card.cvv = "123".to_string();
        assert_eq!(
            card.validate_at(&now).map_err(|e| e.kind()),
            Err("expired")
        );
    }

    #[test]
    fn test_blank_name_rejected() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let mut card = card();
        card.name = "\u{3000} ".to_string();
        assert_eq!(card.validate_at(&now), Err(CardError::EmptyName));
    }

    #[test]
    fn test_half_width_normalisation() {
        assert_eq!(to_half_width("ＡＢＣ１２３"), "ABC123");
        assert_eq!(to_half_width("ＴＡＲＯ\u{3000}ＹＡＭＡＤＡ"), "TARO YAMADA");
        assert_eq!(to_half_width("山田"), "山田");

        let mut card = card();
        card.name = " ｔａｒｏ ｙａｍａｄａ ".to_string();
        assert_eq!(card.normalized_name(), "TARO YAMADA");
    }

    #[test]
    fn test_debug_masks_number() {
        let debug = format!("{:?}", card());
        assert!(debug.contains("****4242"));
        assert!(!debug.contains(VALID_NUMBER));
        assert!(!debug.contains("123"));
    }

    #[test]
    fn test_validate_product() {
        let mut product = Product {
            id: "p1".into(),
            seller_id: "s1".into(),
            name: String::new(),
            delivery_type: DeliveryType::Normal,
            weight: Weight::grams(100),
            box60_rate: 100,
            box80_rate: 50,
            box100_rate: 25,
            inventory: 1,
            price: Money::from_yen(500),
            revision: 1,
        };
        assert!(validate_product(&product).is_ok());

        product.box80_rate = 101;
        assert!(validate_product(&product).is_err());

        product.box80_rate = 50;
        product.price = Money::from_yen(-1);
        assert!(validate_product(&product).is_err());
    }

    #[test]
    fn test_validate_box_limits() {
        assert!(validate_box_limits(&BoxSizeLimits::default()).is_ok());

        let shrinking = BoxSizeLimits {
            box60_grams: 6_000,
            box80_grams: 5_000,
            box100_grams: 10_000,
        };
        assert!(validate_box_limits(&shrinking).is_err());

        let zero = BoxSizeLimits {
            box60_grams: 0,
            ..BoxSizeLimits::default()
        };
        assert_eq!(
            validate_box_limits(&zero),
            Err(ValidationError::MustBePositive {
                field: "box60_grams".to_string()
            })
        );
    }
}
