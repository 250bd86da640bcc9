//! End-to-end checkout: cart → boxes → shipping → payment summary.

use std::collections::HashMap;

use chrono::{FixedOffset, TimeZone};
use hako_core::{
    BasketPacker, BoxShipping, BoxSize, CardError, CartItem, CoreError, CreditCard, DeliveryType,
    Money, PaymentSummaryCalculator, Product, ShippingRate, ShippingRevision, TaxRate,
};

const TOKYO: u8 = 13;
const OSAKA: u8 = 27;

fn catalog() -> HashMap<String, Product> {
    let jam: Product = serde_json::from_str(
        r#"{
            "id": "jam",
            "seller_id": "farm",
            "name": "Strawberry jam",
            "weight": { "value": 2500, "unit": "gram" },
            "box60_rate": 50,
            "box80_rate": 30,
            "box100_rate": 20,
            "inventory": 20,
            "price": 1200,
            "revision": 3
        }"#,
    )
    .unwrap();

    let butter: Product = serde_json::from_str(
        r#"{
            "id": "butter",
            "seller_id": "dairy",
            "name": "Cultured butter",
            "delivery_type": "frozen",
            "weight": { "value": 400, "unit": "gram" },
            "box60_rate": 25,
            "box80_rate": 15,
            "box100_rate": 10,
            "inventory": 8,
            "price": 800
        }"#,
    )
    .unwrap();

    [jam, butter].into_iter().map(|p| (p.id.clone(), p)).collect()
}

/// East (8-24) at base, everywhere else at base + 500.
fn two_zones(base: i64) -> BoxShipping {
    BoxShipping::new(
        vec![
            ShippingRate::new(1, "East", Money::from_yen(base), 8..=24),
            ShippingRate::new(
                2,
                "Elsewhere",
                Money::from_yen(base + 500),
                (1..=7).chain(25..=47),
            ),
        ],
        Money::from_yen(300),
    )
}

fn revision(threshold: Option<i64>) -> ShippingRevision {
    ShippingRevision {
        revision: 1,
        box60: two_zones(800),
        box80: two_zones(1000),
        box100: two_zones(1300),
        free_shipping_threshold: threshold.map(Money::from_yen),
    }
}

fn sellers(farm_threshold: Option<i64>) -> HashMap<String, ShippingRevision> {
    HashMap::from([
        ("farm".to_string(), revision(farm_threshold)),
        ("dairy".to_string(), revision(None)),
    ])
}

#[test]
fn heavy_units_split_into_two_boxes_and_price() {
    let catalog = catalog();
    let boxes = BasketPacker::default()
        .pack_items(&[CartItem::new("jam", 5)], &catalog)
        .unwrap();

    assert_eq!(boxes.len(), 2);
    assert_eq!((boxes[0].box_number, boxes[0].box_size), (1, BoxSize::Size100));
    assert_eq!(boxes[0].items, vec![CartItem::new("jam", 4)]);
    assert_eq!((boxes[1].box_number, boxes[1].box_size), (2, BoxSize::Size80));
    assert_eq!(boxes[1].items, vec![CartItem::new("jam", 1)]);

    let summary = PaymentSummaryCalculator::new(TaxRate::STANDARD)
        .product_summary(&boxes, &catalog, &sellers(None), Some(TOKYO))
        .unwrap();

    assert_eq!(summary.subtotal.yen(), 6000);
    assert_eq!(summary.shipping_fee.yen(), 1300 + 1000);
    assert_eq!(summary.total.yen(), 8300);
    assert_eq!(summary.tax.yen(), 754);
}

#[test]
fn mixed_sellers_and_cold_chain() {
    let catalog = catalog();
    let cart = [CartItem::new("jam", 5), CartItem::new("butter", 2)];
    let boxes = BasketPacker::default().pack_items(&cart, &catalog).unwrap();

    // dairy sorts before farm
    assert_eq!(boxes.len(), 3);
    assert_eq!(boxes[0].seller_id, "dairy");
    assert_eq!(boxes[0].delivery_type, DeliveryType::Frozen);
    assert_eq!(boxes[0].box_size, BoxSize::Size60);
    assert!(boxes[1..].iter().all(|b| b.seller_id == "farm"));
    let numbers: Vec<u32> = boxes.iter().map(|b| b.box_number).collect();
    assert_eq!(numbers, vec![1, 2, 3]);

    let calculator = PaymentSummaryCalculator::default();
    let fees = calculator
        .shipping_fees(&boxes, &catalog, &sellers(None), TOKYO)
        .unwrap();
    let fees: Vec<i64> = fees.iter().map(|f| f.fee.yen()).collect();
    assert_eq!(fees, vec![800 + 300, 1300, 1000]);

    let summary = calculator
        .product_summary(&boxes, &catalog, &sellers(None), Some(TOKYO))
        .unwrap();
    assert_eq!(summary.subtotal.yen(), 7600);
    assert_eq!(summary.shipping_fee.yen(), 3400);
    assert_eq!(summary.total.yen(), 11_000);
    assert_eq!(summary.tax.yen(), 1000);
}

#[test]
fn free_shipping_applies_per_seller() {
    let catalog = catalog();
    let cart = [CartItem::new("jam", 5), CartItem::new("butter", 2)];
    let boxes = BasketPacker::default().pack_items(&cart, &catalog).unwrap();

    // farm's ¥6000 clears its ¥5000 threshold; dairy has none
    let summary = PaymentSummaryCalculator::default()
        .product_summary(&boxes, &catalog, &sellers(Some(5000)), Some(OSAKA))
        .unwrap();

    assert_eq!(summary.shipping_fee.yen(), 1300 + 300);
    assert_eq!(summary.total.yen(), 9200);
    assert_eq!(summary.tax.yen(), 836);
}

#[test]
fn discount_reduces_taxable_total() {
    let catalog = catalog();
    let boxes = BasketPacker::default()
        .pack_items(&[CartItem::new("butter", 1)], &catalog)
        .unwrap();

    let half_off_shipping = |_subtotal: Money, shipping: Money| Money::from_yen(shipping.yen() / 2);
    let summary = PaymentSummaryCalculator::default()
        .with_promotion(half_off_shipping)
        .product_summary(&boxes, &catalog, &sellers(None), Some(TOKYO))
        .unwrap();

    assert_eq!(summary.shipping_fee.yen(), 1100);
    assert_eq!(summary.discount.yen(), 550);
    assert_eq!(summary.total.yen(), 1350);
    assert_eq!(summary.tax.yen(), 122);
}

#[test]
fn missing_rate_fails_whole_order() {
    let catalog = catalog();
    let boxes = BasketPacker::default()
        .pack_items(&[CartItem::new("jam", 5)], &catalog)
        .unwrap();

    let mut rates = sellers(None);
    if let Some(farm) = rates.get_mut("farm") {
        farm.box80.rates[0].regions.retain(|&r| r != TOKYO);
    }

    let err = PaymentSummaryCalculator::default()
        .product_summary(&boxes, &catalog, &rates, Some(TOKYO))
        .unwrap_err();

    assert!(err.is_not_found());
    assert!(matches!(
        err,
        CoreError::ShippingRateNotFoundForSize {
            box_size: BoxSize::Size80,
            region: TOKYO
        }
    ));
}

#[test]
fn rate_tables_partition_all_prefectures() {
    assert!(revision(Some(5000)).validate().is_ok());

    let mut broken = revision(None);
    broken.box100.rates[1].regions.retain(|&r| r != 47);
    assert!(broken.validate().is_err());
}

#[test]
fn card_checked_before_payment() {
    let jst = FixedOffset::east_opt(9 * 3600).unwrap();
    let now = jst.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap();

    let card = CreditCard {
        name: "Taro Yamada".into(),
        number: "4111 1111 1111 1111".into(),
        month: 10,
        year: 2026,
        cvv: "123".into(),
    };
    assert_eq!(card.validate_at(&now), Ok(()));

    let expired = CreditCard {
        month: 9,
        ..card.clone()
    };
    let err = expired.validate_at(&now).unwrap_err();
    assert_eq!(err.kind(), "expired");

    let typo = CreditCard {
        number: "4111 1111 1111 1112".into(),
        ..card
    };
    assert_eq!(typo.validate_at(&now), Err(CardError::ChecksumFailed));
}
