//! # hako-quote
//!
//! Command-line front end for the Hako checkout engine.
//!
//! ## Usage
//!
//! ```bash
//! # Pack a cart into boxes
//! hako-quote --config hako.toml pack request.json
//!
//! # Pack and price a cart
//! hako-quote --config hako.toml summary request.json
//!
//! # Validate the engine config (exits non-zero on a bad rate table)
//! hako-quote --config hako.toml check-config
//!
//! # Validate a credit card
//! hako-quote card --name "TARO YAMADA" --number 4111111111111111 \
//!     --month 12 --year 2030 --cvv 123
//! ```
//!
//! JSON goes to stdout, logs to stderr. `RUST_LOG` controls verbosity.

#![cfg_attr(not(test), forbid(unsafe_code))]

mod config;
mod error;
mod request;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use hako_core::{CreditCard, PaymentSummaryCalculator};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::EngineConfig;
use crate::error::{QuoteError, QuoteResult};
use crate::request::{CardCheck, QuoteRequest, QuoteResponse};

#[derive(Parser)]
#[command(name = "hako-quote")]
#[command(author, version, about = "Hako checkout quoting tool")]
struct Cli {
    /// Engine config file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pack a cart into shipping boxes
    Pack {
        /// Quote request (JSON)
        request: PathBuf,
    },
    /// Pack a cart and compute its payment summary
    Summary {
        /// Quote request (JSON)
        request: PathBuf,
    },
    /// Validate the engine config and every seller's rate table
    CheckConfig,
    /// Validate a credit card
    Card {
        /// Cardholder name
        #[arg(long)]
        name: String,

        /// Card number, spaces and hyphens allowed
        #[arg(long)]
        number: String,

        /// Expiry month (1-12)
        #[arg(long)]
        month: u32,

        /// Expiry year (four digits)
        #[arg(long)]
        year: i32,

        /// Security code
        #[arg(long)]
        cvv: String,
    },
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    run(cli)?;
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> QuoteResult<()> {
    match cli.command {
        Commands::Pack { request } => {
            let config = EngineConfig::load(cli.config.as_deref())?;
            let request = QuoteRequest::from_file(&request)?;
            let baskets = config
                .packer()
                .pack_items(&request.cart_items(), &request.catalog())?;
            print_json(&baskets)
        }
        Commands::Summary { request } => {
            let config = EngineConfig::load(cli.config.as_deref())?;
            let request = QuoteRequest::from_file(&request)?;
            print_json(&quote(&config, &request)?)
        }
        Commands::CheckConfig => check_config(cli.config.as_deref()),
        Commands::Card {
            name,
            number,
            month,
            year,
            cvv,
        } => {
            let card = CreditCard {
                name,
                number,
                month,
                year,
                cvv,
            };
            match card.validate() {
                Ok(()) => print_json(&CardCheck {
                    valid: true,
                    code: None,
                    message: None,
                }),
                Err(err) => {
                    print_json(&CardCheck {
                        valid: false,
                        code: Some(err.kind()),
                        message: Some(err.to_string()),
                    })?;
                    Err(QuoteError::CardRejected(err))
                }
            }
        }
    }
}

fn check_config(path: Option<&Path>) -> QuoteResult<()> {
    let config = EngineConfig::load(path)?;
    for (seller_id, revision) in &config.sellers {
        info!(
            %seller_id,
            revision = revision.revision,
            free_shipping_threshold = ?revision.free_shipping_threshold.map(|m| m.yen()),
            "Rate table OK"
        );
    }
    println!("ok");
    Ok(())
}

/// Packs the cart and prices it, or prices the experience booking.
fn quote(config: &EngineConfig, request: &QuoteRequest) -> QuoteResult<QuoteResponse> {
    let calculator =
        PaymentSummaryCalculator::new(config.tax_rate()).with_promotion(request.promotion());

    if let Some(experience) = &request.experience {
        let summary = calculator.experience_summary(&experience.headcount, &experience.prices);
        return Ok(QuoteResponse {
            baskets: Vec::new(),
            shipping_fees: Vec::new(),
            summary,
        });
    }

    let catalog = request.catalog();
    let baskets = config.packer().pack_items(&request.cart_items(), &catalog)?;
    let region = request.destination();

    let shipping_fees = match region {
        Some(region) => calculator.shipping_fees(&baskets, &catalog, &config.sellers, region)?,
        None => Vec::new(),
    };
    let summary = calculator.product_summary(&baskets, &catalog, &config.sellers, region)?;

    info!(
        boxes = baskets.len(),
        total = summary.total.yen(),
        "Quote computed"
    );

    Ok(QuoteResponse {
        baskets,
        shipping_fees,
        summary,
    })
}

fn print_json<T: serde::Serialize>(value: &T) -> QuoteResult<()> {
    let json = serde_json::to_string_pretty(value).map_err(QuoteError::Output)?;
    println!("{json}");
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const REQUEST: &str = r#"{
        "products": [
            {
                "id": "jam", "seller_id": "farm",
                "weight": { "value": 2500, "unit": "gram" },
                "box60_rate": 50, "box80_rate": 30, "box100_rate": 20,
                "inventory": 9, "price": 1200
            }
        ],
        "items": [ { "product_id": "jam", "quantity": 5 } ],
        "region": 13,
        "discount": 300
    }"#;

    fn config() -> EngineConfig {
        let regions = (1..=47).map(|r: u8| r.to_string()).collect::<Vec<_>>().join(", ");
        let mut toml = String::from("[sellers.farm]\n");
        for (size, price) in [(60, 800), (80, 1000), (100, 1300)] {
            toml.push_str(&format!(
                "[[sellers.farm.box{size}.rates]]\nnumber = 1\nname = \"All\"\n\
                 price = {price}\nregions = [{regions}]\n"
            ));
        }
        let config = EngineConfig::from_toml_str(&toml).unwrap();
        config.validate().unwrap();
        config
    }

    #[test]
    fn test_product_quote() {
        let request = QuoteRequest::from_json(REQUEST).unwrap();
        let response = quote(&config(), &request).unwrap();

        assert_eq!(response.baskets.len(), 2);
        let fees: Vec<i64> = response.shipping_fees.iter().map(|f| f.fee.yen()).collect();
        assert_eq!(fees, vec![1300, 1000]);

        let summary = response.summary;
        assert_eq!(summary.subtotal.yen(), 6000);
        assert_eq!(summary.shipping_fee.yen(), 2300);
        assert_eq!(summary.discount.yen(), 300);
        assert_eq!(summary.total.yen(), 8000);
        assert_eq!(summary.tax.yen(), 727);
    }

    #[test]
    fn test_unknown_region_quotes_without_shipping() {
        let mut request = QuoteRequest::from_json(REQUEST).unwrap();
        request.region = Some(99);
        let response = quote(&config(), &request).unwrap();

        assert!(response.shipping_fees.is_empty());
        assert!(response.summary.shipping_fee.is_zero());
        assert_eq!(response.summary.total.yen(), 5700);
    }

    #[test]
    fn test_experience_quote() {
        let request = QuoteRequest::from_json(
            r#"{
                "experience": {
                    "headcount": { "adult": 2, "preschool": 1 },
                    "prices": { "adult": 3300, "preschool": 1100 }
                },
                "discount": 700
            }"#,
        )
        .unwrap();
        let response = quote(&EngineConfig::default(), &request).unwrap();

        assert!(response.baskets.is_empty());
        assert_eq!(response.summary.subtotal.yen(), 7700);
        assert_eq!(response.summary.total.yen(), 7000);
        assert_eq!(response.summary.tax.yen(), 636);
    }

    #[test]
    fn test_unknown_product_is_dropped() {
        let request = QuoteRequest::from_json(
            r#"{ "items": [ { "product_id": "ghost", "quantity": 1 } ], "region": 13 }"#,
        )
        .unwrap();
        // the packer drops unknown products, so nothing is priced
        let response = quote(&config(), &request).unwrap();
        assert!(response.baskets.is_empty());
        assert!(response.summary.total.is_zero());
    }
}
