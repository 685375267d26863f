//! Example: create an order on the stage environment
//!
//! Credentials are read from the configuration (`~/.pmohipay/config.yaml` or
//! `PMOHIPAY_CONFIG__HIPAY__LOGIN` / `PMOHIPAY_CONFIG__HIPAY__PASSWORD`).
//!
//! Run with: cargo run -p pmohipay --example create_order -- <website id> <category id>

use anyhow::{Context, bail};
use chrono::Utc;
use pmohipay::{CreateOrderRequest, HipayClient, HipayConfig, Item, ItemType};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1);
    let (Some(website_id), Some(category_id)) = (args.next(), args.next()) else {
        bail!("usage: create_order <website id> <category id>");
    };

    let config = HipayConfig::load("")?;
    let client = HipayClient::from_config(&config)?;
    println!("Using {}", client);

    let order = CreateOrderRequest {
        website_id: website_id.parse().context("website id must be a number")?,
        category_id: category_id.parse().context("category id must be a number")?,
        currency: "EUR".to_string(),
        amount: "9.99".to_string(),
        rating: "ALL".to_string(),
        locale: Some("en_GB".to_string()),
        customer_ip_address: "127.0.0.1".to_string(),
        description: Some("pmohipay example order".to_string()),
        execution_date: Utc::now(),
        manual_capture: true,
        items: Some(vec![Item {
            name: "T-shirt".to_string(),
            item_type: ItemType::Product,
            infos: String::new(),
            amount: "9.99".to_string(),
            quantity: 1,
            reference: "TSHIRT-01".to_string(),
            taxes: None,
        }]),
        ..Default::default()
    };

    let response = client.create_order(&order, None).await?;
    match response.into_result() {
        Ok(result) => println!("Redirect the customer to {}", result.redirect_url),
        Err(e) => println!("HiPay refused the order: {} ({})", e.description, e.code),
    }

    Ok(())
}
