//! Example: decode a notification saved to a file
//!
//! The file holds either the raw XML or the form-encoded callback body.
//!
//! Run with: cargo run -p pmohipay --example parse_notification -- <file> [--signature]

use anyhow::bail;
use pmohipay::{HipayClient, HipayConfig, ParseNotificationOptions};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(path) = args.first() else {
        bail!("usage: parse_notification <file> [--signature]");
    };
    let options = if args.iter().any(|a| a == "--signature") {
        ParseNotificationOptions::signature_only()
    } else {
        ParseNotificationOptions::default()
    };

    let client = HipayClient::from_config(&HipayConfig::load("")?)?;
    let payload = std::fs::read_to_string(path)?;

    let notification = if payload.trim_start().starts_with('<') {
        client.parse_notification(&payload, Some(&options))?
    } else {
        client.parse_notification_form(&payload, Some(&options))?
    };

    println!("{}", notification);
    for (name, value) in &notification.result.fields {
        println!("  {:<24} {}", name, value);
    }
    if let Some(datas) = &notification.result.merchant_datas {
        println!("  merchant data:");
        for (key, value) in datas {
            println!("    {:<22} {}", key, value);
        }
    }

    Ok(())
}
