//! HiPay Professional client library
//!
//! This crate provides a Rust client for the HiPay Professional (formerly HiPay
//! Wallet) SOAP web services.
//!
//! # Features
//!
//! - **Orders**: create an order and redirect the customer to the payment page
//! - **Transactions**: capture or cancel an authorized order
//! - **Refunds**: refund a captured order, partially or totally
//! - **Notifications**: decode server-to-server callbacks and verify their digest
//!   (legacy MD5 and password-keyed signature)
//!
//! # Example
//!
//! ```no_run
//! use chrono::Utc;
//! use pmohipay::{CreateOrderRequest, HipayClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = HipayClient::new("stage", "ws-login", "ws-password")?;
//!
//!     let order = CreateOrderRequest {
//!         website_id: 123,
//!         category_id: 456,
//!         currency: "EUR".to_string(),
//!         amount: "9.99".to_string(),
//!         rating: "ALL".to_string(),
//!         customer_ip_address: "127.0.0.1".to_string(),
//!         execution_date: Utc::now(),
//!         manual_capture: true,
//!         url_callback: Some("https://example.com/hipay/callback".to_string()),
//!         ..Default::default()
//!     };
//!
//!     let response = client.create_order(&order, None).await?;
//!     match response.into_result() {
//!         Ok(result) => println!("Redirect to {}", result.redirect_url),
//!         Err(e) => println!("Refused: {}", e),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Errors
//!
//! A call either fails ([`Error::Transport`], [`Error::Parse`]) or returns a
//! [`HipayResponse`], which holds either the typed result or a [`HipayError`]
//! (business error reported by HiPay). Business errors are data, not failures.
//!
//! # Notifications
//!
//! ```no_run
//! # let client = pmohipay::HipayClient::new("stage", "login", "password").unwrap();
//! # let body = "";
//! let notification = client.parse_notification_form(body, None)?;
//! println!("{} {:?}", notification.result.transid().unwrap_or("-"), notification.result.status());
//! # Ok::<(), pmohipay::NotificationError>(())
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod notification;
pub mod registry;
pub mod soap;
pub mod transport;

pub use client::{
    ClientBuilder, Credentials, Environment, HipayClient, HipayResponse, RequestOptions,
    DEFAULT_USER_AGENT, PRODUCTION_ENDPOINT, STAGE_ENDPOINT,
};
pub use config::HipayConfig;
pub use error::{Error, HipayError, NotificationError, ParseError, Result, TransportError};
pub use models::*;
pub use notification::{DigestScheme, NotificationDecoder, ParseNotificationOptions};
pub use registry::{MessageDefinition, Namespace};
pub use soap::SoapRequest;
pub use transport::{HttpRequest, RawResponse, ReqwestTransport, Transport};
