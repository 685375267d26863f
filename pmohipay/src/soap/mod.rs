//! # SOAP marshalling for the HiPay web services
//!
//! - [`value`]: intermediate tree built from typed requests
//! - [`builder`]: tree to SOAP envelope
//! - [`parser`]: SOAP envelope to typed result or [`HipayError`](crate::HipayError)
//!
//! ## Example
//!
//! ```
//! use pmohipay::registry::lookup;
//! use pmohipay::soap::{Record, build_request_body};
//!
//! let params = Record::new()
//!     .field("wsLogin", "login")
//!     .field("transactionPublicId", "5CF68C1301DC7655");
//! let def = lookup("CancelOrderRequest").unwrap();
//! let xml = build_request_body("https://test-ws.hipay.com/", def, &params).unwrap();
//! assert!(xml.contains("<ns2:cancel>"));
//! ```

pub mod builder;
pub mod parser;
pub mod value;

pub use builder::{build_request_body, format_datetime};
pub use parser::{CREDENTIAL_FIELDS, ResultFields, parse_response};
pub use value::{Record, SoapValue, ToSoapValue};

use serde::de::DeserializeOwned;

/// A top-level message that can be sent to HiPay
///
/// `TYPE_NAME` is the key of the request in the [registry](crate::registry); the
/// registry entry must carry an operation.
pub trait SoapRequest {
    const TYPE_NAME: &'static str;

    /// Typed result decoded from a successful response
    type Result: DeserializeOwned;

    /// Lower the request into the parameter tree
    fn to_record(&self) -> Record;
}
