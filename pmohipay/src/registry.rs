//! Message registry: XML namespace and SOAP operation of every message type
//!
//! The table is compiled in and never mutated. Top-level requests carry an operation
//! name, which drives both the outbound element (`<ns1:generate>`) and the expected
//! response path (`generateResponse/generateResult`). Nested types only carry their
//! namespace.

use crate::error::{Error, Result};
use std::fmt;

/// API area of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// Orders (`ns1`, `soap/payment-v2`)
    Payment,
    /// Captures and cancellations (`ns2`, `soap/transaction-v2`)
    Transaction,
    /// Refunds (`ns3`, `soap/refund-v2`)
    Refund,
}

impl Namespace {
    /// Prefix used in the SOAP envelope
    pub fn id(&self) -> &'static str {
        match self {
            Namespace::Payment => "ns1",
            Namespace::Transaction => "ns2",
            Namespace::Refund => "ns3",
        }
    }

    /// Path of the service, relative to the endpoint
    pub fn path(&self) -> &'static str {
        match self {
            Namespace::Payment => "soap/payment-v2",
            Namespace::Transaction => "soap/transaction-v2",
            Namespace::Refund => "soap/refund-v2",
        }
    }

    /// Namespace URL declared in the envelope for a given endpoint
    pub fn url(&self, endpoint: &str) -> String {
        join_endpoint(endpoint, self.path())
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Registry entry of one message type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageDefinition {
    pub namespace: Namespace,
    pub operation: Option<&'static str>,
}

impl MessageDefinition {
    const fn nested(namespace: Namespace) -> Self {
        Self {
            namespace,
            operation: None,
        }
    }

    const fn operation(namespace: Namespace, operation: &'static str) -> Self {
        Self {
            namespace,
            operation: Some(operation),
        }
    }

    /// Operation name, or a configuration error for nested-only types
    pub fn require_operation(&self) -> Result<&'static str> {
        self.operation.ok_or_else(|| {
            Error::config(format!(
                "message type in namespace {} has no SOAP operation",
                self.namespace
            ))
        })
    }

    /// Full URL of the operation for a given endpoint
    pub fn operation_url(&self, endpoint: &str) -> Result<String> {
        let operation = self.require_operation()?;
        Ok(join_endpoint(
            endpoint,
            &format!("{}/{}", self.namespace.path(), operation),
        ))
    }
}

/// Every message type known to the client, by type name
pub const DEFINITIONS: &[(&str, MessageDefinition)] = &[
    ("Affiliate", MessageDefinition::nested(Namespace::Payment)),
    ("Tax", MessageDefinition::nested(Namespace::Payment)),
    ("Item", MessageDefinition::nested(Namespace::Payment)),
    ("Customer", MessageDefinition::nested(Namespace::Payment)),
    ("Purchase", MessageDefinition::nested(Namespace::Payment)),
    ("Shipping", MessageDefinition::nested(Namespace::Payment)),
    ("AccountInfo", MessageDefinition::nested(Namespace::Payment)),
    (
        "MerchantRiskStatement",
        MessageDefinition::nested(Namespace::Payment),
    ),
    (
        "CreateOrderRequest",
        MessageDefinition::operation(Namespace::Payment, "generate"),
    ),
    (
        "CreateOrderResult",
        MessageDefinition::nested(Namespace::Payment),
    ),
    (
        "CaptureOrderRequest",
        MessageDefinition::operation(Namespace::Transaction, "confirm"),
    ),
    (
        "CaptureOrderResult",
        MessageDefinition::nested(Namespace::Transaction),
    ),
    (
        "CancelOrderRequest",
        MessageDefinition::operation(Namespace::Transaction, "cancel"),
    ),
    (
        "CancelOrderResult",
        MessageDefinition::nested(Namespace::Transaction),
    ),
    (
        "RefundOrderRequest",
        MessageDefinition::operation(Namespace::Refund, "card"),
    ),
    (
        "RefundOrderResult",
        MessageDefinition::nested(Namespace::Refund),
    ),
];

/// Look up the registry entry of a message type
pub fn lookup(type_name: &str) -> Result<&'static MessageDefinition> {
    DEFINITIONS
        .iter()
        .find(|(name, _)| *name == type_name)
        .map(|(_, definition)| definition)
        .ok_or_else(|| Error::config(format!("no registry entry for message type {type_name}")))
}

/// Append a relative path to an endpoint, with exactly one slash between them
pub(crate) fn join_endpoint(endpoint: &str, path: &str) -> String {
    format!(
        "{}/{}",
        endpoint.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_operations() {
        let expected = [
            ("CreateOrderRequest", "ns1", "generate"),
            ("CaptureOrderRequest", "ns2", "confirm"),
            ("CancelOrderRequest", "ns2", "cancel"),
            ("RefundOrderRequest", "ns3", "card"),
        ];
        for (name, ns, operation) in expected {
            let def = lookup(name).unwrap();
            assert_eq!(def.namespace.id(), ns);
            assert_eq!(def.operation, Some(operation));
        }
    }

    #[test]
    fn test_nested_types_have_no_operation() {
        for name in ["Item", "Tax", "AccountInfo", "CaptureOrderResult"] {
            let def = lookup(name).unwrap();
            assert!(def.operation.is_none(), "{name} should not be top-level");
            assert!(def.require_operation().is_err());
        }
    }

    #[test]
    fn test_unknown_type() {
        let err = lookup("Nope").unwrap_err();
        assert!(err.to_string().contains("Nope"));
    }

    #[test]
    fn test_operation_url() {
        let def = lookup("CreateOrderRequest").unwrap();
        assert_eq!(
            def.operation_url("https://test-ws.hipay.com/").unwrap(),
            "https://test-ws.hipay.com/soap/payment-v2/generate"
        );
        assert_eq!(
            def.operation_url("http://localhost:8080/api").unwrap(),
            "http://localhost:8080/api/soap/payment-v2/generate"
        );
    }

    #[test]
    fn test_namespace_url() {
        assert_eq!(
            Namespace::Refund.url("https://ws.hipay.com/"),
            "https://ws.hipay.com/soap/refund-v2"
        );
    }
}
