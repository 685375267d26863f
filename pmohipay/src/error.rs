//! Error types for the HiPay client
//!
//! Three disjoint failure classes reach the caller:
//!
//! - [`Error::Transport`]: the HTTP exchange itself failed (connection, timeout,
//!   unexpected status code).
//! - [`Error::Parse`]: the server replied but the body could not be understood.
//! - [`HipayError`]: the server understood the request and reported a business
//!   error. This one is *returned* inside a [`HipayResponse`](crate::HipayResponse),
//!   never raised.
//!
//! Notifications have their own error type, [`NotificationError`], since they never
//! involve an HTTP call from our side.

use crate::transport::RawResponse;

/// Result type alias for HiPay operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by [`HipayClient`](crate::HipayClient) operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Network, timeout or status-code failure during the HTTP exchange
    #[error("Error during HTTP requests to HiPay ({source})")]
    Transport {
        source: TransportError,
        /// Raw response, only when one was actually received
        response: Option<RawResponse>,
    },

    /// The response body does not have the expected SOAP shape
    #[error("Error while parsing HiPay's response ({source})")]
    Parse {
        source: ParseError,
        response: RawResponse,
    },

    /// Invalid client or registry configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file could not be decoded
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Configuration file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The XML emitter rejected the request tree
    #[error("Failed to serialize SOAP request: {0}")]
    Serialize(#[from] xmltree::Error),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Raw HTTP response attached to this error, if any
    pub fn http_response(&self) -> Option<&RawResponse> {
        match self {
            Error::Transport { response, .. } => response.as_ref(),
            Error::Parse { response, .. } => Some(response),
            _ => None,
        }
    }

    /// True when the server was never reached or answered with an unusable status
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport { .. })
    }

    /// True when the server replied with a body we could not understand
    pub fn is_parse(&self) -> bool {
        matches!(self, Error::Parse { .. })
    }
}

/// Failures of the HTTP exchange
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    /// Any status other than 200 and 500
    #[error("Request failed with status code {0}")]
    UnexpectedStatus(u16),

    /// The status line arrived but the body could not be read
    #[error("Failed to read response body (status {status}): {source}")]
    Body {
        status: u16,
        #[source]
        source: reqwest::Error,
    },

    #[error("{0}")]
    Other(String),
}

impl TransportError {
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// HTTP status, when the server answered before the failure
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::UnexpectedStatus(status) | Self::Body { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            Self::Other(_) => None,
        }
    }
}

/// Shape failures of a SOAP response body
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("{0}")]
    Xml(#[from] xmltree::ParseError),

    /// A segment of the envelope path is absent
    #[error("{0} is missing")]
    Missing(String),

    #[error("code is missing")]
    MissingCode,

    #[error("code {0:?} is not an integer")]
    InvalidCode(String),

    /// The result fields do not fit the expected typed result
    #[error("{0}")]
    Fields(#[from] serde::de::value::Error),
}

/// Business error reported by HiPay (non-zero result code)
///
/// See the [HiPay documentation](https://developer.hipay.com/getting-started/platform-hipay-professional/overview/#integration-guidelines-error-handling)
/// for the list of codes.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, thiserror::Error)]
#[error("HiPay error {code}: {description}")]
pub struct HipayError {
    /// Error code returned by HiPay
    pub code: i32,

    /// Error cause description
    pub description: String,
}

/// Failures while decoding or verifying a server-to-server notification
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotificationError {
    #[error("cannot decode XML content")]
    Decode,

    #[error("incomplete XML content")]
    Incomplete,

    /// The digest field is not 16 bytes of hex
    #[error("digest is invalid")]
    InvalidDigest,

    #[error("unable to locate the result element in the raw payload")]
    MissingFragment,

    #[error("bad signature: {0}")]
    BadSignature(String),

    /// Both the legacy digest and the signature checks failed
    #[error("bad digest: {0}, {1}")]
    BadDigest(String, String),

    /// Form-encoded callback body without an `xml` field
    #[error("xml field is missing from the notification body")]
    MissingXmlField,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_message_carries_cause() {
        let err = Error::Transport {
            source: TransportError::other("my error"),
            response: None,
        };
        assert_eq!(err.to_string(), "Error during HTTP requests to HiPay (my error)");
        assert!(err.is_transport());
        assert!(err.http_response().is_none());
    }

    #[test]
    fn test_transport_status() {
        assert_eq!(TransportError::UnexpectedStatus(503).status(), Some(503));
        assert_eq!(TransportError::other("refused").status(), None);
    }

    #[test]
    fn test_parse_message_carries_cause() {
        let err = Error::Parse {
            source: ParseError::Missing("SOAP-ENV:Envelope".to_string()),
            response: RawResponse::new(200, "<mapi/>"),
        };
        assert_eq!(
            err.to_string(),
            "Error while parsing HiPay's response (SOAP-ENV:Envelope is missing)"
        );
        assert_eq!(err.http_response().map(|r| r.status), Some(200));
    }

    #[test]
    fn test_bad_digest_message() {
        let err = NotificationError::BadDigest("a".into(), "b".into());
        assert_eq!(err.to_string(), "bad digest: a, b");
    }
}
