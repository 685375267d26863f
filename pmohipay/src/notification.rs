//! Server-to-server notifications
//!
//! HiPay posts an `application/x-www-form-urlencoded` body whose `xml` field holds:
//!
//! ```text
//! <mapi>
//!   <mapiversion>1.0</mapiversion>
//!   <md5content>...</md5content>
//!   <result>
//!     <operation>capture</operation>
//!     <status>ok</status>
//!     ...
//!     <merchantDatas><_aKey_sessionId>42</_aKey_sessionId></merchantDatas>
//!   </result>
//! </mapi>
//! ```
//!
//! `md5content` is an MD5 computed over the exact bytes of the `<result>...</result>`
//! fragment of the raw payload. Older accounts hash the fragment alone, newer ones
//! append the web service password. MD5 is weak but it is what the service sends.

use crate::error::NotificationError;
use crate::models::{NotificationResponse, NotificationResult};
use crate::soap::parser::flatten_children;
use indexmap::IndexMap;
use md5::{Digest, Md5};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use subtle::ConstantTimeEq;
use tracing::{debug, warn};
use xmltree::Element;

/// Root element of a notification
pub const ROOT_TAG: &str = "mapi";
pub const VERSION_TAG: &str = "mapiversion";
pub const DIGEST_TAG: &str = "md5content";
pub const RESULT_TAG: &str = "result";

/// Child of `result` holding the order free data
pub const MERCHANT_DATA_TAG: &str = "merchantDatas";

/// Prefix of every entry of [`MERCHANT_DATA_TAG`]
pub const MERCHANT_DATA_PREFIX: &str = "_aKey_";

/// Form field carrying the payload
pub const FORM_FIELD: &str = "xml";

const RESULT_CLOSE: &str = "</result>";

static RESULT_OPEN: Lazy<Regex> = Lazy::new(|| {
    // `<result` must be a full tag name, not `<resultCode`
    Regex::new(r"<result(\s|>)").expect("RESULT_OPEN: invalid regex pattern")
});

/// Which verifications to run on a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseNotificationOptions {
    /// Accept either digest scheme (legacy first). Default `true`.
    pub check_digest: bool,
    /// Require the password-keyed scheme. Takes precedence over `check_digest`.
    /// Default `false`.
    pub check_signature: bool,
}

impl Default for ParseNotificationOptions {
    fn default() -> Self {
        Self {
            check_digest: true,
            check_signature: false,
        }
    }
}

impl ParseNotificationOptions {
    /// No verification at all
    pub fn unchecked() -> Self {
        Self {
            check_digest: false,
            check_signature: false,
        }
    }

    /// Signature scheme only
    pub fn signature_only() -> Self {
        Self {
            check_digest: false,
            check_signature: true,
        }
    }

    /// Schemes to try, in order; empty when verification is disabled
    pub fn schemes(&self) -> &'static [DigestScheme] {
        if self.check_signature {
            &[DigestScheme::Signature]
        } else if self.check_digest {
            &[DigestScheme::Legacy, DigestScheme::Signature]
        } else {
            &[]
        }
    }
}

/// How the digest of the result fragment is computed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestScheme {
    /// MD5 of the fragment
    Legacy,
    /// MD5 of the fragment followed by the password
    Signature,
}

impl DigestScheme {
    pub fn compute(&self, fragment: &[u8], secret: &str) -> [u8; 16] {
        let mut hasher = Md5::new();
        hasher.update(fragment);
        if *self == DigestScheme::Signature {
            hasher.update(secret.as_bytes());
        }

        let mut digest = [0u8; 16];
        digest.copy_from_slice(&hasher.finalize());
        digest
    }

    /// Compare in constant time; the error reads `<received>(current) != <computed>(expected)`
    pub fn verify(&self, received: &[u8; 16], fragment: &[u8], secret: &str) -> Result<(), String> {
        let computed = self.compute(fragment, secret);
        if bool::from(received[..].ct_eq(&computed[..])) {
            Ok(())
        } else {
            Err(format!(
                "{}(current) != {}(expected)",
                hex::encode(received),
                hex::encode(computed)
            ))
        }
    }
}

impl fmt::Display for DigestScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DigestScheme::Legacy => f.write_str("legacy digest"),
            DigestScheme::Signature => f.write_str("signature"),
        }
    }
}

/// Decodes and verifies notifications with the web service password
#[derive(Clone)]
pub struct NotificationDecoder {
    secret: String,
}

impl fmt::Debug for NotificationDecoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationDecoder")
            .field("secret", &"***")
            .finish()
    }
}

impl NotificationDecoder {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Decode a raw notification payload
    pub fn decode(
        &self,
        xml: &str,
        options: &ParseNotificationOptions,
    ) -> Result<NotificationResponse, NotificationError> {
        if xml.trim().is_empty() {
            return Err(NotificationError::Incomplete);
        }

        let root = Element::parse(xml.as_bytes()).map_err(|e| {
            debug!("Notification is not well-formed XML: {}", e);
            NotificationError::Decode
        })?;

        if root.name != ROOT_TAG {
            return Err(NotificationError::Incomplete);
        }
        let version = child_text(&root, VERSION_TAG).ok_or(NotificationError::Incomplete)?;
        let digest = child_text(&root, DIGEST_TAG).ok_or(NotificationError::Incomplete)?;
        let result = root
            .get_child(RESULT_TAG)
            .ok_or(NotificationError::Incomplete)?;

        let schemes = options.schemes();
        if !schemes.is_empty() {
            let received = decode_digest(&digest)?;
            let fragment = result_fragment(xml).ok_or(NotificationError::MissingFragment)?;
            self.verify(&received, fragment.as_bytes(), schemes)?;
        }

        Ok(NotificationResponse {
            version,
            digest,
            result: decode_result(result),
        })
    }

    /// Decode the form-encoded callback body and its `xml` field
    pub fn decode_form(
        &self,
        body: &str,
        options: &ParseNotificationOptions,
    ) -> Result<NotificationResponse, NotificationError> {
        let xml = form_xml_field(body).ok_or(NotificationError::MissingXmlField)?;
        self.decode(&xml, options)
    }

    fn verify(
        &self,
        received: &[u8; 16],
        fragment: &[u8],
        schemes: &[DigestScheme],
    ) -> Result<(), NotificationError> {
        let mut failures = Vec::with_capacity(schemes.len());
        for scheme in schemes {
            match scheme.verify(received, fragment, &self.secret) {
                Ok(()) => {
                    debug!("Notification verified with {}", scheme);
                    return Ok(());
                }
                Err(reason) => {
                    debug!("Notification {} mismatch: {}", scheme, reason);
                    failures.push(reason);
                }
            }
        }

        warn!("Rejecting notification: {}", failures.join(", "));
        let mut failures = failures.into_iter();
        match (failures.next(), failures.next()) {
            (Some(legacy), Some(signature)) => Err(NotificationError::BadDigest(legacy, signature)),
            (Some(reason), None) => Err(NotificationError::BadSignature(reason)),
            (None, _) => Err(NotificationError::BadSignature(
                "no digest scheme selected".to_string(),
            )),
        }
    }
}

/// Raw `<result ...>...</result>` slice of the payload
///
/// Starts at the first `<result` tag and ends after the last `</result>`.
pub fn result_fragment(xml: &str) -> Option<&str> {
    let start = RESULT_OPEN.find(xml)?.start();
    let end = xml.rfind(RESULT_CLOSE)? + RESULT_CLOSE.len();
    if end <= start {
        return None;
    }
    xml.get(start..end)
}

/// Value of the `xml` field of a form-encoded body
pub fn form_xml_field(body: &str) -> Option<String> {
    url::form_urlencoded::parse(body.as_bytes())
        .find(|(key, _)| key == FORM_FIELD)
        .map(|(_, value)| value.into_owned())
}

fn decode_digest(digest: &str) -> Result<[u8; 16], NotificationError> {
    let bytes = hex::decode(digest.trim()).map_err(|_| NotificationError::InvalidDigest)?;
    <[u8; 16]>::try_from(bytes.as_slice()).map_err(|_| NotificationError::InvalidDigest)
}

fn child_text(element: &Element, name: &str) -> Option<String> {
    element
        .get_child(name)
        .and_then(|child| child.get_text())
        .map(|text| text.into_owned())
}

fn decode_result(result: &Element) -> NotificationResult {
    let mut fields = flatten_children(result);
    fields.shift_remove(MERCHANT_DATA_TAG);

    let merchant_datas = result.get_child(MERCHANT_DATA_TAG).map(|datas| {
        let mut entries = IndexMap::new();
        for child in datas.children.iter().filter_map(|n| n.as_element()) {
            if let Some(key) = child.name.strip_prefix(MERCHANT_DATA_PREFIX) {
                let value = child.get_text().map(|t| t.into_owned()).unwrap_or_default();
                entries.entry(key.to_string()).or_insert(value);
            }
        }
        entries
    });

    NotificationResult {
        fields,
        merchant_datas,
    }
}
