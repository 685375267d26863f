//! SOAP response parsing
//!
//! HiPay answers every call with the same shape:
//!
//! ```text
//! <SOAP-ENV:Envelope>
//!   <SOAP-ENV:Body>
//!     <ns1:confirmResponse>
//!       <confirmResult>
//!         <code>0</code>
//!         <description></description>
//!         <transactionPublicId>...</transactionPublicId>
//!       </confirmResult>
//!     </ns1:confirmResponse>
//!   </SOAP-ENV:Body>
//! </SOAP-ENV:Envelope>
//! ```
//!
//! Anything that does not follow this path is a [`ParseError`]. A non-zero `code` is
//! a business error and is returned as data.

use super::builder::SOAP_ENV_PREFIX;
use crate::error::{HipayError, ParseError};
use crate::registry::MessageDefinition;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::de::value::MapDeserializer;
use xmltree::Element;

/// Credential fields merged into every request, never exposed in results
pub const CREDENTIAL_FIELDS: &[&str] = &[
    "wsLogin",
    "wsPassword",
    "wsSubAccountLogin",
    "wsSubAccountId",
];

/// Flattened children of a result element: tag name to text content
pub type ResultFields = IndexMap<String, String>;

/// Parse a raw SOAP response into a typed result or a business error
///
/// The message prefix of the response element is not checked, only local names.
pub fn parse_response<T: DeserializeOwned>(
    body: &str,
    definition: &MessageDefinition,
) -> Result<Result<T, HipayError>, ParseError> {
    let mut fields = extract_result_fields(body, definition)?;

    let code = fields.shift_remove("code").ok_or(ParseError::MissingCode)?;
    let description = fields.shift_remove("description").unwrap_or_default();

    if code.trim() != "0" {
        let code = code
            .trim()
            .parse::<i32>()
            .map_err(|_| ParseError::InvalidCode(code.clone()))?;
        return Ok(Err(HipayError { code, description }));
    }

    for name in CREDENTIAL_FIELDS {
        fields.shift_remove(*name);
    }

    let result = decode_fields(fields)?;
    Ok(Ok(result))
}

/// Walk the envelope path and flatten the `<operation>Result` element
pub fn extract_result_fields(
    body: &str,
    definition: &MessageDefinition,
) -> Result<ResultFields, ParseError> {
    let operation = definition
        .operation
        .ok_or_else(|| ParseError::Missing("operation".to_string()))?;

    let root = Element::parse(body.as_bytes())?;
    if root.name != "Envelope" {
        return Err(ParseError::Missing(format!("{SOAP_ENV_PREFIX}:Envelope")));
    }

    let response_name = format!("{operation}Response");
    let result_name = format!("{operation}Result");
    let segments = [
        (String::from("Body"), format!("{SOAP_ENV_PREFIX}:Body")),
        (
            response_name.clone(),
            format!("{}:{}", definition.namespace.id(), response_name),
        ),
        (result_name.clone(), result_name),
    ];

    let mut current = &root;
    for (local, qualified) in &segments {
        current = current
            .get_child(local.as_str())
            .ok_or_else(|| ParseError::Missing(qualified.clone()))?;
    }

    Ok(flatten_children(current))
}

/// Text content of every child element, in document order
///
/// Empty elements are left out; the first occurrence of a repeated tag wins.
pub fn flatten_children(element: &Element) -> ResultFields {
    let mut fields = ResultFields::new();
    for child in element.children.iter().filter_map(|n| n.as_element()) {
        if let Some(text) = child.get_text() {
            fields
                .entry(child.name.clone())
                .or_insert_with(|| text.into_owned());
        }
    }
    fields
}

/// Decode flattened fields into a typed result, ignoring unknown fields
pub fn decode_fields<T: DeserializeOwned>(fields: ResultFields) -> Result<T, ParseError> {
    let deserializer = MapDeserializer::<_, serde::de::value::Error>::new(fields.into_iter());
    Ok(T::deserialize(deserializer)?)
}
