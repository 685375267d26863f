//! SOAP request construction

use super::value::{Record, SoapValue};
use crate::error::Result;
use crate::registry::MessageDefinition;
use chrono::{DateTime, Utc};
use xmltree::{Element, XMLNode};

/// Prefix bound to the SOAP envelope namespace
pub const SOAP_ENV_PREFIX: &str = "SOAP-ENV";

/// SOAP 1.1 envelope namespace
pub const SOAP_ENV_NAMESPACE: &str = "http://schemas.xmlsoap.org/soap/envelope/";

/// Tag of each entry of a list or dictionary
pub const ITEM_TAG: &str = "item";

/// Date-time profile expected by the service (MySQL DATETIME, `T` separator)
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Build the complete SOAP envelope of a request
///
/// # Arguments
///
/// * `endpoint` - resolved service endpoint, used to qualify the message namespace
/// * `definition` - registry entry of the request type (must carry an operation)
/// * `parameters` - merged credentials + request fields
///
/// # Returns
///
/// ```text
/// <SOAP-ENV:Envelope xmlns:SOAP-ENV="..." xmlns:ns1="<endpoint>soap/payment-v2">
///   <SOAP-ENV:Body>
///     <ns1:generate>
///       <parameters>...</parameters>
///     </ns1:generate>
///   </SOAP-ENV:Body>
/// </SOAP-ENV:Envelope>
/// ```
pub fn build_request_body(
    endpoint: &str,
    definition: &MessageDefinition,
    parameters: &Record,
) -> Result<String> {
    let operation = definition.require_operation()?;
    let ns = definition.namespace;

    let mut message = Element::new(&format!("{}:{}", ns.id(), operation));
    message
        .children
        .push(XMLNode::Element(record_to_element("parameters", parameters)));

    let mut body = Element::new(&format!("{SOAP_ENV_PREFIX}:Body"));
    body.children.push(XMLNode::Element(message));

    let mut envelope = Element::new(&format!("{SOAP_ENV_PREFIX}:Envelope"));
    envelope.attributes.insert(
        format!("xmlns:{SOAP_ENV_PREFIX}"),
        SOAP_ENV_NAMESPACE.to_string(),
    );
    envelope
        .attributes
        .insert(format!("xmlns:{}", ns.id()), ns.url(endpoint));
    envelope.children.push(XMLNode::Element(body));

    let mut buf = Vec::new();
    let config = xmltree::EmitterConfig::new()
        .write_document_declaration(true)
        .perform_indent(true)
        .indent_string("  ");
    envelope.write_with_config(&mut buf, config)?;

    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Serialize a record as an element named `name`, one child per field
pub fn record_to_element(name: &str, record: &Record) -> Element {
    let mut element = Element::new(name);
    for (field, value) in record.iter() {
        element
            .children
            .push(XMLNode::Element(value_to_element(field, value)));
    }
    element
}

/// Serialize one value of the tree
///
/// All the special cases of the wire format live here.
pub fn value_to_element(name: &str, value: &SoapValue) -> Element {
    match value {
        SoapValue::Scalar(text) => text_element(name, text),
        SoapValue::Bool(flag) => text_element(name, if *flag { "1" } else { "0" }),
        SoapValue::DateTime(date) => text_element(name, &format_datetime(date)),
        SoapValue::List(items) => {
            let mut element = Element::new(name);
            for item in items {
                element
                    .children
                    .push(XMLNode::Element(value_to_element(ITEM_TAG, item)));
            }
            element
        }
        SoapValue::Dictionary(entries) => {
            // key/value pairs, not dynamically named elements
            let mut element = Element::new(name);
            for (key, value) in entries {
                let mut item = Element::new(ITEM_TAG);
                item.children.push(XMLNode::Element(text_element("key", key)));
                item.children
                    .push(XMLNode::Element(text_element("value", value)));
                element.children.push(XMLNode::Element(item));
            }
            element
        }
        SoapValue::Record(record) => record_to_element(name, record),
    }
}

/// `YYYY-MM-DDTHH:MM:SS`, UTC, seconds truncated
pub fn format_datetime(date: &DateTime<Utc>) -> String {
    date.format(DATETIME_FORMAT).to_string()
}

fn text_element(name: &str, text: &str) -> Element {
    let mut element = Element::new(name);
    if !text.is_empty() {
        element.children.push(XMLNode::Text(text.to_string()));
    }
    element
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::lookup;
    use chrono::TimeZone;
    use indexmap::IndexMap;

    fn render(value: &SoapValue) -> String {
        let mut buf = Vec::new();
        let config = xmltree::EmitterConfig::new().write_document_declaration(false);
        value_to_element("v", value)
            .write_with_config(&mut buf, config)
            .unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_booleans_are_numeric() {
        assert_eq!(render(&SoapValue::Bool(true)), "<v>1</v>");
        assert_eq!(render(&SoapValue::Bool(false)), "<v>0</v>");
    }

    #[test]
    fn test_datetime_is_truncated() {
        let date = Utc
            .with_ymd_and_hms(2014, 12, 25, 10, 57, 55)
            .unwrap()
            .checked_add_signed(chrono::Duration::milliseconds(123))
            .unwrap();
        assert_eq!(format_datetime(&date), "2014-12-25T10:57:55");
        assert_eq!(render(&SoapValue::DateTime(date)), "<v>2014-12-25T10:57:55</v>");
    }

    #[test]
    fn test_list_uses_item_children() {
        let list = SoapValue::List(vec![
            SoapValue::Scalar("a".into()),
            SoapValue::Scalar("b".into()),
        ]);
        assert_eq!(render(&list), "<v><item>a</item><item>b</item></v>");
    }

    #[test]
    fn test_dictionary_uses_key_value_pairs() {
        let mut entries = IndexMap::new();
        entries.insert("sessionId".to_string(), "123".to_string());
        entries.insert("color".to_string(), "yellow".to_string());

        assert_eq!(
            render(&SoapValue::Dictionary(entries)),
            "<v><item><key>sessionId</key><value>123</value></item>\
             <item><key>color</key><value>yellow</value></item></v>"
        );
    }

    #[test]
    fn test_nested_record_uses_field_names() {
        let record = Record::new()
            .field("label", "TVA")
            .field("amount", "2.00");
        assert_eq!(
            render(&SoapValue::Record(record)),
            "<v><label>TVA</label><amount>2.00</amount></v>"
        );
    }

    #[test]
    fn test_envelope_shape() {
        let def = lookup("CaptureOrderRequest").unwrap();
        let params = Record::new()
            .field("wsLogin", "login")
            .field("transactionPublicId", "5CF68C1301DC7655");

        let xml = build_request_body("https://test-ws.hipay.com/", def, &params).unwrap();

        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains("<SOAP-ENV:Envelope"));
        assert!(xml.contains(r#"xmlns:SOAP-ENV="http://schemas.xmlsoap.org/soap/envelope/""#));
        assert!(xml.contains(r#"xmlns:ns2="https://test-ws.hipay.com/soap/transaction-v2""#));
        assert!(xml.contains("<SOAP-ENV:Body>"));
        assert!(xml.contains("<ns2:confirm>"));
        assert!(xml.contains("<parameters>"));
        assert!(xml.contains("<transactionPublicId>5CF68C1301DC7655</transactionPublicId>"));
    }

    #[test]
    fn test_nested_type_cannot_be_sent() {
        let def = lookup("Item").unwrap();
        assert!(build_request_body("https://ws.hipay.com/", def, &Record::new()).is_err());
    }
}
