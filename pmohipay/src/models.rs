//! Data models for the HiPay Professional API
//!
//! Requests lower themselves into a [`Record`] (see [`SoapRequest`]); results are
//! decoded from the flattened result element with serde, so unknown fields sent by
//! HiPay are ignored.

use crate::soap::{Record, SoapRequest, SoapValue, ToSoapValue};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Field name of the free-form merchant data in [`CreateOrderRequest`]
pub const FREE_DATA_FIELD: &str = "freeData";

/// A date stored as an integer `YYYYMMDD` (eg. `20190925`)
pub type DateInt = u32;

/// Enumerations sent as their numeric code
macro_rules! numeric_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $value:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(into = "u8", try_from = "u8")]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $value ),+
        }

        impl From<$name> for u8 {
            fn from(value: $name) -> u8 {
                value as u8
            }
        }

        impl TryFrom<u8> for $name {
            type Error = String;

            fn try_from(value: u8) -> Result<Self, Self::Error> {
                match value {
                    $( $value => Ok($name::$variant), )+
                    other => Err(format!("invalid {} value: {}", stringify!($name), other)),
                }
            }
        }

        impl ToSoapValue for $name {
            fn to_soap_value(&self) -> Option<SoapValue> {
                Some(SoapValue::Scalar(u8::from(*self).to_string()))
            }
        }
    };
}

numeric_enum! {
    /// How HiPay displays an [`Item`]
    ItemType {
        Insurances = 1,
        FixedCosts = 2,
        ShippingCosts = 3,
        Product = 4,
    }
}

numeric_enum! {
    /// See [`Shipping::name_indicator`]
    NameIndicator {
        /// Account name identical to shipping name
        Identical = 1,
        /// Account name different than shipping name
        Different = 2,
    }
}

numeric_enum! {
    /// See [`Shipping::suspicious_activity`]
    SuspiciousActivity {
        NoSuspiciousActivity = 1,
        SuspiciousActivity = 2,
    }
}

numeric_enum! {
    /// See [`MerchantRiskStatement::delivery_time_frame`]
    DeliveryTimeFrame {
        ElectronicDelivery = 1,
        SameDayShipping = 2,
        OvernightShipping = 3,
        TwoDayOrMoreShipping = 4,
    }
}

numeric_enum! {
    /// See [`MerchantRiskStatement::purchase_indicator`]
    PurchaseIndicator {
        MerchandiseAvailable = 1,
        FutureAvailability = 2,
    }
}

numeric_enum! {
    /// See [`MerchantRiskStatement::reorder_indicator`]
    ReorderIndicator {
        FirstTimeOrdered = 1,
        Reordered = 2,
    }
}

numeric_enum! {
    /// See [`MerchantRiskStatement::shipping_indicator`]
    ShippingIndicator {
        /// Ship to cardholder's billing address
        ShipToCardholderBillingAddress = 1,
        /// Ship to another verified address on file with merchant
        ShipToVerifiedAddress = 2,
        /// Ship to address that is different than the cardholder's billing address
        ShipToDifferentAddress = 3,
        /// Ship to store / pick up at local store
        ShipToStore = 4,
        /// Digital goods (online services, electronic gift cards, redemption codes)
        DigitalGoods = 5,
        /// Travel and event tickets, not shipped
        DigitalTravelEventTickets = 6,
        /// Gaming, digital services not shipped, e-media subscriptions
        Other = 7,
    }
}

// ============================================================================
// Nested request structures
// ============================================================================

/// An affiliate receiving part of the earnings on capture
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Affiliate {
    pub name: String,
    pub hipay_account_id: u64,
    pub amount: String,
}

impl ToSoapValue for Affiliate {
    fn to_soap_value(&self) -> Option<SoapValue> {
        Record::new()
            .field("name", &self.name)
            .field("hipayAccountId", &self.hipay_account_id)
            .field("amount", &self.amount)
            .to_soap_value()
    }
}

/// A tax line, displayed in the order price details
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tax {
    pub label: String,
    pub amount: String,
}

impl ToSoapValue for Tax {
    fn to_soap_value(&self) -> Option<SoapValue> {
        Record::new()
            .field("label", &self.label)
            .field("amount", &self.amount)
            .to_soap_value()
    }
}

/// An order line, displayed in the order price details
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Mandatory, but only displayed for [`ItemType::Product`]
    pub name: String,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub infos: String,
    pub amount: String,
    pub quantity: u32,
    pub reference: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taxes: Option<Vec<Tax>>,
}

impl ToSoapValue for Item {
    fn to_soap_value(&self) -> Option<SoapValue> {
        Record::new()
            .field("name", &self.name)
            .field("type", &self.item_type)
            .field("infos", &self.infos)
            .field("amount", &self.amount)
            .field("quantity", &self.quantity)
            .field("reference", &self.reference)
            .field("taxes", &self.taxes)
            .to_soap_value()
    }
}

/// Customer's account on the merchant's website (3-D Secure data)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<Customer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase: Option<Purchase>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping: Option<Shipping>,
}

impl ToSoapValue for AccountInfo {
    fn to_soap_value(&self) -> Option<SoapValue> {
        Record::new()
            .field("customer", &self.customer)
            .field("purchase", &self.purchase)
            .field("shipping", &self.shipping)
            .to_soap_value()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    /// Last change on the account
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_change: Option<DateInt>,
    /// Account creation date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opening_account_date: Option<DateInt>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_change: Option<DateInt>,
}

impl ToSoapValue for Customer {
    fn to_soap_value(&self) -> Option<SoapValue> {
        Record::new()
            .field("accountChange", &self.account_change)
            .field("openingAccountDate", &self.opening_account_date)
            .field("passwordChange", &self.password_change)
            .to_soap_value()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    /// Purchases with this account during the last six months
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    /// Attempts to add a card in the last 24 hours
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_stored_24h: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_attempts_24h: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_attempts_1y: Option<u32>,
}

impl ToSoapValue for Purchase {
    fn to_soap_value(&self) -> Option<SoapValue> {
        Record::new()
            .field("count", &self.count)
            .field("cardStored24h", &self.card_stored_24h)
            .field("paymentAttempts24h", &self.payment_attempts_24h)
            .field("paymentAttempts1y", &self.payment_attempts_1y)
            .to_soap_value()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shipping {
    /// First use of the shipping address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_used_date: Option<DateInt>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_indicator: Option<NameIndicator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suspicious_activity: Option<SuspiciousActivity>,
}

impl ToSoapValue for Shipping {
    fn to_soap_value(&self) -> Option<SoapValue> {
        Record::new()
            .field("shippingUsedDate", &self.shipping_used_date)
            .field("nameIndicator", &self.name_indicator)
            .field("suspiciousActivity", &self.suspicious_activity)
            .to_soap_value()
    }
}

/// Merchant's statement about the transaction
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MerchantRiskStatement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_delivery_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_time_frame: Option<DeliveryTimeFrame>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_indicator: Option<PurchaseIndicator>,
    /// Expected availability date of a pre-ordered purchase
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_order_date: Option<DateInt>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reorder_indicator: Option<ReorderIndicator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_indicator: Option<ShippingIndicator>,
}

impl ToSoapValue for MerchantRiskStatement {
    fn to_soap_value(&self) -> Option<SoapValue> {
        Record::new()
            .field("emailDeliveryAddress", &self.email_delivery_address)
            .field("deliveryTimeFrame", &self.delivery_time_frame)
            .field("purchaseIndicator", &self.purchase_indicator)
            .field("preOrderDate", &self.pre_order_date)
            .field("reorderIndicator", &self.reorder_indicator)
            .field("shippingIndicator", &self.shipping_indicator)
            .to_soap_value()
    }
}

// ============================================================================
// Create order
// ============================================================================

/// Parameters of [`HipayClient::create_order`](crate::HipayClient::create_order)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    /// Website ID, from the dashboard *Websites* page
    pub website_id: u64,

    /// Order category, depends on the website category
    pub category_id: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<String>,

    /// ISO 4217 code (eg. "EUR")
    pub currency: String,

    /// Total amount: items + shipping + taxes
    pub amount: String,

    /// Age category: `+12`, `+16`, `+18` or `ALL`
    pub rating: String,

    /// Customer locale (eg. "en_GB", "fr_FR")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,

    pub customer_ip_address: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Execution date of the payment
    pub execution_date: DateTime<Utc>,

    /// `true`: authorization only, capture must be requested later.
    /// `false`: captured automatically once authorized.
    pub manual_capture: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant_comment: Option<String>,

    /// Email used by HiPay to post operation notifications
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_callback: Option<String>,

    /// Server-to-server notification URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_callback: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_accept: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_decline: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_cancel: Option<String>,

    /// Logo shown on the payment page (HTTPS only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_logo: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_report_label: Option<String>,

    /// Custom data, sent back in notifications as `merchantDatas`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub free_data: Option<IndexMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affiliates: Option<Vec<Affiliate>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<Item>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shop_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub third_party_security: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_info: Option<AccountInfo>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant_risk_statement: Option<MerchantRiskStatement>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exemption: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

impl SoapRequest for CreateOrderRequest {
    const TYPE_NAME: &'static str = "CreateOrderRequest";
    type Result = CreateOrderResult;

    fn to_record(&self) -> Record {
        Record::new()
            .field("websiteId", &self.website_id)
            .field("categoryId", &self.category_id)
            .field("subscriptionId", &self.subscription_id)
            .field("currency", &self.currency)
            .field("amount", &self.amount)
            .field("rating", &self.rating)
            .field("locale", &self.locale)
            .field("customerIpAddress", &self.customer_ip_address)
            .field("description", &self.description)
            .field("executionDate", &self.execution_date)
            .field("manualCapture", &self.manual_capture)
            .field("customerEmail", &self.customer_email)
            .field("merchantComment", &self.merchant_comment)
            .field("emailCallback", &self.email_callback)
            .field("urlCallback", &self.url_callback)
            .field("urlAccept", &self.url_accept)
            .field("urlDecline", &self.url_decline)
            .field("urlCancel", &self.url_cancel)
            .field("urlLogo", &self.url_logo)
            .field("bankReportLabel", &self.bank_report_label)
            .field(FREE_DATA_FIELD, &self.free_data)
            .field("affiliates", &self.affiliates)
            .field("items", &self.items)
            .field("shopId", &self.shop_id)
            .field("thirdPartySecurity", &self.third_party_security)
            .field("accountInfo", &self.account_info)
            .field("merchantRiskStatement", &self.merchant_risk_statement)
            .field("exemption", &self.exemption)
            .field("method", &self.method)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResult {
    /// Payment page the customer must be redirected to
    pub redirect_url: String,
}

// ============================================================================
// Capture / cancel / refund
// ============================================================================

/// Parameters of [`HipayClient::capture_order`](crate::HipayClient::capture_order)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureOrderRequest {
    /// The `transid` received in the authorization notification
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_public_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

impl CaptureOrderRequest {
    pub fn new(transaction_public_id: impl Into<String>) -> Self {
        Self {
            transaction_public_id: Some(transaction_public_id.into()),
            ..Default::default()
        }
    }
}

impl SoapRequest for CaptureOrderRequest {
    const TYPE_NAME: &'static str = "CaptureOrderRequest";
    type Result = CaptureOrderResult;

    fn to_record(&self) -> Record {
        Record::new()
            .field("transactionPublicId", &self.transaction_public_id)
            .field("amount", &self.amount)
            .field("currency", &self.currency)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureOrderResult {
    pub transaction_public_id: String,
    #[serde(default)]
    pub merchant_reference: String,
}

/// Parameters of [`HipayClient::cancel_order`](crate::HipayClient::cancel_order)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelOrderRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_public_id: Option<String>,
}

impl CancelOrderRequest {
    pub fn new(transaction_public_id: impl Into<String>) -> Self {
        Self {
            transaction_public_id: Some(transaction_public_id.into()),
        }
    }
}

impl SoapRequest for CancelOrderRequest {
    const TYPE_NAME: &'static str = "CancelOrderRequest";
    type Result = CancelOrderResult;

    fn to_record(&self) -> Record {
        Record::new().field("transactionPublicId", &self.transaction_public_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelOrderResult {
    pub transaction_public_id: String,
    #[serde(default)]
    pub merchant_reference: String,
}

/// Parameters of [`HipayClient::refund_order`](crate::HipayClient::refund_order)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundOrderRequest {
    pub transaction_public_id: String,
    pub amount: String,
}

impl RefundOrderRequest {
    pub fn new(transaction_public_id: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            transaction_public_id: transaction_public_id.into(),
            amount: amount.into(),
        }
    }
}

impl SoapRequest for RefundOrderRequest {
    const TYPE_NAME: &'static str = "RefundOrderRequest";
    type Result = RefundOrderResult;

    fn to_record(&self) -> Record {
        Record::new()
            .field("transactionPublicId", &self.transaction_public_id)
            .field("amount", &self.amount)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundOrderResult {
    pub transaction_public_id: String,
    /// Refunded amount
    pub amount: String,
    pub currency: String,
}

// ============================================================================
// Notifications
// ============================================================================

/// Operation reported by a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationOperation {
    Authorization,
    Capture,
    Cancellation,
    Refund,
    Reject,
}

impl FromStr for NotificationOperation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "authorization" => Ok(Self::Authorization),
            "capture" => Ok(Self::Capture),
            "cancellation" => Ok(Self::Cancellation),
            "refund" => Ok(Self::Refund),
            "reject" => Ok(Self::Reject),
            other => Err(format!("unknown notification operation: {other}")),
        }
    }
}

/// Outcome of the notified operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationStatus {
    Ok,
    Nok,
    Cancel,
    Waiting,
}

impl FromStr for NotificationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ok" => Ok(Self::Ok),
            "nok" => Ok(Self::Nok),
            "cancel" => Ok(Self::Cancel),
            "waiting" => Ok(Self::Waiting),
            other => Err(format!("unknown notification status: {other}")),
        }
    }
}

/// Content of the `result` element of a notification
///
/// HiPay adds fields over time, so every scalar child is kept in [`fields`](Self::fields)
/// and the known ones get typed accessors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NotificationResult {
    #[serde(flatten)]
    pub fields: IndexMap<String, String>,

    /// `freeData` of the order, decoded from `merchantDatas`
    #[serde(rename = "merchantDatas", skip_serializing_if = "Option::is_none")]
    pub merchant_datas: Option<IndexMap<String, String>>,
}

impl NotificationResult {
    /// Raw value of a result field
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn operation(&self) -> Option<NotificationOperation> {
        self.get("operation").and_then(|s| s.parse().ok())
    }

    pub fn status(&self) -> Option<NotificationStatus> {
        self.get("status").and_then(|s| s.parse().ok())
    }

    /// Transaction id, to use as `transactionPublicId` in capture/cancel/refund
    pub fn transid(&self) -> Option<&str> {
        self.get("transid")
    }

    pub fn date(&self) -> Option<&str> {
        self.get("date")
    }

    pub fn time(&self) -> Option<&str> {
        self.get("time")
    }

    pub fn orig_amount(&self) -> Option<&str> {
        self.get("origAmount")
    }

    pub fn orig_currency(&self) -> Option<&str> {
        self.get("origCurrency")
    }

    pub fn id_for_merchant(&self) -> Option<&str> {
        self.get("idForMerchant")
    }

    pub fn email_client(&self) -> Option<&str> {
        self.get("emailClient")
    }

    pub fn refunded_amount(&self) -> Option<&str> {
        self.get("refundedAmount")
    }

    pub fn return_code(&self) -> Option<&str> {
        self.get("returnCode")
    }

    pub fn merchant_data(&self, key: &str) -> Option<&str> {
        self.merchant_datas
            .as_ref()
            .and_then(|m| m.get(key))
            .map(String::as_str)
    }
}

/// A decoded (and, unless disabled, verified) notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationResponse {
    /// Protocol version (`mapiversion`)
    #[serde(rename = "mapiversion")]
    pub version: String,

    /// Digest as received, hex encoded (`md5content`)
    #[serde(rename = "md5content")]
    pub digest: String,

    pub result: NotificationResult,
}

impl fmt::Display for NotificationResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "notification v{} ({} {})",
            self.version,
            self.result.get("operation").unwrap_or("?"),
            self.result.get("status").unwrap_or("?")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_order() -> CreateOrderRequest {
        let mut free_data = IndexMap::new();
        free_data.insert("sessionId".to_string(), "123456789".to_string());

        CreateOrderRequest {
            website_id: 42,
            category_id: 7,
            amount: "14.39".to_string(),
            currency: "EUR".to_string(),
            rating: "ALL".to_string(),
            customer_ip_address: "127.0.0.1".to_string(),
            execution_date: Utc.with_ymd_and_hms(2019, 9, 26, 10, 0, 0).unwrap(),
            manual_capture: true,
            free_data: Some(free_data),
            items: Some(vec![Item {
                name: "Lamborghini Aventador S".to_string(),
                item_type: ItemType::Product,
                infos: String::new(),
                amount: "10.00".to_string(),
                quantity: 1,
                reference: "LAMBO-AV-S".to_string(),
                taxes: Some(vec![Tax {
                    label: "TVA".to_string(),
                    amount: "2.00".to_string(),
                }]),
            }]),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_order_record() {
        let record = sample_order().to_record();

        assert_eq!(record.get("manualCapture"), Some(&SoapValue::Bool(true)));
        assert_eq!(record.get("websiteId"), Some(&SoapValue::Scalar("42".into())));
        assert!(!record.contains("locale"));
        assert!(matches!(record.get(FREE_DATA_FIELD), Some(SoapValue::Dictionary(_))));
        assert!(matches!(record.get("executionDate"), Some(SoapValue::DateTime(_))));

        match record.get("items") {
            Some(SoapValue::List(items)) => {
                assert_eq!(items.len(), 1);
                match &items[0] {
                    SoapValue::Record(item) => {
                        assert_eq!(item.get("type"), Some(&SoapValue::Scalar("4".into())));
                        assert!(matches!(item.get("taxes"), Some(SoapValue::List(_))));
                    }
                    other => panic!("unexpected {other:?}"),
                }
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_numeric_enum_conversions() {
        assert_eq!(u8::from(ShippingIndicator::DigitalGoods), 5);
        assert_eq!(ItemType::try_from(3), Ok(ItemType::ShippingCosts));
        assert!(ReorderIndicator::try_from(9).is_err());
    }

    #[test]
    fn test_item_without_taxes() {
        let item = Item {
            name: "Insurance".to_string(),
            item_type: ItemType::Insurances,
            infos: String::new(),
            amount: "2.39".to_string(),
            quantity: 1,
            reference: "LAMBO-INSURANCE".to_string(),
            taxes: None,
        };
        match item.to_soap_value() {
            Some(SoapValue::Record(record)) => assert!(!record.contains("taxes")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_notification_accessors() {
        let mut fields = IndexMap::new();
        fields.insert("operation".to_string(), "capture".to_string());
        fields.insert("status".to_string(), "ok".to_string());
        fields.insert("transid".to_string(), "5D8C9A2B6A6C1".to_string());
        let result = NotificationResult {
            fields,
            merchant_datas: None,
        };

        assert_eq!(result.operation(), Some(NotificationOperation::Capture));
        assert_eq!(result.status(), Some(NotificationStatus::Ok));
        assert_eq!(result.transid(), Some("5D8C9A2B6A6C1"));
        assert_eq!(result.merchant_data("sessionId"), None);
    }
}
