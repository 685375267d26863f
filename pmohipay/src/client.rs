//! HiPay Professional client
//!
//! # Example
//!
//! ```no_run
//! use pmohipay::{CaptureOrderRequest, HipayClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = HipayClient::new("stage", "login", "password")?;
//!
//!     let response = client
//!         .capture_order(&CaptureOrderRequest::new("5CF68C1301DC7655"), None)
//!         .await?;
//!     match response.result() {
//!         Some(result) => println!("captured {}", result.transaction_public_id),
//!         None => println!("refused: {:?}", response.error()),
//!     }
//!     Ok(())
//! }
//! ```

use crate::config::HipayConfig;
use crate::error::{Error, HipayError, NotificationError, Result, TransportError};
use crate::models::{
    CancelOrderRequest, CancelOrderResult, CaptureOrderRequest, CaptureOrderResult,
    CreateOrderRequest, CreateOrderResult, NotificationResponse, RefundOrderRequest,
    RefundOrderResult,
};
use crate::notification::{NotificationDecoder, ParseNotificationOptions};
use crate::registry;
use crate::soap::{Record, SoapRequest, build_request_body, parse_response};
use crate::transport::{HttpRequest, RawResponse, ReqwestTransport, Transport};
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Production web services
pub const PRODUCTION_ENDPOINT: &str = "https://ws.hipay.com/";

/// Test web services
pub const STAGE_ENDPOINT: &str = "https://test-ws.hipay.com/";

/// Default timeout for HTTP requests (30 seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default User-Agent
pub const DEFAULT_USER_AGENT: &str = concat!("pmohipay/", env!("CARGO_PKG_VERSION"));

/// Content type of SOAP 1.1 requests and responses
pub const SOAP_CONTENT_TYPE: &str = "text/xml;charset=UTF-8";

/// Target web services
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Production,
    Stage,
    /// Any http(s) base URL, fragment stripped
    Custom(Url),
}

impl Environment {
    /// Base URL of the web services
    pub fn endpoint(&self) -> &str {
        match self {
            Environment::Production => PRODUCTION_ENDPOINT,
            Environment::Stage => STAGE_ENDPOINT,
            Environment::Custom(url) => url.as_str(),
        }
    }
}

impl FromStr for Environment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "production" => Ok(Environment::Production),
            "stage" => Ok(Environment::Stage),
            other => {
                let invalid = || {
                    Error::config(format!(
                        "env must be \"production\", \"stage\" or a valid http(s) URL, got {other:?}"
                    ))
                };
                let has_slashes = other
                    .split_once(':')
                    .is_some_and(|(_, rest)| rest.starts_with("//"));
                if !has_slashes {
                    return Err(invalid());
                }
                let mut url = Url::parse(other).map_err(|_| invalid())?;
                if !matches!(url.scheme(), "http" | "https") || url.query().is_some() {
                    return Err(invalid());
                }
                url.set_fragment(None);
                Ok(Environment::Custom(url))
            }
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Production => f.write_str("production"),
            Environment::Stage => f.write_str("stage"),
            Environment::Custom(url) => f.write_str(url.as_str()),
        }
    }
}

/// Web service account, sent as hidden fields of every request
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub login: String,
    pub password: String,
    pub sub_account_login: Option<String>,
    pub sub_account_id: Option<String>,
}

impl Credentials {
    pub fn to_record(&self) -> Record {
        Record::new()
            .field("wsLogin", &self.login)
            .field("wsPassword", &self.password)
            .field("wsSubAccountLogin", &self.sub_account_login)
            .field("wsSubAccountId", &self.sub_account_id)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("login", &self.login)
            .field("password", &"***")
            .field("sub_account_login", &self.sub_account_login)
            .field("sub_account_id", &self.sub_account_id)
            .finish()
    }
}

/// Per-call overrides of the client defaults
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub timeout: Option<Duration>,
    /// Added to (and overriding) the default headers
    pub headers: HeaderMap,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// Outcome of a call that reached HiPay and was understood
///
/// Exactly one of [`result`](Self::result) and [`error`](Self::error) is set.
#[derive(Debug, Clone)]
pub struct HipayResponse<T> {
    http_response: RawResponse,
    outcome: std::result::Result<T, HipayError>,
}

impl<T> HipayResponse<T> {
    pub fn new(http_response: RawResponse, outcome: std::result::Result<T, HipayError>) -> Self {
        Self {
            http_response,
            outcome,
        }
    }

    pub fn result(&self) -> Option<&T> {
        self.outcome.as_ref().ok()
    }

    pub fn error(&self) -> Option<&HipayError> {
        self.outcome.as_ref().err()
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn outcome(&self) -> &std::result::Result<T, HipayError> {
        &self.outcome
    }

    pub fn into_result(self) -> std::result::Result<T, HipayError> {
        self.outcome
    }

    /// Raw status and body, for diagnostics
    pub fn http_response(&self) -> &RawResponse {
        &self.http_response
    }
}

/// HiPay Professional SOAP client
///
/// The client is immutable once built and can be shared between tasks; every call
/// is a single request with no retry.
#[derive(Clone)]
pub struct HipayClient {
    environment: String,
    endpoint: String,
    credentials: Credentials,
    timeout: Duration,
    headers: HeaderMap,
    transport: Arc<dyn Transport>,
    notifications: NotificationDecoder,
}

impl HipayClient {
    /// Create a client with default options
    ///
    /// `environment` is `production`, `stage` or an http(s) base URL.
    pub fn new(
        environment: impl Into<String>,
        login: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self> {
        Self::builder()
            .environment(environment)
            .login(login)
            .password(password)
            .build()
    }

    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create a client from loaded configuration
    pub fn from_config(config: &HipayConfig) -> Result<Self> {
        let mut builder = Self::builder()
            .environment(&config.environment)
            .login(&config.login)
            .password(&config.password)
            .timeout(config.timeout());
        if let Some(login) = &config.sub_account_login {
            builder = builder.sub_account_login(login);
        }
        if let Some(id) = &config.sub_account_id {
            builder = builder.sub_account_id(id);
        }
        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent);
        }
        builder.build()
    }

    /// Environment as given at construction
    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Resolved base URL
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Create an order and get the payment page URL
    pub async fn create_order(
        &self,
        request: &CreateOrderRequest,
        options: Option<&RequestOptions>,
    ) -> Result<HipayResponse<CreateOrderResult>> {
        self.execute(request, options).await
    }

    /// Capture an authorized order
    pub async fn capture_order(
        &self,
        request: &CaptureOrderRequest,
        options: Option<&RequestOptions>,
    ) -> Result<HipayResponse<CaptureOrderResult>> {
        self.execute(request, options).await
    }

    /// Cancel an authorized order
    pub async fn cancel_order(
        &self,
        request: &CancelOrderRequest,
        options: Option<&RequestOptions>,
    ) -> Result<HipayResponse<CancelOrderResult>> {
        self.execute(request, options).await
    }

    /// Refund a captured order, partially or totally
    pub async fn refund_order(
        &self,
        request: &RefundOrderRequest,
        options: Option<&RequestOptions>,
    ) -> Result<HipayResponse<RefundOrderResult>> {
        self.execute(request, options).await
    }

    /// Send any registered request
    ///
    /// HTTP 200 and 500 are both handed to the response parser (HiPay reports SOAP
    /// faults with a 500); any other status is a transport error.
    pub async fn execute<R: SoapRequest>(
        &self,
        request: &R,
        options: Option<&RequestOptions>,
    ) -> Result<HipayResponse<R::Result>> {
        let definition = registry::lookup(R::TYPE_NAME)?;
        let url = definition.operation_url(&self.endpoint)?;

        let parameters = self.credentials.to_record().merge(request.to_record());
        let body = build_request_body(&self.endpoint, definition, &parameters)?;

        let http_request = HttpRequest {
            url,
            headers: self.request_headers(options),
            body,
            timeout: options.and_then(|o| o.timeout).unwrap_or(self.timeout),
        };
        debug!("POST {} ({})", http_request.url, R::TYPE_NAME);

        let response = match self.transport.post(http_request).await {
            Ok(response) => response,
            Err(source) => {
                warn!("{} failed: {}", R::TYPE_NAME, source);
                return Err(Error::Transport {
                    source,
                    response: None,
                });
            }
        };
        debug!("{} answered with status {}", R::TYPE_NAME, response.status);

        if response.status != 200 && response.status != 500 {
            warn!("{} failed with status {}", R::TYPE_NAME, response.status);
            return Err(Error::Transport {
                source: TransportError::UnexpectedStatus(response.status),
                response: Some(response),
            });
        }

        match parse_response::<R::Result>(&response.body, definition) {
            Ok(outcome) => {
                if let Err(e) = &outcome {
                    warn!("{} refused by HiPay: {}", R::TYPE_NAME, e);
                }
                Ok(HipayResponse::new(response, outcome))
            }
            Err(source) => {
                warn!("{} response could not be parsed: {}", R::TYPE_NAME, source);
                Err(Error::Parse { source, response })
            }
        }
    }

    /// Decode and verify a notification payload
    pub fn parse_notification(
        &self,
        xml: &str,
        options: Option<&ParseNotificationOptions>,
    ) -> std::result::Result<NotificationResponse, NotificationError> {
        self.notifications
            .decode(xml, options.unwrap_or(&ParseNotificationOptions::default()))
    }

    /// Decode and verify the raw `application/x-www-form-urlencoded` callback body
    pub fn parse_notification_form(
        &self,
        body: &str,
        options: Option<&ParseNotificationOptions>,
    ) -> std::result::Result<NotificationResponse, NotificationError> {
        self.notifications
            .decode_form(body, options.unwrap_or(&ParseNotificationOptions::default()))
    }

    fn request_headers(&self, options: Option<&RequestOptions>) -> HeaderMap {
        let mut headers = self.headers.clone();
        if let Some(options) = options {
            for (name, value) in &options.headers {
                headers.insert(name.clone(), value.clone());
            }
        }
        for name in [CONTENT_TYPE, ACCEPT] {
            if !headers.contains_key(&name) {
                headers.insert(name, HeaderValue::from_static(SOAP_CONTENT_TYPE));
            }
        }
        if !headers.contains_key(USER_AGENT) {
            headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));
        }
        headers
    }
}

impl fmt::Display for HipayClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HipayClient{{environment={}}}", self.environment)
    }
}

impl fmt::Debug for HipayClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HipayClient")
            .field("environment", &self.environment)
            .field("endpoint", &self.endpoint)
            .field("credentials", &self.credentials)
            .field("timeout", &self.timeout)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// Builder for configuring a HipayClient
pub struct ClientBuilder {
    environment: Option<String>,
    login: Option<String>,
    password: Option<String>,
    sub_account_login: Option<String>,
    sub_account_id: Option<String>,
    timeout: Duration,
    user_agent: Option<String>,
    headers: Vec<(String, String)>,
    transport: Option<Arc<dyn Transport>>,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            environment: None,
            login: None,
            password: None,
            sub_account_login: None,
            sub_account_id: None,
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            user_agent: None,
            headers: Vec::new(),
            transport: None,
        }
    }
}

impl ClientBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// `production`, `stage` or an http(s) base URL
    pub fn environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    pub fn login(mut self, login: impl Into<String>) -> Self {
        self.login = Some(login.into());
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn sub_account_login(mut self, login: impl Into<String>) -> Self {
        self.sub_account_login = Some(login.into());
        self
    }

    pub fn sub_account_id(mut self, id: impl Into<String>) -> Self {
        self.sub_account_id = Some(id.into());
        self
    }

    /// Set the default request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set a custom User-Agent header
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Add a header sent with every request
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Use a custom transport instead of `reqwest`
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build the client
    pub fn build(self) -> Result<HipayClient> {
        let environment = self
            .environment
            .ok_or_else(|| Error::config("environment is required"))?;
        let endpoint = environment.parse::<Environment>()?.endpoint().to_string();

        let login = self.login.filter(|s| !s.is_empty());
        let password = self.password.filter(|s| !s.is_empty());
        let (Some(login), Some(password)) = (login, password) else {
            return Err(Error::config("login and password are required"));
        };

        let mut headers = HeaderMap::new();
        for (name, value) in &self.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| Error::config(format!("invalid header name {name:?}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| Error::config(format!("invalid header value {value:?}: {e}")))?;
            headers.insert(name, value);
        }
        if let Some(user_agent) = &self.user_agent {
            let value = HeaderValue::from_str(user_agent)
                .map_err(|e| Error::config(format!("invalid User-Agent {user_agent:?}: {e}")))?;
            headers.insert(USER_AGENT, value);
        }

        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(ReqwestTransport::new()));

        info!(environment = %environment, endpoint = %endpoint, "HiPay client ready");

        Ok(HipayClient {
            environment,
            endpoint,
            notifications: NotificationDecoder::new(password.clone()),
            credentials: Credentials {
                login,
                password,
                sub_account_login: self.sub_account_login,
                sub_account_id: self.sub_account_id,
            },
            timeout: self.timeout,
            headers,
            transport,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::soap::SoapValue;

    #[test]
    fn test_environment_resolution() {
        assert_eq!(
            "stage".parse::<Environment>().unwrap().endpoint(),
            "https://test-ws.hipay.com/"
        );
        assert_eq!(
            "production".parse::<Environment>().unwrap().endpoint(),
            "https://ws.hipay.com/"
        );
        assert_eq!(
            "https://x.com/#frag".parse::<Environment>().unwrap().endpoint(),
            "https://x.com/"
        );
        assert_eq!(
            "http://localhost:8080/hipay/".parse::<Environment>().unwrap().endpoint(),
            "http://localhost:8080/hipay/"
        );
    }

    #[test]
    fn test_invalid_environments() {
        for env in [
            "https://x.com/?q=1",
            "not-a-url",
            "ftp://x.com/",
            "Stage",
            "",
            "http:foo",
            "https:x.com/api",
            "https:/x.com/",
        ] {
            let err = env.parse::<Environment>().unwrap_err();
            assert!(
                err.to_string()
                    .contains("env must be \"production\", \"stage\" or a valid http(s) URL"),
                "{env}: {err}"
            );
        }
    }

    #[test]
    fn test_display_and_accessors() {
        let client = HipayClient::new("https://x.com/#frag", "login", "password").unwrap();
        assert_eq!(client.to_string(), "HipayClient{environment=https://x.com/#frag}");
        assert_eq!(client.environment(), "https://x.com/#frag");
        assert_eq!(client.endpoint(), "https://x.com/");
        assert_eq!(client.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_debug_hides_password() {
        let client = HipayClient::new("stage", "login", "s3cr3t").unwrap();
        let debug = format!("{client:?}");
        assert!(debug.contains("login"));
        assert!(!debug.contains("s3cr3t"));
    }

    #[test]
    fn test_missing_credentials() {
        assert!(HipayClient::new("stage", "", "password").is_err());
        assert!(HipayClient::new("stage", "login", "").is_err());
        assert!(HipayClient::builder().login("l").password("p").build().is_err());
    }

    #[test]
    fn test_credentials_record() {
        let credentials = Credentials {
            login: "l".into(),
            password: "p".into(),
            sub_account_login: None,
            sub_account_id: Some("7".into()),
        };
        let record = credentials.to_record();
        let keys: Vec<&str> = record.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["wsLogin", "wsPassword", "wsSubAccountId"]);
        assert_eq!(record.get("wsSubAccountId"), Some(&SoapValue::Scalar("7".into())));
    }

    #[test]
    fn test_default_headers() {
        let client = HipayClient::new("stage", "login", "password").unwrap();
        let headers = client.request_headers(None);
        assert_eq!(headers[CONTENT_TYPE], SOAP_CONTENT_TYPE);
        assert_eq!(headers[ACCEPT], SOAP_CONTENT_TYPE);
        assert!(headers[USER_AGENT].to_str().unwrap().starts_with("pmohipay/"));
    }

    #[test]
    fn test_caller_headers_win() {
        let client = HipayClient::builder()
            .environment("stage")
            .login("login")
            .password("password")
            .user_agent("my-shop/1.0")
            .header("X-Trace", "abc")
            .build()
            .unwrap();

        let options = RequestOptions::new()
            .header(CONTENT_TYPE, HeaderValue::from_static("application/soap+xml"));
        let headers = client.request_headers(Some(&options));

        assert_eq!(headers[CONTENT_TYPE], "application/soap+xml");
        assert_eq!(headers[ACCEPT], SOAP_CONTENT_TYPE);
        assert_eq!(headers[USER_AGENT], "my-shop/1.0");
        assert_eq!(headers["x-trace"], "abc");
    }

    #[test]
    fn test_invalid_header() {
        let result = HipayClient::builder()
            .environment("stage")
            .login("login")
            .password("password")
            .header("bad header", "x")
            .build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_from_config() {
        let config = HipayConfig::from_yaml(
            "hipay:\n  environment: production\n  login: l\n  password: p\n  sub_account_id: 12\n  timeout_ms: 5000\n",
        )
        .unwrap();
        let client = HipayClient::from_config(&config).unwrap();
        assert_eq!(client.endpoint(), PRODUCTION_ENDPOINT);
        assert_eq!(client.timeout(), Duration::from_secs(5));
        assert_eq!(client.credentials.sub_account_id.as_deref(), Some("12"));
    }
}
