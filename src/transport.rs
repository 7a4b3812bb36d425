use crate::error::{BraviaError, Result};
use crate::protocol::{self, RpcRequest, RpcResponse};
use reqwest::header::{HeaderValue, CONTENT_TYPE, COOKIE, SET_COOKIE};
use serde_json::Value;
use std::sync::Mutex;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Low-level HTTP transport for the set's control services
///
/// Holds the host identity and the pairing cookie. The cookie the set issues
/// at registration is scoped to `/sony`; only its `auth` pair is stored and
/// re-attached, because the `appControl` and `avContent` services sit above
/// that path.
pub struct Transport {
    host: String,
    http: reqwest::Client,
    auth_cookie: Mutex<Option<String>>,
}

impl Transport {
    /// Create a transport for the set at `host` (`host` or `host:port`)
    pub fn new(host: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            host: host.into(),
            http,
            auth_cookie: Mutex::new(None),
        })
    }

    /// Get the host this transport talks to
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Check whether an auth cookie has been stored
    ///
    /// Does not probe the set; the cookie may have expired.
    pub fn is_paired(&self) -> bool {
        self.auth_cookie.lock().unwrap().is_some()
    }

    fn url(&self, service: &str) -> String {
        format!("http://{}/{}", self.host, service)
    }

    fn cookie_header(&self) -> Option<HeaderValue> {
        self.auth_cookie
            .lock()
            .unwrap()
            .as_ref()
            .and_then(|auth| HeaderValue::from_str(&format!("auth={auth}")).ok())
    }

    /// Register this client with the set and capture the auth cookie
    ///
    /// A non-empty `pin` is sent as HTTP Basic credentials with an empty
    /// username. Any failure leaves a previously stored cookie untouched.
    pub async fn register(&self, pin: &str, request: &RpcRequest) -> Result<()> {
        let mut builder = self
            .http
            .post(self.url(protocol::service::ACCESS_CONTROL))
            .json(request);
        if !pin.is_empty() {
            builder = builder.basic_auth("", Some(pin));
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%status, "registration rejected");
            return Err(BraviaError::Status(status));
        }

        // Capture the cookie before the body consumes the response.
        let auth = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find_map(parse_auth_cookie);

        // Some firmwares answer with an empty or null body on success.
        let bytes = response.bytes().await?;
        if !bytes.is_empty() {
            let body: Value = serde_json::from_slice(&bytes)?;
            if !body.is_null() {
                let envelope: RpcResponse = serde_json::from_value(body)?;
                envelope.into_result()?;
            }
        }

        if let Some(auth) = auth {
            tracing::debug!("stored auth cookie");
            *self.auth_cookie.lock().unwrap() = Some(auth);
        }
        Ok(())
    }

    /// Send an IRCC remote code and return the raw SOAP response body
    pub async fn send_ircc(&self, code: &str) -> Result<String> {
        tracing::debug!(code, "sending IRCC code");
        let mut builder = self
            .http
            .post(self.url(protocol::service::IRCC))
            .header("SOAPACTION", protocol::SOAP_ACTION)
            .header(CONTENT_TYPE, "text/xml; charset=UTF-8")
            .body(protocol::ircc_envelope(code));
        if let Some(cookie) = self.cookie_header() {
            builder = builder.header(COOKIE, cookie);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(BraviaError::Status(status));
        }
        Ok(response.text().await?)
    }

    /// Issue a JSON-RPC-style call against one of the control services
    ///
    /// Returns the whole envelope; callers decide whether a device-reported
    /// error is fatal.
    pub async fn json_rpc(&self, service: &str, request: &RpcRequest) -> Result<RpcResponse> {
        tracing::debug!(service, method = %request.method, "sending rpc request");
        let mut builder = self.http.post(self.url(service)).json(request);
        if let Some(cookie) = self.cookie_header() {
            builder = builder.header(COOKIE, cookie);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(BraviaError::Status(status));
        }
        Ok(response.json().await?)
    }
}

/// Extract the value of the `auth` pair from a `Set-Cookie` header
fn parse_auth_cookie(header: &str) -> Option<String> {
    let (name, rest) = header.split_once('=')?;
    if name.trim() != "auth" {
        return None;
    }
    let value = rest.split(';').next().unwrap_or(rest).trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
