use crate::error::{BraviaError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Control service paths on the set.
///
/// The registration cookie the set issues is scoped to `/sony`, but a few
/// services are rooted above it; both roots appear here.
pub mod service {
    /// Pairing/registration service
    pub const ACCESS_CONTROL: &str = "sony/accessControl";
    /// IRCC remote-code delivery service
    pub const IRCC: &str = "sony/IRCC";
    /// Content and playing-info queries
    pub const AV_CONTENT: &str = "sony/avContent";
    /// Audio control
    pub const AUDIO: &str = "sony/audio";
    /// System queries (power, remote codes, system info)
    pub const SYSTEM: &str = "sony/system";
    /// App listing and activation (rooted above `/sony`)
    pub const APP_CONTROL: &str = "appControl";
    /// Source listing and content playback (rooted above `/sony`)
    pub const AV_CONTENT_ROOT: &str = "avContent";
}

/// SOAPACTION header value for `X_SendIRCC`, quotes included
pub const SOAP_ACTION: &str = "\"urn:schemas-sony-com:service:IRCC:1#X_SendIRCC\"";

/// Request envelope for the set's JSON-RPC-style control API
///
/// The set ignores the request id, so it is fixed at 1.
#[derive(Debug, Clone, Serialize)]
pub struct RpcRequest {
    pub method: String,
    pub params: Vec<Value>,
    pub id: u32,
    pub version: &'static str,
}

impl RpcRequest {
    /// Create a request with no parameters
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            params: Vec::new(),
            id: 1,
            version: "1.0",
        }
    }

    /// Append one positional parameter
    pub fn with_params(mut self, params: Value) -> Self {
        self.params.push(params);
        self
    }
}

/// Response envelope for the JSON-RPC-style control API
///
/// Exactly one of `result` and `error` is present on a well-behaved set.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub result: Option<Vec<Value>>,
    #[serde(default)]
    pub error: Option<Value>,
    #[serde(default)]
    pub id: Option<u32>,
}

impl RpcResponse {
    /// Check if the set reported an error
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// Unwrap the result array, converting a reported error into
    /// [`BraviaError::Device`]
    pub fn into_result(self) -> Result<Vec<Value>> {
        match self.error {
            Some(error) => Err(device_error(&error)),
            None => Ok(self.result.unwrap_or_default()),
        }
    }
}

/// Parse the set's error field, usually a `[code, "message"]` pair
fn device_error(error: &Value) -> BraviaError {
    let (code, message) = match error {
        Value::Array(items) => (
            items.first().and_then(Value::as_i64).unwrap_or(0),
            items
                .get(1)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        ),
        other => (0, other.to_string()),
    };
    BraviaError::Device { code, message }
}

/// Wrap an IRCC code in the SOAP envelope the IRCC service expects
pub fn ircc_envelope(code: &str) -> String {
    format!(
        concat!(
            "<?xml version=\"1.0\"?>",
            "<s:Envelope xmlns:s=\"http://schemas.xmlsoap.org/soap/envelope/\" ",
            "s:encodingStyle=\"http://schemas.xmlsoap.org/soap/encoding/\">",
            "<s:Body>",
            "<u:X_SendIRCC xmlns:u=\"urn:schemas-sony-com:service:IRCC:1\">",
            "<IRCCCode>{}</IRCCCode>",
            "</u:X_SendIRCC>",
            "</s:Body>",
            "</s:Envelope>"
        ),
        code
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_without_params_serializes_with_empty_array() {
        let request = RpcRequest::new("getPowerStatus");
        let body = serde_json::to_string(&request).unwrap();
        assert_eq!(
            body,
            r#"{"method":"getPowerStatus","params":[],"id":1,"version":"1.0"}"#
        );
    }

    #[test]
    fn request_params_are_wrapped_in_an_array() {
        let request = RpcRequest::new("getSourceList").with_params(json!({"scheme": "tv"}));
        let body: Value = serde_json::to_value(&request).unwrap();
        assert_eq!(body["params"], json!([{"scheme": "tv"}]));
    }

    #[test]
    fn error_pair_maps_to_device_error() {
        let response: RpcResponse =
            serde_json::from_str(r#"{"error":[40005,"Display Is Turned off"],"id":1}"#).unwrap();
        match response.into_result() {
            Err(BraviaError::Device { code, message }) => {
                assert_eq!(code, 40005);
                assert_eq!(message, "Display Is Turned off");
            }
            other => panic!("expected device error, got {other:?}"),
        }
    }

    #[test]
    fn missing_result_reads_as_empty() {
        let response: RpcResponse = serde_json::from_str(r#"{"id":1}"#).unwrap();
        assert!(response.into_result().unwrap().is_empty());
    }

    #[test]
    fn ircc_envelope_wraps_the_code() {
        let envelope = ircc_envelope("AAAAAQAAAAEAAAAuAw==");
        assert!(envelope.starts_with("<?xml version=\"1.0\"?><s:Envelope"));
        assert!(envelope.contains("<IRCCCode>AAAAAQAAAAEAAAAuAw==</IRCCCode>"));
        assert!(envelope.ends_with("</s:Body></s:Envelope>"));
    }
}
