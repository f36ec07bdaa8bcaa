//! JSON-RPC 2.0 envelopes for calls that bypass the `tendermint-rpc` driver.
//!
//! Only the framing lives here. Params and results are encoded and decoded
//! with the `tendermint_rpc::endpoint` types.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::RpcError;

pub const JSONRPC_VERSION: &str = "2.0";

#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcRequest<P> {
    pub jsonrpc: &'static str,
    pub id: String,
    pub method: &'static str,
    pub params: P,
}

impl<P: Serialize> JsonRpcRequest<P> {
    pub fn new(method: &'static str, params: P) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id: Uuid::new_v4().to_string(),
            method,
            params,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    pub fn parse(body: &[u8]) -> Result<Self, RpcError> {
        let response: Self = serde_json::from_slice(body)?;
        match response.jsonrpc.as_deref() {
            None | Some(JSONRPC_VERSION) => Ok(response),
            Some(version) => Err(RpcError::Envelope(format!(
                "unsupported jsonrpc version {version}"
            ))),
        }
    }

    /// Checks for an error object before touching the result, so a failed
    /// call never reaches the payload decoder.
    pub fn into_result<R: DeserializeOwned>(self) -> Result<R, RpcError> {
        if let Some(error) = self.error {
            return Err(RpcError::Protocol(serde_json::to_string(&error)?));
        }
        let result = self.result.ok_or_else(|| {
            RpcError::Envelope("neither result nor error present".to_string())
        })?;

        Ok(serde_json::from_value(result)?)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn request_envelope_shape() {
        let request = JsonRpcRequest::new("abci_query", json!({"prove": true}));
        let encoded = serde_json::to_value(&request).unwrap();

        assert_eq!(encoded["jsonrpc"], "2.0");
        assert_eq!(encoded["method"], "abci_query");
        assert_eq!(encoded["params"]["prove"], true);
        assert!(Uuid::parse_str(encoded["id"].as_str().unwrap()).is_ok());
    }

    #[test]
    fn error_object_wins_over_result() {
        let body = br#"{"jsonrpc":"2.0","id":1,"result":{"ok":true},"error":{"code":1,"message":"x"}}"#;
        let error = JsonRpcResponse::parse(body)
            .unwrap()
            .into_result::<Value>()
            .unwrap_err();

        assert!(matches!(&error, RpcError::Protocol(message) if message == r#"{"code":1,"message":"x"}"#));
    }

    #[test]
    fn bare_error_envelope_is_a_protocol_error() {
        let body = br#"{"error":{"code":1,"message":"x"}}"#;
        let error = JsonRpcResponse::parse(body)
            .unwrap()
            .into_result::<Value>()
            .unwrap_err();

        assert!(error.to_string().contains("\"code\":1"));
    }

    #[test]
    fn error_data_is_kept() {
        let body = br#"{"jsonrpc":"2.0","id":"a","error":{"code":-32603,"message":"Internal error","data":"height 99 must be less than or equal to the current blockchain height 10"}}"#;
        let error = JsonRpcResponse::parse(body)
            .unwrap()
            .into_result::<Value>()
            .unwrap_err();

        let RpcError::Protocol(message) = error else {
            panic!("expected a protocol error");
        };
        let object: JsonRpcError = serde_json::from_str(&message).unwrap();
        assert_eq!(object.code, -32603);
        assert!(object.data.unwrap().as_str().unwrap().contains("height 99"));
    }

    #[test]
    fn rejects_foreign_versions() {
        let body = br#"{"jsonrpc":"1.0","id":1,"result":{}}"#;

        assert!(matches!(
            JsonRpcResponse::parse(body),
            Err(RpcError::Envelope(_))
        ));
    }

    #[test]
    fn empty_envelope_is_invalid() {
        let body = br#"{"jsonrpc":"2.0","id":1}"#;
        let error = JsonRpcResponse::parse(body)
            .unwrap()
            .into_result::<Value>()
            .unwrap_err();

        assert!(matches!(error, RpcError::Envelope(_)));
    }

    #[test]
    fn decodes_result_payload() {
        let body = br#"{"jsonrpc":"2.0","id":1,"result":{"n":"7"}}"#;
        let result: Value =
            JsonRpcResponse::parse(body).unwrap().into_result().unwrap();

        assert_eq!(result["n"], "7");
    }
}
