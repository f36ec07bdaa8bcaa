use serde_json::{json, Value};
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

/// A JSON-RPC call received by the [`MockNode`].
#[derive(Debug, Clone)]
pub struct RpcCall {
    pub id: Value,
    pub method: String,
    pub params: Value,
}

impl RpcCall {
    fn from_body(body: &[u8]) -> Option<Self> {
        let envelope: Value = serde_json::from_slice(body).ok()?;

        Some(Self {
            id: envelope.get("id").cloned().unwrap_or(Value::Null),
            method: envelope.get("method")?.as_str()?.to_owned(),
            params: envelope.get("params").cloned().unwrap_or(Value::Null),
        })
    }

    /// CometBFT accepts integers both as JSON numbers and as strings.
    pub fn param_u64(&self, name: &str) -> Option<u64> {
        match self.params.get(name)? {
            Value::String(value) => value.parse().ok(),
            Value::Number(value) => value.as_u64(),
            _ => None,
        }
    }

    pub fn param_str(&self, name: &str) -> Option<&str> {
        self.params.get(name)?.as_str()
    }

    pub fn param_bool(&self, name: &str) -> Option<bool> {
        self.params.get(name)?.as_bool()
    }
}

pub enum Reply {
    Result(Value),
    Error(Value),
    /// Error envelope sent with a non-200 status, as CometBFT does for
    /// internal errors.
    ErrorWithStatus(u16, Value),
    /// Body sent verbatim, e.g. a proxy error page.
    Raw(u16, String),
}

/// In-process stand-in for a CometBFT RPC endpoint.
pub struct MockNode {
    server: MockServer,
}

impl MockNode {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// Answers every JSON-RPC POST with `handler`, echoing the call id.
    pub async fn serve<F>(&self, handler: F)
    where
        F: Fn(&RpcCall) -> Reply + Send + Sync + 'static,
    {
        Mock::given(method("POST"))
            .respond_with(move |request: &Request| {
                let Some(call) = RpcCall::from_body(&request.body) else {
                    return ResponseTemplate::new(400)
                        .set_body_string("malformed JSON-RPC request");
                };
                match handler(&call) {
                    Reply::Result(result) => ResponseTemplate::new(200)
                        .set_body_json(envelope(&call, "result", result)),
                    Reply::Error(error) => ResponseTemplate::new(200)
                        .set_body_json(envelope(&call, "error", error)),
                    Reply::ErrorWithStatus(status, error) => {
                        ResponseTemplate::new(status)
                            .set_body_json(envelope(&call, "error", error))
                    }
                    Reply::Raw(status, body) => {
                        ResponseTemplate::new(status).set_body_string(body)
                    }
                }
            })
            .mount(&self.server)
            .await;
    }

    /// Calls received so far, in arrival order.
    pub async fn calls(&self) -> Vec<RpcCall> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter_map(|request| RpcCall::from_body(&request.body))
            .collect()
    }
}

fn envelope(call: &RpcCall, key: &str, payload: Value) -> Value {
    let mut envelope = json!({
        "jsonrpc": "2.0",
        "id": call.id,
    });
    envelope[key] = payload;
    envelope
}
