//! JSON-RPC message intake and host context tracking
//!
//! The engine only needs `{ "hostContext": { .. } }`. Hosts deliver that
//! object over JSON-RPC: in full as the result of `ui/initialize`, and as
//! partial updates in `ui/notifications/host-context-changed`. The
//! [`HostContextTracker`] folds those messages into the current context.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::schema::HOST_CONTEXT_KEY;
use crate::{ConformanceError, ConformanceResult};

/// JSON-RPC protocol version string
pub const JSONRPC_VERSION: &str = "2.0";

/// MCP Apps method names
pub mod methods {
    /// View -> host handshake; the result carries the host context
    pub const UI_INITIALIZE: &str = "ui/initialize";
    /// View -> host, sent once the handshake completed
    pub const UI_INITIALIZED: &str = "ui/notifications/initialized";
    /// Host -> view, partial host context update
    pub const HOST_CONTEXT_CHANGED: &str = "ui/notifications/host-context-changed";
    /// View -> host, content size report
    pub const SIZE_CHANGED: &str = "ui/notifications/size-changed";
}

/// A classified JSON-RPC 2.0 message
#[derive(Debug, Clone, PartialEq)]
pub enum RpcMessage {
    /// Call expecting a response
    Request {
        id: Value,
        method: String,
        params: Option<Value>,
    },
    /// Call without an id
    Notification {
        method: String,
        params: Option<Value>,
    },
    /// Successful reply
    Response {
        id: Value,
        result: Value,
    },
    /// Error reply
    Error {
        id: Value,
        code: i64,
        message: String,
        data: Option<Value>,
    },
}

impl RpcMessage {
    /// Classify a JSON value as a JSON-RPC 2.0 message
    pub fn parse(value: &Value) -> ConformanceResult<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| ConformanceError::invalid_message("Message must be a JSON object"))?;

        match obj.get("jsonrpc").and_then(Value::as_str) {
            Some(JSONRPC_VERSION) => {}
            Some(other) => {
                return Err(ConformanceError::invalid_message(format!(
                    "Expected jsonrpc '{}', got '{}'",
                    JSONRPC_VERSION, other
                )));
            }
            None => {
                return Err(ConformanceError::invalid_message(
                    "Message must have 'jsonrpc' field with string value",
                ));
            }
        }

        if let Some(method) = obj.get("method") {
            let method = method
                .as_str()
                .ok_or_else(|| ConformanceError::invalid_message("'method' must be a string"))?
                .to_string();
            let params = obj.get("params").cloned();
            if let Some(p) = &params {
                if !p.is_object() && !p.is_array() {
                    return Err(ConformanceError::invalid_message(format!(
                        "'params' of {} must be an object or array",
                        method
                    )));
                }
            }

            return match obj.get("id") {
                None => Ok(RpcMessage::Notification { method, params }),
                Some(id) if id.is_string() || id.is_number() => Ok(RpcMessage::Request {
                    id: id.clone(),
                    method,
                    params,
                }),
                Some(_) => Err(ConformanceError::invalid_message(format!(
                    "Request id of {} must be a string or number",
                    method
                ))),
            };
        }

        let id = obj
            .get("id")
            .cloned()
            .ok_or_else(|| ConformanceError::invalid_message("Response must have 'id' field"))?;
        if !(id.is_string() || id.is_number() || id.is_null()) {
            return Err(ConformanceError::invalid_message(
                "Response id must be a string, number or null",
            ));
        }

        match (obj.get("result"), obj.get("error")) {
            (Some(result), None) => Ok(RpcMessage::Response {
                id,
                result: result.clone(),
            }),
            (None, Some(error)) => {
                let code = error.get("code").and_then(Value::as_i64).ok_or_else(|| {
                    ConformanceError::invalid_message("Error must have integer 'code'")
                })?;
                let message = error
                    .get("message")
                    .and_then(Value::as_str)
                    .ok_or_else(|| {
                        ConformanceError::invalid_message("Error must have string 'message'")
                    })?
                    .to_string();
                Ok(RpcMessage::Error {
                    id,
                    code,
                    message,
                    data: error.get("data").cloned(),
                })
            }
            (Some(_), Some(_)) => Err(ConformanceError::invalid_message(
                "Response cannot have both 'result' and 'error' fields",
            )),
            (None, None) => Err(ConformanceError::invalid_message(
                "Response must have either 'result' or 'error' field",
            )),
        }
    }

    /// Method name of a request or notification
    pub fn method(&self) -> Option<&str> {
        match self {
            RpcMessage::Request { method, .. } | RpcMessage::Notification { method, .. } => {
                Some(method)
            }
            _ => None,
        }
    }

    /// Id of anything but a notification
    pub fn id(&self) -> Option<&Value> {
        match self {
            RpcMessage::Request { id, .. }
            | RpcMessage::Response { id, .. }
            | RpcMessage::Error { id, .. } => Some(id),
            RpcMessage::Notification { .. } => None,
        }
    }
}

/// Folds protocol messages into the host context a view currently sees
#[derive(Debug, Clone, Default)]
pub struct HostContextTracker {
    current: Option<Map<String, Value>>,
    pending_initialize: Vec<Value>,
    protocol_version: Option<String>,
    updates: usize,
}

impl HostContextTracker {
    /// Tracker with no context delivered yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one message. Returns true when the host context changed.
    pub fn observe(&mut self, message: &RpcMessage) -> bool {
        match message {
            RpcMessage::Request { id, method, .. } if method == methods::UI_INITIALIZE => {
                self.pending_initialize.push(id.clone());
                false
            }
            RpcMessage::Response { id, result } => {
                let answered_initialize = self.take_pending(id);
                if let Some(version) = result.get("protocolVersion").and_then(Value::as_str) {
                    if answered_initialize || result.get(HOST_CONTEXT_KEY).is_some() {
                        self.protocol_version = Some(version.to_string());
                    }
                }
                match result.get(HOST_CONTEXT_KEY) {
                    Some(Value::Object(context)) => {
                        self.replace(context.clone());
                        true
                    }
                    _ if answered_initialize => {
                        warn!("ui/initialize result carries no {} object", HOST_CONTEXT_KEY);
                        self.replace(Map::new());
                        true
                    }
                    _ => false,
                }
            }
            RpcMessage::Error { id, code, message, .. } => {
                if self.take_pending(id) {
                    warn!(code, "ui/initialize failed: {}", message);
                }
                false
            }
            RpcMessage::Notification { method, params } if method == methods::HOST_CONTEXT_CHANGED => {
                match params {
                    Some(Value::Object(changes)) => {
                        self.merge(changes);
                        true
                    }
                    _ => {
                        warn!("{} without object params ignored", methods::HOST_CONTEXT_CHANGED);
                        false
                    }
                }
            }
            RpcMessage::Notification { method, .. }
                if method == methods::UI_INITIALIZED || method == methods::SIZE_CHANGED =>
            {
                debug!(method = method.as_str(), "View notification leaves host context unchanged");
                false
            }
            _ => false,
        }
    }

    /// Apply a bare `{ "hostContext": { .. } }` payload
    pub fn observe_payload(&mut self, payload: &Value) -> bool {
        match payload.get(HOST_CONTEXT_KEY) {
            Some(Value::Object(context)) => {
                self.replace(context.clone());
                true
            }
            _ => false,
        }
    }

    /// The current context object, if any was delivered
    pub fn host_context(&self) -> Option<&Map<String, Value>> {
        self.current.as_ref()
    }

    /// The current context wrapped as `{ "hostContext": { .. } }`
    pub fn payload(&self) -> Option<Value> {
        self.current.as_ref().map(|context| {
            let mut payload = Map::new();
            payload.insert(HOST_CONTEXT_KEY.to_string(), Value::Object(context.clone()));
            Value::Object(payload)
        })
    }

    /// Protocol version from the `ui/initialize` result
    pub fn protocol_version(&self) -> Option<&str> {
        self.protocol_version.as_deref()
    }

    /// Number of full or partial context deliveries seen
    pub fn updates(&self) -> usize {
        self.updates
    }

    fn take_pending(&mut self, id: &Value) -> bool {
        match self.pending_initialize.iter().position(|pending| pending == id) {
            Some(index) => {
                self.pending_initialize.remove(index);
                true
            }
            None => false,
        }
    }

    fn replace(&mut self, context: Map<String, Value>) {
        debug!(fields = context.len(), "Host context delivered");
        self.current = Some(context);
        self.updates += 1;
    }

    /// Shallow merge. Keys set to `null` stay, so the presence walk reports them missing.
    fn merge(&mut self, changes: &Map<String, Value>) {
        let current = self.current.get_or_insert_with(Map::new);
        for (key, value) in changes {
            current.insert(key.clone(), value.clone());
        }
        debug!(changed = changes.len(), "Host context updated");
        self.updates += 1;
    }
}
