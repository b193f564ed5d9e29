//! Base message shapes for the DevTools protocol.
//!
//! Three shapes travel over the channel, told apart by which members they
//! carry rather than by an explicit tag:
//!
//! - events: `{ method, params }`
//! - requests: `{ id, method, params }`
//! - responses: `{ id, result }` or `{ id, error }`

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DecodeError, ProtocolError};

/// Request identifier. Locally issued ids are negative; remote ids are echoed
/// back untouched.
pub type RequestId = i64;

/// Result from a domain method handler.
pub type HandlerResult = Result<Value, ProtocolError>;

/// Identifier-less, fire-and-forget message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub method: String,
    #[serde(default = "empty_params")]
    pub params: Value,
}

/// Identifier-correlated call expecting exactly one response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub id: RequestId,
    pub method: String,
    #[serde(default = "empty_params")]
    pub params: Value,
}

/// Either member of a response, never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Result(Value),
    Error(ProtocolError),
}

/// Answer to a request issued by the opposite side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub id: RequestId,
    #[serde(flatten)]
    pub outcome: Outcome,
}

/// Any frame on the channel.
///
/// Variant order matters for decoding: a request must be tried before an
/// event, since every request also has the members of an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Message {
    Request(Request),
    Response(Response),
    Event(Event),
}

fn empty_params() -> Value {
    Value::Object(serde_json::Map::new())
}

// ─────────────────────────────────────────────────────────────────────────────
// Helper constructors
// ─────────────────────────────────────────────────────────────────────────────

impl Event {
    pub fn new(method: impl Into<String>, params: Value) -> Self {
        Self {
            method: method.into(),
            params,
        }
    }
}

impl Request {
    pub fn new(id: RequestId, method: impl Into<String>, params: Value) -> Self {
        Self {
            id,
            method: method.into(),
            params,
        }
    }
}

impl Response {
    /// A success response. A handler that produced nothing answers `{}`.
    pub fn success(id: RequestId, result: Value) -> Self {
        let result = if result.is_null() { empty_params() } else { result };
        Self {
            id,
            outcome: Outcome::Result(result),
        }
    }

    pub fn error(id: RequestId, error: ProtocolError) -> Self {
        Self {
            id,
            outcome: Outcome::Error(error),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.outcome, Outcome::Error(_))
    }

    pub fn into_result(self) -> HandlerResult {
        match self.outcome {
            Outcome::Result(value) => Ok(value),
            Outcome::Error(err) => Err(err),
        }
    }
}

impl Message {
    /// Decode one text frame.
    ///
    /// A frame carrying an `id` must be a request or a response. When its id
    /// is not an integer it would otherwise match the event shape, so it is
    /// rejected instead of being dispatched without an answer.
    pub fn decode(text: &str) -> Result<Self, DecodeError> {
        let value: Value = serde_json::from_str(text)?;
        let has_id = value.get("id").is_some();
        match serde_json::from_value(value) {
            Ok(Self::Event(_)) if has_id => Err(DecodeError::UnknownShape),
            Ok(message) => Ok(message),
            Err(_) => Err(DecodeError::UnknownShape),
        }
    }

    /// Encode as one text frame.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn method(&self) -> Option<&str> {
        match self {
            Self::Request(req) => Some(&req.method),
            Self::Event(event) => Some(&event.method),
            Self::Response(_) => None,
        }
    }

    pub fn id(&self) -> Option<RequestId> {
        match self {
            Self::Request(req) => Some(req.id),
            Self::Response(resp) => Some(resp.id),
            Self::Event(_) => None,
        }
    }
}

impl From<Event> for Message {
    fn from(event: Event) -> Self {
        Self::Event(event)
    }
}

impl From<Request> for Message {
    fn from(req: Request) -> Self {
        Self::Request(req)
    }
}

impl From<Response> for Message {
    fn from(resp: Response) -> Self {
        Self::Response(resp)
    }
}
