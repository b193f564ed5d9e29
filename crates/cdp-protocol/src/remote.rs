//! Runtime domain payload types: remote object descriptors, call frames,
//! and the parameters of the events that carry them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ─────────────────────────────────────────────────────────────────────────────
// Remote objects
// ─────────────────────────────────────────────────────────────────────────────

/// Dynamic type tag of a wrapped value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteObjectType {
    Undefined,
    String,
    Boolean,
    Number,
    Bigint,
    Symbol,
    Object,
    Function,
}

/// Refinement of [`RemoteObjectType::Object`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteObjectSubtype {
    Null,
    Array,
    Regexp,
    Error,
    Map,
    Set,
    Object,
}

/// Wire-safe structural summary of a runtime value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteObject {
    #[serde(rename = "type")]
    pub kind: RemoteObjectType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtype: Option<RemoteObjectSubtype>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    /// Primitive value, when it is representable as JSON.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Primitive value that JSON cannot carry (`NaN`, `-0`, `Infinity`, `12n`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unserializable_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl RemoteObject {
    /// A bare descriptor with only the type tag set.
    pub fn of_type(kind: RemoteObjectType) -> Self {
        Self {
            kind,
            subtype: None,
            class_name: None,
            value: None,
            unserializable_value: None,
            description: None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Stack traces
// ─────────────────────────────────────────────────────────────────────────────

/// One entry of a captured stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallFrame {
    pub function_name: String,
    pub line_number: u32,
    pub column_number: u32,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackTrace {
    pub call_frames: Vec<CallFrame>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Runtime events
// ─────────────────────────────────────────────────────────────────────────────

/// Kind of console call, as named on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConsoleApiType {
    Log,
    Warning,
    Error,
    Info,
    Dir,
    Table,
    StartGroup,
    StartGroupCollapsed,
    EndGroup,
    Debug,
    Clear,
}

impl ConsoleApiType {
    pub const ALL: [Self; 11] = [
        Self::Log,
        Self::Warning,
        Self::Error,
        Self::Info,
        Self::Dir,
        Self::Table,
        Self::StartGroup,
        Self::StartGroupCollapsed,
        Self::EndGroup,
        Self::Debug,
        Self::Clear,
    ];

    /// Only errors and warnings carry a stack.
    pub fn captures_stack(&self) -> bool {
        matches!(self, Self::Error | Self::Warning)
    }
}

/// Parameters of `Runtime.consoleAPICalled`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsoleApiCalledParams {
    #[serde(rename = "type")]
    pub kind: ConsoleApiType,
    pub args: Vec<RemoteObject>,
    pub execution_context_id: i64,
    /// Milliseconds since the Unix epoch.
    pub timestamp: f64,
    pub stack_trace: StackTrace,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionContextDescription {
    pub id: i64,
    pub is_page_context: bool,
    pub name: String,
}

/// Parameters of `Runtime.executionContextCreated`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionContextCreatedParams {
    pub context: ExecutionContextDescription,
}
