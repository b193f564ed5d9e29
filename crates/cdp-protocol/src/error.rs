//! CDP error types and the JSON-RPC style error codes DevTools front ends expect.

use serde::{Deserialize, Serialize};

/// Standard error codes surfaced in error responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    ParseError,
    InvalidRequest,
    MethodNotFound,
    InvalidParams,
    InternalError,
    ServerError,

    // Custom code
    Custom(i64),
}

impl ErrorCode {
    pub fn code(&self) -> i64 {
        match self {
            Self::ParseError => -32700,
            Self::InvalidRequest => -32600,
            Self::MethodNotFound => -32601,
            Self::InvalidParams => -32602,
            Self::InternalError => -32603,
            Self::ServerError => -32000,
            Self::Custom(c) => *c,
        }
    }

    pub fn from_code(code: i64) -> Self {
        match code {
            -32700 => Self::ParseError,
            -32600 => Self::InvalidRequest,
            -32601 => Self::MethodNotFound,
            -32602 => Self::InvalidParams,
            -32603 => Self::InternalError,
            -32000 => Self::ServerError,
            c => Self::Custom(c),
        }
    }
}

/// The `error` member of an error response.
///
/// `code` is only present when the failure carries one; a handler that fails
/// with a plain message produces `{ "message": ... }` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtocolError {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,
}

impl ProtocolError {
    /// An application error without a code.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
        }
    }

    pub fn with_code(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: Some(code.code()),
        }
    }

    pub fn method_not_found(method: &str) -> Self {
        Self::with_code(ErrorCode::MethodNotFound, format!("'{method}' wasn't found"))
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::with_code(ErrorCode::InvalidParams, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::with_code(ErrorCode::InternalError, message)
    }

    pub fn server_error(message: impl Into<String>) -> Self {
        Self::with_code(ErrorCode::ServerError, message)
    }

    pub fn error_code(&self) -> Option<ErrorCode> {
        self.code.map(ErrorCode::from_code)
    }
}

impl std::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.code {
            Some(code) => write!(f, "CDP Error [{code}]: {}", self.message),
            None => write!(f, "CDP Error: {}", self.message),
        }
    }
}

impl std::error::Error for ProtocolError {}

/// A text frame that is not one of the three message shapes.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("frame is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("frame is not an event, request, or response")]
    UnknownShape,
}
