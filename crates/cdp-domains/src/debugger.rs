//! Debugger domain — accepts the calls front ends make on attach.
//!
//! Breakpoints, stepping and pausing are not supported. The exposed methods
//! succeed without effect so the front end finishes its handshake, except
//! for URL-regex breakpoints, which are refused outright.

use cdp_protocol::{HandlerResult, ProtocolError};
use cdp_server::Domain;
use serde::Deserialize;
use serde_json::Value;

use crate::parse_params;

#[derive(Debug, Default)]
pub struct DebuggerDomain;

impl DebuggerDomain {
    pub fn new() -> Self {
        Self
    }

    fn set_breakpoint_by_url(&self, params: Value) -> HandlerResult {
        let p: SetBreakpointByUrlParams = parse_params(params)?;
        if p.url_regex.as_deref().is_some_and(|r| !r.is_empty()) {
            return Err(ProtocolError::new(
                "setBreakpointByUrl with urlRegex is not supported",
            ));
        }
        Ok(Value::Null)
    }
}

impl Domain for DebuggerDomain {
    fn methods(&self) -> &'static [&'static str] {
        &[
            "enable",
            "setPauseOnExceptions",
            "setAsyncCallStackDepth",
            "setBlackboxPatterns",
            "setBreakpointByUrl",
        ]
    }

    async fn call(&self, method: &str, params: Value) -> HandlerResult {
        match method {
            "enable" | "setPauseOnExceptions" | "setAsyncCallStackDepth" | "setBlackboxPatterns" => {
                Ok(Value::Null)
            }
            "setBreakpointByUrl" => self.set_breakpoint_by_url(params),
            _ => Err(ProtocolError::method_not_found(method)),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Params
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct SetBreakpointByUrlParams {
    #[serde(rename = "urlRegex")]
    url_regex: Option<String>,
}
