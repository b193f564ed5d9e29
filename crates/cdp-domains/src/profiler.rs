//! Profiler domain — `enable` only, so front ends can attach.

use cdp_protocol::{HandlerResult, ProtocolError};
use cdp_server::Domain;
use serde_json::Value;

#[derive(Debug, Default)]
pub struct ProfilerDomain;

impl ProfilerDomain {
    pub fn new() -> Self {
        Self
    }
}

impl Domain for ProfilerDomain {
    fn methods(&self) -> &'static [&'static str] {
        &["enable"]
    }

    async fn call(&self, method: &str, _params: Value) -> HandlerResult {
        match method {
            "enable" => Ok(Value::Null),
            _ => Err(ProtocolError::method_not_found(method)),
        }
    }
}
