//! CDP domain implementations.
//!
//! The built-in domains expose just enough of `Runtime`, `Debugger` and
//! `Profiler` for a front end to attach, plus the remote-value wrapper and
//! the console decorator that feed `Runtime.consoleAPICalled`.

pub mod call_frames;
pub mod console;
pub mod debugger;
pub mod profiler;
pub mod remote_value;
pub mod runtime;
pub mod sessions;

use std::sync::Arc;

use cdp_protocol::ProtocolError;
use cdp_server::Dispatcher;
use serde::Deserialize;
use serde_json::Value;

pub use console::{Console, ConsoleError, InterceptingConsole, TracingConsole};
pub use debugger::DebuggerDomain;
pub use profiler::ProfilerDomain;
pub use remote_value::{HostObject, RuntimeValue, WrapError, wrap, wrap_all};
pub use runtime::RuntimeDomain;
pub use sessions::RuntimeSessions;

/// Identifier of the one execution context this process exposes.
pub const EXECUTION_CONTEXT_ID: i64 = 1;

/// Register Runtime, Debugger and Profiler on a dispatcher.
///
/// Returns the Runtime domain so the caller can reach its console.
pub fn register_builtin_domains(dispatcher: &mut Dispatcher) -> Arc<RuntimeDomain> {
    let runtime = Arc::new(RuntimeDomain::new(dispatcher.peer()));
    dispatcher.register("Runtime", runtime.clone());
    dispatcher.register("Debugger", Arc::new(DebuggerDomain::new()));
    dispatcher.register("Profiler", Arc::new(ProfilerDomain::new()));
    runtime
}

pub(crate) fn parse_params<T: for<'de> Deserialize<'de>>(params: Value) -> Result<T, ProtocolError> {
    let params = if params.is_null() {
        Value::Object(Default::default())
    } else {
        params
    };
    serde_json::from_value(params)
        .map_err(|e| ProtocolError::invalid_params(format!("Invalid parameters: {e}")))
}
