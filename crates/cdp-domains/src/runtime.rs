//! Runtime domain — execution context announcement and console forwarding.
//!
//! `Runtime.enable` announces the single execution context and switches on
//! console interception. Interception is set up once per domain instance;
//! enabling again re-announces the context but reuses the same decorator,
//! so console events are never duplicated.

use std::sync::{Arc, OnceLock};

use cdp_protocol::{
    Events, ExecutionContextCreatedParams, ExecutionContextDescription, HandlerResult,
    ProtocolError,
};
use cdp_server::{Domain, Peer};
use serde_json::Value;
use tracing::debug;

use crate::EXECUTION_CONTEXT_ID;
use crate::console::{Console, InterceptingConsole, TracingConsole};

pub struct RuntimeDomain<C: Console + 'static = TracingConsole> {
    peer: Peer,
    base: Arc<C>,
    console: OnceLock<Arc<InterceptingConsole<Arc<C>>>>,
}

impl RuntimeDomain<TracingConsole> {
    pub fn new(peer: Peer) -> Self {
        Self::with_console(peer, Arc::new(TracingConsole::new()))
    }
}

impl<C: Console + 'static> RuntimeDomain<C> {
    pub fn with_console(peer: Peer, base: Arc<C>) -> Self {
        Self {
            peer,
            base,
            console: OnceLock::new(),
        }
    }

    /// The intercepting console, once `Runtime.enable` has run.
    pub fn console(&self) -> Option<Arc<InterceptingConsole<Arc<C>>>> {
        self.console.get().cloned()
    }

    /// The console callers should log through right now: intercepting when
    /// enabled, the plain base console otherwise.
    pub fn active_console(&self) -> Arc<dyn Console> {
        match self.console.get() {
            Some(console) => console.clone() as Arc<dyn Console>,
            None => self.base.clone() as Arc<dyn Console>,
        }
    }

    /// Switch on console interception. Repeat calls return the same decorator.
    pub fn enable_console(&self) -> Arc<InterceptingConsole<Arc<C>>> {
        self.console
            .get_or_init(|| {
                debug!("Console interception enabled");
                Arc::new(InterceptingConsole::new(
                    self.base.clone(),
                    self.peer.clone(),
                    EXECUTION_CONTEXT_ID,
                ))
            })
            .clone()
    }

    fn enable(&self) -> HandlerResult {
        let params = ExecutionContextCreatedParams {
            context: ExecutionContextDescription {
                id: EXECUTION_CONTEXT_ID,
                is_page_context: true,
                name: String::new(),
            },
        };
        let params = serde_json::to_value(params)
            .map_err(|e| ProtocolError::internal(format!("Failed to encode context: {e}")))?;
        self.peer
            .send_event(Events::RUNTIME_EXECUTION_CONTEXT_CREATED, params)
            .map_err(|e| ProtocolError::server_error(e.to_string()))?;

        self.enable_console();
        Ok(Value::Null)
    }
}

impl<C: Console + 'static> Domain for RuntimeDomain<C> {
    fn methods(&self) -> &'static [&'static str] {
        &["enable", "runIfWaitingForDebugger"]
    }

    async fn call(&self, method: &str, _params: Value) -> HandlerResult {
        match method {
            "enable" => self.enable(),
            "runIfWaitingForDebugger" => Ok(Value::Null),
            _ => Err(ProtocolError::method_not_found(method)),
        }
    }
}
