//! Runtime domains of the connections currently attached.
//!
//! The transport builds one Runtime domain per connection. Code that wants
//! its console output mirrored to every front end logs through
//! [`RuntimeSessions`], which fans the call out to each live domain's active
//! console. Connections that have gone away are pruned on the next call.

use std::sync::{Arc, Weak};

use cdp_protocol::ConsoleApiType;
use parking_lot::Mutex;

use crate::console::{Console, TracingConsole};
use crate::remote_value::RuntimeValue;
use crate::runtime::RuntimeDomain;

#[derive(Clone, Default)]
pub struct RuntimeSessions {
    live: Arc<Mutex<Vec<Weak<RuntimeDomain>>>>,
    local: Arc<TracingConsole>,
}

impl RuntimeSessions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track(&self, runtime: &Arc<RuntimeDomain>) {
        let mut live = self.live.lock();
        live.retain(|w| w.strong_count() > 0);
        live.push(Arc::downgrade(runtime));
    }

    /// Number of attached connections.
    pub fn len(&self) -> usize {
        let mut live = self.live.lock();
        live.retain(|w| w.strong_count() > 0);
        live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn upgrade_all(&self) -> Vec<Arc<RuntimeDomain>> {
        let mut live = self.live.lock();
        live.retain(|w| w.strong_count() > 0);
        live.iter().filter_map(Weak::upgrade).collect()
    }
}

impl Console for RuntimeSessions {
    /// Logs locally exactly once, then forwards to every front end that has
    /// enabled the Runtime domain.
    #[track_caller]
    fn call(&self, kind: ConsoleApiType, args: &[RuntimeValue]) {
        self.local.call(kind, args);
        for runtime in self.upgrade_all() {
            if let Some(console) = runtime.console() {
                if let Err(e) = console.emit(kind, args) {
                    tracing::debug!("Console event not forwarded: {e}");
                }
            }
        }
    }
}
