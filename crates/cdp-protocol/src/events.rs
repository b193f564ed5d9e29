//! CDP event name constants.
//!
//! Events are server-to-client messages with no response expected.

/// Event names emitted by the built-in domains.
pub struct Events;

impl Events {
    // ── Runtime ─────────────────────────────────────────────────────────
    pub const RUNTIME_EXECUTION_CONTEXT_CREATED: &str = "Runtime.executionContextCreated";
    pub const RUNTIME_CONSOLE_API_CALLED: &str = "Runtime.consoleAPICalled";
}
