//! CDP method name constants, grouped by domain.
//!
//! Each constant is the exact string sent over the wire as the `method`
//! field of a request. Domains register the part after the first `.`.

/// Method names served by the built-in domains.
pub struct Methods;

impl Methods {
    // ── Runtime ─────────────────────────────────────────────────────────
    pub const RUNTIME_ENABLE: &str = "Runtime.enable";
    pub const RUNTIME_RUN_IF_WAITING_FOR_DEBUGGER: &str = "Runtime.runIfWaitingForDebugger";

    // ── Debugger ────────────────────────────────────────────────────────
    pub const DEBUGGER_ENABLE: &str = "Debugger.enable";
    pub const DEBUGGER_SET_PAUSE_ON_EXCEPTIONS: &str = "Debugger.setPauseOnExceptions";
    pub const DEBUGGER_SET_ASYNC_CALL_STACK_DEPTH: &str = "Debugger.setAsyncCallStackDepth";
    pub const DEBUGGER_SET_BLACKBOX_PATTERNS: &str = "Debugger.setBlackboxPatterns";
    pub const DEBUGGER_SET_BREAKPOINT_BY_URL: &str = "Debugger.setBreakpointByUrl";

    // ── Profiler ────────────────────────────────────────────────────────
    pub const PROFILER_ENABLE: &str = "Profiler.enable";
}

/// Split a combined `Domain.method` string on the first `.`.
///
/// Returns `None` when there is no `.` at all. Everything after the first
/// `.` is the method name, dots included.
pub fn split_method(method: &str) -> Option<(&str, &str)> {
    method.split_once('.')
}
