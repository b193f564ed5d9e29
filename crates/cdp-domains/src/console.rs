//! Console facade and the decorator that forwards console calls to the
//! front end as `Runtime.consoleAPICalled` events.
//!
//! Nothing global is patched: code that wants its console output mirrored
//! must log through the [`InterceptingConsole`] obtained from the Runtime
//! domain once it is enabled.

use std::sync::Arc;

use cdp_protocol::{ConsoleApiCalledParams, ConsoleApiType, Events, StackTrace};
use cdp_server::{DispatchError, Peer};
use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use crate::call_frames::capture_call_frames;
use crate::remote_value::{RuntimeValue, WrapError, wrap_all};

/// Logging facade. Implementors only provide [`Console::call`].
pub trait Console: Send + Sync {
    fn call(&self, kind: ConsoleApiType, args: &[RuntimeValue]);

    #[track_caller]
    fn log(&self, args: &[RuntimeValue]) {
        self.call(ConsoleApiType::Log, args)
    }

    #[track_caller]
    fn warn(&self, args: &[RuntimeValue]) {
        self.call(ConsoleApiType::Warning, args)
    }

    #[track_caller]
    fn error(&self, args: &[RuntimeValue]) {
        self.call(ConsoleApiType::Error, args)
    }

    #[track_caller]
    fn info(&self, args: &[RuntimeValue]) {
        self.call(ConsoleApiType::Info, args)
    }

    #[track_caller]
    fn dir(&self, args: &[RuntimeValue]) {
        self.call(ConsoleApiType::Dir, args)
    }

    #[track_caller]
    fn table(&self, args: &[RuntimeValue]) {
        self.call(ConsoleApiType::Table, args)
    }

    #[track_caller]
    fn group(&self, args: &[RuntimeValue]) {
        self.call(ConsoleApiType::StartGroup, args)
    }

    #[track_caller]
    fn group_collapsed(&self, args: &[RuntimeValue]) {
        self.call(ConsoleApiType::StartGroupCollapsed, args)
    }

    #[track_caller]
    fn group_end(&self) {
        self.call(ConsoleApiType::EndGroup, &[])
    }

    #[track_caller]
    fn debug(&self, args: &[RuntimeValue]) {
        self.call(ConsoleApiType::Debug, args)
    }

    #[track_caller]
    fn clear(&self) {
        self.call(ConsoleApiType::Clear, &[])
    }
}

impl<C: Console + ?Sized> Console for Arc<C> {
    #[track_caller]
    fn call(&self, kind: ConsoleApiType, args: &[RuntimeValue]) {
        (**self).call(kind, args)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Base console
// ─────────────────────────────────────────────────────────────────────────────

/// Console that writes through `tracing`, indenting open groups.
#[derive(Debug, Default)]
pub struct TracingConsole {
    groups: Mutex<Vec<String>>,
}

impl TracingConsole {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn group_depth(&self) -> usize {
        self.groups.lock().len()
    }
}

impl Console for TracingConsole {
    fn call(&self, kind: ConsoleApiType, args: &[RuntimeValue]) {
        let line = format_args_line(args);
        let indent = "  ".repeat(self.group_depth());

        match kind {
            ConsoleApiType::Error => error!(target: "console", "{indent}{line}"),
            ConsoleApiType::Warning => warn!(target: "console", "{indent}{line}"),
            ConsoleApiType::Debug => debug!(target: "console", "{indent}{line}"),
            ConsoleApiType::Log
            | ConsoleApiType::Info
            | ConsoleApiType::Dir
            | ConsoleApiType::Table => info!(target: "console", "{indent}{line}"),
            ConsoleApiType::StartGroup | ConsoleApiType::StartGroupCollapsed => {
                if !line.is_empty() {
                    info!(target: "console", "{indent}{line}");
                }
                self.groups.lock().push(line);
            }
            ConsoleApiType::EndGroup => {
                self.groups.lock().pop();
            }
            // Clearing has no effect on a log stream.
            ConsoleApiType::Clear => {}
        }
    }
}

/// Space-separated arguments, strings unquoted at the top level.
pub fn format_args_line(args: &[RuntimeValue]) -> String {
    args.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

// ─────────────────────────────────────────────────────────────────────────────
// Interception
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    #[error(transparent)]
    Wrap(#[from] WrapError),
    #[error("failed to encode console event: {0}")]
    Encode(#[from] serde_json::Error),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

/// Decorator that mirrors every console call to the front end.
///
/// The wrapped console always runs first and its output is left untouched.
pub struct InterceptingConsole<C> {
    inner: C,
    peer: Peer,
    execution_context_id: i64,
}

impl<C: Console> InterceptingConsole<C> {
    pub fn new(inner: C, peer: Peer, execution_context_id: i64) -> Self {
        Self {
            inner,
            peer,
            execution_context_id,
        }
    }

    /// Perform the call and emit its event, reporting any failure to emit.
    #[track_caller]
    pub fn try_call(&self, kind: ConsoleApiType, args: &[RuntimeValue]) -> Result<(), ConsoleError> {
        self.inner.call(kind, args);
        self.emit(kind, args)
    }

    /// Send the `Runtime.consoleAPICalled` event without touching the
    /// wrapped console.
    #[track_caller]
    pub fn emit(&self, kind: ConsoleApiType, args: &[RuntimeValue]) -> Result<(), ConsoleError> {
        let call_frames = if kind.captures_stack() {
            capture_call_frames()
        } else {
            Vec::new()
        };

        let params = ConsoleApiCalledParams {
            kind,
            args: wrap_all(args)?,
            execution_context_id: self.execution_context_id,
            timestamp: now_ms(),
            stack_trace: StackTrace { call_frames },
        };

        self.peer
            .send_event(Events::RUNTIME_CONSOLE_API_CALLED, serde_json::to_value(params)?)?;
        Ok(())
    }
}

impl<C: Console> Console for InterceptingConsole<C> {
    #[track_caller]
    fn call(&self, kind: ConsoleApiType, args: &[RuntimeValue]) {
        if let Err(e) = self.try_call(kind, args) {
            debug!("Console event not forwarded: {e}");
        }
    }
}

fn now_ms() -> f64 {
    chrono::Utc::now().timestamp_micros() as f64 / 1000.0
}
