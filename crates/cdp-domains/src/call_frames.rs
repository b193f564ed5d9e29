//! Call-frame capture for console events.

use std::panic::Location;

use backtrace::{Backtrace, BacktraceFrame};
use cdp_protocol::CallFrame;

/// Symbol path fragments of the capture machinery itself. Frames matching
/// these never reach the wire.
const INTERNAL_FRAMES: &[&str] = &[
    "backtrace::",
    "cdp_domains::call_frames::",
    "cdp_domains::console::",
];

/// Capture the current stack, immediate caller first.
///
/// The capture point and the console decorator that called it are left out.
/// When the binary carries no symbols the result falls back to the single
/// caller location, so it is never empty.
#[inline(never)]
#[track_caller]
pub fn capture_call_frames() -> Vec<CallFrame> {
    let caller = Location::caller();
    let backtrace = Backtrace::new();
    let frames = frames_from(backtrace.frames());
    if frames.is_empty() {
        vec![frame_from_location(caller)]
    } else {
        frames
    }
}

fn frames_from(frames: &[BacktraceFrame]) -> Vec<CallFrame> {
    let mut out = Vec::new();
    let mut seen_user_frame = false;

    for frame in frames {
        for symbol in frame.symbols() {
            let Some(name) = symbol.name() else { continue };
            // `{:#}` drops the trailing hash from mangled names.
            let function_name = format!("{name:#}");
            let internal = INTERNAL_FRAMES.iter().any(|p| function_name.contains(p));

            // Internal frames only sit on top of the stack.
            if internal && !seen_user_frame {
                continue;
            }
            seen_user_frame = true;

            out.push(CallFrame {
                function_name,
                line_number: symbol.lineno().unwrap_or(0).saturating_sub(1),
                column_number: symbol.colno().unwrap_or(0).saturating_sub(1),
                url: symbol
                    .filename()
                    .map(|path| format!("file://{}", path.display()))
                    .unwrap_or_default(),
            });
        }
    }

    out
}

/// Protocol frames are zero-based; source locations are one-based.
fn frame_from_location(location: &Location<'_>) -> CallFrame {
    CallFrame {
        function_name: String::new(),
        line_number: location.line().saturating_sub(1),
        column_number: location.column().saturating_sub(1),
        url: format!("file://{}", location.file()),
    }
}
