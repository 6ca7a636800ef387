/*!
 * Crash Event
 * The reported artifact for a suppressed fault
 */

use crate::core::types::{Address, Signo, Tid, Timestamp};
use crate::engine::RuleHit;
use crate::signals::signal_name;
use crate::trace::{Backtrace, RawBacktrace};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// A suppressed crash, as handed to the [`super::CrashSink`]
///
/// Created at delivery time and discarded after reporting; the process
/// keeps no event history of its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrashEvent {
    /// Signal number that was delivered
    pub signo: Signo,
    /// Canonical signal name ("SIGSEGV", "SIGRT", ...)
    pub signal: String,
    /// Kernel thread ID of the faulting thread
    pub tid: Tid,
    /// Event time in microseconds since the UNIX epoch
    pub timestamp_us: Timestamp,
    /// Faulting instruction pointer, when the platform exposes it
    pub fault_pc: Option<Address>,
    /// Module name of the rule that fired
    pub matched_module: String,
    /// Pattern that fired, `None` for a wildcard rule
    pub matched_pattern: Option<String>,
    /// Resolved stack of the faulting thread, innermost frame first
    pub backtrace: Backtrace,
}

impl CrashEvent {
    /// Materialize an event from handler-context capture state
    ///
    /// Allocates; only called once the verdict is Suppress and the process
    /// is committed to surviving.
    pub(crate) fn capture(
        signo: Signo,
        fault_pc: Option<Address>,
        backtrace: &RawBacktrace,
        hit: &RuleHit<'_>,
    ) -> Self {
        Self {
            signo,
            signal: signal_name(signo).to_string(),
            tid: current_tid(),
            timestamp_us: timestamp_micros(),
            fault_pc,
            matched_module: hit.module.to_string(),
            matched_pattern: hit.pattern.map(str::to_string),
            backtrace: backtrace.materialize(),
        }
    }

    /// Render as JSON for an external reporting pipeline
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

fn timestamp_micros() -> Timestamp {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_micros() as Timestamp
}

#[cfg(any(target_os = "linux", target_os = "android"))]
fn current_tid() -> Tid {
    // SAFETY: gettid has no preconditions.
    unsafe { libc::gettid() as Tid }
}

#[cfg(not(any(target_os = "linux", target_os = "android")))]
fn current_tid() -> Tid {
    // SAFETY: pthread_self has no preconditions.
    unsafe { libc::pthread_self() as Tid }
}
