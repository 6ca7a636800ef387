/*!
 * Airbag
 * Process-wide crash-signal interception and filtering
 *
 * A configured set of fault signals is intercepted at delivery time; the
 * faulting thread's backtrace is resolved against a frozen filter table
 * (signal → module → backtrace patterns) and the crash is either suppressed
 * and reported ("airbag deployed") or re-raised with its original
 * disposition so the process dies exactly as an unmodified one would.
 */

#[cfg(not(unix))]
compile_error!("airbag requires a Unix-like platform (sigaction-based interception)");

pub mod core;
pub mod engine;
pub mod filter;
pub mod report;
pub mod signals;
pub mod trace;

// Re-export public API
pub use engine::{evaluate, RuleHit, Verdict};
pub use filter::{FilterTable, FilterTableBuilder, ModuleRules, PatternSet};
pub use report::{CrashEvent, CrashSink, LogSink};
pub use signals::{
    can_intercept, install_thread_stack, installed, register_airbag, register_airbag_with_sink,
    send_signal, signal_name, RegistrationError, RegistrationPolicy, RegistrationResult,
    SignalError, SignalResult, CRASH_SIGNALS, MAX_SIGNO,
};
pub use trace::{Backtrace, Frame, RawBacktrace, RawFrame, MAX_FRAMES};
