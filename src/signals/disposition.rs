/*!
 * Dispositioner
 * Re-raise with the original disposition, or report and resume
 */

use super::interceptor;
use crate::core::types::{Address, Signo};
use crate::engine::RuleHit;
use crate::report::CrashEvent;
use crate::trace::RawBacktrace;
use std::mem;
use std::ptr;

/// Hand the signal back to its original disposition
///
/// Propagate path, handler context: restores the saved disposition (the
/// default when none was saved) and re-raises. The signal stays blocked
/// until the handler returns, so delivery happens immediately afterwards
/// with the original semantics — a genuine crash is never swallowed.
/// No allocation, no locking, no logging on this path.
pub(super) fn propagate(signo: Signo) {
    // SAFETY: restoring a disposition and re-raising are async-signal-safe;
    // the saved action was a valid sigaction for this signal.
    unsafe {
        match interceptor::saved_action(signo) {
            Some(original) => {
                libc::sigaction(signo, &original, ptr::null_mut());
            }
            None => {
                let mut default: libc::sigaction = mem::zeroed();
                default.sa_sigaction = libc::SIG_DFL;
                libc::sigemptyset(&mut default.sa_mask);
                libc::sigaction(signo, &default, ptr::null_mut());
            }
        }
        libc::raise(signo);
    }
}

/// Deploy the airbag: report the suppressed crash and resume
///
/// Materializes the event (the one place handler context allocates) and
/// hands it to the registered sink; returning from here resumes the
/// faulting thread.
pub(super) fn deploy(
    signo: Signo,
    backtrace: &RawBacktrace,
    fault_pc: Option<Address>,
    hit: &RuleHit<'_>,
) {
    let event = CrashEvent::capture(signo, fault_pc, backtrace, hit);
    if let Some(sink) = interceptor::current_sink() {
        sink.0.report(&event);
    }
}
