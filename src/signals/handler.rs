/*!
 * Crash Handler
 * The async-signal-constrained interception path
 */

use super::disposition;
use super::interceptor;
use crate::core::types::{Address, Signo};
use crate::engine::{self, Verdict};
use crate::trace::{self, RawBacktrace};
use std::cell::Cell;
use std::os::raw::{c_int, c_void};

thread_local! {
    /// Set while this thread is inside the crash handler.
    static IN_HANDLER: Cell<bool> = const { Cell::new(false) };
    /// pc of the last synchronous fault this thread suppressed.
    static LAST_SUPPRESSED_PC: Cell<Address> = const { Cell::new(0) };
}

/// Entry point installed via sigaction for every configured signal
///
/// Everything reachable from here is restricted to the async-signal-safe
/// subset on the propagate path: atomics, const-initialized thread locals,
/// stack buffers, the unwinder, `dladdr`, `sigaction` and `raise`. The
/// general allocator is touched only after a Suppress verdict, when the
/// process is committed to surviving.
pub(super) extern "C" fn crash_handler(
    signo: c_int,
    info: *mut libc::siginfo_t,
    ucontext: *mut c_void,
) {
    match IN_HANDLER.try_with(|guard| guard.replace(true)) {
        Ok(false) => {}
        // A fault while already handling one means the recovery path itself
        // is broken; so is a fault during thread teardown. Never recurse.
        Ok(true) | Err(_) => {
            disposition::propagate(signo);
            return;
        }
    }
    handle_fault(signo, info, ucontext);
    let _ = IN_HANDLER.try_with(|guard| guard.set(false));
}

fn handle_fault(signo: Signo, info: *mut libc::siginfo_t, ucontext: *mut c_void) {
    let Some(table) = interceptor::current_table() else {
        disposition::propagate(signo);
        return;
    };

    let fault_pc = fault_program_counter(ucontext);
    let fault_frame = fault_pc.map(trace::resolve_pc);

    let mut backtrace = RawBacktrace::empty();
    trace::capture_into(&mut backtrace);

    match engine::evaluate(table.as_ref(), signo, &backtrace, fault_frame.as_ref()) {
        Verdict::Suppress(hit) => {
            if synchronous_fault(info) && !record_progress(fault_pc) {
                // Second consecutive fault at the same instruction:
                // suppression is not making progress, hand the crash to
                // the OS instead of looping.
                disposition::propagate(signo);
                return;
            }
            disposition::deploy(signo, &backtrace, fault_pc, &hit);
        }
        Verdict::Propagate => disposition::propagate(signo),
    }
}

/// Remember the suppressed pc; false when the same pc repeats back-to-back
fn record_progress(fault_pc: Option<Address>) -> bool {
    let Some(pc) = fault_pc else {
        return true;
    };
    if pc == 0 {
        return true;
    }
    match LAST_SUPPRESSED_PC.try_with(|last| last.replace(pc)) {
        Ok(previous) => previous != pc,
        // No per-thread tracking available: do not risk a fault loop.
        Err(_) => false,
    }
}

/// Kernel-generated faults carry a positive si_code; raise/kill style
/// deliveries carry SI_USER / SI_TKILL (<= 0)
fn synchronous_fault(info: *mut libc::siginfo_t) -> bool {
    if info.is_null() {
        return false;
    }
    // SAFETY: the kernel hands a valid siginfo_t to an SA_SIGINFO handler.
    unsafe { (*info).si_code > 0 }
}

#[cfg(all(target_os = "linux", target_arch = "x86_64"))]
fn fault_program_counter(ucontext: *mut c_void) -> Option<Address> {
    if ucontext.is_null() {
        return None;
    }
    // SAFETY: ucontext is the kernel-provided context for this delivery.
    let context = unsafe { &*(ucontext as *const libc::ucontext_t) };
    Some(context.uc_mcontext.gregs[libc::REG_RIP as usize] as Address)
}

#[cfg(all(target_os = "linux", target_arch = "aarch64"))]
fn fault_program_counter(ucontext: *mut c_void) -> Option<Address> {
    if ucontext.is_null() {
        return None;
    }
    // SAFETY: ucontext is the kernel-provided context for this delivery.
    let context = unsafe { &*(ucontext as *const libc::ucontext_t) };
    Some(context.uc_mcontext.pc as Address)
}

#[cfg(not(all(target_os = "linux", any(target_arch = "x86_64", target_arch = "aarch64"))))]
fn fault_program_counter(_ucontext: *mut c_void) -> Option<Address> {
    // Fault-pc module identity is a Linux refinement; elsewhere the walk
    // alone decides and an empty backtrace propagates.
    None
}
