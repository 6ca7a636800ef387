/*!
 * Signal Interceptor
 * Process-wide handler installation and registration state
 */

use super::handler;
use super::types::{
    can_intercept, signal_name, RegistrationError, RegistrationPolicy, RegistrationResult,
    SignalError, SignalResult, MAX_SIGNO,
};
use crate::core::types::Signo;
use crate::filter::FilterTable;
use crate::report::{CrashSink, LogSink};
use arc_swap::ArcSwapOption;
use log::{debug, error, info};
use nix::errno::Errno;
use parking_lot::Mutex;
use std::cell::{Cell, UnsafeCell};
use std::mem::{self, MaybeUninit};
use std::os::raw::{c_int, c_void};
use std::ptr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Alternate signal stack size per thread
///
/// Large enough for the handler, the unwinder, and kernel-injected frames.
const SIGNAL_STACK_SIZE: usize = 128 * 1024;

const NSIG_SLOTS: usize = (MAX_SIGNO + 1) as usize;

/// Live filter table, swapped atomically on registration
///
/// Handler context loads this lock-free; no allocation is involved.
static LIVE_TABLE: ArcSwapOption<FilterTable> = ArcSwapOption::const_empty();

/// Live crash sink (boxed behind a sized slot for the atomic swap)
static LIVE_SINK: ArcSwapOption<SinkSlot> = ArcSwapOption::const_empty();

static INSTALLED: AtomicBool = AtomicBool::new(false);

static REGISTRATION: Mutex<RegistrationState> = Mutex::new(RegistrationState {
    installed: false,
    signals: Vec::new(),
});

pub(crate) struct SinkSlot(pub(crate) Arc<dyn CrashSink>);

struct RegistrationState {
    installed: bool,
    signals: Vec<Signo>,
}

/// Original dispositions, saved before each handler install
///
/// A fixed slot per signal number: slots are written only under the
/// registration lock before the matching flag is released, and handler
/// context only reads slots whose flag is set, so lookups need no locking.
struct SavedActions {
    flags: [AtomicBool; NSIG_SLOTS],
    actions: [UnsafeCell<MaybeUninit<libc::sigaction>>; NSIG_SLOTS],
}

// SAFETY: see the slot write/read protocol above.
unsafe impl Sync for SavedActions {}

#[allow(clippy::declare_interior_mutable_const)]
const UNSAVED_FLAG: AtomicBool = AtomicBool::new(false);
#[allow(clippy::declare_interior_mutable_const)]
const UNSAVED_ACTION: UnsafeCell<MaybeUninit<libc::sigaction>> =
    UnsafeCell::new(MaybeUninit::uninit());

static SAVED_ACTIONS: SavedActions = SavedActions {
    flags: [UNSAVED_FLAG; NSIG_SLOTS],
    actions: [UNSAVED_ACTION; NSIG_SLOTS],
};

thread_local! {
    static ALT_STACK: Cell<bool> = const { Cell::new(false) };
}

/// Register the airbag with the default log-backed sink
///
/// Installs handlers for every signal configured in `table`. One-shot:
/// what a second call does is governed by `policy`.
pub fn register_airbag(table: FilterTable, policy: RegistrationPolicy) -> RegistrationResult<()> {
    register_airbag_with_sink(table, policy, Arc::new(LogSink::new()))
}

/// Register the airbag with an explicit crash sink
pub fn register_airbag_with_sink(
    table: FilterTable,
    policy: RegistrationPolicy,
    sink: Arc<dyn CrashSink>,
) -> RegistrationResult<()> {
    if table.is_empty() {
        return Err(RegistrationError::EmptyTable);
    }
    let mut signals: Vec<Signo> = table.signals().collect();
    signals.sort_unstable();
    for &signo in &signals {
        if !(1..=MAX_SIGNO).contains(&signo) {
            return Err(RegistrationError::InvalidSignal(signo));
        }
        if !can_intercept(signo) {
            return Err(RegistrationError::Unhandleable(signo));
        }
    }

    let mut registration = REGISTRATION.lock();
    if registration.installed && policy == RegistrationPolicy::Reject {
        return Err(RegistrationError::AlreadyRegistered);
    }

    install_thread_stack()?;

    let was_installed = registration.installed;
    let previous = registration.signals.clone();

    // Publish the table before touching dispositions: a fault on another
    // thread between installs must already see consistent rules.
    let previous_table = LIVE_TABLE.swap(Some(Arc::new(table)));
    LIVE_SINK.store(Some(Arc::new(SinkSlot(sink))));

    let mut installed_now: Vec<Signo> = Vec::new();
    let mut failure: Option<RegistrationError> = None;
    for &signo in &signals {
        if previous.contains(&signo) {
            continue;
        }
        // SAFETY: signo is validated; crash_handler has the SA_SIGINFO ABI.
        match unsafe { install_handler(signo) } {
            Ok(()) => installed_now.push(signo),
            Err(err) => {
                failure = Some(err);
                break;
            }
        }
    }

    if let Some(err) = failure {
        // Roll back this call's installs and leave the previous
        // registration (if any) live.
        for &signo in &installed_now {
            // SAFETY: signo was installed by this call, so a saved
            // disposition exists.
            unsafe { restore_original(signo) };
        }
        if was_installed {
            LIVE_TABLE.store(previous_table);
        } else {
            LIVE_TABLE.store(None);
            LIVE_SINK.store(None);
        }
        error!("airbag registration failed: {}", err);
        return Err(err);
    }

    // Replace policy: signals dropped from the new table go back to their
    // original dispositions.
    for &signo in &previous {
        if !signals.contains(&signo) {
            // SAFETY: signo was installed by the previous registration.
            unsafe { restore_original(signo) };
        }
    }

    registration.signals = signals;
    registration.installed = true;
    INSTALLED.store(true, Ordering::Release);
    info!(
        "airbag registered: intercepting {} signal(s)",
        registration.signals.len()
    );
    Ok(())
}

/// Check whether the airbag has been registered in this process
pub fn installed() -> bool {
    INSTALLED.load(Ordering::Acquire)
}

/// Raise a signal on the calling thread
///
/// Test/demo trigger: delivery is synchronous, so this returns only if the
/// signal was suppressed or is not fatal under its disposition.
pub fn send_signal(signo: Signo) -> SignalResult<()> {
    if !(1..=MAX_SIGNO).contains(&signo) {
        return Err(SignalError::InvalidSignal(signo));
    }
    info!("raising {} ({}) on current thread", signal_name(signo), signo);
    // SAFETY: raise has no preconditions beyond a valid signal number.
    if unsafe { libc::raise(signo) } != 0 {
        return Err(SignalError::RaiseFailed {
            signo,
            errno: Errno::last(),
        });
    }
    Ok(())
}

/// Install the alternate signal stack for the calling thread
///
/// Registration does this for the registering thread; other threads that
/// want their faults handled off their own (possibly overflowed) stack can
/// opt in by calling it themselves. Idempotent per thread.
pub fn install_thread_stack() -> RegistrationResult<()> {
    if ALT_STACK.with(Cell::get) {
        return Ok(());
    }
    // SAFETY: the freshly allocated stack is handed to sigaltstack and
    // intentionally leaked; it must outlive the thread's handlers.
    unsafe {
        let stack = libc::calloc(1, SIGNAL_STACK_SIZE);
        if stack.is_null() {
            return Err(RegistrationError::AltStackFailed(Errno::ENOMEM));
        }
        let ss = libc::stack_t {
            ss_sp: stack,
            ss_flags: 0,
            ss_size: SIGNAL_STACK_SIZE,
        };
        if libc::sigaltstack(&ss, ptr::null_mut()) != 0 {
            let errno = Errno::last();
            libc::free(stack);
            return Err(RegistrationError::AltStackFailed(errno));
        }
    }
    ALT_STACK.with(|flag| flag.set(true));
    debug!(
        "installed {} KiB alternate signal stack for current thread",
        SIGNAL_STACK_SIZE / 1024
    );
    Ok(())
}

/// Current filter table; lock-free, callable from handler context
pub(crate) fn current_table() -> Option<Arc<FilterTable>> {
    LIVE_TABLE.load_full()
}

/// Current crash sink; lock-free, callable from handler context
pub(crate) fn current_sink() -> Option<Arc<SinkSlot>> {
    LIVE_SINK.load_full()
}

/// Original disposition saved for a signal, if its handler is installed
pub(crate) fn saved_action(signo: Signo) -> Option<libc::sigaction> {
    let slot = signo as usize;
    if slot >= NSIG_SLOTS || !SAVED_ACTIONS.flags[slot].load(Ordering::Acquire) {
        return None;
    }
    // SAFETY: a set flag means the slot was initialized before release.
    Some(unsafe { (*SAVED_ACTIONS.actions[slot].get()).assume_init() })
}

/// # Safety
/// Caller holds the registration lock; `signo` is a valid signal number.
unsafe fn install_handler(signo: Signo) -> RegistrationResult<()> {
    let mut action: libc::sigaction = mem::zeroed();
    action.sa_sigaction = handler::crash_handler
        as extern "C" fn(c_int, *mut libc::siginfo_t, *mut c_void)
        as usize;
    action.sa_flags = libc::SA_SIGINFO | libc::SA_ONSTACK | libc::SA_RESTART;
    // Block everything while the handler runs; recursive delivery of other
    // configured signals would corrupt the capture.
    libc::sigfillset(&mut action.sa_mask);

    let mut original: libc::sigaction = mem::zeroed();
    if libc::sigaction(signo, &action, &mut original) != 0 {
        return Err(RegistrationError::SigactionFailed {
            signo,
            errno: Errno::last(),
        });
    }

    let slot = signo as usize;
    *SAVED_ACTIONS.actions[slot].get() = MaybeUninit::new(original);
    SAVED_ACTIONS.flags[slot].store(true, Ordering::Release);

    debug!("installed handler for {} ({})", signal_name(signo), signo);
    Ok(())
}

/// # Safety
/// Caller holds the registration lock; a disposition was saved for `signo`.
unsafe fn restore_original(signo: Signo) {
    let slot = signo as usize;
    let Some(original) = saved_action(signo) else {
        return;
    };
    SAVED_ACTIONS.flags[slot].store(false, Ordering::Release);
    libc::sigaction(signo, &original, ptr::null_mut());
    debug!("restored original disposition for {} ({})", signal_name(signo), signo);
}
