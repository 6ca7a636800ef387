/*!
 * Signal Types
 * Signal number helpers, registration policy, and result types
 */

use crate::core::types::Signo;
use nix::errno::Errno;
use thiserror::Error;

/// Registration operation result
pub type RegistrationResult<T> = Result<T, RegistrationError>;

/// Test-trigger operation result
pub type SignalResult<T> = Result<T, SignalError>;

/// Highest interceptable signal number (SIGRTMAX on Linux)
pub const MAX_SIGNO: Signo = 64;

/// The synchronous fault signals a crash reporter typically intercepts
pub const CRASH_SIGNALS: [Signo; 7] = [
    libc::SIGSEGV,
    libc::SIGBUS,
    libc::SIGFPE,
    libc::SIGILL,
    libc::SIGABRT,
    libc::SIGTRAP,
    libc::SIGSYS,
];

/// Registration errors
///
/// All surfaced when `register_airbag` is called; nothing is deferred to
/// fault time.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("airbag already registered (policy is Reject)")]
    AlreadyRegistered,

    #[error("invalid signal: {0}")]
    InvalidSignal(Signo),

    #[error("signal {0} cannot be intercepted")]
    Unhandleable(Signo),

    #[error("filter table has no signals configured")]
    EmptyTable,

    #[error("sigaction({signo}) failed: {errno}")]
    SigactionFailed { signo: Signo, errno: Errno },

    #[error("failed to install alternate signal stack: {0}")]
    AltStackFailed(Errno),
}

/// Test-trigger errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignalError {
    #[error("invalid signal: {0}")]
    InvalidSignal(Signo),

    #[error("raise({signo}) failed: {errno}")]
    RaiseFailed { signo: Signo, errno: Errno },
}

/// What a second `register_airbag` call does
///
/// The process-wide handler set is installed once; whether a later call
/// replaces it is an explicit caller choice, never an implicit merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegistrationPolicy {
    /// Second registration fails with [`RegistrationError::AlreadyRegistered`]
    #[default]
    Reject,
    /// Second registration swaps the table and the installed signal set
    Replace,
}

/// Check whether a signal can be intercepted
///
/// SIGKILL and SIGSTOP cannot be caught; numbers outside [1, `MAX_SIGNO`]
/// are not signals.
pub fn can_intercept(signo: Signo) -> bool {
    (1..=MAX_SIGNO).contains(&signo) && signo != libc::SIGKILL && signo != libc::SIGSTOP
}

/// Canonical name for a signal number
pub fn signal_name(signo: Signo) -> &'static str {
    match signo {
        libc::SIGHUP => "SIGHUP",
        libc::SIGINT => "SIGINT",
        libc::SIGQUIT => "SIGQUIT",
        libc::SIGILL => "SIGILL",
        libc::SIGTRAP => "SIGTRAP",
        libc::SIGABRT => "SIGABRT",
        libc::SIGBUS => "SIGBUS",
        libc::SIGFPE => "SIGFPE",
        libc::SIGKILL => "SIGKILL",
        libc::SIGUSR1 => "SIGUSR1",
        libc::SIGSEGV => "SIGSEGV",
        libc::SIGUSR2 => "SIGUSR2",
        libc::SIGPIPE => "SIGPIPE",
        libc::SIGALRM => "SIGALRM",
        libc::SIGTERM => "SIGTERM",
        #[cfg(any(target_os = "linux", target_os = "android"))]
        libc::SIGSTKFLT => "SIGSTKFLT",
        libc::SIGCHLD => "SIGCHLD",
        libc::SIGCONT => "SIGCONT",
        libc::SIGSTOP => "SIGSTOP",
        libc::SIGTSTP => "SIGTSTP",
        libc::SIGTTIN => "SIGTTIN",
        libc::SIGTTOU => "SIGTTOU",
        libc::SIGURG => "SIGURG",
        libc::SIGXCPU => "SIGXCPU",
        libc::SIGXFSZ => "SIGXFSZ",
        libc::SIGVTALRM => "SIGVTALRM",
        libc::SIGPROF => "SIGPROF",
        libc::SIGWINCH => "SIGWINCH",
        libc::SIGIO => "SIGIO",
        #[cfg(any(target_os = "linux", target_os = "android"))]
        libc::SIGPWR => "SIGPWR",
        libc::SIGSYS => "SIGSYS",
        32..=MAX_SIGNO => "SIGRT",
        _ => "UNKNOWN",
    }
}
