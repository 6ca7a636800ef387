/*!
 * Signals Module
 * Signal interception, disposition, and the registration surface
 */

mod disposition;
mod handler;
mod interceptor;
pub mod types;

// Re-export public API
pub use interceptor::{
    install_thread_stack, installed, register_airbag, register_airbag_with_sink, send_signal,
};
pub use types::{
    can_intercept, signal_name, RegistrationError, RegistrationPolicy, RegistrationResult,
    SignalError, SignalResult, CRASH_SIGNALS, MAX_SIGNO,
};
