/*!
 * Registration Surface Tests
 * Construction-time validation; nothing in this binary installs handlers
 */

use airbag::{
    can_intercept, register_airbag, send_signal, signal_name, FilterTableBuilder,
    RegistrationError, RegistrationPolicy, SignalError, CRASH_SIGNALS, MAX_SIGNO,
};

#[test]
fn empty_table_is_rejected() {
    let table = FilterTableBuilder::new().build();
    let err = register_airbag(table, RegistrationPolicy::Reject).unwrap_err();
    assert_eq!(err, RegistrationError::EmptyTable);
}

#[test]
fn out_of_range_signals_are_rejected() {
    for signo in [0, -1, MAX_SIGNO + 1, 999] {
        let table = FilterTableBuilder::new().add_rule(signo, "a.so").build();
        let err = register_airbag(table, RegistrationPolicy::Reject).unwrap_err();
        assert_eq!(err, RegistrationError::InvalidSignal(signo));
    }
}

#[test]
fn kill_and_stop_cannot_be_intercepted() {
    for signo in [libc::SIGKILL, libc::SIGSTOP] {
        let table = FilterTableBuilder::new().add_rule(signo, "a.so").build();
        let err = register_airbag(table, RegistrationPolicy::Reject).unwrap_err();
        assert_eq!(err, RegistrationError::Unhandleable(signo));
    }
}

#[test]
fn nothing_installed_without_a_successful_registration() {
    assert!(!airbag::installed());
}

#[test]
fn send_signal_validates_its_input() {
    assert_eq!(
        send_signal(0).unwrap_err(),
        SignalError::InvalidSignal(0)
    );
    assert_eq!(
        send_signal(-3).unwrap_err(),
        SignalError::InvalidSignal(-3)
    );
}

#[test]
fn send_signal_with_default_ignore_disposition_returns() {
    // SIGURG is ignored by default; raising it without any registration
    // must behave exactly as in an unmodified process.
    send_signal(libc::SIGURG).unwrap();
}

#[test]
fn signal_helpers() {
    assert!(can_intercept(libc::SIGSEGV));
    assert!(can_intercept(34)); // real-time signal
    assert!(!can_intercept(libc::SIGKILL));
    assert!(!can_intercept(libc::SIGSTOP));
    assert!(!can_intercept(0));
    assert!(!can_intercept(MAX_SIGNO + 1));

    assert_eq!(signal_name(libc::SIGSEGV), "SIGSEGV");
    assert_eq!(signal_name(libc::SIGBUS), "SIGBUS");
    assert_eq!(signal_name(40), "SIGRT");
    assert_eq!(signal_name(0), "UNKNOWN");

    for signo in CRASH_SIGNALS {
        assert!(can_intercept(signo), "{} must be interceptable", signo);
    }
}
