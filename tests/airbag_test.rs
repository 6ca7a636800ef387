/*!
 * Airbag Integration Tests
 * Full register → raise → suppress round trips on live signal handlers
 *
 * Handler state is process-wide, so every test here registers with the
 * Replace policy and runs serialized.
 */

use airbag::{
    register_airbag_with_sink, send_signal, CrashEvent, CrashSink, FilterTableBuilder,
    RegistrationError, RegistrationPolicy,
};
use parking_lot::Mutex;
use serial_test::serial;
use std::sync::Arc;

/// The module name of this test binary as the loader reports it
const SELF_MODULE: &str = "airbag_test";

#[derive(Default)]
struct CapturingSink {
    events: Mutex<Vec<CrashEvent>>,
}

impl CapturingSink {
    fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn events(&self) -> Vec<CrashEvent> {
        self.events.lock().clone()
    }
}

impl CrashSink for CapturingSink {
    fn report(&self, event: &CrashEvent) {
        self.events.lock().push(event.clone());
    }
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
#[serial]
fn round_trip_suppresses_and_reports() {
    init_logging();

    let sink = CapturingSink::new();
    let table = FilterTableBuilder::new()
        .add_rule(libc::SIGURG, SELF_MODULE)
        .build();
    register_airbag_with_sink(table, RegistrationPolicy::Replace, sink.clone()).unwrap();
    assert!(airbag::installed());

    // A second registration under the default policy is a caller error.
    let again = FilterTableBuilder::new()
        .add_rule(libc::SIGURG, SELF_MODULE)
        .build();
    let err = register_airbag_with_sink(again, RegistrationPolicy::Reject, sink.clone())
        .unwrap_err();
    assert_eq!(err, RegistrationError::AlreadyRegistered);

    // Raising the configured signal deploys the airbag: the process
    // survives and the sink receives one event.
    send_signal(libc::SIGURG).unwrap();
    let events = sink.events();
    assert_eq!(events.len(), 1);

    let event = &events[0];
    assert_eq!(event.signo, libc::SIGURG);
    assert_eq!(event.signal, "SIGURG");
    assert_eq!(event.matched_module, SELF_MODULE);
    assert_eq!(event.matched_pattern, None);
    assert!(!event.backtrace.is_empty());

    // An unconfigured signal passes through untouched (SIGWINCH is
    // ignored by default) and nothing is reported.
    send_signal(libc::SIGWINCH).unwrap();
    assert_eq!(sink.events().len(), 1);
}

#[test]
#[serial]
fn replace_swaps_the_intercepted_signal_set() {
    init_logging();

    let first = CapturingSink::new();
    let table = FilterTableBuilder::new()
        .add_rule(libc::SIGURG, SELF_MODULE)
        .build();
    register_airbag_with_sink(table, RegistrationPolicy::Replace, first.clone()).unwrap();

    // Swap to a pattern rule on SIGIO: the test binary lives under
    // target/*/deps, so the pattern matches every resolved frame's path.
    let second = CapturingSink::new();
    let replacement = FilterTableBuilder::new()
        .add_pattern(libc::SIGIO, SELF_MODULE, "deps")
        .build();
    register_airbag_with_sink(replacement, RegistrationPolicy::Replace, second.clone()).unwrap();

    send_signal(libc::SIGIO).unwrap();
    let events = second.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].signo, libc::SIGIO);
    assert_eq!(events[0].matched_pattern.as_deref(), Some("deps"));

    // SIGURG went back to its original disposition (ignore): the raise
    // returns and neither sink hears about it.
    send_signal(libc::SIGURG).unwrap();
    assert_eq!(first.events().len(), 0);
    assert_eq!(second.events().len(), 1);
}

#[test]
#[serial]
fn reported_event_serializes_to_json() {
    init_logging();

    let sink = CapturingSink::new();
    let table = FilterTableBuilder::new()
        .add_rule(libc::SIGWINCH, SELF_MODULE)
        .build();
    register_airbag_with_sink(table, RegistrationPolicy::Replace, sink.clone()).unwrap();

    send_signal(libc::SIGWINCH).unwrap();
    let events = sink.events();
    assert_eq!(events.len(), 1);

    let json = events[0].to_json().unwrap();
    assert!(json.contains("\"signal\":\"SIGWINCH\""));
    assert!(json.contains("\"backtrace\""));

    let parsed: CrashEvent = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, events[0]);
}
