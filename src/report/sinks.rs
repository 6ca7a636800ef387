/*!
 * Reporting Sinks
 * Log-backed reference sink
 */

use super::traits::CrashSink;
use super::types::CrashEvent;
use log::{info, warn};

/// Reference sink rendering events through the `log` facade
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl LogSink {
    pub fn new() -> Self {
        Self
    }
}

impl CrashSink for LogSink {
    fn report(&self, event: &CrashEvent) {
        match &event.matched_pattern {
            Some(pattern) => warn!(
                "airbag deployed: caught {} ({}) from module {} with pattern {:?} on tid {}",
                event.signal, event.signo, event.matched_module, pattern, event.tid
            ),
            None => warn!(
                "airbag deployed: caught {} ({}) from module {} with no pattern on tid {}",
                event.signal, event.signo, event.matched_module, event.tid
            ),
        }
        info!("crash backtrace:\n{}", event.backtrace);
    }
}
