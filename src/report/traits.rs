/*!
 * Report Traits
 * Reporting abstraction for suppressed crashes
 */

use super::types::CrashEvent;

/// Collaborator receiving suppressed crashes
///
/// Registered alongside the filter table; invoked on the faulting thread
/// after the airbag deploys, so implementations should hand the event off
/// quickly rather than perform slow uploads inline.
pub trait CrashSink: Send + Sync {
    /// Report one suppressed crash
    fn report(&self, event: &CrashEvent);
}
