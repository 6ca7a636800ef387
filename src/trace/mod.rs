/*!
 * Trace Module
 * Backtrace capture and frame-to-module resolution
 */

mod resolve;
mod types;
mod unwind;

// Re-export public API
pub use resolve::{capture, capture_into, resolve_pc};
pub use types::{Backtrace, Frame, RawBacktrace, RawFrame, MAX_FRAMES};
