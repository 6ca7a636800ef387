/*!
 * Core Module
 * Shared scalar types
 */

pub mod types;

// Re-export for convenience
pub use types::*;
