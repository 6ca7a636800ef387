/*!
 * Filter Module
 * Signal filter table: mutable builder, frozen process-wide snapshot
 */

mod builder;
mod table;

// Re-export public API
pub use builder::FilterTableBuilder;
pub use table::{FilterTable, ModuleRules, PatternSet};
