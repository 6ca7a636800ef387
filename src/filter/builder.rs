/*!
 * Filter Table Builder
 * Mutable accumulation, frozen snapshot on build
 */

use super::table::{FilterTable, ModuleRules, PatternSet};
use crate::core::types::Signo;
use ahash::HashMap;

/// Builder for [`FilterTable`]
///
/// Accumulates (signal, module, pattern) rules; all structurally valid input
/// is accepted. Validation of the signal set itself happens at registration
/// time, not here.
#[derive(Debug, Clone, Default)]
pub struct FilterTableBuilder {
    rules: HashMap<Signo, HashMap<String, PatternSet>>,
}

impl FilterTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensure a (signal, module) rule exists with wildcard semantics
    ///
    /// A rule whose pattern set is empty matches any backtrace touching the
    /// module. Calling this repeatedly for the same pair is a no-op; calling
    /// it after patterns were added leaves the patterns in place.
    pub fn add_rule(&mut self, signo: Signo, module: impl Into<String>) -> &mut Self {
        self.rules
            .entry(signo)
            .or_default()
            .entry(module.into())
            .or_default();
        self
    }

    /// Add a backtrace pattern to the (signal, module) rule
    ///
    /// Patterns accumulate as a set union: repeated additions of the same
    /// pattern are idempotent, distinct patterns are alternatives (a
    /// backtrace matching any one of them matches the rule).
    pub fn add_pattern(
        &mut self,
        signo: Signo,
        module: impl Into<String>,
        pattern: impl Into<String>,
    ) -> &mut Self {
        self.rules
            .entry(signo)
            .or_default()
            .entry(module.into())
            .or_default()
            .insert(pattern.into());
        self
    }

    /// Freeze the accumulated rules into an immutable [`FilterTable`]
    ///
    /// The table is a deep copy: mutating the builder afterwards never
    /// affects a previously built table.
    pub fn build(&self) -> FilterTable {
        let rules = self
            .rules
            .iter()
            .map(|(signo, modules)| {
                (
                    *signo,
                    ModuleRules {
                        modules: modules.clone(),
                    },
                )
            })
            .collect();
        FilterTable { rules }
    }
}
