/*!
 * Filter Table
 * Immutable signal → module → pattern mapping
 */

use crate::core::types::Signo;
use ahash::{HashMap, HashSet};

/// Backtrace patterns attached to one (signal, module) rule
///
/// An empty set is the wildcard: any backtrace touching the module matches.
pub type PatternSet = HashSet<String>;

/// Per-signal rules, keyed by ELF module name
#[derive(Debug, Clone, Default)]
pub struct ModuleRules {
    pub(super) modules: HashMap<String, PatternSet>,
}

impl ModuleRules {
    /// Iterate (module name, pattern set) pairs
    ///
    /// Iteration order is unspecified; the match engine's verdict does not
    /// depend on it.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PatternSet)> {
        self.modules.iter().map(|(m, p)| (m.as_str(), p))
    }

    /// Get the pattern set for a module, if a rule exists
    pub fn get(&self, module: &str) -> Option<&PatternSet> {
        self.modules.get(module)
    }

    /// Number of module rules for this signal
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Check whether any module rule exists
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

/// Frozen filter table shared read-only across threads
///
/// Built once via [`super::FilterTableBuilder::build`]; never mutated
/// afterwards, so concurrent lookups from signal-handler context need no
/// locking.
#[derive(Debug, Clone, Default)]
pub struct FilterTable {
    pub(super) rules: HashMap<Signo, ModuleRules>,
}

impl FilterTable {
    /// Signals configured in this table
    pub fn signals(&self) -> impl Iterator<Item = Signo> + '_ {
        self.rules.keys().copied()
    }

    /// Rules for a signal; `None` means the signal is never intercepted
    pub fn rules_for(&self, signo: Signo) -> Option<&ModuleRules> {
        self.rules.get(&signo)
    }

    /// Number of configured signals
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check whether any signal is configured
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
