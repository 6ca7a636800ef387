/*!
 * Match Engine
 * Decides whether a captured fault is suppressed or propagated
 */

use crate::core::types::Signo;
use crate::filter::FilterTable;
use crate::trace::{RawBacktrace, RawFrame};

/// The rule that fired for a suppressed fault
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleHit<'t> {
    /// Module name of the matching rule
    pub module: &'t str,
    /// Pattern that matched, `None` for a wildcard rule
    pub pattern: Option<&'t str>,
}

/// Match engine decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict<'t> {
    /// Airbag deploys: the crash is reported and execution resumes
    Suppress(RuleHit<'t>),
    /// The fault is re-raised with its original disposition
    Propagate,
}

impl Verdict<'_> {
    pub fn is_suppress(&self) -> bool {
        matches!(self, Verdict::Suppress(_))
    }
}

/// Evaluate a fault against the filter table
///
/// Frames are scanned innermost-first (frame 0 outward); the first frame
/// that triggers a rule wins. A rule triggers when its module name occurs
/// in a frame's module path; a wildcard rule (empty pattern set) then
/// suppresses outright, otherwise some frame's module path or symbol must
/// contain one of the rule's patterns as a substring. Module names and
/// patterns that are empty strings never match, mirroring the configured
/// rule format.
///
/// `fault_frame` is the resolved faulting instruction pointer. It is
/// consulted only when the walk produced no frames: an empty backtrace
/// suppresses iff a wildcard rule exists for the module owning the fault
/// pc, and propagates conservatively otherwise.
///
/// Runs in handler context: no allocation, no locking, bounded work.
pub fn evaluate<'t>(
    table: &'t FilterTable,
    signo: Signo,
    backtrace: &RawBacktrace,
    fault_frame: Option<&RawFrame>,
) -> Verdict<'t> {
    let Some(rules) = table.rules_for(signo) else {
        return Verdict::Propagate;
    };

    if backtrace.is_empty() {
        return evaluate_fault_frame(rules, fault_frame);
    }

    for frame in backtrace.iter() {
        let Some(module_path) = frame.module_bytes() else {
            continue;
        };
        for (module, patterns) in rules.iter() {
            if module.is_empty() || !contains(module_path, module.as_bytes()) {
                continue;
            }
            if patterns.is_empty() {
                return Verdict::Suppress(RuleHit {
                    module,
                    pattern: None,
                });
            }
            for pattern in patterns {
                if pattern.is_empty() {
                    continue;
                }
                if backtrace
                    .iter()
                    .any(|f| frame_contains(f, pattern.as_bytes()))
                {
                    return Verdict::Suppress(RuleHit {
                        module,
                        pattern: Some(pattern.as_str()),
                    });
                }
            }
        }
    }

    Verdict::Propagate
}

/// Empty-backtrace path: module identity comes from the fault pc alone, so
/// only wildcard rules can fire.
fn evaluate_fault_frame<'t>(
    rules: &'t crate::filter::ModuleRules,
    fault_frame: Option<&RawFrame>,
) -> Verdict<'t> {
    let Some(module_path) = fault_frame.and_then(RawFrame::module_bytes) else {
        return Verdict::Propagate;
    };
    for (module, patterns) in rules.iter() {
        if module.is_empty() || !patterns.is_empty() {
            continue;
        }
        if contains(module_path, module.as_bytes()) {
            return Verdict::Suppress(RuleHit {
                module,
                pattern: None,
            });
        }
    }
    Verdict::Propagate
}

/// Check whether a frame's module path or symbol contains `needle`
fn frame_contains(frame: &RawFrame, needle: &[u8]) -> bool {
    frame
        .module_bytes()
        .is_some_and(|m| contains(m, needle))
        || frame
            .symbol_bytes()
            .is_some_and(|s| contains(s, needle))
}

/// Naive byte substring scan; needles are short configured strings
fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    if needle.is_empty() || needle.len() > haystack.len() {
        return false;
    }
    haystack.windows(needle.len()).any(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substring_scan() {
        assert!(contains(b"/system/lib64/libdemo.so", b"libdemo.so"));
        assert!(contains(b"abc", b"abc"));
        assert!(!contains(b"abc", b"abcd"));
        assert!(!contains(b"/system/lib64/libdemo.so", b"libother.so"));
        assert!(!contains(b"abc", b""));
    }
}
