//! Plugin ordering for load-order synchronization.
//!
//! Plugins are sorted primarily by the priority of the mod that provides
//! them. Within a single mod, file names are compared heuristically so that
//! dependent files ("patch", "fix", "addon" and friends) land after the
//! files they modify. Operators can override the heuristics per mod with an
//! exception table (see [`crate::config::ExceptionRule`]).

use std::cmp::Ordering;

use regex::Regex;

use crate::config::{ExceptionRule, HeuristicSet};
use crate::error::SyncError;

/// Name patterns that usually mark a dependent file. Evaluation order
/// matters: the first pattern matching exactly one of two names decides.
const CLASSIC_PATTERNS: &[&str] = &[
    "(:?hot|bug)[ ._-]?fix",
    r"\bfix\b",
    "patch",
    "add[ ._-]?on",
    "expansion",
    "expanded",
    "extension",
    "ext",
    "remastered",
];

/// The extended set trades the bare `remastered` entry for `ng` and the
/// concatenated `conversionfixremastered`. Kept verbatim; hosts depend on
/// the observable order either set produces.
const EXTENDED_PATTERNS: &[&str] = &[
    "(:?hot|bug)[ ._-]?fix",
    r"\bfix\b",
    "patch",
    "add[ ._-]?on",
    "expansion",
    "expanded",
    "extension",
    "ext",
    "ng",
    "conversionfixremastered",
];

fn patterns_for(set: HeuristicSet) -> &'static [&'static str] {
    match set {
        HeuristicSet::Classic => CLASSIC_PATTERNS,
        HeuristicSet::Extended => EXTENDED_PATTERNS,
    }
}

/// Composite sort key for one plugin: owning-mod priority plus the plugin's
/// file name. Built fresh for each sort pass and discarded afterwards.
#[derive(Debug, Clone)]
pub struct OrderKey {
    pub priority: i32,
    pub name: String,
    lower: String,
}

impl OrderKey {
    pub fn new(priority: i32, name: impl Into<String>) -> Self {
        let name = name.into();
        let lower = name.to_lowercase();
        OrderKey {
            priority,
            name,
            lower,
        }
    }
}

struct CompiledRule {
    pattern: Regex,
    order: Vec<String>,
}

/// Compiled comparator state shared by every comparison in a sort pass.
///
/// All patterns compile once here; a sort never touches the regex parser.
pub struct PluginOrdering {
    exceptions: Vec<CompiledRule>,
    heuristics: Vec<Regex>,
}

impl PluginOrdering {
    /// Compiles the heuristic set and the operator exception table. A rule
    /// pattern that does not compile is a configuration error.
    pub fn new(set: HeuristicSet, exceptions: &[ExceptionRule]) -> Result<Self, SyncError> {
        let mut rules = Vec::with_capacity(exceptions.len());
        for rule in exceptions {
            let pattern =
                Regex::new(&rule.pattern).map_err(|source| SyncError::InvalidPattern {
                    pattern: rule.pattern.clone(),
                    source,
                })?;
            rules.push(CompiledRule {
                pattern,
                order: rule.order.iter().map(|s| s.to_lowercase()).collect(),
            });
        }

        let heuristics = patterns_for(set)
            .iter()
            .map(|p| Regex::new(p).expect("built-in pattern compiles"))
            .collect();

        Ok(PluginOrdering {
            exceptions: rules,
            heuristics,
        })
    }

    /// Total order over plugins: priority first, then the per-mod name
    /// rules, then shortest-name-first as the deterministic last resort.
    pub fn compare(&self, a: &OrderKey, b: &OrderKey) -> Ordering {
        if a.priority != b.priority {
            return a.priority.cmp(&b.priority);
        }

        if let Some(ordering) = self.exception_cmp(&a.lower, &b.lower) {
            return ordering;
        }

        if let Some(ordering) = self.heuristic_cmp(&a.lower, &b.lower) {
            return ordering;
        }

        a.lower
            .len()
            .cmp(&b.lower.len())
            .then_with(|| a.name.cmp(&b.name))
    }

    /// Operator overrides for mods whose files defy the generic heuristics.
    /// Each rule is tested against the first name; the first listed
    /// substring found in either name decides. A rule that matches but
    /// finds none of its substrings falls through to the next rule.
    fn exception_cmp(&self, a: &str, b: &str) -> Option<Ordering> {
        for rule in &self.exceptions {
            if !rule.pattern.is_match(a) {
                continue;
            }
            for needle in &rule.order {
                if a.contains(needle) {
                    return Some(Ordering::Less);
                }
                if b.contains(needle) {
                    return Some(Ordering::Greater);
                }
            }
        }
        None
    }

    /// A name matching a dependent-file pattern sorts after one that does
    /// not. Both or neither matching defers to the next pattern.
    fn heuristic_cmp(&self, a: &str, b: &str) -> Option<Ordering> {
        for pattern in &self.heuristics {
            match (pattern.is_match(a), pattern.is_match(b)) {
                (true, false) => return Some(Ordering::Greater),
                (false, true) => return Some(Ordering::Less),
                _ => {}
            }
        }
        None
    }
}
