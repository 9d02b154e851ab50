// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Rule registry and dispatch.

use guardcheck_diagnostics::Diagnostic;
use guardcheck_resolve::Resolution;

use crate::guarded_by;
use crate::types::CheckOpts;
use crate::units::Units;

/// What a rule gets to look at.
pub struct RuleContext<'a> {
    pub source: &'a str,
    pub resolution: &'a Resolution,
    pub units: &'a Units<'a>,
    pub opts: &'a CheckOpts,
}

/// A rule: id, check function.
pub struct Rule {
    pub id: &'static str,
    pub summary: &'static str,
    check: fn(&RuleContext<'_>) -> Vec<Diagnostic>,
}

/// All registered rules.
pub fn all_rules() -> Vec<Rule> {
    vec![
        Rule {
            id: guarded_by::UNGUARDED_ACCESS,
            summary: "guarded member accessed without holding its lock",
            check: guarded_by::check_unguarded_access,
        },
        Rule {
            id: guarded_by::INVALID,
            summary: "@GuardedBy expression that does not name a lock",
            check: guarded_by::check_invalid_guards,
        },
    ]
}

/// Run selected rules.
pub fn run_rules(ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    let mut results = Vec::new();

    for rule in all_rules() {
        if !should_run(rule.id, ctx.opts) {
            log::debug!("rule {} disabled", rule.id);
            continue;
        }
        results.extend((rule.check)(ctx));
    }

    results
}

/// Check if a rule should run based on include/exclude filters.
pub fn should_run(rule_id: &str, opts: &CheckOpts) -> bool {
    // Exclude takes priority
    if opts.excludes.iter().any(|pattern| matches_rule(rule_id, pattern)) {
        return false;
    }

    opts.rules.is_empty() || opts.rules.iter().any(|pattern| matches_rule(rule_id, pattern))
}

/// Match a rule ID against a glob pattern.
/// Supports: exact match, "category/*" for all rules in a category, "*".
fn matches_rule(rule_id: &str, pattern: &str) -> bool {
    if pattern == rule_id || pattern == "*" {
        return true;
    }

    // "guarded-by/*" matches "guarded-by/invalid", etc.
    if let Some(prefix) = pattern.strip_suffix("/*") {
        if let Some(rule_prefix) = rule_id.split('/').next() {
            return rule_prefix == prefix;
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(rules: &[&str], excludes: &[&str]) -> CheckOpts {
        CheckOpts {
            rules: rules.iter().map(|s| s.to_string()).collect(),
            excludes: excludes.iter().map(|s| s.to_string()).collect(),
            unresolved_as_error: false,
        }
    }

    #[test]
    fn patterns() {
        assert!(matches_rule("guarded-by/invalid", "guarded-by/*"));
        assert!(matches_rule("guarded-by/invalid", "guarded-by/invalid"));
        assert!(matches_rule("guarded-by/invalid", "*"));
        assert!(!matches_rule("guarded-by/invalid", "guarded/*"));
        assert!(!matches_rule("guarded-by/invalid", "guarded-by/unguarded-access"));
    }

    #[test]
    fn filters() {
        assert!(should_run(guarded_by::INVALID, &CheckOpts::default()));
        assert!(should_run(guarded_by::INVALID, &opts(&["guarded-by/*"], &[])));
        assert!(!should_run(guarded_by::INVALID, &opts(&[guarded_by::UNGUARDED_ACCESS], &[])));
        assert!(!should_run(guarded_by::INVALID, &opts(&["guarded-by/*"], &["guarded-by/invalid"])));
    }

    #[test]
    fn rule_ids_are_unique() {
        let rules = all_rules();
        for (i, rule) in rules.iter().enumerate() {
            assert!(rules[i + 1..].iter().all(|r| r.id != rule.id));
            assert!(!rule.summary.is_empty());
        }
    }
}
