//! Verdict parsing for free-text model answers.
//!
//! The model is asked for "+1" or "-1" but often answers in prose. The checks
//! below run in a fixed order and earlier checks win on ambiguous text, so the
//! order must not change:
//!
//! 1. count "+1" and "-1" occurrences
//! 2. "not safe" / "unsafe"                  → Conflict
//! 3. "conflict"                             → Conflict
//! 4. both markers, "+1" in the majority     → Safe
//! 5. both markers, "-1" in the majority     → Conflict
//! 6. any "-1"                               → Conflict
//! 7. bare `1` once spaces/newlines removed  → Safe
//! 8. otherwise                              → Unknown
//!
//! All keyword matches are case-sensitive.

use medcheck_common::Verdict;
use regex::Regex;
use serde::Serialize;

/// Which check produced the verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionRule {
    UnsafeKeyword,
    ConflictKeyword,
    PlusMajority,
    MinusMajority,
    MinusMarker,
    BareOne,
    NoSignal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VerdictTrace {
    pub verdict: Verdict,
    pub rule: DecisionRule,
    pub plus_ones: usize,
    pub minus_ones: usize,
}

/// Classify one raw model answer. Pure: the same text always yields the same verdict.
pub fn parse_verdict(raw_text: &str) -> Verdict {
    explain_verdict(raw_text).verdict
}

/// Like [`parse_verdict`], also reporting which check fired and the marker counts.
pub fn explain_verdict(raw_text: &str) -> VerdictTrace {
    let plus_ones = raw_text.matches("+1").count();
    let minus_ones = raw_text.matches("-1").count();

    let decide = |verdict, rule| VerdictTrace { verdict, rule, plus_ones, minus_ones };

    if raw_text.contains("not safe") || raw_text.contains("unsafe") {
        return decide(Verdict::Conflict, DecisionRule::UnsafeKeyword);
    }

    if raw_text.contains("conflict") {
        return decide(Verdict::Conflict, DecisionRule::ConflictKeyword);
    }

    // Requires minus_ones > 0 as well: only mixed answers reach this branch.
    if plus_ones > 0 && plus_ones > minus_ones && minus_ones > 0 {
        return decide(Verdict::Safe, DecisionRule::PlusMajority);
    }

    if minus_ones > 0 && minus_ones > plus_ones && plus_ones > 0 {
        return decide(Verdict::Conflict, DecisionRule::MinusMajority);
    }

    if raw_text.contains("-1") {
        return decide(Verdict::Conflict, DecisionRule::MinusMarker);
    }

    let squeezed: String = raw_text.chars().filter(|c| *c != '\n' && *c != ' ').collect();
    if bare_one_regex().is_match(&squeezed) {
        return decide(Verdict::Safe, DecisionRule::BareOne);
    }

    decide(Verdict::Unknown, DecisionRule::NoSignal)
}

fn bare_one_regex() -> &'static Regex {
    use std::sync::OnceLock;
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b1\b").expect("static regex"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minus_marker_is_conflict() {
        assert_eq!(parse_verdict("The answer is -1 for this pair"), Verdict::Conflict);
        assert_eq!(explain_verdict("-1").rule, DecisionRule::MinusMarker);
    }

    #[test]
    fn test_plus_marker_alone_is_safe_via_bare_one() {
        let trace = explain_verdict("+1");
        assert_eq!(trace.verdict, Verdict::Safe);
        assert_eq!(trace.rule, DecisionRule::BareOne);
    }

    #[test]
    fn test_unsafe_prose_overrides_markers() {
        assert_eq!(parse_verdict("This combination is unsafe."), Verdict::Conflict);
        assert_eq!(parse_verdict("+1 but not safe at high doses"), Verdict::Conflict);
    }

    #[test]
    fn test_conflict_keyword_is_case_sensitive() {
        assert_eq!(parse_verdict("there is a conflict +1"), Verdict::Conflict);
        // Capitalised keyword does not match and there is no digit to fall back on.
        assert_eq!(parse_verdict("Conflict detected"), Verdict::Unknown);
        assert_eq!(parse_verdict("UNSAFE"), Verdict::Unknown);
    }

    #[test]
    fn test_plus_majority_with_both_markers_is_safe() {
        let trace = explain_verdict("+1 +1 -1");
        assert_eq!(trace.plus_ones, 2);
        assert_eq!(trace.minus_ones, 1);
        assert_eq!(trace.verdict, Verdict::Safe);
        assert_eq!(trace.rule, DecisionRule::PlusMajority);
    }

    #[test]
    fn test_minus_majority_with_both_markers_is_conflict() {
        let trace = explain_verdict("+1 -1 -1");
        assert_eq!(trace.verdict, Verdict::Conflict);
        assert_eq!(trace.rule, DecisionRule::MinusMajority);
    }

    #[test]
    fn test_plus_majority_without_minus_skips_majority_branch() {
        // Documented, possibly unintended: the majority branch needs a "-1"
        // too, so a "+1"-only answer is decided by the bare-digit fallback.
        let trace = explain_verdict("+1 +1");
        assert_eq!(trace.verdict, Verdict::Safe);
        assert_eq!(trace.rule, DecisionRule::BareOne);
    }

    #[test]
    fn test_tied_markers_fall_through_to_minus_marker() {
        let trace = explain_verdict("+1 or -1");
        assert_eq!(trace.verdict, Verdict::Conflict);
        assert_eq!(trace.rule, DecisionRule::MinusMarker);
    }

    #[test]
    fn test_no_signal_is_unknown() {
        assert_eq!(parse_verdict("maybe"), Verdict::Unknown);
        assert_eq!(parse_verdict(""), Verdict::Unknown);
    }

    #[test]
    fn test_bare_one_needs_word_boundaries_after_squeezing() {
        assert_eq!(parse_verdict("Answer: 1"), Verdict::Safe);
        assert_eq!(parse_verdict("1\n"), Verdict::Safe);
        // "The answer is 1" squeezes to "Theansweris1": no boundary before the digit.
        assert_eq!(parse_verdict("The answer is 1"), Verdict::Unknown);
        assert_eq!(parse_verdict("10 mg"), Verdict::Unknown);
    }

    #[test]
    fn test_parse_is_deterministic() {
        let text = "Result:\n+1\n(no interaction)";
        let first = parse_verdict(text);
        for _ in 0..10 {
            assert_eq!(parse_verdict(text), first);
        }
    }
}
