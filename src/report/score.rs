//! Heuristic security score.
//!
//! The score is approximate: it counts risk keywords in the report and deducts
//! a fixed weight per occurrence. A report with no keyword matches always
//! scores 100 regardless of what it actually says.

use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

const BASE_SCORE: usize = 100;
const LOW_WEIGHT: usize = 5;
const MEDIUM_WEIGHT: usize = 10;
const HIGH_WEIGHT: usize = 15;

static LOW_RISK: LazyLock<Regex> =
    LazyLock::new(|| keyword_set(&["low risk", "minor", "suggestion"]));
static MEDIUM_RISK: LazyLock<Regex> =
    LazyLock::new(|| keyword_set(&["moderate", "warning", "consider"]));
static HIGH_RISK: LazyLock<Regex> =
    LazyLock::new(|| keyword_set(&["critical", "severe", "vulnerability", "exploit"]));

fn keyword_set(keywords: &[&str]) -> Regex {
    let pattern = keywords.iter().map(|k| regex::escape(k)).collect::<Vec<_>>().join("|");
    RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .build()
        .expect("escaped keyword alternation is a valid regex")
}

/// Derive a 0-100 score from keyword occurrences in the report
///
/// `deduction = min(100, 5 * low + 10 * medium + 15 * high)`, `score = 100 - deduction`.
pub fn derive_score(report_text: &str) -> u8 {
    let low = LOW_RISK.find_iter(report_text).count();
    let medium = MEDIUM_RISK.find_iter(report_text).count();
    let high = HIGH_RISK.find_iter(report_text).count();

    let deduction = (low.saturating_mul(LOW_WEIGHT))
        .saturating_add(medium.saturating_mul(MEDIUM_WEIGHT))
        .saturating_add(high.saturating_mul(HIGH_WEIGHT))
        .min(BASE_SCORE);

    (BASE_SCORE - deduction) as u8
}

/// Coarse classification of a score for display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    Secure,
    Moderate,
    Vulnerable,
    Critical,
}

impl ScoreBand {
    pub fn from_score(score: u8) -> Self {
        match score {
            90.. => ScoreBand::Secure,
            70..=89 => ScoreBand::Moderate,
            50..=69 => ScoreBand::Vulnerable,
            _ => ScoreBand::Critical,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ScoreBand::Secure => "SECURE",
            ScoreBand::Moderate => "MODERATE",
            ScoreBand::Vulnerable => "VULNERABLE",
            ScoreBand::Critical => "CRITICAL",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_report_scores_100() {
        assert_eq!(derive_score(""), 100);
    }

    #[test]
    fn test_one_of_each_high_keyword() {
        assert_eq!(derive_score("critical vulnerability exploit"), 55);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(derive_score("CRITICAL"), 85);
        assert_eq!(derive_score("Low Risk"), 95);
        assert_eq!(derive_score("WaRnInG"), 90);
    }

    #[test]
    fn test_mixed_weights() {
        // 1 low (5) + 2 medium (20) + 1 high (15)
        let report = "A minor issue. Warning: consider input validation. Severe.";
        assert_eq!(derive_score(report), 60);
    }

    #[test]
    fn test_substring_matches_count() {
        // "exploitable" contains "exploit", "considered" contains "consider"
        assert_eq!(derive_score("exploitable and considered"), 75);
    }

    #[test]
    fn test_deduction_is_clamped() {
        let report = "critical ".repeat(20);
        assert_eq!(derive_score(&report), 0);
    }

    #[test]
    fn test_no_keywords_scores_100() {
        assert_eq!(derive_score("SUMMARY:\n1. SQL Injection\n"), 100);
    }

    #[test]
    fn test_deterministic() {
        let report = "SUMMARY:\n1. Severe XSS\nIMPACT:\n1. Moderate data exposure";
        assert_eq!(derive_score(report), derive_score(report));
    }

    #[test]
    fn test_score_bands() {
        assert_eq!(ScoreBand::from_score(100), ScoreBand::Secure);
        assert_eq!(ScoreBand::from_score(90), ScoreBand::Secure);
        assert_eq!(ScoreBand::from_score(89), ScoreBand::Moderate);
        assert_eq!(ScoreBand::from_score(70), ScoreBand::Moderate);
        assert_eq!(ScoreBand::from_score(69), ScoreBand::Vulnerable);
        assert_eq!(ScoreBand::from_score(50), ScoreBand::Vulnerable);
        assert_eq!(ScoreBand::from_score(49), ScoreBand::Critical);
        assert_eq!(ScoreBand::from_score(0).label(), "CRITICAL");
    }
}
