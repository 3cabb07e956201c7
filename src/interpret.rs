//! Threshold tables that turn precomputed forensic scores into labels.
//!
//! Every classification is an ordered list of `(predicate, label)` rows. Rows
//! are evaluated top to bottom and the first match wins, so the order of each
//! table *is* the precedence. The last row of every table is a catch-all.

use std::fmt;

use serde::Serialize;

use crate::models::{AccrualZone, FinancialRecord};

// ---------------------------------------------------------------------------
// Display tones
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Green,
    Amber,
    Blue,
    Red,
}

impl Tone {
    pub fn hex(self) -> &'static str {
        match self {
            Self::Green => "#1f7a1f",
            Self::Amber => "#7a6a1f",
            Self::Blue => "#1f4e7a",
            Self::Red => "#7a1f1f",
        }
    }

    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            Self::Green => (0x1f, 0x7a, 0x1f),
            Self::Amber => (0x7a, 0x6a, 0x1f),
            Self::Blue => (0x1f, 0x4e, 0x7a),
            Self::Red => (0x7a, 0x1f, 0x1f),
        }
    }
}

// ---------------------------------------------------------------------------
// Predicates
// ---------------------------------------------------------------------------

/// A single-score comparison against an inclusive bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    AtLeast(f64),
    AtMost(f64),
    Always,
}

impl Bound {
    pub fn matches(self, value: f64) -> bool {
        match self {
            Self::AtLeast(t) => value >= t,
            Self::AtMost(t) => value <= t,
            Self::Always => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Score {
    F,
    C,
    O,
}

/// The three scores the composite verdict looks at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scores {
    pub f: f64,
    pub c: f64,
    pub o: f64,
}

impl Scores {
    fn get(&self, which: Score) -> f64 {
        match which {
            Score::F => self.f,
            Score::C => self.c,
            Score::O => self.o,
        }
    }
}

impl From<&FinancialRecord> for Scores {
    fn from(r: &FinancialRecord) -> Self {
        Self {
            f: r.f_score,
            c: r.c_score,
            o: r.o_score,
        }
    }
}

/// Multi-score predicate used by the verdict table.
#[derive(Debug, Clone, Copy)]
pub enum Condition {
    All(&'static [(Score, Bound)]),
    Any(&'static [(Score, Bound)]),
    Always,
}

impl Condition {
    pub fn matches(&self, scores: &Scores) -> bool {
        match self {
            Self::All(terms) => terms.iter().all(|(s, b)| b.matches(scores.get(*s))),
            Self::Any(terms) => terms.iter().any(|(s, b)| b.matches(scores.get(*s))),
            Self::Always => true,
        }
    }
}

// ---------------------------------------------------------------------------
// Labels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FScoreLabel {
    Strong,
    Moderate,
    Weak,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CScoreLabel {
    LowRisk,
    ModerateRisk,
    HighRisk,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OScoreLabel {
    Stable,
    AtRisk,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Verdict {
    FinanciallyHealthy,
    HighForensicRisk,
    WatchlistCompany,
}

impl FScoreLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Strong => "Strong",
            Self::Moderate => "Moderate",
            Self::Weak => "Weak",
        }
    }
}

impl CScoreLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LowRisk => "Low Risk",
            Self::ModerateRisk => "Moderate Risk",
            Self::HighRisk => "High Risk",
        }
    }
}

impl OScoreLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stable => "Stable",
            Self::AtRisk => "At Risk",
        }
    }
}

impl Verdict {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FinanciallyHealthy => "Financially Healthy",
            Self::HighForensicRisk => "High Forensic Risk",
            Self::WatchlistCompany => "Watchlist Company",
        }
    }

    pub fn tone(self) -> Tone {
        match self {
            Self::FinanciallyHealthy => Tone::Green,
            Self::HighForensicRisk => Tone::Red,
            Self::WatchlistCompany => Tone::Amber,
        }
    }
}

macro_rules! impl_display {
    ($($t:ty),*) => {
        $(impl fmt::Display for $t {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

impl_display!(FScoreLabel, CScoreLabel, OScoreLabel, Verdict);

// ---------------------------------------------------------------------------
// Rule tables
// ---------------------------------------------------------------------------

pub const F_SCORE_RULES: &[(Bound, FScoreLabel)] = &[
    (Bound::AtLeast(7.0), FScoreLabel::Strong),
    (Bound::AtLeast(4.0), FScoreLabel::Moderate),
    (Bound::Always, FScoreLabel::Weak),
];

pub const C_SCORE_RULES: &[(Bound, CScoreLabel)] = &[
    (Bound::AtMost(1.0), CScoreLabel::LowRisk),
    (Bound::AtMost(3.0), CScoreLabel::ModerateRisk),
    (Bound::Always, CScoreLabel::HighRisk),
];

pub const O_SCORE_RULES: &[(Bound, OScoreLabel)] = &[
    (Bound::AtMost(1.0), OScoreLabel::Stable),
    (Bound::Always, OScoreLabel::AtRisk),
];

// The composite thresholds (c >= 4, o >= 3) are independent of the per-score
// label boundaries above and must not be folded into them.
pub const VERDICT_RULES: &[(Condition, Verdict)] = &[
    (
        Condition::All(&[
            (Score::F, Bound::AtLeast(7.0)),
            (Score::C, Bound::AtMost(1.0)),
            (Score::O, Bound::AtMost(1.0)),
        ]),
        Verdict::FinanciallyHealthy,
    ),
    (
        Condition::Any(&[(Score::C, Bound::AtLeast(4.0)), (Score::O, Bound::AtLeast(3.0))]),
        Verdict::HighForensicRisk,
    ),
    (Condition::Always, Verdict::WatchlistCompany),
];

pub const ACCRUAL_ZONE_TONES: &[(&str, Tone)] = &[
    (AccrualZone::HIGH_QUALITY, Tone::Green),
    (AccrualZone::EARLY_WARNING, Tone::Amber),
    (AccrualZone::ASSET_HEAVY, Tone::Blue),
];

const ACCRUAL_FALLBACK_TONE: Tone = Tone::Red;

fn first_match<L: Copy>(rules: &[(Bound, L)], value: f64) -> L {
    rules
        .iter()
        .find(|(bound, _)| bound.matches(value))
        .map(|(_, label)| *label)
        // Tables end in `Bound::Always`; only NaN can fall through.
        .unwrap_or(rules[rules.len() - 1].1)
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

pub fn classify_f_score(f_score: f64) -> FScoreLabel {
    first_match(F_SCORE_RULES, f_score)
}

pub fn classify_c_score(c_score: f64) -> CScoreLabel {
    first_match(C_SCORE_RULES, c_score)
}

pub fn classify_o_score(o_score: f64) -> OScoreLabel {
    first_match(O_SCORE_RULES, o_score)
}

pub fn overall_verdict(f_score: f64, c_score: f64, o_score: f64) -> (Verdict, Tone) {
    let scores = Scores {
        f: f_score,
        c: c_score,
        o: o_score,
    };
    let verdict = VERDICT_RULES
        .iter()
        .find(|(cond, _)| cond.matches(&scores))
        .map(|(_, v)| *v)
        .unwrap_or(Verdict::WatchlistCompany);
    (verdict, verdict.tone())
}

pub fn classify_accrual_zone(zone: &str) -> Tone {
    ACCRUAL_ZONE_TONES
        .iter()
        .find(|(name, _)| *name == zone)
        .map(|(_, tone)| *tone)
        .unwrap_or(ACCRUAL_FALLBACK_TONE)
}

/// Labels for one record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Interpretation {
    pub f_label: FScoreLabel,
    pub c_label: CScoreLabel,
    pub o_label: OScoreLabel,
    pub verdict: Verdict,
    pub verdict_tone: Tone,
    pub zone_tone: Tone,
}

pub fn interpret(record: &FinancialRecord) -> Interpretation {
    let scores = Scores::from(record);
    let (verdict, verdict_tone) = overall_verdict(scores.f, scores.c, scores.o);
    Interpretation {
        f_label: classify_f_score(scores.f),
        c_label: classify_c_score(scores.c),
        o_label: classify_o_score(scores.o),
        verdict,
        verdict_tone,
        zone_tone: classify_accrual_zone(record.accrual_zone.name()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_support::record;

    #[test]
    fn test_f_score_bands() {
        for f in [7.0, 8.0, 9.0, 12.0] {
            assert_eq!(classify_f_score(f), FScoreLabel::Strong, "f = {f}");
        }
        for f in [4.0, 5.0, 6.0, 6.999] {
            assert_eq!(classify_f_score(f), FScoreLabel::Moderate, "f = {f}");
        }
        for f in [3.999, 3.0, 0.0, -2.0] {
            assert_eq!(classify_f_score(f), FScoreLabel::Weak, "f = {f}");
        }
    }

    #[test]
    fn test_c_score_bands() {
        assert_eq!(classify_c_score(0.0), CScoreLabel::LowRisk);
        assert_eq!(classify_c_score(1.0), CScoreLabel::LowRisk);
        assert_eq!(classify_c_score(1.5), CScoreLabel::ModerateRisk);
        assert_eq!(classify_c_score(3.0), CScoreLabel::ModerateRisk);
        assert_eq!(classify_c_score(3.5), CScoreLabel::HighRisk);
        assert_eq!(classify_c_score(6.0), CScoreLabel::HighRisk);
        assert_eq!(classify_c_score(-1.0), CScoreLabel::LowRisk);
    }

    #[test]
    fn test_o_score_bands() {
        assert_eq!(classify_o_score(-4.2), OScoreLabel::Stable);
        assert_eq!(classify_o_score(1.0), OScoreLabel::Stable);
        assert_eq!(classify_o_score(1.0001), OScoreLabel::AtRisk);
        assert_eq!(classify_o_score(25.0), OScoreLabel::AtRisk);
    }

    #[test]
    fn test_verdict_branches() {
        assert_eq!(
            overall_verdict(7.0, 1.0, 1.0),
            (Verdict::FinanciallyHealthy, Tone::Green)
        );
        assert_eq!(
            overall_verdict(7.0, 1.0, 3.0),
            (Verdict::HighForensicRisk, Tone::Red)
        );
        assert_eq!(
            overall_verdict(5.0, 2.0, 0.5),
            (Verdict::WatchlistCompany, Tone::Amber)
        );
    }

    #[test]
    fn test_verdict_composite_boundaries_differ_from_labels() {
        // c = 3.5 is "High Risk" as a label but below the verdict's c >= 4.
        assert_eq!(classify_c_score(3.5), CScoreLabel::HighRisk);
        assert_eq!(overall_verdict(5.0, 3.5, 0.5).0, Verdict::WatchlistCompany);
        assert_eq!(overall_verdict(5.0, 4.0, 0.5).0, Verdict::HighForensicRisk);
        // o = 2.5 is "At Risk" as a label but below the verdict's o >= 3.
        assert_eq!(classify_o_score(2.5), OScoreLabel::AtRisk);
        assert_eq!(overall_verdict(5.0, 2.0, 2.5).0, Verdict::WatchlistCompany);
        assert_eq!(overall_verdict(5.0, 2.0, 3.0).0, Verdict::HighForensicRisk);
    }

    #[test]
    fn test_healthy_requires_all_three() {
        assert_eq!(overall_verdict(6.0, 0.0, 0.0).0, Verdict::WatchlistCompany);
        assert_eq!(overall_verdict(9.0, 2.0, 0.0).0, Verdict::WatchlistCompany);
        assert_eq!(overall_verdict(9.0, 0.0, 1.5).0, Verdict::WatchlistCompany);
        assert_eq!(overall_verdict(9.0, 0.0, -3.0).0, Verdict::FinanciallyHealthy);
    }

    #[test]
    fn test_accrual_zone_tones() {
        assert_eq!(classify_accrual_zone("High-Quality Earnings"), Tone::Green);
        assert_eq!(classify_accrual_zone("Early Warning Zone"), Tone::Amber);
        assert_eq!(classify_accrual_zone("Asset-Heavy Operations"), Tone::Blue);
        assert_eq!(classify_accrual_zone("Other/Low-Quality"), Tone::Red);
        assert_eq!(classify_accrual_zone("Unrecognized Value"), Tone::Red);
        assert_eq!(classify_accrual_zone("early warning zone"), Tone::Red);
    }

    #[test]
    fn test_tone_hex() {
        assert_eq!(Tone::Green.hex(), "#1f7a1f");
        assert_eq!(Tone::Red.hex(), "#7a1f1f");
        assert_eq!(Tone::Amber.hex(), "#7a6a1f");
        assert_eq!(Tone::Blue.hex(), "#1f4e7a");
    }

    #[test]
    fn test_label_text() {
        assert_eq!(FScoreLabel::Moderate.to_string(), "Moderate");
        assert_eq!(CScoreLabel::ModerateRisk.to_string(), "Moderate Risk");
        assert_eq!(OScoreLabel::AtRisk.to_string(), "At Risk");
        assert_eq!(Verdict::WatchlistCompany.to_string(), "Watchlist Company");
    }

    #[test]
    fn test_interpret_is_idempotent() {
        let mut r = record("Acme", 2023, 3.0, 5.0, 3.2);
        r.accrual_zone = AccrualZone::EarlyWarning;
        let first = interpret(&r);
        let second = interpret(&r);
        assert_eq!(first, second);
        assert_eq!(first.f_label, FScoreLabel::Weak);
        assert_eq!(first.c_label, CScoreLabel::HighRisk);
        assert_eq!(first.o_label, OScoreLabel::AtRisk);
        assert_eq!(first.verdict, Verdict::HighForensicRisk);
        assert_eq!(first.verdict_tone, Tone::Red);
        assert_eq!(first.zone_tone, Tone::Amber);
    }
}
