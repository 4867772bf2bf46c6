//! Fundamentals hygiene gate.
//!
//! A pass/fail gate over a handful of balance-sheet and growth checks. It is
//! not a score: one failed check fails the symbol, and every failed check is
//! named. A symbol with no fundamentals record is UNKNOWN, never PASS.

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FundamentalsRecord {
    pub symbol: String,
    pub debt_to_equity: Option<f64>,
    pub interest_coverage: Option<f64>,
    pub promoter_pledge_pct: Option<f64>,
    /// Positive quarter-over-quarter revenue changes among the last three.
    pub qoq_rev_pos_last3: Option<f64>,
    /// Positive quarter-over-quarter EPS changes among the last three.
    pub qoq_eps_pos_last3: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HygieneCheck {
    DebtToEquity,
    InterestCoverage,
    PromoterPledge,
    QoqRevenue,
    QoqEps,
    QoqRevenueOrEps,
}

impl HygieneCheck {
    pub fn name(&self) -> &'static str {
        match self {
            HygieneCheck::DebtToEquity => "debt_to_equity",
            HygieneCheck::InterestCoverage => "interest_coverage",
            HygieneCheck::PromoterPledge => "promoter_pledge",
            HygieneCheck::QoqRevenue => "qoq_revenue",
            HygieneCheck::QoqEps => "qoq_eps",
            HygieneCheck::QoqRevenueOrEps => "qoq_revenue_or_eps",
        }
    }
}

impl fmt::Display for HygieneCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How the two quarterly growth checks combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthRule {
    /// Revenue and EPS are separate checks.
    #[default]
    Both,
    /// One combined check: revenue or EPS growth is enough.
    Either,
}

impl GrowthRule {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "both" => Some(GrowthRule::Both),
            "either" => Some(GrowthRule::Either),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HygieneThresholds {
    pub debt_to_equity_max: f64,
    pub interest_coverage_min: f64,
    pub pledge_pct_max: f64,
    pub qoq_min_positive: f64,
    pub growth_rule: GrowthRule,

    pub check_debt_to_equity: bool,
    pub check_interest_coverage: bool,
    pub check_pledge: bool,
    pub check_qoq_revenue: bool,
    pub check_qoq_eps: bool,
}

impl Default for HygieneThresholds {
    fn default() -> Self {
        Self {
            debt_to_equity_max: 1.5,
            interest_coverage_min: 2.5,
            pledge_pct_max: 20.0,
            qoq_min_positive: 1.0,
            growth_rule: GrowthRule::Both,
            check_debt_to_equity: true,
            check_interest_coverage: true,
            check_pledge: true,
            check_qoq_revenue: true,
            check_qoq_eps: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HygieneOutcome {
    Pass,
    Fail,
    Unknown,
}

impl HygieneOutcome {
    /// Ranking preference: verifiably clean first, then unknown, then failed.
    pub fn preference(&self) -> u8 {
        match self {
            HygieneOutcome::Pass => 0,
            HygieneOutcome::Unknown => 1,
            HygieneOutcome::Fail => 2,
        }
    }
}

impl fmt::Display for HygieneOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HygieneOutcome::Pass => write!(f, "PASS"),
            HygieneOutcome::Fail => write!(f, "FAIL"),
            HygieneOutcome::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HygieneResult {
    pub symbol: String,
    pub outcome: HygieneOutcome,
    pub failing_checks: BTreeSet<HygieneCheck>,
}

impl HygieneResult {
    pub fn unknown(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            outcome: HygieneOutcome::Unknown,
            failing_checks: BTreeSet::new(),
        }
    }

    pub fn failing_names(&self) -> Vec<&'static str> {
        self.failing_checks.iter().map(HygieneCheck::name).collect()
    }
}

pub fn evaluate_hygiene(
    symbol: &str,
    record: Option<&FundamentalsRecord>,
    thresholds: &HygieneThresholds,
) -> HygieneResult {
    let Some(record) = record else {
        return HygieneResult::unknown(symbol);
    };

    let at_most = |value: Option<f64>, max: f64| value.is_some_and(|v| v <= max);
    let at_least = |value: Option<f64>, min: f64| value.is_some_and(|v| v >= min);

    let mut failing = BTreeSet::new();

    if thresholds.check_debt_to_equity && !at_most(record.debt_to_equity, thresholds.debt_to_equity_max) {
        failing.insert(HygieneCheck::DebtToEquity);
    }
    if thresholds.check_interest_coverage
        && !at_least(record.interest_coverage, thresholds.interest_coverage_min)
    {
        failing.insert(HygieneCheck::InterestCoverage);
    }
    if thresholds.check_pledge && !at_most(record.promoter_pledge_pct, thresholds.pledge_pct_max) {
        failing.insert(HygieneCheck::PromoterPledge);
    }

    let revenue_ok = at_least(record.qoq_rev_pos_last3, thresholds.qoq_min_positive);
    let eps_ok = at_least(record.qoq_eps_pos_last3, thresholds.qoq_min_positive);
    match thresholds.growth_rule {
        GrowthRule::Both => {
            if thresholds.check_qoq_revenue && !revenue_ok {
                failing.insert(HygieneCheck::QoqRevenue);
            }
            if thresholds.check_qoq_eps && !eps_ok {
                failing.insert(HygieneCheck::QoqEps);
            }
        }
        GrowthRule::Either => {
            let enabled = thresholds.check_qoq_revenue || thresholds.check_qoq_eps;
            let passed = (thresholds.check_qoq_revenue && revenue_ok)
                || (thresholds.check_qoq_eps && eps_ok);
            if enabled && !passed {
                failing.insert(HygieneCheck::QoqRevenueOrEps);
            }
        }
    }

    HygieneResult {
        symbol: symbol.to_string(),
        outcome: if failing.is_empty() {
            HygieneOutcome::Pass
        } else {
            HygieneOutcome::Fail
        },
        failing_checks: failing,
    }
}
