//! Candidate ranking.
//!
//! Merges technical verdicts with hygiene results. Only BUY verdicts are
//! ranked. Order: strength descending, then hygiene PASS > UNKNOWN > FAIL,
//! then symbol ascending.
//!
//! Hygiene is advisory by default; [`HygienePolicy`] can turn it into a hard
//! filter for callers with a lower risk tolerance.

use crate::domain::hygiene::{HygieneOutcome, HygieneResult};
use crate::domain::technical::{Signal, TechnicalVerdict};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HygienePolicy {
    /// FAIL symbols are ranked and annotated.
    #[default]
    Advisory,
    /// FAIL symbols are left out of the candidate list.
    ExcludeFail,
    /// Only PASS symbols are ranked.
    RequirePass,
}

impl HygienePolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "advisory" => Some(HygienePolicy::Advisory),
            "exclude_fail" => Some(HygienePolicy::ExcludeFail),
            "require_pass" => Some(HygienePolicy::RequirePass),
            _ => None,
        }
    }

    pub fn admits(&self, outcome: HygieneOutcome) -> bool {
        match self {
            HygienePolicy::Advisory => true,
            HygienePolicy::ExcludeFail => outcome != HygieneOutcome::Fail,
            HygienePolicy::RequirePass => outcome == HygieneOutcome::Pass,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RankingConfig {
    pub hygiene_policy: HygienePolicy,
    /// 0 means no limit.
    pub max_candidates: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub rank: usize,
    pub symbol: String,
    pub verdict: TechnicalVerdict,
    pub hygiene: HygieneResult,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Ranking {
    pub candidates: Vec<Candidate>,
    /// BUY symbols dropped by the hygiene policy.
    pub excluded_by_policy: Vec<String>,
}

pub fn rank_candidates(
    verdicts: &BTreeMap<String, TechnicalVerdict>,
    hygiene: &BTreeMap<String, HygieneResult>,
    config: &RankingConfig,
) -> Ranking {
    let mut excluded_by_policy = Vec::new();
    let mut eligible: Vec<(&TechnicalVerdict, HygieneResult)> = Vec::new();

    for (symbol, verdict) in verdicts {
        if verdict.signal != Signal::Buy {
            continue;
        }
        let result = hygiene
            .get(symbol)
            .cloned()
            .unwrap_or_else(|| HygieneResult::unknown(symbol));
        if config.hygiene_policy.admits(result.outcome) {
            eligible.push((verdict, result));
        } else {
            excluded_by_policy.push(symbol.clone());
        }
    }

    eligible.sort_by(|(va, ha), (vb, hb)| compare(va, ha, vb, hb));

    let limit = match config.max_candidates {
        0 => usize::MAX,
        n => n,
    };

    let candidates = eligible
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(i, (verdict, hygiene))| Candidate {
            rank: i + 1,
            symbol: verdict.symbol.clone(),
            verdict: verdict.clone(),
            hygiene,
        })
        .collect();

    Ranking {
        candidates,
        excluded_by_policy,
    }
}

fn compare(
    va: &TechnicalVerdict,
    ha: &HygieneResult,
    vb: &TechnicalVerdict,
    hb: &HygieneResult,
) -> Ordering {
    vb.strength
        .total_cmp(&va.strength)
        .then_with(|| ha.outcome.preference().cmp(&hb.outcome.preference()))
        .then_with(|| va.symbol.cmp(&vb.symbol))
}
