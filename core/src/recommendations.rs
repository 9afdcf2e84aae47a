//! Recommendation rule catalog.
//!
//! Seven fixed rules, each tied to a chart on the dashboard. The catalog is
//! static text: selecting a rule reorders and highlights, it never edits.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKey {
    Temporal,
    FailedPayments,
    AddressVelocity,
    Device,
    Sift,
    Gov,
    Platform,
}

impl RuleKey {
    pub const ALL: [RuleKey; 7] = [
        RuleKey::Temporal,
        RuleKey::FailedPayments,
        RuleKey::AddressVelocity,
        RuleKey::Device,
        RuleKey::Sift,
        RuleKey::Gov,
        RuleKey::Platform,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RuleKey::Temporal => "temporal",
            RuleKey::FailedPayments => "failed_payments",
            RuleKey::AddressVelocity => "address_velocity",
            RuleKey::Device => "device",
            RuleKey::Sift => "sift",
            RuleKey::Gov => "gov",
            RuleKey::Platform => "platform",
        }
    }

    pub fn rule(self) -> &'static RecommendationRule {
        // CATALOG is ordered like ALL.
        &CATALOG[self as usize]
    }
}

impl fmt::Display for RuleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown recommendation rule: {0:?}")]
pub struct UnknownRule(pub String);

impl FromStr for RuleKey {
    type Err = UnknownRule;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RuleKey::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| UnknownRule(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecommendationRule {
    pub key: RuleKey,
    pub title: &'static str,
    pub trigger: &'static str,
    pub significance: &'static str,
    pub rationale: &'static str,
    pub actions: &'static [&'static str],
    pub kpis: &'static [&'static str],
    pub tags: &'static [&'static str],
}

/// A rule as rendered: the catalog entry plus its highlight state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RecommendationCard {
    pub rule: &'static RecommendationRule,
    pub highlighted: bool,
}

/// All rules in catalog order. A known `selected` rule moves to the front
/// and is highlighted; the relative order of the rest is kept.
pub fn catalog(selected: Option<RuleKey>) -> Vec<RecommendationCard> {
    let mut cards: Vec<RecommendationCard> = CATALOG
        .iter()
        .map(|rule| RecommendationCard {
            rule,
            highlighted: Some(rule.key) == selected,
        })
        .collect();
    cards.sort_by_key(|c| !c.highlighted);
    cards
}

pub static CATALOG: [RecommendationRule; 7] = [
    RecommendationRule {
        key: RuleKey::Temporal,
        title: "Temporal Guardrails (Hot-Zone Windows)",
        trigger: "Hours/days with above-baseline fraud in the Temporal Heatmap.",
        significance: "Hot windows concentrate loss; targeted friction saves $ with low UX impact.",
        rationale: "Abuse clusters in predictable windows (e.g., late nights). Rate-limits/step-up then reduce leakage with minimal overall UX cost.",
        actions: &[
            "Tighten limits + 3DS in hot hours",
            "Queue high-GOV/high-risk to review",
            "Staff review to peaks",
        ],
        kpis: &["Fraud in hot windows", "Approval vs off-hours", "Review SLA at peaks"],
        tags: &["Time Windows", "Ops", "Rate Limits"],
    },
    RecommendationRule {
        key: RuleKey::FailedPayments,
        title: "Step-up Verification on Failed Payments",
        trigger: "FAIL_CHARGES_1HR ≥ 1 or FAIL_CHARGES_1D ≥ 2.",
        significance: "Multiple declines often indicate card testing.",
        rationale: "Repeated payment failures signal card testing; assurance reduces high-risk volume.",
        actions: &[
            "Require 3DS/OTP",
            "Throttle retries / risky BINs",
            "Add cooldowns after multiple declines",
        ],
        kpis: &["3DS pass rate", "Fraud on stepped-up traffic", "Approval rate impact"],
        tags: &["Payments", "Velocity", "3DS"],
    },
    RecommendationRule {
        key: RuleKey::AddressVelocity,
        title: "Address Velocity & Uniqueness Control",
        trigger: "UNIQUE_ADDRESS_PAST_1DAY ≥ 2 or UNIQUE_ADDRESS_PAST_7DAY ≥ 3; lifetime CX_UNIQUE_ADDRESSES in top decile.",
        significance: "Many new/different addresses → reship/mule risk.",
        rationale: "Many distinct addresses in short windows suggests reship/mule behavior.",
        actions: &[
            "OTP on address change",
            "Cap new addresses/day",
            "Hold first order to a new address",
        ],
        kpis: &[
            "Fraud by address-velocity",
            "Review accept rate",
            "Time-to-fulfillment (flagged)",
        ],
        tags: &["Address", "Velocity"],
    },
    RecommendationRule {
        key: RuleKey::Device,
        title: "Device-Level Risk Throttling",
        trigger: "DEVICE_PCT_CHARGEBACK ≥ max(1%, 2× baseline) or repeated disputes on same device.",
        significance: "Repeat abusers cluster on the same device or emulator.",
        rationale: "Shared/emulated devices drive repeat abuse; throttling reduces serial loss.",
        actions: &[
            "Increase friction / re-auth",
            "Cap daily orders / cool-offs",
            "Limit multi-account per device",
        ],
        kpis: &[
            "Fraud by device tier",
            "Legit conversion (flagged)",
            "Share throttled/blocked",
        ],
        tags: &["Device", "Rate Limits"],
    },
    RecommendationRule {
        key: RuleKey::Sift,
        title: "Sift Thresholds with Feedback Loop",
        trigger: "Top-decile Sift scores or above tuned threshold.",
        significance: "High scores flag risk; tuning optimizes $ saved vs. friction.",
        rationale: "External risk scores are predictive; local calibration maximizes $ saved vs. friction.",
        actions: &[
            "Route to 3DS/review at cut-points",
            "Weekly backfill outcomes to Sift",
            "Use reason codes to tune",
        ],
        kpis: &[
            "Precision/Recall at threshold",
            "False-positive rate",
            "$ saved vs. revenue loss",
        ],
        tags: &["ML Score", "Calibration"],
    },
    RecommendationRule {
        key: RuleKey::Gov,
        title: "High-Value (GOV) Order Scrutiny",
        trigger: "Orders in top 20% GOV bins.",
        significance: "High-GOV orders carry outsized loss per hit.",
        rationale: "Payout incentives rise with order size; fraud often increases at the top end.",
        actions: &[
            "3DS + re-verify address",
            "Short holds for risky high-GOV",
            "Escalate during spikes",
        ],
        kpis: &["Fraud by GOV bin", "Approval after step-up", "NPS on high-GOV flow"],
        tags: &["GOV", "Manual Review"],
    },
    RecommendationRule {
        key: RuleKey::Platform,
        title: "Platform-Aware Guardrails",
        trigger: "Platforms with above-baseline fraud rate.",
        significance: "Some platforms are more bot-exposed or weakly instrumented.",
        rationale: "Certain platform funnels/SDKs or bot exposure can inflate risk.",
        actions: &[
            "Bot mitigation + phone verify",
            "Require account age / verified pay",
            "Fix instrumentation on risky paths",
        ],
        kpis: &["Fraud by platform", "Checkout drop-off", "Bot signal quality"],
        tags: &["Platform", "Bots"],
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_order_matches_keys() {
        for (i, key) in RuleKey::ALL.iter().enumerate() {
            assert_eq!(CATALOG[i].key, *key);
            assert_eq!(key.rule().key, *key);
        }
    }

    #[test]
    fn unknown_key_is_a_std_error() {
        let err: Box<dyn std::error::Error> = Box::new("bogus".parse::<RuleKey>().unwrap_err());
        assert_eq!(err.to_string(), "unknown recommendation rule: \"bogus\"");
    }
}
