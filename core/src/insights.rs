//! Insight derivation: short text bullets computed from the aggregates.
//!
//! RULE: Every function is total. It returns at most `max_bullets` bullets
//! and a single fallback bullet when its input is empty.

use crate::{
    aggregate::{Aggregates, Capability, CountRow, DailyRow, SegmentRow, WEEKDAY_LABELS},
    config::AnalysisConfig,
    correlation::pearson,
    format,
    types::Rate,
};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

// ── Period comparison ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodComparison {
    pub last: f64,
    pub prior: f64,
    /// `last - prior`.
    pub delta: f64,
}

/// Mean of the trailing `window_days` calendar days ending at the latest
/// date, against the `window_days` before that. `None` if either is empty.
pub fn compare_periods(points: &[(NaiveDate, f64)], window_days: i64) -> Option<PeriodComparison> {
    let latest = points.iter().map(|(d, _)| *d).max()?;
    let window = Duration::try_days(window_days.max(1))?;
    let last_start = latest.checked_sub_signed(window)?;
    let prior_start = last_start.checked_sub_signed(window)?;

    let mean_in = |lo: NaiveDate, hi: NaiveDate| {
        let vals: Vec<f64> = points
            .iter()
            .filter(|(d, _)| *d > lo && *d <= hi)
            .map(|(_, v)| *v)
            .collect();
        (!vals.is_empty()).then(|| vals.iter().sum::<f64>() / vals.len() as f64)
    };

    let last = mean_in(last_start, latest)?;
    let prior = mean_in(prior_start, last_start)?;
    Some(PeriodComparison {
        last,
        prior,
        delta: last - prior,
    })
}

/// Cost sums over the trailing daily rows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostComparison {
    pub last: f64,
    /// Present only with at least two full windows of rows.
    pub prior: Option<f64>,
    pub lifetime: f64,
}

pub fn compare_costs(daily: &[DailyRow], window_rows: usize, lifetime: f64) -> CostComparison {
    let n = daily.len();
    let w = window_rows.max(1);
    let last: f64 = daily[n.saturating_sub(w)..].iter().map(|d| d.chargeback_cost).sum();
    let prior = (n / 2 >= w).then(|| {
        daily[n - 2 * w..n - w]
            .iter()
            .map(|d| d.chargeback_cost)
            .sum::<f64>()
    });
    CostComparison {
        last,
        prior,
        lifetime,
    }
}

// ── Bullets ──────────────────────────────────────────────────────────────────

/// Bullets for every dashboard panel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Insights {
    pub rate_trends: Vec<String>,
    pub chargeback_cost: Vec<String>,
    pub risk_and_value: Vec<String>,
    pub platforms: Vec<String>,
    pub addresses: Vec<String>,
    pub failed_charges: Vec<String>,
    pub gov_buckets: Vec<String>,
    pub temporal: Vec<String>,
}

pub fn derive(aggs: &Aggregates, config: &AnalysisConfig) -> Insights {
    let cap = |bullets: Vec<String>| capped(bullets, config.max_bullets);
    Insights {
        rate_trends: cap(rate_trends(aggs, config.comparison_window_days)),
        chargeback_cost: cap(chargeback_cost(aggs, config.comparison_window_days)),
        risk_and_value: cap(risk_and_value(aggs)),
        platforms: cap(platforms(aggs)),
        addresses: cap(addresses(aggs)),
        failed_charges: cap(failed_charges(aggs)),
        gov_buckets: cap(gov_buckets(aggs)),
        temporal: cap(temporal(aggs)),
    }
}

fn capped(mut bullets: Vec<String>, max: usize) -> Vec<String> {
    bullets.truncate(max.max(1));
    bullets
}

pub fn rate_trends(aggs: &Aggregates, window_days: i64) -> Vec<String> {
    let series = |f: fn(&DailyRow) -> Rate| -> Vec<(NaiveDate, f64)> {
        aggs.daily.iter().map(|d| (d.date, f(d))).collect()
    };
    let mut bullets = Vec::new();
    for (label, points) in [
        ("Chargeback rate", series(|d| d.chargeback_rate)),
        ("Fraud rate", series(|d| d.fraud_rate)),
    ] {
        if let Some(c) = compare_periods(&points, window_days) {
            bullets.push(format!(
                "{label} last {window_days}d {} vs prior {window_days}d {} ({}).",
                format::pct(c.last),
                format::pct(c.prior),
                format::signed_pct(c.delta)
            ));
        }
    }
    if bullets.is_empty() {
        bullets.push(format!(
            "Insufficient recent data for {}-day comparison.",
            window_days.saturating_mul(2)
        ));
    }
    bullets
}

pub fn chargeback_cost(aggs: &Aggregates, window_days: i64) -> Vec<String> {
    if aggs.daily.is_empty() {
        return vec!["No cost data available.".into()];
    }
    let window = usize::try_from(window_days).unwrap_or(1);
    let c = compare_costs(&aggs.daily, window, aggs.kpis.chargeback_cost);
    let mut bullets = vec![format!(
        "Last {window_days}d chargeback cost: {}.",
        format::money(c.last)
    )];
    if let Some(prior) = c.prior {
        bullets.push(format!(
            "Prior {window_days}d: {} ({}).",
            format::money(prior),
            format::signed_amount(c.last - prior)
        ));
    }
    bullets.push(format!(
        "Lifetime total chargeback cost: {}.",
        format::money(c.lifetime)
    ));
    bullets
}

pub fn risk_and_value(aggs: &Aggregates) -> Vec<String> {
    let mut bullets = Vec::new();
    let scored = aggs.daily.iter().any(|d| d.avg_risk_score.is_some());
    if aggs.has(Capability::RiskScore) && scored {
        bullets.push(format!(
            "Average risk score overall: {:.2}.",
            aggs.kpis.avg_risk_score
        ));
    }
    if aggs.has(Capability::GovBuckets) {
        bullets.push(format!(
            "Average order value: {}.",
            format::money_cents(aggs.kpis.avg_order_value)
        ));
    }
    let pairs = aggs
        .daily
        .iter()
        .filter_map(|d| d.avg_risk_score.map(|s| (s, d.fraud_rate)));
    if let Some((r, _)) = pearson(pairs) {
        bullets.push(format!(
            "Risk score vs fraud (daily) correlation: {r:+.2} (directional)."
        ));
    }
    if bullets.is_empty() {
        bullets.push("No risk score or order value data available.".into());
    }
    bullets
}

pub fn platforms(aggs: &Aggregates) -> Vec<String> {
    extremum(
        &aggs.platforms,
        aggs.kpis.fraud_rate,
        "No platform data available.",
        |k| k.clone().unwrap_or_else(|| "unknown".into()),
        ("Highest fraud platform", "Lowest fraud platform"),
    )
}

pub fn addresses(aggs: &Aggregates) -> Vec<String> {
    extremum(
        &aggs.addresses,
        aggs.kpis.fraud_rate,
        "No address data available.",
        |k| format!("{} unique addresses", count_key(k)),
        ("Highest fraud at", "Lowest fraud at"),
    )
}

pub fn gov_buckets(aggs: &Aggregates) -> Vec<String> {
    extremum(
        &aggs.gov_buckets,
        aggs.kpis.fraud_rate,
        "No order value bucket data available.",
        |b| b.label(),
        ("Highest fraud order value bucket", "Lowest fraud order value bucket"),
    )
}

/// Max-rate group, min-rate group, overall baseline. First group wins ties.
fn extremum<K, F>(
    rows: &[SegmentRow<K>],
    baseline: Rate,
    empty: &str,
    label: F,
    (high, low): (&str, &str),
) -> Vec<String>
where
    F: Fn(&K) -> String,
{
    let Some(first) = rows.first() else {
        return vec![empty.to_string()];
    };
    let (mut top, mut bottom) = (first, first);
    for row in rows {
        if row.fraud_rate > top.fraud_rate {
            top = row;
        }
        if row.fraud_rate < bottom.fraud_rate {
            bottom = row;
        }
    }
    vec![
        format!("{high}: {} ({}).", label(&top.key), format::pct(top.fraud_rate)),
        format!("{low}: {} ({}).", label(&bottom.key), format::pct(bottom.fraud_rate)),
        format!("Overall fraud rate baseline: {}.", format::pct(baseline)),
    ]
}

pub fn failed_charges(aggs: &Aggregates) -> Vec<String> {
    if aggs.failed_charges.is_empty() {
        return vec!["No failed charge data available.".into()];
    }
    let mean_where = |pred: fn(f64) -> bool| -> Option<f64> {
        let rates: Vec<f64> = aggs
            .failed_charges
            .iter()
            .filter(|r| r.key.is_some_and(pred))
            .map(|r| r.fraud_rate)
            .collect();
        (!rates.is_empty()).then(|| rates.iter().sum::<f64>() / rates.len() as f64)
    };

    let mut bullets = Vec::new();
    if let Some(m) = mean_where(|k| k == 0.0) {
        bullets.push(format!("0 failed charges fraud rate: {}.", format::pct(m)));
    }
    if let Some(m) = mean_where(|k| k >= 1.0) {
        bullets.push(format!("≥1 failed charge: {}.", format::pct(m)));
    }
    if let Some(m) = mean_where(|k| k >= 2.0) {
        bullets.push(format!("≥2 failed charges: {}.", format::pct(m)));
    }
    if bullets.is_empty() {
        bullets.push("Insufficient distribution across buckets.".into());
    }
    bullets
}

pub fn temporal(aggs: &Aggregates) -> Vec<String> {
    let mut bullets = vec![
        "Heatmap shows fraud rate by day-of-week and hour; bright cells indicate risky windows."
            .to_string(),
        "Use hot zones to set rate limits, staffing and step-up windows.".to_string(),
    ];
    if let Some(cell) = aggs.temporal.hottest() {
        bullets.push(format!(
            "Hottest window: {} {:02}:00 ({} over {} deliveries).",
            WEEKDAY_LABELS[cell.weekday],
            cell.hour,
            format::pct(cell.fraud_rate),
            format::count(cell.deliveries)
        ));
    }
    bullets
}

/// Group key of a count segment, e.g. `3` or `unknown`.
pub fn count_key(key: &Option<f64>) -> String {
    match key {
        Some(v) if v.fract() == 0.0 => format!("{v:.0}"),
        Some(v) => format!("{v}"),
        None => "unknown".into(),
    }
}

/// Keys of a count segment table, for chart axes.
pub fn count_labels(rows: &[CountRow]) -> Vec<String> {
    rows.iter().map(|r| count_key(&r.key)).collect()
}
