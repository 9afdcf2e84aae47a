//! Aggregator: every derived table the dashboard shows, computed once.
//!
//! This stage:
//!   1. Computes the headline KPIs
//!   2. Builds the daily series (one row per observed calendar date)
//!   3. Builds fraud-rate segment tables (platform, address count,
//!      failed charges, order-value bucket)
//!   4. Builds the day-of-week x hour fraud-rate matrix
//!   5. Ranks numeric predictors against the fraud flag
//!
//! RULE: Pure functions of the table. Groups with no rows never appear and
//! every rate is positives / total with a zero total giving 0.0.

use crate::{
    columns,
    config::AnalysisConfig,
    correlation::{rank_predictors, PredictorScore},
    gov_buckets::{GovBucket, GovBucketing},
    normalizer::label_inconsistencies,
    table::{DeliveryRecord, DeliveryTable},
    types::{mean_present, rate, Dollars, Rate},
};
use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashSet};

pub const DAYS_PER_WEEK: usize = 7;
pub const HOURS_PER_DAY: usize = 24;
pub const WEEKDAY_LABELS: [&str; DAYS_PER_WEEK] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

// ── Capabilities ─────────────────────────────────────────────────────────────

/// A derived view the aggregator could build from the columns present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    DailySeries,
    TemporalMatrix,
    PlatformSegments,
    AddressSegments,
    FailedChargeSegments,
    GovBuckets,
    RiskScore,
    ChargebackCost,
    Predictors,
}

impl Capability {
    pub fn detect(table: &DeliveryTable) -> BTreeSet<Capability> {
        let mut caps = BTreeSet::new();
        let mut declare = |cap, column: &str| {
            if table.has_column(column) {
                caps.insert(cap);
            }
        };
        declare(Capability::DailySeries, columns::CREATED_AT);
        declare(Capability::TemporalMatrix, columns::CREATED_AT);
        declare(Capability::PlatformSegments, columns::PLATFORM);
        declare(Capability::AddressSegments, columns::CX_UNIQUE_ADDRESSES);
        declare(Capability::FailedChargeSegments, columns::FAIL_CHARGES_1D);
        declare(Capability::GovBuckets, columns::GOV);
        declare(Capability::RiskScore, columns::RISK_SCORE);
        declare(Capability::ChargebackCost, columns::CHARGEBACK_COST);
        declare(Capability::Predictors, columns::IS_FRAUDULENT_CHARGEBACK);
        caps
    }
}

// ── Output types ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Kpis {
    /// Distinct non-empty delivery ids.
    pub deliveries: u64,
    pub chargebacks: u64,
    pub fraudulent: u64,
    pub chargeback_rate: Rate,
    pub fraud_rate: Rate,
    /// Missing costs count as zero.
    pub chargeback_cost: f64,
    /// Mean over present order values; 0.0 when none.
    pub avg_order_value: Dollars,
    /// Mean over present risk scores; 0.0 when unavailable.
    pub avg_risk_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRow {
    pub date: NaiveDate,
    pub deliveries: u64,
    pub chargebacks: u64,
    pub fraudulent: u64,
    pub chargeback_cost: f64,
    pub avg_risk_score: Option<f64>,
    pub avg_order_value: Option<Dollars>,
    pub chargeback_rate: Rate,
    pub fraud_rate: Rate,
}

/// Fraud rate of one group. `key` is `None` for rows missing the group column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentRow<K> {
    pub key: K,
    pub deliveries: u64,
    pub fraudulent: u64,
    pub fraud_rate: Rate,
}

pub type PlatformRow = SegmentRow<Option<String>>;
pub type CountRow = SegmentRow<Option<f64>>;
pub type GovBucketRow = SegmentRow<GovBucket>;

/// Fraud rate by weekday (Mon..Sun) x hour (0..23). Empty cells are 0.0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemporalMatrix {
    pub rates: [[Rate; HOURS_PER_DAY]; DAYS_PER_WEEK],
    pub deliveries: [[u64; HOURS_PER_DAY]; DAYS_PER_WEEK],
}

/// One cell of the temporal matrix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemporalCell {
    /// 0 = Monday.
    pub weekday: usize,
    pub hour: usize,
    pub deliveries: u64,
    pub fraud_rate: Rate,
}

impl TemporalMatrix {
    pub fn is_empty(&self) -> bool {
        self.deliveries.iter().flatten().all(|n| *n == 0)
    }

    /// Highest-rate observed cell; earliest cell wins ties.
    pub fn hottest(&self) -> Option<TemporalCell> {
        let mut best: Option<TemporalCell> = None;
        for (weekday, row) in self.rates.iter().enumerate() {
            for (hour, &fraud_rate) in row.iter().enumerate() {
                let deliveries = self.deliveries[weekday][hour];
                if deliveries == 0 {
                    continue;
                }
                if best.map_or(true, |b| fraud_rate > b.fraud_rate) {
                    best = Some(TemporalCell {
                        weekday,
                        hour,
                        deliveries,
                        fraud_rate,
                    });
                }
            }
        }
        best
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub first: NaiveDate,
    pub last: NaiveDate,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Aggregates {
    pub kpis: Kpis,
    pub daily: Vec<DailyRow>,
    pub platforms: Vec<PlatformRow>,
    pub addresses: Vec<CountRow>,
    pub failed_charges: Vec<CountRow>,
    pub gov_buckets: Vec<GovBucketRow>,
    pub temporal: TemporalMatrix,
    pub predictors: Vec<PredictorScore>,
    pub date_range: Option<DateRange>,
    pub capabilities: BTreeSet<Capability>,
    /// Rows flagged fraud without a chargeback.
    pub label_inconsistencies: usize,
}

impl Aggregates {
    pub fn has(&self, cap: Capability) -> bool {
        self.capabilities.contains(&cap)
    }
}

// ── Entry point ──────────────────────────────────────────────────────────────

pub fn aggregate(table: &DeliveryTable, config: &AnalysisConfig) -> Aggregates {
    let capabilities = Capability::detect(table);
    let has = |cap| capabilities.contains(&cap);

    let daily = if has(Capability::DailySeries) {
        daily_series(&table.records)
    } else {
        Vec::new()
    };
    let date_range = match (daily.first(), daily.last()) {
        (Some(first), Some(last)) => Some(DateRange {
            first: first.date,
            last: last.date,
        }),
        _ => None,
    };

    let platforms = if has(Capability::PlatformSegments) {
        segment_by(
            &table.records,
            |r| r.platform.clone(),
            |a, b| none_last(a.as_ref(), b.as_ref(), |x, y| x.cmp(y)),
        )
    } else {
        Vec::new()
    };
    let addresses = if has(Capability::AddressSegments) {
        segment_by(&table.records, |r| r.unique_addresses, cmp_numeric_key)
    } else {
        Vec::new()
    };
    let failed_charges = if has(Capability::FailedChargeSegments) {
        segment_by(&table.records, |r| r.fail_charges_1d, cmp_numeric_key)
    } else {
        Vec::new()
    };
    let gov_buckets = if has(Capability::GovBuckets) {
        gov_bucket_rates(&table.records, config.decile_count)
    } else {
        Vec::new()
    };
    let temporal = if has(Capability::TemporalMatrix) {
        temporal_matrix(&table.records)
    } else {
        TemporalMatrix::default()
    };
    let predictors = if has(Capability::Predictors) {
        rank_predictors(table, config.top_predictors)
    } else {
        Vec::new()
    };

    let aggregates = Aggregates {
        kpis: kpis(&table.records),
        daily,
        platforms,
        addresses,
        failed_charges,
        gov_buckets,
        temporal,
        predictors,
        date_range,
        capabilities,
        label_inconsistencies: label_inconsistencies(table),
    };

    log::info!(
        "aggregated {} deliveries over {} days ({} platforms, {} order-value buckets, {} predictors)",
        aggregates.kpis.deliveries,
        aggregates.daily.len(),
        aggregates.platforms.len(),
        aggregates.gov_buckets.len(),
        aggregates.predictors.len()
    );
    aggregates
}

// ── KPIs ─────────────────────────────────────────────────────────────────────

pub fn kpis(records: &[DeliveryRecord]) -> Kpis {
    let deliveries = records
        .iter()
        .filter_map(|r| r.delivery_id.as_deref())
        .collect::<HashSet<&str>>()
        .len() as u64;
    let chargebacks: u64 = records.iter().map(|r| u64::from(r.received_chargeback)).sum();
    let fraudulent: u64 = records.iter().map(|r| u64::from(r.fraudulent)).sum();
    // Rates are per row so they stay in [0, 1] even with duplicate ids.
    let rows = records.len() as u64;

    Kpis {
        deliveries,
        chargebacks,
        fraudulent,
        chargeback_rate: rate(chargebacks, rows),
        fraud_rate: rate(fraudulent, rows),
        chargeback_cost: records.iter().filter_map(|r| r.chargeback_cost).sum(),
        avg_order_value: mean_present(records.iter().map(|r| r.gov_dollars)).unwrap_or(0.0),
        avg_risk_score: mean_present(records.iter().map(|r| r.risk_score)).unwrap_or(0.0),
    }
}

// ── Daily series ─────────────────────────────────────────────────────────────

#[derive(Default)]
struct DayAcc {
    deliveries: u64,
    chargebacks: u64,
    fraudulent: u64,
    cost: f64,
    scores: Vec<Option<f64>>,
    values: Vec<Option<f64>>,
}

/// One row per observed date, ascending. Undated rows are skipped.
pub fn daily_series(records: &[DeliveryRecord]) -> Vec<DailyRow> {
    let mut days: BTreeMap<NaiveDate, DayAcc> = BTreeMap::new();
    for r in records {
        let Some(date) = r.date() else { continue };
        let acc = days.entry(date).or_default();
        acc.deliveries += 1;
        acc.chargebacks += u64::from(r.received_chargeback);
        acc.fraudulent += u64::from(r.fraudulent);
        acc.cost += r.chargeback_cost.unwrap_or(0.0);
        acc.scores.push(r.risk_score);
        acc.values.push(r.gov_dollars);
    }

    days.into_iter()
        .map(|(date, acc)| DailyRow {
            date,
            deliveries: acc.deliveries,
            chargebacks: acc.chargebacks,
            fraudulent: acc.fraudulent,
            chargeback_cost: acc.cost,
            avg_risk_score: mean_present(acc.scores),
            avg_order_value: mean_present(acc.values),
            chargeback_rate: rate(acc.chargebacks, acc.deliveries),
            fraud_rate: rate(acc.fraudulent, acc.deliveries),
        })
        .collect()
}

// ── Segments ─────────────────────────────────────────────────────────────────

/// Group records by `key`, sorted by `cmp`, with per-group fraud rate.
pub fn segment_by<K, F, C>(records: &[DeliveryRecord], key: F, cmp: C) -> Vec<SegmentRow<K>>
where
    K: PartialEq,
    F: Fn(&DeliveryRecord) -> K,
    C: Fn(&K, &K) -> Ordering,
{
    let mut keyed: Vec<(K, u8)> = records.iter().map(|r| (key(r), r.fraudulent)).collect();
    keyed.sort_by(|a, b| cmp(&a.0, &b.0));

    let mut rows: Vec<SegmentRow<K>> = Vec::new();
    for (k, fraud) in keyed {
        match rows.last_mut() {
            Some(last) if last.key == k => {
                last.deliveries += 1;
                last.fraudulent += u64::from(fraud);
            }
            _ => rows.push(SegmentRow {
                key: k,
                deliveries: 1,
                fraudulent: u64::from(fraud),
                fraud_rate: 0.0,
            }),
        }
    }
    for row in &mut rows {
        row.fraud_rate = rate(row.fraudulent, row.deliveries);
    }
    rows
}

fn none_last<T, C>(a: Option<T>, b: Option<T>, cmp: C) -> Ordering
where
    C: Fn(&T, &T) -> Ordering,
{
    match (a, b) {
        (Some(x), Some(y)) => cmp(&x, &y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn cmp_numeric_key(a: &Option<f64>, b: &Option<f64>) -> Ordering {
    none_last(*a, *b, |x, y| x.total_cmp(y))
}

/// Fraud rate per order-value bucket. Rows without an order value are left out.
pub fn gov_bucket_rates(records: &[DeliveryRecord], bucket_count: usize) -> Vec<GovBucketRow> {
    let values: Vec<Dollars> = records.iter().filter_map(|r| r.gov_dollars).collect();
    let bucketing = GovBucketing::from_values(&values, bucket_count);
    if bucketing.is_empty() {
        return Vec::new();
    }

    let mut counts = vec![(0u64, 0u64); bucketing.len()];
    for r in records {
        let Some(idx) = r.gov_dollars.and_then(|v| bucketing.assign(v)) else {
            continue;
        };
        counts[idx].0 += 1;
        counts[idx].1 += u64::from(r.fraudulent);
    }

    bucketing
        .buckets
        .iter()
        .zip(counts)
        .filter(|(_, (n, _))| *n > 0)
        .map(|(bucket, (deliveries, fraudulent))| SegmentRow {
            key: *bucket,
            deliveries,
            fraudulent,
            fraud_rate: rate(fraudulent, deliveries),
        })
        .collect()
}

// ── Temporal matrix ──────────────────────────────────────────────────────────

pub fn temporal_matrix(records: &[DeliveryRecord]) -> TemporalMatrix {
    let mut matrix = TemporalMatrix::default();
    let mut fraud = [[0u64; HOURS_PER_DAY]; DAYS_PER_WEEK];

    for r in records {
        let (Some(day), Some(hour)) = (r.weekday(), r.hour()) else {
            continue;
        };
        let d = weekday_index(day);
        let h = hour as usize;
        matrix.deliveries[d][h] += 1;
        fraud[d][h] += u64::from(r.fraudulent);
    }

    for d in 0..DAYS_PER_WEEK {
        for h in 0..HOURS_PER_DAY {
            matrix.rates[d][h] = rate(fraud[d][h], matrix.deliveries[d][h]);
        }
    }
    matrix
}

pub fn weekday_index(day: Weekday) -> usize {
    day.num_days_from_monday() as usize
}
