//! Aggregator: KPIs, daily series, segments, temporal matrix, capabilities.

mod common;

use common::{raw, synthetic, FULL_HEADER};
use fraudscope_core::{
    aggregate::{aggregate, Capability},
    config::AnalysisConfig,
    normalizer::normalize,
    pipeline::Dashboard,
    types::{rate, safe_div},
};

fn build(table: &fraudscope_core::loader::RawTable) -> Dashboard {
    Dashboard::from_raw(table, &AnalysisConfig::default()).expect("dashboard")
}

/// A single delivery yields one group everywhere and rates of 0 or 1.
#[test]
fn single_record_scenario() {
    let table = raw(
        &["DELIVERY_ID", "CREATED_AT", "GOV", "RECEIVED_CHARGEBACK", "IS_FRAUDULENT_CHARGEBACK", "PLATFORM"],
        &[&["d1", "2024-01-01T14:00:00Z", "5000", "1", "1", "iOS"]],
    );
    let dash = build(&table);
    let a = &dash.aggregates;

    assert_eq!(a.kpis.chargeback_rate, 1.0);
    assert_eq!(a.kpis.fraud_rate, 1.0);
    assert_eq!(a.kpis.avg_order_value, 50.0);
    assert_eq!(a.daily.len(), 1, "exactly one daily row");
    let day = &a.daily[0];
    assert_eq!(day.date.to_string(), "2024-01-01");
    assert_eq!((day.deliveries, day.chargebacks, day.fraudulent), (1, 1, 1));

    assert_eq!(a.platforms.len(), 1);
    assert_eq!(a.platforms[0].key.as_deref(), Some("iOS"));
    assert_eq!(a.gov_buckets.len(), 1, "a single value is one bucket");
    assert_eq!(a.temporal.rates[0][14], 1.0, "Monday 14:00");
    assert_eq!(dash.date_range_note(), "Data range: Jan 01, 2024 – Jan 01, 2024");
}

/// A header with no rows yields empty tables and zero KPIs.
#[test]
fn zero_record_scenario() {
    let table = raw(FULL_HEADER, &[]);
    let dash = build(&table);
    let k = &dash.aggregates.kpis;

    assert_eq!(k.deliveries, 0);
    assert_eq!(k.chargebacks, 0);
    assert_eq!(k.fraudulent, 0);
    assert_eq!(k.chargeback_rate, 0.0);
    assert_eq!(k.fraud_rate, 0.0);
    assert_eq!(k.chargeback_cost, 0.0);
    assert_eq!(k.avg_order_value, 0.0);
    assert_eq!(k.avg_risk_score, 0.0);
    assert!(dash.aggregates.daily.is_empty());
    assert!(dash.aggregates.platforms.is_empty());
    assert!(dash.aggregates.gov_buckets.is_empty());
    assert!(dash.aggregates.predictors.is_empty());
    assert!(dash.aggregates.temporal.hottest().is_none());
    assert_eq!(dash.date_range_note(), "Data range: —");
    assert_eq!(dash.insights.platforms, vec!["No platform data available."]);
}

/// Dividing by an empty group gives exactly 0.0.
#[test]
fn zero_denominator_rate_is_exactly_zero() {
    assert_eq!(rate(0, 0), 0.0);
    assert_eq!(rate(5, 0), 0.0);
    assert_eq!(safe_div(1.0, 0.0), 0.0);
    assert_eq!(safe_div(f64::NAN, 2.0), 0.0);
}

/// Every rate in every table should stay within [0, 1].
#[test]
fn every_rate_is_in_unit_interval() {
    for seed in [1u64, 7, 42, 1234] {
        let dash = build(&synthetic(seed, 400));
        let a = &dash.aggregates;
        let mut rates = vec![a.kpis.chargeback_rate, a.kpis.fraud_rate];
        rates.extend(a.daily.iter().flat_map(|d| [d.chargeback_rate, d.fraud_rate]));
        rates.extend(a.platforms.iter().map(|r| r.fraud_rate));
        rates.extend(a.addresses.iter().map(|r| r.fraud_rate));
        rates.extend(a.failed_charges.iter().map(|r| r.fraud_rate));
        rates.extend(a.gov_buckets.iter().map(|r| r.fraud_rate));
        rates.extend(a.temporal.rates.iter().flatten().copied());
        for r in rates {
            assert!((0.0..=1.0).contains(&r), "seed {seed}: rate {r} out of range");
        }
    }
}

/// No segment row should have zero deliveries.
#[test]
fn groups_are_never_empty() {
    let dash = build(&synthetic(99, 300));
    let a = &dash.aggregates;
    assert!(a.daily.iter().all(|d| d.deliveries > 0));
    assert!(a.platforms.iter().all(|r| r.deliveries > 0));
    assert!(a.addresses.iter().all(|r| r.deliveries > 0));
    assert!(a.failed_charges.iter().all(|r| r.deliveries > 0));
    assert!(a.gov_buckets.iter().all(|r| r.deliveries > 0));
}

/// Segment deliveries should sum to the row count.
#[test]
fn segment_counts_cover_every_row() {
    let table = synthetic(5, 250);
    let dash = build(&table);
    let a = &dash.aggregates;
    let total = table.len() as u64;
    assert_eq!(a.platforms.iter().map(|r| r.deliveries).sum::<u64>(), total);
    assert_eq!(a.addresses.iter().map(|r| r.deliveries).sum::<u64>(), total);
    let fraud: u64 = a.platforms.iter().map(|r| r.fraudulent).sum();
    assert_eq!(fraud, a.kpis.fraudulent);
}

/// Aggregating the same table twice gives identical results.
#[test]
fn aggregation_is_idempotent() {
    let table = synthetic(2024, 500);
    assert_eq!(build(&table), build(&table), "rerun must give identical aggregates");
}

/// Rows without a platform form an unknown group at the end.
#[test]
fn missing_platform_group_sorts_last() {
    let table = raw(
        &["DELIVERY_ID", "PLATFORM", "IS_FRAUDULENT_CHARGEBACK", "RECEIVED_CHARGEBACK"],
        &[&["a", "web", "1", "1"], &["b", "", "0", "0"], &["c", "android", "0", "0"], &["d", "web", "0", "0"]],
    );
    let a = build(&table).aggregates;
    let keys: Vec<Option<&str>> = a.platforms.iter().map(|r| r.key.as_deref()).collect();
    assert_eq!(keys, vec![Some("android"), Some("web"), None]);
    assert_eq!(a.platforms[1].fraud_rate, 0.5);
}

/// Count segments are ordered numerically, not lexically.
#[test]
fn numeric_segments_sort_by_value() {
    let table = raw(
        &["DELIVERY_ID", "FAIL_CHARGES_1D", "IS_FRAUDULENT_CHARGEBACK"],
        &[&["a", "10", "1"], &["b", "2", "1"], &["c", "0", "0"], &["d", "2", "0"], &["e", "x", "0"]],
    );
    let a = build(&table).aggregates;
    let keys: Vec<Option<f64>> = a.failed_charges.iter().map(|r| r.key).collect();
    assert_eq!(keys, vec![Some(0.0), Some(2.0), Some(10.0), None]);
}

/// A constant order value collapses to a single bucket.
#[test]
fn constant_order_values_give_one_bucket() {
    let table = raw(
        &["DELIVERY_ID", "GOV", "IS_FRAUDULENT_CHARGEBACK"],
        &[&["a", "2500", "1"], &["b", "2500", "0"], &["c", "2500", "0"], &["d", "2500", "0"]],
    );
    let a = build(&table).aggregates;
    assert_eq!(a.gov_buckets.len(), 1);
    assert_eq!(a.gov_buckets[0].deliveries, 4);
    assert_eq!(a.gov_buckets[0].fraud_rate, 0.25);
    assert_eq!(a.gov_buckets[0].key.label(), "[25.00, 25.00]");
}

/// Every present order value lands in exactly one bucket.
#[test]
fn decile_buckets_partition_present_values() {
    let dash = build(&synthetic(11, 600));
    let buckets = &dash.aggregates.gov_buckets;
    assert!(buckets.len() <= 10 && !buckets.is_empty());
    assert!(buckets[0].key.lower_inclusive);
    assert!(buckets[1..].iter().all(|b| !b.key.lower_inclusive));
    for pair in buckets.windows(2) {
        assert!(pair[0].key.upper <= pair[1].key.lower + 1e-9, "buckets must not overlap");
    }
}

/// Undated rows stay out of the daily series.
#[test]
fn daily_series_skips_undated_rows_and_averages_present_values() {
    let table = raw(
        &["DELIVERY_ID", "CREATED_AT", "SIFT_CREATE_ORDER_PA_SCORE", "CHARGEBACK_COST", "RECEIVED_CHARGEBACK"],
        &[
            &["a", "2024-03-01 08:00:00", "10", "100", "1"],
            &["b", "2024-03-01 09:00:00", "", "", "0"],
            &["c", "2024-03-01 10:00:00", "30", "", "0"],
            &["d", "", "99", "50", "1"],
            &["e", "2024-03-02 10:00:00", "", "", "0"],
        ],
    );
    let a = build(&table).aggregates;
    assert_eq!(a.daily.len(), 2);
    let d1 = &a.daily[0];
    assert_eq!(d1.deliveries, 3);
    assert_eq!(d1.avg_risk_score, Some(20.0), "missing scores are excluded");
    assert_eq!(d1.chargeback_cost, 100.0, "missing cost counts as zero");
    assert!((d1.chargeback_rate - 1.0 / 3.0).abs() < 1e-12);
    assert_eq!(a.daily[1].avg_risk_score, None);
    assert_eq!(a.kpis.chargeback_cost, 150.0, "KPI cost includes undated rows");
}

/// Duplicate delivery ids are counted once.
#[test]
fn kpi_deliveries_count_distinct_ids() {
    let table = raw(
        &["DELIVERY_ID", "IS_FRAUDULENT_CHARGEBACK"],
        &[&["a", "1"], &["a", "0"], &["b", "0"], &["", "0"]],
    );
    let k = build(&table).aggregates.kpis;
    assert_eq!(k.deliveries, 2);
    assert_eq!(k.fraud_rate, 0.25, "rates are per row");
}

/// The hottest temporal cell has the highest fraud rate.
#[test]
fn hottest_cell_is_the_max_rate() {
    let table = raw(
        &["DELIVERY_ID", "CREATED_AT", "IS_FRAUDULENT_CHARGEBACK"],
        &[
            &["a", "2024-01-05 22:10:00", "1"],
            &["b", "2024-01-05 22:40:00", "1"],
            &["c", "2024-01-01 09:00:00", "0"],
        ],
    );
    let a = build(&table).aggregates;
    let hot = a.temporal.hottest().expect("non-empty matrix");
    assert_eq!((hot.weekday, hot.hour, hot.deliveries), (4, 22, 2), "Friday 22:00");
    assert_eq!(hot.fraud_rate, 1.0);
    assert_eq!(a.temporal.rates[0][9], 0.0);
    assert_eq!(a.temporal.rates[3][3], 0.0, "unobserved cells are 0.0");
}

/// Capabilities should match the columns actually present.
#[test]
fn capabilities_follow_present_columns() {
    let table = raw(&["DELIVERY_ID", "PLATFORM", "GOV"], &[&["a", "web", "100"]]);
    let t = normalize(&table).expect("normalize");
    let a = aggregate(&t, &AnalysisConfig::default());
    assert!(a.has(Capability::PlatformSegments));
    assert!(a.has(Capability::GovBuckets));
    assert!(!a.has(Capability::DailySeries));
    assert!(!a.has(Capability::TemporalMatrix));
    assert!(!a.has(Capability::RiskScore));
    assert!(a.daily.is_empty());
    assert!(a.temporal.is_empty());

    let full = build(&synthetic(3, 50)).aggregates;
    assert_eq!(full.capabilities.len(), 9, "every capability with every column");
}
