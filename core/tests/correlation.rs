//! Predictor ranking against the fraud flag.

mod common;

use common::{raw, synthetic};
use fraudscope_core::{
    columns,
    config::AnalysisConfig,
    correlation::rank_predictors,
    normalizer::normalize,
    pipeline::Dashboard,
};

/// Label columns should never appear in the ranking.
#[test]
fn labels_never_rank() {
    let dash = Dashboard::from_raw(&synthetic(17, 500), &AnalysisConfig::default()).expect("dashboard");
    let preds = &dash.aggregates.predictors;
    assert!(!preds.is_empty(), "synthetic data has real signal");
    for p in preds {
        assert!(
            !columns::is_label(&p.column),
            "label column {} must not appear in the ranking",
            p.column
        );
        assert!((-1.0..=1.0).contains(&p.correlation));
    }
}

/// Predictors are ordered by |r|, strongest first.
#[test]
fn ranking_is_by_absolute_correlation() {
    let dash = Dashboard::from_raw(&synthetic(8, 500), &AnalysisConfig::default()).expect("dashboard");
    let preds = &dash.aggregates.predictors;
    for pair in preds.windows(2) {
        assert!(
            pair[0].correlation.abs() >= pair[1].correlation.abs(),
            "{} ({}) ranked above {} ({})",
            pair[0].column,
            pair[0].correlation,
            pair[1].column,
            pair[1].correlation
        );
    }
}

/// A strong negative correlation beats a weak positive one.
#[test]
fn strong_negative_signal_outranks_weak_positive() {
    let table = raw(
        &["DELIVERY_ID", "IS_FRAUDULENT_CHARGEBACK", "RECEIVED_CHARGEBACK", "DEVICE_DELIVERIES", "CX_ORDER_NUM"],
        &[
            &["a", "1", "1", "1", "3"],
            &["b", "1", "1", "2", "1"],
            &["c", "0", "0", "9", "2"],
            &["d", "0", "0", "8", "2"],
        ],
    );
    let t = normalize(&table).expect("normalize");
    let preds = rank_predictors(&t, 20);
    assert_eq!(preds[0].column, "DEVICE_DELIVERIES");
    assert!(preds[0].correlation < -0.9);
    assert_eq!(preds[0].observations, 4);
}

/// Constant or sparse columns are left out of the ranking.
#[test]
fn undefined_correlations_are_omitted() {
    let table = raw(
        &["DELIVERY_ID", "IS_FRAUDULENT_CHARGEBACK", "DEVICE_DELIVERIES", "CX_ORDER_NUM", "FAIL_CHARGES_7D"],
        &[
            &["a", "1", "5", "1", ""],
            &["b", "0", "5", "2", "3"],
            &["c", "0", "5", "3", ""],
        ],
    );
    let t = normalize(&table).expect("normalize");
    let names: Vec<String> = rank_predictors(&t, 20).into_iter().map(|p| p.column).collect();
    assert_eq!(
        names,
        vec!["CX_ORDER_NUM".to_string()],
        "constant column and single-observation column have no correlation"
    );
}

/// The ranking is truncated and ties keep column order.
#[test]
fn top_limit_and_stable_ties() {
    let table = raw(
        &["DELIVERY_ID", "IS_FRAUDULENT_CHARGEBACK", "CX_ORDER_NUM", "CX_CARD_ORDER_NUM", "DEVICE_DELIVERIES"],
        &[&["a", "1", "2", "2", "2"], &["b", "0", "1", "1", "1"]],
    );
    let t = normalize(&table).expect("normalize");
    let all = rank_predictors(&t, 20);
    let names: Vec<&str> = all.iter().map(|p| p.column.as_str()).collect();
    assert_eq!(
        names,
        vec!["CX_ORDER_NUM", "CX_CARD_ORDER_NUM", "DEVICE_DELIVERIES"],
        "equal |r| keeps source column order"
    );
    assert_eq!(rank_predictors(&t, 2).len(), 2);
}

/// No fraud label, no predictors.
#[test]
fn without_fraud_label_there_is_no_ranking() {
    let table = raw(&["DELIVERY_ID", "CX_ORDER_NUM"], &[&["a", "1"], &["b", "2"]]);
    let dash = Dashboard::from_raw(&table, &AnalysisConfig::default()).expect("dashboard");
    assert!(dash.aggregates.predictors.is_empty());
}
