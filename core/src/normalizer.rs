//! Normalizer: turns the raw text table into typed delivery records.
//!
//! This stage:
//!   1. Coerces declared numeric columns (invalid -> absent)
//!   2. Coerces boolean-like label columns to 0/1 with a tolerant rule
//!   3. Parses timestamps (invalid -> absent)
//!   4. Converts order value from minor to major currency units
//!   5. Infers numeric type for undeclared columns and adds derived columns
//!
//! RULE: Bad cell values never fail the load. Only a missing `DELIVERY_ID`
//! column does.

use crate::{
    columns,
    error::{DashError, DashResult},
    loader::RawTable,
    table::{DeliveryRecord, DeliveryTable, NumericColumn},
};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::collections::{BTreeSet, HashSet};

/// Minor currency units per major unit.
pub const MINOR_UNITS_PER_MAJOR: f64 = 100.0;

const TRUTHY: &[&str] = &["1", "true", "t", "yes", "y"];
const FALSEY: &[&str] = &["0", "false", "f", "no", "n"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

// ── Cell coercion ────────────────────────────────────────────────────────────

/// Coerce a boolean-like cell to 0/1. Total: every input maps somewhere.
pub fn to_flag(cell: Option<&str>) -> u8 {
    let Some(raw) = cell else { return 0 };
    let s = raw.trim().to_ascii_lowercase();
    if TRUTHY.contains(&s.as_str()) {
        return 1;
    }
    if FALSEY.contains(&s.as_str()) {
        return 0;
    }
    match s.parse::<f64>() {
        Ok(v) if !v.is_nan() && v != 0.0 => 1,
        _ => 0,
    }
}

/// Parse a numeric cell. Unparseable or non-finite values are absent.
pub fn parse_number(cell: Option<&str>) -> Option<f64> {
    cell.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// Parse a timestamp cell. Offsets keep their local wall-clock time.
pub fn parse_timestamp(cell: Option<&str>) -> Option<NaiveDateTime> {
    let s = cell?.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.naive_local());
    }
    if let Ok(ts) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(ts.naive_local());
    }
    let naive = s.trim_end_matches('Z').trim_end_matches(" UTC");
    for fmt in DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(naive, fmt) {
            return Some(ts);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(naive, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}

// ── Table normalization ──────────────────────────────────────────────────────

/// Normalize a raw table. Pure: the same input always yields the same table.
pub fn normalize(raw: &RawTable) -> DashResult<DeliveryTable> {
    let id_col = raw
        .column_index(columns::DELIVERY_ID)
        .ok_or_else(|| DashError::MissingColumn {
            name: columns::DELIVERY_ID.into(),
        })?;

    for optional in [
        columns::CREATED_AT,
        columns::PLATFORM,
        columns::GOV,
        columns::RECEIVED_CHARGEBACK,
        columns::IS_FRAUDULENT_CHARGEBACK,
        columns::CHARGEBACK_COST,
        columns::RISK_SCORE,
        columns::FAIL_CHARGES_1D,
        columns::CX_UNIQUE_ADDRESSES,
    ] {
        if !raw.has_column(optional) {
            log::warn!("column {optional} missing; dependent views will be empty");
        }
    }

    let col = |name: &str| raw.column_index(name);
    let consumer_col = col(columns::CONSUMER_ID);
    let created_col = col(columns::CREATED_AT);
    let platform_col = col(columns::PLATFORM);
    let gov_col = col(columns::GOV);
    let cb_col = col(columns::RECEIVED_CHARGEBACK);
    let fraud_col = col(columns::IS_FRAUDULENT_CHARGEBACK);
    let cost_col = col(columns::CHARGEBACK_COST);
    let score_col = col(columns::RISK_SCORE);
    let failed_col = col(columns::FAIL_CHARGES_1D);
    let addr_col = col(columns::CX_UNIQUE_ADDRESSES);

    let cell = |row: usize, c: Option<usize>| c.and_then(|c| raw.cell(row, c));

    let records: Vec<DeliveryRecord> = (0..raw.len())
        .map(|row| DeliveryRecord {
            delivery_id: cell(row, Some(id_col)).map(str::to_string),
            consumer_id: cell(row, consumer_col).map(str::to_string),
            created_at: parse_timestamp(cell(row, created_col)),
            platform: cell(row, platform_col).map(str::to_string),
            gov_dollars: parse_number(cell(row, gov_col)).map(|v| v / MINOR_UNITS_PER_MAJOR),
            received_chargeback: to_flag(cell(row, cb_col)),
            fraudulent: to_flag(cell(row, fraud_col)),
            chargeback_cost: parse_number(cell(row, cost_col)),
            risk_score: parse_number(cell(row, score_col)),
            fail_charges_1d: parse_number(cell(row, failed_col)),
            unique_addresses: parse_number(cell(row, addr_col)),
        })
        .collect();

    let inconsistent = count_unbacked_fraud(&records);
    if inconsistent > 0 {
        log::warn!(
            "{inconsistent} rows flagged fraudulent without a chargeback; trusting labels as given"
        );
    }

    let numeric = numeric_columns(raw, &records);
    let columns: BTreeSet<String> = raw.headers.iter().filter(|h| !h.is_empty()).cloned().collect();

    log::debug!(
        "normalized {} records, {} numeric columns",
        records.len(),
        numeric.len()
    );

    Ok(DeliveryTable {
        columns,
        records,
        numeric,
    })
}

/// Count rows whose fraud flag is set without a chargeback flag.
pub fn label_inconsistencies(table: &DeliveryTable) -> usize {
    count_unbacked_fraud(&table.records)
}

fn count_unbacked_fraud(records: &[DeliveryRecord]) -> usize {
    records
        .iter()
        .filter(|r| r.fraudulent == 1 && r.received_chargeback == 0)
        .count()
}

fn numeric_columns(raw: &RawTable, records: &[DeliveryRecord]) -> Vec<NumericColumn> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut out = Vec::new();

    for (idx, name) in raw.headers.iter().enumerate() {
        if name.is_empty() || !seen.insert(name.as_str()) {
            continue;
        }
        let keep = if columns::is_declared_numeric(name) {
            true
        } else if columns::is_inference_candidate(name) {
            infer_numeric(raw, idx)
        } else {
            false
        };
        if keep {
            out.push(NumericColumn {
                name: name.clone(),
                values: (0..raw.len())
                    .map(|row| parse_number(raw.cell(row, idx)))
                    .collect(),
            });
        }
    }

    if raw.has_column(columns::CREATED_AT) {
        out.push(NumericColumn {
            name: columns::HOUR.into(),
            values: records.iter().map(|r| r.hour().map(f64::from)).collect(),
        });
        out.push(NumericColumn {
            name: columns::DOW.into(),
            values: records
                .iter()
                .map(|r| r.weekday().map(|d| f64::from(d.num_days_from_monday())))
                .collect(),
        });
    }
    if raw.has_column(columns::GOV) {
        out.push(NumericColumn {
            name: columns::GOV_DOLLARS.into(),
            values: records.iter().map(|r| r.gov_dollars).collect(),
        });
    }
    out
}

/// An undeclared column is numeric when it has at least one value and every
/// non-empty cell parses as a finite number.
fn infer_numeric(raw: &RawTable, idx: usize) -> bool {
    let mut any = false;
    for row in 0..raw.len() {
        if let Some(s) = raw.cell(row, idx) {
            if parse_number(Some(s)).is_none() {
                return false;
            }
            any = true;
        }
    }
    any
}
