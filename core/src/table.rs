//! The normalized, typed delivery table.
//!
//! Built once by the normalizer and never mutated afterwards.

use crate::types::{ColumnName, Dollars};
use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One delivery, with the fields the aggregator reads directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryRecord {
    pub delivery_id: Option<String>,
    pub consumer_id: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    pub platform: Option<String>,
    /// Order value in major units; `None` when missing or unparseable.
    pub gov_dollars: Option<Dollars>,
    pub received_chargeback: u8,
    pub fraudulent: u8,
    pub chargeback_cost: Option<f64>,
    pub risk_score: Option<f64>,
    pub fail_charges_1d: Option<f64>,
    pub unique_addresses: Option<f64>,
}

impl DeliveryRecord {
    pub fn date(&self) -> Option<NaiveDate> {
        self.created_at.map(|ts| ts.date())
    }

    pub fn hour(&self) -> Option<u32> {
        self.created_at.map(|ts| ts.hour())
    }

    pub fn weekday(&self) -> Option<Weekday> {
        self.created_at.map(|ts| ts.weekday())
    }

    pub fn is_fraud(&self) -> bool {
        self.fraudulent == 1
    }
}

/// A numeric column kept for the predictor ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericColumn {
    pub name: ColumnName,
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeliveryTable {
    /// Source columns found in the header.
    pub columns: BTreeSet<ColumnName>,
    pub records: Vec<DeliveryRecord>,
    /// Every numeric column, source order first, then derived ones.
    /// Label columns are never stored here.
    pub numeric: Vec<NumericColumn>,
}

impl DeliveryTable {
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains(name)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn numeric_column(&self, name: &str) -> Option<&NumericColumn> {
        self.numeric.iter().find(|c| c.name == name)
    }

    /// The fraud label as a 0/1 vector aligned with `records`.
    pub fn fraud_flags(&self) -> Vec<f64> {
        self.records.iter().map(|r| f64::from(r.fraudulent)).collect()
    }
}
