//! The dashboard pipeline: run once at startup.
//!
//! STAGE ORDER (fixed):
//!   1. Loader       (CSV -> raw text table)
//!   2. Normalizer   (raw -> typed delivery table)
//!   3. Aggregator   (table -> KPIs, series, segments, matrix, ranking)
//!   4. Insights     (aggregates -> bullets)
//!
//! RULES:
//!   - Data flows one way; nothing is mutated after `build` returns.
//!   - Any stage error before aggregation is fatal to startup.

use crate::{
    aggregate::{aggregate, Aggregates},
    config::{AnalysisConfig, DashboardConfig},
    error::DashResult,
    insights::{derive, Insights},
    loader::{load_csv, RawTable},
    normalizer::normalize,
};
use serde::Serialize;

/// Everything the presentation layer reads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub aggregates: Aggregates,
    pub insights: Insights,
}

impl Dashboard {
    /// Load the configured data file and compute every derived view.
    pub fn build(config: &DashboardConfig) -> DashResult<Self> {
        let raw = load_csv(&config.data_file)?;
        Self::from_raw(&raw, &config.analysis)
    }

    /// Compute from an already-loaded table.
    pub fn from_raw(raw: &RawTable, analysis: &AnalysisConfig) -> DashResult<Self> {
        let table = normalize(raw)?;
        let aggregates = aggregate(&table, analysis);
        let insights = derive(&aggregates, analysis);
        Ok(Self {
            aggregates,
            insights,
        })
    }

    /// `Data range: Jan 01, 2024 – Jan 07, 2024`, or a dash with no dates.
    pub fn date_range_note(&self) -> String {
        match self.aggregates.date_range {
            Some(r) => format!(
                "Data range: {} – {}",
                crate::format::date(r.first),
                crate::format::date(r.last)
            ),
            None => "Data range: —".to_string(),
        }
    }
}
