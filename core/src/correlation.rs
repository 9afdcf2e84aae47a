//! Univariate predictor ranking against the fraud label.
//!
//! RULE: Label columns never enter the ranking, and a column is never
//! correlated with itself.

use crate::{columns, table::DeliveryTable};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictorScore {
    pub column: String,
    pub correlation: f64,
    /// Rows where both the column and the label were present.
    pub observations: usize,
}

/// Pearson correlation over pairwise-complete observations.
/// `None` with fewer than two pairs or zero variance on either side.
pub fn pearson<I>(pairs: I) -> Option<(f64, usize)>
where
    I: IntoIterator<Item = (f64, f64)>,
{
    let pairs: Vec<(f64, f64)> = pairs.into_iter().collect();
    let n = pairs.len();
    if n < 2 {
        return None;
    }
    let nf = n as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / nf;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / nf;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx <= 0.0 || syy <= 0.0 {
        return None;
    }
    let r = sxy / (sxx.sqrt() * syy.sqrt());
    r.is_finite().then(|| (r.clamp(-1.0, 1.0), n))
}

/// Rank every numeric column by |r| against the fraud flag, descending.
/// Ties keep column order (stable sort).
pub fn rank_predictors(table: &DeliveryTable, top: usize) -> Vec<PredictorScore> {
    let label = table.fraud_flags();
    let mut scores: Vec<PredictorScore> = table
        .numeric
        .iter()
        .filter(|c| !columns::is_label(&c.name))
        .filter_map(|c| {
            let pairs = c
                .values
                .iter()
                .zip(&label)
                .filter_map(|(x, y)| x.map(|x| (x, *y)));
            pearson(pairs).map(|(correlation, observations)| PredictorScore {
                column: c.name.clone(),
                correlation,
                observations,
            })
        })
        .collect();

    scores.sort_by(|a, b| b.correlation.abs().total_cmp(&a.correlation.abs()));
    scores.truncate(top);
    log::debug!("ranked {} predictors", scores.len());
    scores
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_positive_and_negative() {
        let (r, n) = pearson([(1.0, 2.0), (2.0, 4.0), (3.0, 6.0)]).unwrap();
        assert!((r - 1.0).abs() < 1e-12);
        assert_eq!(n, 3);
        let (r, _) = pearson([(1.0, 3.0), (2.0, 2.0), (3.0, 1.0)]).unwrap();
        assert!((r + 1.0).abs() < 1e-12);
    }

    #[test]
    fn undefined_cases_are_none() {
        assert!(pearson([(1.0, 1.0)]).is_none());
        assert!(pearson([(1.0, 0.0), (1.0, 1.0)]).is_none());
        assert!(pearson(Vec::<(f64, f64)>::new()).is_none());
    }
}
