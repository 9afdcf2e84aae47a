//! Equal-population order-value buckets.
//!
//! Boundaries are the 0..=k quantiles of the observed order values, computed
//! once over the full table. Duplicate boundaries collapse, so a column with
//! few distinct values yields fewer than k buckets and a constant column
//! yields exactly one.

use crate::{config::MAX_DECILE_COUNT, types::Dollars};
use serde::{Deserialize, Serialize};

/// One order-value range. The first bucket is closed on both ends,
/// every later one is `(lower, upper]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GovBucket {
    pub index: usize,
    pub lower: Dollars,
    pub upper: Dollars,
    pub lower_inclusive: bool,
}

impl GovBucket {
    pub fn contains(&self, value: Dollars) -> bool {
        let above = if self.lower_inclusive {
            value >= self.lower
        } else {
            value > self.lower
        };
        above && value <= self.upper
    }

    /// Display label, formatted at the presentation boundary only.
    pub fn label(&self) -> String {
        let open = if self.lower_inclusive { '[' } else { '(' };
        format!("{open}{:.2}, {:.2}]", self.lower, self.upper)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GovBucketing {
    pub buckets: Vec<GovBucket>,
}

impl GovBucketing {
    /// Build buckets from the present order values. Empty input, no buckets.
    pub fn from_values(values: &[Dollars], bucket_count: usize) -> Self {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() {
            return Self::default();
        }
        sorted.sort_by(f64::total_cmp);

        let k = bucket_count.clamp(1, MAX_DECILE_COUNT);
        let mut edges: Vec<f64> = Vec::with_capacity(k + 1);
        for i in 0..=k {
            let edge = quantile_sorted(&sorted, i as f64 / k as f64);
            if edges.last().map_or(true, |last| edge > *last) {
                edges.push(edge);
            }
        }

        let buckets = if edges.len() == 1 {
            vec![GovBucket {
                index: 0,
                lower: edges[0],
                upper: edges[0],
                lower_inclusive: true,
            }]
        } else {
            edges
                .windows(2)
                .enumerate()
                .map(|(index, w)| GovBucket {
                    index,
                    lower: w[0],
                    upper: w[1],
                    lower_inclusive: index == 0,
                })
                .collect()
        };
        Self { buckets }
    }

    /// Bucket index for a value, `None` outside the observed range.
    pub fn assign(&self, value: Dollars) -> Option<usize> {
        self.buckets.iter().position(|b| b.contains(value))
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

/// Linear-interpolation quantile over an ascending slice.
fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let pos = q.clamp(0.0, 1.0) * (n - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        return sorted[lo];
    }
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantile_interpolates_between_ranks() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile_sorted(&xs, 0.0), 1.0);
        assert_eq!(quantile_sorted(&xs, 1.0), 4.0);
        assert!((quantile_sorted(&xs, 0.5) - 2.5).abs() < 1e-12);
    }

    #[test]
    fn ten_distinct_values_give_ten_buckets() {
        let values: Vec<f64> = (1..=10).map(f64::from).collect();
        let b = GovBucketing::from_values(&values, 10);
        assert_eq!(b.len(), 10, "11 distinct edges give 10 buckets");
        for v in &values {
            assert!(b.assign(*v).is_some(), "value {v} must land in a bucket");
        }
    }

    #[test]
    fn duplicate_edges_collapse() {
        let values = [5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 9.0];
        let b = GovBucketing::from_values(&values, 10);
        assert!(b.len() < 10, "repeated 5.0 edges must merge, got {}", b.len());
        assert_eq!(b.assign(5.0), Some(0));
        assert!(b.assign(9.0).is_some());
        assert_eq!(b.assign(4.0), None);
    }

    #[test]
    fn first_label_is_closed() {
        let b = GovBucketing::from_values(&[1.0, 2.0, 3.0], 2);
        assert_eq!(b.buckets[0].label(), "[1.00, 2.00]");
        assert_eq!(b.buckets[1].label(), "(2.00, 3.00]");
    }
}
