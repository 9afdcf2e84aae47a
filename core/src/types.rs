//! Shared primitive types used across the aggregation pipeline.

/// A share of deliveries in [0.0, 1.0].
pub type Rate = f64;

/// Order value in major currency units (dollars).
pub type Dollars = f64;

/// Name of a column as it appears in the source file header.
pub type ColumnName = String;

/// Ratio with the zero-denominator case pinned to 0.0.
///
/// Never returns NaN or infinity, whatever the inputs.
pub fn safe_div(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 || !denominator.is_finite() || !numerator.is_finite() {
        return 0.0;
    }
    let ratio = numerator / denominator;
    if ratio.is_finite() {
        ratio
    } else {
        0.0
    }
}

/// Count ratio used by every grouped rate table.
pub fn rate(positives: u64, total: u64) -> Rate {
    if total == 0 {
        0.0
    } else {
        positives as f64 / total as f64
    }
}

/// Arithmetic mean over present values; `None` when nothing is present.
pub fn mean_present<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let (sum, n) = values
        .into_iter()
        .flatten()
        .fold((0.0f64, 0u64), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        None
    } else {
        Some(sum / n as f64)
    }
}
