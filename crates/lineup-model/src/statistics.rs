//! Box-plot statistics over embedded numeric samples.
//!
//! Quantiles use linear interpolation between closest ranks: for a sorted
//! sample `x` of length `n`, the `p`-quantile is read at rank `(n - 1) * p`
//! and interpolated between its neighbours. NaN entries are ignored by the
//! order statistics but still take part in the outlier scan, where they never
//! compare as outliers.

use serde::{Deserialize, Serialize};

/// Multiplier applied to the interquartile range for outlier fences.
pub const DEFAULT_OUTLIER_FENCE: f64 = 1.5;

/// Five-number digest of one row's sample plus its outliers.
///
/// A field is NaN when the sample held no numeric value to derive it from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxPlotSummary {
    pub min: f64,
    pub max: f64,
    pub median: f64,
    pub q1: f64,
    pub q3: f64,
    pub outliers: Vec<f64>,
}

/// The scalar box-plot fields merged into a row's event map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxPlotKey {
    Min,
    Q1,
    Median,
    Q3,
    Max,
}

impl BoxPlotKey {
    pub const ALL: [BoxPlotKey; 5] = [
        BoxPlotKey::Min,
        BoxPlotKey::Q1,
        BoxPlotKey::Median,
        BoxPlotKey::Q3,
        BoxPlotKey::Max,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BoxPlotKey::Min => "min",
            BoxPlotKey::Q1 => "q1",
            BoxPlotKey::Median => "median",
            BoxPlotKey::Q3 => "q3",
            BoxPlotKey::Max => "max",
        }
    }
}

impl BoxPlotSummary {
    /// Summarize `sample` with outlier fences at `fence` times the IQR.
    pub fn from_sample(sample: &[f64], fence: f64) -> Self {
        let sorted = sorted_numeric(sample);

        let q1 = quantile_sorted(&sorted, 0.25).unwrap_or(f64::NAN);
        let median = quantile_sorted(&sorted, 0.5).unwrap_or(f64::NAN);
        let q3 = quantile_sorted(&sorted, 0.75).unwrap_or(f64::NAN);
        let iqr = q3 - q1;

        let lower_bound = q1 - fence * iqr;
        let upper_bound = q3 + fence * iqr;

        let outliers = sample
            .iter()
            .copied()
            .filter(|v| *v < lower_bound || *v > upper_bound)
            .collect();

        Self {
            min: sorted.first().copied().unwrap_or(f64::NAN),
            max: sorted.last().copied().unwrap_or(f64::NAN),
            median,
            q1,
            q3,
            outliers,
        }
    }

    pub fn get(&self, key: BoxPlotKey) -> f64 {
        match key {
            BoxPlotKey::Min => self.min,
            BoxPlotKey::Q1 => self.q1,
            BoxPlotKey::Median => self.median,
            BoxPlotKey::Q3 => self.q3,
            BoxPlotKey::Max => self.max,
        }
    }

    /// Interquartile range, `q3 - q1`.
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }
}

/// Linear-interpolation quantile of an unsorted sample.
///
/// Returns `None` when the sample holds no numeric value.
pub fn quantile(sample: &[f64], p: f64) -> Option<f64> {
    quantile_sorted(&sorted_numeric(sample), p)
}

fn sorted_numeric(sample: &[f64]) -> Vec<f64> {
    let mut sorted: Vec<f64> = sample.iter().copied().filter(|v| !v.is_nan()).collect();
    sorted.sort_by(f64::total_cmp);
    sorted
}

fn quantile_sorted(sorted: &[f64], p: f64) -> Option<f64> {
    let (first, last) = (*sorted.first()?, *sorted.last()?);
    if p <= 0.0 || sorted.len() < 2 {
        return Some(first);
    }
    if p >= 1.0 {
        return Some(last);
    }

    let rank = (sorted.len() - 1) as f64 * p;
    let lo = rank.floor() as usize;
    let lower = sorted[lo];
    let upper = sorted[(lo + 1).min(sorted.len() - 1)];
    Some(lower + (upper - lower) * (rank - lo as f64))
}
