//! Summaries over fetched series: correlation between two parameters and the
//! direction a single series is heading.

use serde::Serialize;

/// Slope (units per sample) below which a series counts as flat.
pub const DEFAULT_TREND_TOLERANCE: f64 = 0.05;

/// Pearson correlation coefficient in `[-1, 1]`.
///
/// Mismatched, empty or zero-variance input yields `0.0`.
pub fn pearson_correlation(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || x.is_empty() {
        return 0.0;
    }

    let n = x.len() as f64;

    let sum_x: f64 = x.iter().sum();
    let sum_y: f64 = y.iter().sum();
    let sum_xy: f64 = x.iter().zip(y.iter()).map(|(a, b)| a * b).sum();
    let sum_x2: f64 = x.iter().map(|a| a * a).sum();
    let sum_y2: f64 = y.iter().map(|b| b * b).sum();

    let numerator = n * sum_xy - sum_x * sum_y;
    let denominator = ((n * sum_x2 - sum_x.powi(2)) * (n * sum_y2 - sum_y.powi(2))).sqrt();

    if denominator == 0.0 || denominator.is_nan() {
        0.0
    } else {
        numerator / denominator
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationStrength {
    Strong,
    Moderate,
    Weak,
    Negligible,
}

impl CorrelationStrength {
    pub fn from_coefficient(r: f64) -> Self {
        let abs_r = r.abs();
        if abs_r > 0.7 {
            Self::Strong
        } else if abs_r > 0.5 {
            Self::Moderate
        } else if abs_r > 0.3 {
            Self::Weak
        } else {
            Self::Negligible
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strong => "strong",
            Self::Moderate => "moderate",
            Self::Weak => "weak",
            Self::Negligible => "negligible",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Correlation {
    /// Rounded to two decimals.
    pub coefficient: f64,
    pub strength: CorrelationStrength,
    pub sample_size: usize,
}

impl Correlation {
    /// Correlates two aligned series, skipping indices where either has a gap.
    pub fn between(a: &[Option<f64>], b: &[Option<f64>]) -> Self {
        let (xs, ys): (Vec<f64>, Vec<f64>) = a
            .iter()
            .zip(b.iter())
            .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
            .unzip();

        let r = pearson_correlation(&xs, &ys);

        Self {
            coefficient: (r * 100.0).round() / 100.0,
            strength: CorrelationStrength::from_coefficient(r),
            sample_size: xs.len(),
        }
    }

    pub fn direction(&self) -> &'static str {
        if self.coefficient >= 0.0 { "positive" } else { "negative" }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Rising,
    Falling,
    Stable,
}

impl Trend {
    pub fn from_slope(slope: f64, tolerance: f64) -> Self {
        if slope > tolerance {
            Trend::Rising
        } else if slope < -tolerance {
            Trend::Falling
        } else {
            Trend::Stable
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            Trend::Rising => "↑",
            Trend::Falling => "↓",
            Trend::Stable => "→",
        }
    }
}

/// Least-squares slope over sample index; gaps are skipped but keep their position.
pub fn slope(values: &[Option<f64>]) -> Option<f64> {
    let points: Vec<(f64, f64)> = values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|v| (i as f64, v)))
        .collect();

    if points.len() < 2 {
        return None;
    }

    let n = points.len() as f64;
    let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / n;

    let num: f64 = points.iter().map(|(x, y)| (x - mean_x) * (y - mean_y)).sum();
    let den: f64 = points.iter().map(|(x, _)| (x - mean_x).powi(2)).sum();

    (den != 0.0).then(|| num / den)
}

pub fn trend(values: &[Option<f64>], tolerance: f64) -> Trend {
    slope(values).map_or(Trend::Stable, |s| Trend::from_slope(s, tolerance))
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesSummary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub total: f64,
    pub count: usize,
}

impl SeriesSummary {
    /// `None` when the series holds no values.
    pub fn of(values: &[Option<f64>]) -> Option<Self> {
        let present: Vec<f64> = values.iter().flatten().copied().collect();
        if present.is_empty() {
            return None;
        }

        let total: f64 = present.iter().sum();
        let min = present.iter().copied().fold(f64::INFINITY, f64::min);
        let max = present.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Some(Self { min, max, mean: total / present.len() as f64, total, count: present.len() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pearson_perfect_positive_and_negative() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let up = [2.0, 4.0, 6.0, 8.0, 10.0];
        let down = [10.0, 8.0, 6.0, 4.0, 2.0];

        assert!((pearson_correlation(&x, &up) - 1.0).abs() < 0.001);
        assert!((pearson_correlation(&x, &down) + 1.0).abs() < 0.001);
    }

    #[test]
    fn pearson_degenerate_inputs() {
        assert_eq!(pearson_correlation(&[], &[]), 0.0);
        assert_eq!(pearson_correlation(&[1.0, 2.0], &[1.0]), 0.0);
        assert_eq!(pearson_correlation(&[3.0, 3.0, 3.0], &[1.0, 2.0, 3.0]), 0.0);
    }

    #[test]
    fn strength_thresholds() {
        assert_eq!(CorrelationStrength::from_coefficient(0.9), CorrelationStrength::Strong);
        assert_eq!(CorrelationStrength::from_coefficient(-0.6), CorrelationStrength::Moderate);
        assert_eq!(CorrelationStrength::from_coefficient(0.4), CorrelationStrength::Weak);
        assert_eq!(CorrelationStrength::from_coefficient(0.1), CorrelationStrength::Negligible);
    }

    #[test]
    fn correlation_skips_gaps() {
        let temp = [Some(5.0), Some(6.0), None, Some(8.0)];
        let feels = [Some(3.0), Some(4.0), Some(9.0), Some(6.0)];

        let c = Correlation::between(&temp, &feels);
        assert_eq!(c.sample_size, 3);
        assert_eq!(c.coefficient, 1.0);
        assert_eq!(c.direction(), "positive");
    }

    #[test]
    fn trend_direction() {
        let warming = [Some(1.0), Some(2.0), Some(3.0), Some(4.0)];
        let cooling = [Some(4.0), None, Some(2.0), Some(1.0)];
        let flat = [Some(2.0), Some(2.01), Some(2.0)];

        assert_eq!(trend(&warming, DEFAULT_TREND_TOLERANCE), Trend::Rising);
        assert_eq!(trend(&cooling, DEFAULT_TREND_TOLERANCE), Trend::Falling);
        assert_eq!(trend(&flat, DEFAULT_TREND_TOLERANCE), Trend::Stable);
        assert_eq!(trend(&[Some(1.0)], DEFAULT_TREND_TOLERANCE), Trend::Stable);
    }

    #[test]
    fn summary_ignores_gaps() {
        let s = SeriesSummary::of(&[Some(0.0), None, Some(5.0), Some(10.0)]).unwrap();
        assert_eq!(s.count, 3);
        assert_eq!(s.min, 0.0);
        assert_eq!(s.max, 10.0);
        assert_eq!(s.total, 15.0);
        assert_eq!(s.mean, 5.0);

        assert!(SeriesSummary::of(&[None, None]).is_none());
    }
}
