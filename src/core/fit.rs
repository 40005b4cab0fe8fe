//! Outlier-resistant straight line fitting.
//!
//! Edge samples are spoiled by exactly the things a card reader has to live
//! with: torn corners, print touching the edge, dust in the scanner. The fit
//! starts from a Theil–Sen estimate (median of pairwise slopes), rejects
//! samples whose residual exceeds `sigma` robust standard deviations, and
//! refines the survivors with least squares.

use serde::{Deserialize, Serialize};

/// `value = slope * t + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineModel {
    pub slope: f64,
    pub intercept: f64,
}

impl LineModel {
    pub fn new(slope: f64, intercept: f64) -> Self {
        Self { slope, intercept }
    }

    pub fn at(&self, t: f64) -> f64 {
        self.slope * t + self.intercept
    }
}

/// Result of [`fit_robust`].
#[derive(Debug, Clone, PartialEq)]
pub struct RobustFit {
    pub line: LineModel,
    /// Mask over the input samples; `false` marks rejected outliers.
    pub inliers: Vec<bool>,
    /// RMS residual of the inliers.
    pub rms: f64,
}

impl RobustFit {
    pub fn inlier_count(&self) -> usize {
        self.inliers.iter().filter(|&&keep| keep).count()
    }
}

/// Residuals below this are treated as noise-free, so a perfect synthetic
/// edge cannot collapse the robust scale to zero.
const MIN_SCALE: f64 = 0.5;
const REFINE_ROUNDS: usize = 3;

/// Fit `(t, value)` samples. Needs at least two samples with distinct `t`.
pub fn fit_robust(samples: &[(f64, f64)], sigma: f64) -> Option<RobustFit> {
    let mut line = theil_sen(samples)?;
    let mut inliers = vec![true; samples.len()];

    for _ in 0..REFINE_ROUNDS {
        let residuals: Vec<f64> = samples.iter().map(|&(t, v)| v - line.at(t)).collect();
        let scale = (1.4826 * median(residuals.iter().map(|r| r.abs()).collect())?).max(MIN_SCALE);
        let cutoff = sigma * scale;
        let next: Vec<bool> = residuals.iter().map(|r| r.abs() <= cutoff).collect();
        let kept: Vec<(f64, f64)> = samples
            .iter()
            .zip(&next)
            .filter(|(_, keep)| **keep)
            .map(|(s, _)| *s)
            .collect();
        let Some(refined) = least_squares(&kept) else {
            break;
        };
        let settled = next == inliers;
        line = refined;
        inliers = next;
        if settled {
            break;
        }
    }

    let (sum_sq, n) = samples
        .iter()
        .zip(&inliers)
        .filter(|(_, keep)| **keep)
        .fold((0.0, 0usize), |(acc, n), (&(t, v), _)| {
            let r = v - line.at(t);
            (acc + r * r, n + 1)
        });
    let rms = if n > 0 { (sum_sq / n as f64).sqrt() } else { 0.0 };
    Some(RobustFit { line, inliers, rms })
}

/// Median of pairwise slopes, intercept as median of `v - slope * t`.
pub fn theil_sen(samples: &[(f64, f64)]) -> Option<LineModel> {
    let mut slopes = Vec::with_capacity(samples.len() * samples.len() / 2);
    for (i, &(t0, v0)) in samples.iter().enumerate() {
        for &(t1, v1) in &samples[i + 1..] {
            let dt = t1 - t0;
            if dt.abs() > f64::EPSILON {
                slopes.push((v1 - v0) / dt);
            }
        }
    }
    let slope = median(slopes)?;
    let intercept = median(samples.iter().map(|&(t, v)| v - slope * t).collect())?;
    Some(LineModel::new(slope, intercept))
}

/// Ordinary least squares; `None` when all `t` coincide.
pub fn least_squares(samples: &[(f64, f64)]) -> Option<LineModel> {
    if samples.len() < 2 {
        return None;
    }
    let n = samples.len() as f64;
    let mean_t = samples.iter().map(|s| s.0).sum::<f64>() / n;
    let mean_v = samples.iter().map(|s| s.1).sum::<f64>() / n;
    let (mut stt, mut stv) = (0.0, 0.0);
    for &(t, v) in samples {
        stt += (t - mean_t) * (t - mean_t);
        stv += (t - mean_t) * (v - mean_v);
    }
    if stt <= f64::EPSILON {
        return None;
    }
    let slope = stv / stt;
    Some(LineModel::new(slope, mean_v - slope * mean_t))
}

pub(crate) fn median(mut values: Vec<f64>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        Some(values[mid])
    } else {
        Some((values[mid - 1] + values[mid]) / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn line_samples(slope: f64, intercept: f64, n: usize) -> Vec<(f64, f64)> {
        (0..n)
            .map(|i| {
                let t = 100.0 + 20.0 * i as f64;
                (t, slope * t + intercept)
            })
            .collect()
    }

    #[test]
    fn exact_line_is_recovered() {
        let samples = line_samples(0.02, 10.0, 40);
        let fit = fit_robust(&samples, 3.0).unwrap();
        assert_abs_diff_eq!(fit.line.slope, 0.02, epsilon = 1e-9);
        assert_abs_diff_eq!(fit.line.intercept, 10.0, epsilon = 1e-6);
        assert_eq!(fit.inlier_count(), 40);
    }

    #[test]
    fn gross_outliers_are_rejected() {
        let mut samples = line_samples(-0.01, 580.0, 40);
        for idx in [3, 7, 11, 19, 23, 31, 37] {
            samples[idx].1 += if idx % 2 == 0 { 45.0 } else { -60.0 };
        }
        let fit = fit_robust(&samples, 3.0).unwrap();
        assert_abs_diff_eq!(fit.line.slope, -0.01, epsilon = 1e-6);
        assert_abs_diff_eq!(fit.line.intercept, 580.0, epsilon = 1e-3);
        assert_eq!(fit.inlier_count(), 33);
        assert!(!fit.inliers[3]);
    }

    #[test]
    fn least_squares_is_swayed_where_robust_fit_is_not() {
        let mut samples = line_samples(0.0, 50.0, 20);
        samples[0].1 = 150.0;
        let ols = least_squares(&samples).unwrap();
        let robust = fit_robust(&samples, 3.0).unwrap();
        assert!((ols.at(100.0) - 50.0).abs() > 5.0);
        assert_abs_diff_eq!(robust.line.at(100.0), 50.0, epsilon = 1e-9);
    }

    #[test]
    fn degenerate_inputs_yield_none() {
        assert!(fit_robust(&[(1.0, 2.0)], 3.0).is_none());
        assert!(fit_robust(&[(1.0, 2.0), (1.0, 3.0)], 3.0).is_none());
        assert!(least_squares(&[]).is_none());
    }
}
