//! Locating the physical card within the scan.
//!
//! The scanner background is dark and the card stock is light, so every edge
//! is a dark → light transition when walking inward from the image border.
//! Crossings are reported as boundary coordinates: pixel `i` covers
//! `[i, i + 1)`, so a card whose first light pixel is column 10 has its
//! left edge at `x = 10.0`.

use serde::{Deserialize, Serialize};

use crate::core::config::ReaderConfig;
use crate::core::error::{CardState, GeometryError, GeometryFault, Side};
use crate::core::fit::{LineModel, fit_robust};
use crate::core::pixels::{PixelGrid, quantile};

/// Left and right card edges, each `x = slope * y + intercept`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeModel {
    pub left: LineModel,
    pub right: LineModel,
    pub rows_sampled: usize,
    pub left_inliers: usize,
    pub right_inliers: usize,
}

impl EdgeModel {
    pub fn center(&self, y: f64) -> f64 {
        (self.left.at(y) + self.right.at(y)) * 0.5
    }

    pub fn width(&self, y: f64) -> f64 {
        self.right.at(y) - self.left.at(y)
    }

    /// Mean `dx/dy` of the two edges.
    pub fn skew(&self) -> f64 {
        (self.left.slope + self.right.slope) * 0.5
    }
}

/// The near (leading) edge of the card, `y = slope * x + intercept`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrontEdgeModel {
    pub line: LineModel,
    pub samples: usize,
}

impl FrontEdgeModel {
    pub fn y_at(&self, x: f64) -> f64 {
        self.line.at(x)
    }

    pub fn tilt(&self) -> f64 {
        self.line.slope
    }
}

/// Crossings found on one sampled image row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeSample {
    pub y: f64,
    pub left: Option<f64>,
    pub right: Option<f64>,
}

/// Finds the left and right card edges down through the image.
pub struct EdgeLocator<'a> {
    config: &'a ReaderConfig,
}

impl<'a> EdgeLocator<'a> {
    pub fn new(config: &'a ReaderConfig) -> Self {
        Self { config }
    }

    pub fn locate(&self, grid: &PixelGrid) -> Result<EdgeModel, GeometryError> {
        let samples = self.sample_rows(grid)?;
        self.fit(&samples, f64::from(grid.height()))
    }

    /// Walk inward from both margins on every sampled row.
    pub fn sample_rows(&self, grid: &PixelGrid) -> Result<Vec<EdgeSample>, GeometryError> {
        let scan = &self.config.edge_scan;
        let (width, height) = (grid.width(), grid.height());
        let first = scan.top_margin_px;
        let last = height.saturating_sub(scan.bottom_margin_px);
        if width < 4 * scan.min_run_px.max(1) || last <= first + scan.sample_step_px {
            return Err(GeometryError::new(
                CardState::EdgesFound,
                GeometryFault::ImageTooSmall { width, height },
            ));
        }

        let limit = (f64::from(width) * scan.max_inward_fraction) as usize;
        let mut samples = Vec::new();
        for y in (first..last).step_by(scan.sample_step_px as usize) {
            let row = grid.row(y);
            let threshold = self.row_threshold(row);
            let left = threshold
                .and_then(|thr| first_crossing(row.iter().copied(), limit, thr, scan.min_run_px));
            let right = threshold
                .and_then(|thr| {
                    first_crossing(row.iter().rev().copied(), limit, thr, scan.min_run_px)
                })
                .map(|d| f64::from(width) - d);
            samples.push(EdgeSample {
                y: f64::from(y) + 0.5,
                left,
                right,
            });
        }
        Ok(samples)
    }

    /// Fit both edges to `samples`; `height` bounds the range checked for crossing.
    pub fn fit(&self, samples: &[EdgeSample], height: f64) -> Result<EdgeModel, GeometryError> {
        let scan = &self.config.edge_scan;
        let required = ((samples.len() as f64 * scan.min_valid_fraction).ceil() as usize).max(2);

        let side_fit = |side: Side| {
            let points: Vec<(f64, f64)> = samples
                .iter()
                .filter_map(|s| match side {
                    Side::Left => s.left,
                    Side::Right => s.right,
                }
                .map(|x| (s.y, x)))
                .collect();
            let too_few = |found| {
                GeometryError::new(
                    CardState::EdgesFound,
                    GeometryFault::TooFewEdgeSamples {
                        side,
                        found,
                        required,
                    },
                )
            };
            if points.len() < required {
                return Err(too_few(points.len()));
            }
            let fit = fit_robust(&points, scan.outlier_sigma).ok_or_else(|| too_few(points.len()))?;
            if fit.inlier_count() < required {
                return Err(too_few(fit.inlier_count()));
            }
            Ok(fit)
        };

        let left = side_fit(Side::Left)?;
        let right = side_fit(Side::Right)?;
        for y in [0.0, height] {
            if left.line.at(y) >= right.line.at(y) {
                return Err(GeometryError::new(
                    CardState::EdgesFound,
                    GeometryFault::EdgesCross { y },
                ));
            }
        }

        let model = EdgeModel {
            left: left.line,
            right: right.line,
            rows_sampled: samples.len(),
            left_inliers: left.inlier_count(),
            right_inliers: right.inlier_count(),
        };
        log::debug!(
            "edges: left x={:.4}*y+{:.2} ({} inliers, rms {:.2}), right x={:.4}*y+{:.2} ({} inliers, rms {:.2})",
            model.left.slope,
            model.left.intercept,
            model.left_inliers,
            left.rms,
            model.right.slope,
            model.right.intercept,
            model.right_inliers,
            right.rms
        );
        Ok(model)
    }

    fn row_threshold(&self, row: &[u8]) -> Option<f32> {
        crossing_threshold(row, self.config.scan_thresholds.edge_min_contrast)
    }
}

/// Finds the leading edge of the card near the bottom of the image.
pub struct FrontEdgeLocator<'a> {
    config: &'a ReaderConfig,
}

impl<'a> FrontEdgeLocator<'a> {
    pub fn new(config: &'a ReaderConfig) -> Self {
        Self { config }
    }

    /// Scan upward from the bottom border across a strip around the card centre.
    pub fn locate(&self, grid: &PixelGrid, edges: &EdgeModel) -> Result<FrontEdgeModel, GeometryError> {
        let scan = &self.config.edge_scan;
        let (width, height) = (grid.width(), grid.height());
        let depth = scan.front_search_px.min(height);
        let y_mid = f64::from(height) - f64::from(depth) * 0.5;
        let center = edges.center(y_mid);
        let span = edges.width(y_mid) * scan.front_strip_fraction;
        let n = scan.front_strip_samples as usize;

        let mut points = Vec::with_capacity(n);
        for i in 0..n {
            let x = center + span * (i as f64 / (n - 1) as f64 - 0.5);
            if x < 0.0 || x >= f64::from(width) {
                continue;
            }
            let px = x.floor() as u32;
            let mut profile = grid.column(px, height - depth, height);
            profile.reverse();
            let Some(threshold) = crossing_threshold(&profile, self.config.scan_thresholds.edge_min_contrast)
            else {
                continue;
            };
            if let Some(d) = first_crossing(profile.iter().copied(), profile.len(), threshold, scan.min_run_px) {
                points.push((f64::from(px) + 0.5, f64::from(height) - d));
            }
        }

        let required = ((n as f64 * scan.min_valid_fraction).ceil() as usize).max(2);
        let no_edge = |found| {
            GeometryError::new(
                CardState::FrontEdgeFound,
                GeometryFault::NoFrontEdge { found, required },
            )
        };
        if points.len() < required {
            return Err(no_edge(points.len()));
        }
        let fit = fit_robust(&points, scan.outlier_sigma).ok_or_else(|| no_edge(points.len()))?;
        if fit.inlier_count() < required {
            return Err(no_edge(fit.inlier_count()));
        }
        let model = FrontEdgeModel {
            line: fit.line,
            samples: fit.inlier_count(),
        };
        log::debug!(
            "front edge: y={:.2} at x={:.1}, tilt {:.4} ({} samples)",
            model.y_at(center),
            center,
            model.tilt(),
            model.samples
        );
        Ok(model)
    }
}

/// Midpoint between background and card-stock level of a profile.
///
/// Holes show the background through the card, so the lowest percentile is
/// background even when the margin itself is only a few pixels wide; the
/// upper quartile is card stock as long as holes and print stay a minority.
fn crossing_threshold(profile: &[u8], min_contrast: f32) -> Option<f32> {
    let background = f32::from(quantile(profile, 0.01)?);
    let stock = f32::from(quantile(profile, 0.75)?);
    if stock - background < min_contrast {
        return None;
    }
    Some((background + stock) * 0.5)
}

/// Distance from the outer border of the first pixel to the first
/// dark → light crossing that stays light for `min_run` pixels.
///
/// The walk must start on background, and the crossing must lie within
/// `limit` pixels. The position is interpolated linearly between the last
/// dark and the first light pixel centre.
fn first_crossing(
    profile: impl Iterator<Item = u8>,
    limit: usize,
    threshold: f32,
    min_run: u32,
) -> Option<f64> {
    let values: Vec<f32> = profile.take(limit + min_run as usize).map(f32::from).collect();
    if values.first().is_none_or(|&v| v >= threshold) {
        return None;
    }
    let run = min_run.max(1) as usize;
    (1..values.len().min(limit + 1))
        .find(|&k| {
            values[k - 1] < threshold
                && values[k..].len() >= run
                && values[k..k + run].iter().all(|&v| v >= threshold)
        })
        .map(|k| {
            let (dark, light) = (values[k - 1], values[k]);
            let frac = f64::from((threshold - dark) / (light - dark));
            (k - 1) as f64 + 0.5 + frac
        })
}
