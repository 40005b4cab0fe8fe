//! Reading the 80 × 12 hole matrix.
//!
//! Worn punches and residual skew move the true hole centres smoothly away
//! from the linear card model. Each hole is hunted for within a few pixels of
//! its prediction, and the deviations seen in one column bias the predictions
//! for the next through a small [`DriftOffset`] state carried from column to
//! column.

use serde::{Deserialize, Serialize};

use crate::core::binarize::Binarizer;
use crate::core::config::{ReaderConfig, RowOrder, SearchRadius};
use crate::core::encoding::{Hollerith, ROW_LABELS};
use crate::core::geometry::{COLUMNS, CardGeometry, Point, ROWS};
use crate::core::pixels::PixelGrid;

/// Running correction between predicted and observed hole centres, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DriftOffset {
    pub dx: f64,
    pub dy: f64,
}

impl DriftOffset {
    pub fn as_point(self) -> Point {
        Point::new(self.dx, self.dy)
    }

    /// Fold a column's mean deviation in: a `gain` fraction of it, at most
    /// `limit` per axis, never beyond `max` in total.
    pub fn update(self, deviation: Point, gain: f64, limit: f64, max: f64) -> Self {
        let step = |d: f64| (d * gain).clamp(-limit, limit);
        Self {
            dx: (self.dx + step(deviation.x)).clamp(-max, max),
            dy: (self.dy + step(deviation.y)).clamp(-max, max),
        }
    }
}

/// The twelve bits of one column, in punch order (row 12 first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ColumnBits(pub [bool; ROWS]);

impl ColumnBits {
    pub fn hollerith(&self) -> Hollerith {
        Hollerith::from_bits(&self.0)
    }
}

impl From<Hollerith> for ColumnBits {
    fn from(code: Hollerith) -> Self {
        ColumnBits(code.bits())
    }
}

/// What was seen at one hole position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HoleObservation {
    pub column: usize,
    /// Position from the left of the image, 0..12.
    pub image_row: usize,
    /// Punch row label: 12, 11 or 0..9.
    pub row: u8,
    /// Geometric prediction including drift.
    pub predicted: Point,
    /// Refined centre; equals the best probe position for empty holes.
    pub measured: Point,
    /// Mean intensity of the darkest probe box.
    pub intensity: f32,
    pub background: f32,
    pub contrast: f32,
    pub punched: bool,
    pub confidence: f32,
}

/// One fully read column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnReading {
    pub column: usize,
    pub holes: Vec<HoleObservation>,
    pub bits: ColumnBits,
    /// Drift state after this column was folded in.
    pub drift: DriftOffset,
}

/// Reads columns in physical order, carrying drift between them.
pub struct HoleReader<'a> {
    grid: &'a PixelGrid,
    geometry: &'a CardGeometry,
    config: &'a ReaderConfig,
    binarizer: Binarizer,
    probe_half: (u32, u32),
    radius: SearchRadius,
    row_order: RowOrder,
}

impl<'a> HoleReader<'a> {
    pub fn new(grid: &'a PixelGrid, geometry: &'a CardGeometry, config: &'a ReaderConfig) -> Self {
        Self {
            grid,
            geometry,
            config,
            binarizer: Binarizer::new(&config.scan_thresholds),
            probe_half: config.probe_half(),
            radius: config.contrast_search_radius,
            row_order: config.row_order,
        }
    }

    /// Read all 80 columns, front edge first.
    pub fn read_all(&self) -> Vec<ColumnReading> {
        let mut drift = DriftOffset::default();
        let mut columns = Vec::with_capacity(COLUMNS);
        for column in 0..COLUMNS {
            let reading = self.read_column(column, drift);
            drift = reading.drift;
            columns.push(reading);
        }
        columns
    }

    /// Read one column starting from `drift`; the returned reading carries
    /// the drift to use for the next column.
    pub fn read_column(&self, column: usize, drift: DriftOffset) -> ColumnReading {
        let mut holes = Vec::with_capacity(ROWS);
        let mut bits = [false; ROWS];
        let mut deviation = Point::default();
        let mut found = 0usize;

        for image_row in 0..ROWS {
            let predicted = self.geometry.hole(column, image_row) + drift.as_point();
            let hole = self.observe(column, image_row, predicted);
            if hole.punched {
                deviation = deviation + (hole.measured - predicted);
                found += 1;
            }
            bits[self.row_order.punch_index(image_row)] = hole.punched;
            holes.push(hole);
        }

        let next = if found > 0 {
            drift.update(
                deviation.scale(1.0 / found as f64),
                self.config.drift_gain,
                self.config.drift_correction_limit,
                self.config.drift_max,
            )
        } else {
            drift
        };
        log::trace!(
            "column {}: {} holes, drift ({:.2}, {:.2})",
            column + 1,
            found,
            next.dx,
            next.dy
        );
        ColumnReading {
            column,
            holes,
            bits: ColumnBits(bits),
            drift: next,
        }
    }

    fn observe(&self, column: usize, image_row: usize, predicted: Point) -> HoleObservation {
        let background = self.background(predicted);
        let (best, intensity) = self.hunt(predicted);
        let decision = self.binarizer.decide(intensity, background);
        let measured = if decision.punched {
            self.centroid(best, background).unwrap_or(best)
        } else {
            best
        };
        HoleObservation {
            column,
            image_row,
            row: ROW_LABELS[self.row_order.punch_index(image_row)],
            predicted,
            measured,
            intensity,
            background,
            contrast: decision.contrast,
            punched: decision.punched,
            confidence: decision.confidence,
        }
    }

    /// Darkest probe position within the search radius; ties go to the
    /// candidate closest to the prediction.
    fn hunt(&self, predicted: Point) -> (Point, f32) {
        let (hx, hy) = self.probe_half;
        let (rx, ry) = (i64::from(self.radius.x), i64::from(self.radius.y));
        let mut offsets: Vec<(i64, i64)> = (-ry..=ry)
            .flat_map(|dy| (-rx..=rx).map(move |dx| (dx, dy)))
            .collect();
        offsets.sort_by_key(|&(dx, dy)| dx * dx + dy * dy);

        let base = Point::new(predicted.x.floor() + 0.5, predicted.y.floor() + 0.5);
        let mut best = (base, f32::MAX);
        for (dx, dy) in offsets {
            let candidate = Point::new(base.x + dx as f64, base.y + dy as f64);
            if let Some(mean) = self.grid.centered_mean(candidate.x, candidate.y, hx, hy) {
                if mean < best.1 {
                    best = (candidate, mean);
                }
            }
        }
        best
    }

    /// Card stock level half a row pitch to either side of the hole.
    fn background(&self, predicted: Point) -> f32 {
        let half_step = self.geometry.row_step().scale(0.5);
        let (hx, hy) = self.probe_half;
        let patch_x = (hx / 3).max(1);
        let samples: Vec<f32> = [predicted - half_step, predicted + half_step]
            .into_iter()
            .filter_map(|p| self.grid.centered_mean(p.x, p.y, patch_x, hy))
            .collect();
        if samples.is_empty() {
            return 0.0;
        }
        samples.iter().sum::<f32>() / samples.len() as f32
    }

    /// Darkness-weighted centre of the hole around `around`.
    fn centroid(&self, around: Point, background: f32) -> Option<Point> {
        let hole_w = self.config.px(self.config.card.hole_width_in);
        let hole_h = self.config.px(self.config.card.hole_height_in);
        let wx = (hole_w * 0.5).ceil() as i64 + i64::from(self.radius.x) + 1;
        let wy = (hole_h * 0.5).ceil() as i64 + 1;
        let floor = self.config.scan_thresholds.hole_margin * 0.5;
        let (cx, cy) = (around.x.floor() as i64, around.y.floor() as i64);

        let (mut sum_w, mut sum_x, mut sum_y) = (0.0f64, 0.0f64, 0.0f64);
        for y in (cy - wy).max(0)..=(cy + wy).min(i64::from(self.grid.height()) - 1) {
            for x in (cx - wx).max(0)..=(cx + wx).min(i64::from(self.grid.width()) - 1) {
                let v = f32::from(self.grid.get(x as u32, y as u32));
                let w = f64::from((background - v - floor).max(0.0));
                sum_w += w;
                sum_x += w * (x as f64 + 0.5);
                sum_y += w * (y as f64 + 0.5);
            }
        }
        (sum_w > 0.0).then(|| Point::new(sum_x / sum_w, sum_y / sum_w))
    }
}
