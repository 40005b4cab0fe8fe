use serde::{Deserialize, Serialize};

use crate::core::config::ReaderConfig;
use crate::core::edges::{EdgeModel, FrontEdgeModel};
use crate::core::error::{CardState, GeometryError, GeometryFault};

pub const COLUMNS: usize = 80;
pub const ROWS: usize = 12;

/// A position in image pixel coordinates (pixel `i` covers `[i, i + 1)`).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn scale(self, k: f64) -> Self {
        Point::new(self.x * k, self.y * k)
    }
}

impl std::ops::Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Predicted hole centres for one card.
///
/// Cards are scanned tail-first, so the column axis runs up the image from
/// the front edge and the twelve rows lie side by side across it, centred on
/// the midline between the two side edges. Both axes follow the measured
/// skew of the side edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardGeometry {
    /// Where the card midline meets the front edge.
    pub origin: Point,
    /// Unit vector from the front edge towards the card tail.
    pub column_axis: Point,
    /// Unit vector from the leftmost row towards the rightmost.
    pub row_axis: Point,
    pub first_column_px: f64,
    pub column_pitch_px: f64,
    pub row_pitch_px: f64,
}

impl CardGeometry {
    /// Compose the edge models with the card constants and check that every
    /// hole, including its search neighbourhood, lies inside the image.
    pub fn build(
        edges: &EdgeModel,
        front: &FrontEdgeModel,
        config: &ReaderConfig,
        width: u32,
        height: u32,
    ) -> Result<Self, GeometryError> {
        let skew = edges.skew();
        let center_intercept = (edges.left.intercept + edges.right.intercept) * 0.5;
        let tilt = front.tilt();
        // Solve x = c0 + skew * y, y = f0 + tilt * x.
        let y = (front.line.intercept + tilt * center_intercept) / (1.0 - tilt * skew);
        let origin = Point::new(center_intercept + skew * y, y);

        let norm = (1.0 + skew * skew).sqrt();
        let geometry = Self {
            origin,
            column_axis: Point::new(-skew / norm, -1.0 / norm),
            row_axis: Point::new(1.0 / norm, -skew / norm),
            first_column_px: config.px(config.card.first_column_in),
            column_pitch_px: config.px(config.card.column_pitch_in),
            row_pitch_px: config.px(config.card.row_pitch_in),
        };
        geometry.check_bounds(config, width, height)?;
        log::debug!(
            "geometry: origin ({:.2}, {:.2}), skew {:.4}, column pitch {:.2}px, row pitch {:.2}px",
            origin.x,
            origin.y,
            skew,
            geometry.column_pitch_px,
            geometry.row_pitch_px
        );
        Ok(geometry)
    }

    /// Expected centre of the hole at `column` (0 = nearest the front edge)
    /// and `row` (0 = leftmost in the image).
    pub fn hole(&self, column: usize, row: usize) -> Point {
        let along = self.first_column_px + column as f64 * self.column_pitch_px;
        let across = (row as f64 - (ROWS as f64 - 1.0) * 0.5) * self.row_pitch_px;
        self.origin + self.column_axis.scale(along) + self.row_axis.scale(across)
    }

    /// Offset between neighbouring rows of one column.
    pub fn row_step(&self) -> Point {
        self.row_axis.scale(self.row_pitch_px)
    }

    fn check_bounds(&self, config: &ReaderConfig, width: u32, height: u32) -> Result<(), GeometryError> {
        let (hx, hy) = config.probe_half();
        let radius = config.contrast_search_radius;
        let margin_x = f64::from(hx + radius.x + 1) + config.drift_max;
        let margin_y = f64::from(hy + radius.y + 1) + config.drift_max;
        for column in 0..COLUMNS {
            for row in 0..ROWS {
                let p = self.hole(column, row);
                let inside = p.x >= margin_x
                    && p.x <= f64::from(width) - margin_x
                    && p.y >= margin_y
                    && p.y <= f64::from(height) - margin_y;
                if !inside {
                    return Err(GeometryError::new(
                        CardState::GeometryBuilt,
                        GeometryFault::OutOfBounds {
                            column,
                            row,
                            x: p.x,
                            y: p.y,
                        },
                    ));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fit::LineModel;
    use approx::assert_abs_diff_eq;

    fn edges(left: f64, right: f64, slope: f64) -> EdgeModel {
        EdgeModel {
            left: LineModel::new(slope, left),
            right: LineModel::new(slope, right),
            rows_sampled: 45,
            left_inliers: 45,
            right_inliers: 45,
        }
    }

    fn front(y: f64, tilt: f64) -> FrontEdgeModel {
        FrontEdgeModel {
            line: LineModel::new(tilt, y),
            samples: 15,
        }
    }

    #[test]
    fn square_card_gives_even_grid() {
        let config = ReaderConfig::default();
        let geometry =
            CardGeometry::build(&edges(10.0, 590.0, 0.0), &front(1170.0, 0.0), &config, 600, 1181)
                .unwrap();
        for column in [0, 1, 40, 79] {
            for row in 0..ROWS {
                let p = geometry.hole(column, row);
                assert_abs_diff_eq!(p.x, 300.0 + (row as f64 - 5.5) * 37.5, epsilon = 1e-9);
                assert_abs_diff_eq!(
                    p.y,
                    1170.0 - (0.25 + 0.087 * column as f64) * 150.0,
                    epsilon = 1e-9
                );
            }
        }
    }

    #[test]
    fn skewed_card_keeps_pitch_and_perpendicular_axes() {
        let config = ReaderConfig::default();
        let geometry =
            CardGeometry::build(&edges(20.0, 580.0, 0.01), &front(1160.0, -0.01), &config, 600, 1181)
                .unwrap();
        let a = geometry.hole(10, 3);
        let b = geometry.hole(10, 4);
        let c = geometry.hole(11, 3);
        let row_step = b - a;
        let col_step = c - a;
        assert_abs_diff_eq!(row_step.x.hypot(row_step.y), 37.5, epsilon = 1e-9);
        assert_abs_diff_eq!(col_step.x.hypot(col_step.y), 13.05, epsilon = 1e-9);
        assert_abs_diff_eq!(row_step.x * col_step.x + row_step.y * col_step.y, 0.0, epsilon = 1e-9);
        // moving up the card drifts left with a positive skew
        assert!(col_step.x < 0.0);
        // the origin sits on both the midline and the front edge
        let o = geometry.origin;
        assert_abs_diff_eq!(o.x, 300.0 + 0.01 * o.y, epsilon = 1e-9);
        assert_abs_diff_eq!(o.y, 1160.0 - 0.01 * o.x, epsilon = 1e-9);
    }

    #[test]
    fn misregistered_card_is_rejected() {
        let config = ReaderConfig::default();
        let err = CardGeometry::build(&edges(10.0, 590.0, 0.0), &front(1000.0, 0.0), &config, 600, 1181)
            .unwrap_err();
        assert_eq!(err.stage, CardState::GeometryBuilt);
        assert!(matches!(err.fault, GeometryFault::OutOfBounds { .. }));
    }
}
