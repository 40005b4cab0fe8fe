use image::{GrayImage, Luma};

use crate::core::config::{CardDimensions, RowOrder};
use crate::core::geometry::{COLUMNS, ROWS};
use crate::core::punchcards::PunchPattern;

/// FIPS-13 card length, front edge to tail.
const CARD_LENGTH_IN: f64 = 7.375;

/// Placement and look of a synthetic tail-first scan.
///
/// `left` and `right` are the side edges at `y = 0`; `skew` is their slope
/// (dx per dy). `front` is the y of the front edge on the card midline; the
/// front edge runs square to the side edges.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanOptions {
    pub width: u32,
    pub height: u32,
    pub dpi: f64,
    pub left: f64,
    pub right: f64,
    pub front: f64,
    pub skew: f64,
    /// Shift applied to every hole but not to the card edges, in pixels.
    pub hole_offset: (f64, f64),
    pub row_order: RowOrder,
    pub card: CardDimensions,
    pub background: u8,
    pub stock: u8,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            width: 600,
            height: 1181,
            dpi: 150.0,
            left: 10.0,
            right: 590.0,
            front: 1170.0,
            skew: 0.0,
            hole_offset: (0.0, 0.0),
            row_order: RowOrder::TwelveFirst,
            card: CardDimensions::default(),
            background: 0,
            stock: 220,
        }
    }
}

impl ScanOptions {
    /// Image and card placement that fit a full card at `dpi`.
    pub fn at_dpi(dpi: f64) -> Self {
        let k = dpi / 150.0;
        Self {
            width: (600.0 * k).round() as u32,
            height: (1181.0 * k).round() as u32,
            dpi,
            left: 10.0 * k,
            right: 590.0 * k,
            front: 1170.0 * k,
            ..Self::default()
        }
    }
}

/// Draw `pattern` as a dark-holes scan. A pixel is dark when its centre
/// lies off the card or inside a punched hole.
pub fn render_scan(pattern: &PunchPattern, options: &ScanOptions) -> GrayImage {
    let s = options.skew;
    let norm = (1.0 + s * s).sqrt();
    let column_axis = (-s / norm, -1.0 / norm);
    let row_axis = (1.0 / norm, -s / norm);
    let origin = (
        (options.left + options.right) * 0.5 + s * options.front,
        options.front,
    );
    let half_width = (options.right - options.left) * 0.5 / norm;
    let length = CARD_LENGTH_IN * options.dpi;

    let card = &options.card;
    let first = card.first_column_in * options.dpi;
    let column_pitch = card.column_pitch_in * options.dpi;
    let row_pitch = card.row_pitch_in * options.dpi;
    let hole_half_w = card.hole_width_in * options.dpi * 0.5;
    let hole_half_h = card.hole_height_in * options.dpi * 0.5;
    let mid_row = (ROWS as f64 - 1.0) * 0.5;

    let project = |x: f64, y: f64| {
        let (dx, dy) = (x - origin.0, y - origin.1);
        (
            dx * column_axis.0 + dy * column_axis.1,
            dx * row_axis.0 + dy * row_axis.1,
        )
    };

    let is_hole = |along: f64, across: f64| {
        let column = ((along - first) / column_pitch).round();
        let row = (across / row_pitch + mid_row).round();
        if column < 0.0 || column >= COLUMNS as f64 || row < 0.0 || row >= ROWS as f64 {
            return false;
        }
        let (column, image_row) = (column as usize, row as usize);
        let punched = pattern
            .column(column)
            .is_punched(options.row_order.punch_index(image_row));
        punched
            && (along - (first + column as f64 * column_pitch)).abs() <= hole_half_h
            && (across - (image_row as f64 - mid_row) * row_pitch).abs() <= hole_half_w
    };

    GrayImage::from_fn(options.width, options.height, |x, y| {
        let (px, py) = (f64::from(x) + 0.5, f64::from(y) + 0.5);
        let (along, across) = project(px, py);
        let on_card = (0.0..=length).contains(&along) && across.abs() <= half_width;
        if !on_card {
            return Luma([options.background]);
        }
        let (hole_along, hole_across) = project(px - options.hole_offset.0, py - options.hole_offset.1);
        if is_hole(hole_along, hole_across) {
            Luma([options.background])
        } else {
            Luma([options.stock])
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::encoding::Hollerith;

    #[test]
    fn blank_card_has_sharp_edges() {
        let scan = render_scan(&PunchPattern::default(), &ScanOptions::default());
        assert_eq!(scan.dimensions(), (600, 1181));
        assert_eq!(scan.get_pixel(9, 500)[0], 0);
        assert_eq!(scan.get_pixel(10, 500)[0], 220);
        assert_eq!(scan.get_pixel(589, 500)[0], 220);
        assert_eq!(scan.get_pixel(590, 500)[0], 0);
        assert_eq!(scan.get_pixel(300, 1169)[0], 220);
        assert_eq!(scan.get_pixel(300, 1170)[0], 0);
    }

    #[test]
    fn punched_hole_lands_at_its_row_and_column() {
        let pattern = PunchPattern::new([Hollerith::row(12).unwrap()]);
        let scan = render_scan(&pattern, &ScanOptions::default());
        // column 1, row 12: x = 300 - 5.5 * 37.5, y = 1170 - 37.5
        assert_eq!(scan.get_pixel(93, 1132)[0], 0);
        assert_eq!(scan.get_pixel(93, 1120)[0], 220);
        assert_eq!(scan.get_pixel(131, 1132)[0], 220);
    }

    #[test]
    fn back_face_mirrors_rows() {
        let pattern = PunchPattern::new([Hollerith::row(12).unwrap()]);
        let options = ScanOptions {
            row_order: RowOrder::NineFirst,
            ..ScanOptions::default()
        };
        let scan = render_scan(&pattern, &options);
        assert_eq!(scan.get_pixel(93, 1132)[0], 220);
        assert_eq!(scan.get_pixel(506, 1132)[0], 0);
    }
}
