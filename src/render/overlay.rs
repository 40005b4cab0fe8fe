use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_cross_mut, draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;

use crate::core::config::ReaderConfig;
use crate::core::pixels::PixelGrid;
use crate::core::reader::Diagnostics;

struct Palette {
    edge: Rgb<u8>,
    front: Rgb<u8>,
    hole: Rgb<u8>,
    empty: Rgb<u8>,
    low_confidence: Rgb<u8>,
}

const PALETTE: Palette = Palette {
    edge: Rgb([0x20, 0xc0, 0x40]),
    front: Rgb([0x30, 0x80, 0xff]),
    hole: Rgb([0xff, 0xff, 0xff]),
    empty: Rgb([0x70, 0x70, 0x70]),
    low_confidence: Rgb([0xff, 0x40, 0x20]),
};

/// Draw what the reader saw on top of the scan: fitted side and front
/// edges, a white box on every hole read as punched, a dim box where a hole
/// was probed and not found, and a red cross on low-confidence decisions.
pub fn render_overlay(grid: &PixelGrid, diagnostics: &Diagnostics, config: &ReaderConfig) -> RgbImage {
    let mut canvas = RgbImage::from_fn(grid.width(), grid.height(), |x, y| {
        let v = grid.get(x, y);
        Rgb([v, v, v])
    });
    let (w, h) = (grid.width() as f32, grid.height() as f32);

    let edges = &diagnostics.edges;
    for line in [&edges.left, &edges.right] {
        let top = (line.at(0.0) as f32, 0.0);
        let bottom = (line.at(f64::from(h)) as f32, h);
        draw_line_segment_mut(&mut canvas, top, bottom, PALETTE.edge);
    }
    let front = &diagnostics.front;
    draw_line_segment_mut(
        &mut canvas,
        (0.0, front.y_at(0.0) as f32),
        (w, front.y_at(f64::from(w)) as f32),
        PALETTE.front,
    );

    let (hx, hy) = config.probe_half();
    for hole in diagnostics.columns.iter().flat_map(|c| c.holes.iter()) {
        let at = if hole.punched { hole.measured } else { hole.predicted };
        let rect = Rect::at(at.x as i32 - hx as i32, at.y as i32 - hy as i32)
            .of_size(2 * hx + 1, 2 * hy + 1);
        let color = if hole.punched { PALETTE.hole } else { PALETTE.empty };
        draw_hollow_rect_mut(&mut canvas, rect, color);
        if hole.confidence < 1.0 {
            draw_cross_mut(&mut canvas, PALETTE.low_confidence, at.x as i32, at.y as i32);
        }
    }
    canvas
}
