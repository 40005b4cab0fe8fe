//! Read-only grayscale raster with constant-time box sums.

use image::imageops;
use image::{DynamicImage, GrayImage, ImageBuffer, Luma};
use imageproc::integral_image::integral_image;
use serde::{Deserialize, Serialize};

use crate::core::config::Polarity;

/// Colour plane used when building a grid from a colour scan.
///
/// A troublesome deck sometimes reads better from a single colour channel,
/// because coloured print vanishes in one of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    #[default]
    Luma,
    Red,
    Green,
    Blue,
}

/// One scanned card face, normalized so that dark means hole or background.
#[derive(Debug, Clone)]
pub struct PixelGrid {
    image: GrayImage,
    integral: ImageBuffer<Luma<u64>, Vec<u64>>,
}

impl PixelGrid {
    pub fn new(mut image: GrayImage, polarity: Polarity) -> Self {
        if polarity == Polarity::LightHoles {
            imageops::invert(&mut image);
        }
        let integral = integral_image::<_, u64>(&image);
        Self { image, integral }
    }

    /// Extract `channel` from any decoded image.
    pub fn from_dynamic(image: &DynamicImage, channel: Channel, polarity: Polarity) -> Self {
        let gray = match channel {
            Channel::Luma => image.to_luma8(),
            Channel::Red | Channel::Green | Channel::Blue => {
                let idx = match channel {
                    Channel::Red => 0,
                    Channel::Green => 1,
                    _ => 2,
                };
                let rgb = image.to_rgb8();
                ImageBuffer::from_fn(rgb.width(), rgb.height(), |x, y| {
                    Luma([rgb.get_pixel(x, y)[idx]])
                })
            }
        };
        Self::new(gray, polarity)
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &GrayImage {
        &self.image
    }

    pub fn get(&self, x: u32, y: u32) -> u8 {
        self.image.get_pixel(x, y)[0]
    }

    /// Pixels of row `y`, left to right.
    pub fn row(&self, y: u32) -> &[u8] {
        let w = self.image.width() as usize;
        let start = y as usize * w;
        &self.image.as_raw()[start..start + w]
    }

    /// Pixels of column `x` between `y0` (inclusive) and `y1` (exclusive).
    pub fn column(&self, x: u32, y0: u32, y1: u32) -> Vec<u8> {
        (y0..y1.min(self.height())).map(|y| self.get(x, y)).collect()
    }

    /// Mean intensity of the pixel box `[x0, x1) × [y0, y1)`, clipped to the image.
    ///
    /// Returns `None` when nothing of the box lies inside the image.
    pub fn box_mean(&self, x0: i64, y0: i64, x1: i64, y1: i64) -> Option<f32> {
        let x0 = x0.clamp(0, i64::from(self.width())) as u32;
        let x1 = x1.clamp(0, i64::from(self.width())) as u32;
        let y0 = y0.clamp(0, i64::from(self.height())) as u32;
        let y1 = y1.clamp(0, i64::from(self.height())) as u32;
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        let at = |x: u32, y: u32| self.integral.get_pixel(x, y)[0];
        let sum = at(x1, y1) + at(x0, y0) - at(x0, y1) - at(x1, y0);
        let count = u64::from(x1 - x0) * u64::from(y1 - y0);
        Some(sum as f32 / count as f32)
    }

    /// Mean of the box of half-extent `(hx, hy)` around the pixel containing `(cx, cy)`.
    pub fn centered_mean(&self, cx: f64, cy: f64, hx: u32, hy: u32) -> Option<f32> {
        let px = cx.floor() as i64;
        let py = cy.floor() as i64;
        let (hx, hy) = (i64::from(hx), i64::from(hy));
        self.box_mean(px - hx, py - hy, px + hx + 1, py + hy + 1)
    }
}

/// Value at quantile `q` (0..=1) of a sample, by sorting a copy.
pub(crate) fn quantile(values: &[u8], q: f64) -> Option<u8> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let idx = ((sorted.len() - 1) as f64 * q.clamp(0.0, 1.0)).round() as usize;
    Some(sorted[idx])
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn ramp() -> GrayImage {
        ImageBuffer::from_fn(8, 4, |x, y| Luma([(x * 10 + y) as u8]))
    }

    #[test]
    fn box_mean_matches_direct_average() {
        let grid = PixelGrid::new(ramp(), Polarity::DarkHoles);
        let mean = grid.box_mean(2, 1, 5, 3).unwrap();
        let direct: f32 = (2..5)
            .flat_map(|x| (1..3).map(move |y| (x * 10 + y) as f32))
            .sum::<f32>()
            / 6.0;
        assert!((mean - direct).abs() < 1e-4);
    }

    #[test]
    fn box_mean_clips_to_image() {
        let grid = PixelGrid::new(ramp(), Polarity::DarkHoles);
        assert_eq!(grid.box_mean(-5, -5, 1, 1), Some(0.0));
        assert_eq!(grid.box_mean(20, 0, 30, 4), None);
    }

    #[test]
    fn light_holes_are_inverted() {
        let grid = PixelGrid::new(ramp(), Polarity::LightHoles);
        assert_eq!(grid.get(0, 0), 255);
        assert_eq!(grid.get(1, 0), 245);
        assert_eq!(grid.row(0).len(), 8);
    }

    #[test]
    fn channel_extraction_picks_plane() {
        let rgb = ImageBuffer::from_pixel(3, 3, Rgb([10u8, 200, 30]));
        let dynamic = DynamicImage::ImageRgb8(rgb);
        let green = PixelGrid::from_dynamic(&dynamic, Channel::Green, Polarity::DarkHoles);
        assert_eq!(green.get(1, 1), 200);
        let blue = PixelGrid::from_dynamic(&dynamic, Channel::Blue, Polarity::DarkHoles);
        assert_eq!(blue.get(1, 1), 30);
    }

    #[test]
    fn quantile_picks_order_statistic() {
        assert_eq!(quantile(&[5, 1, 9, 3, 7], 0.5), Some(5));
        assert_eq!(quantile(&[5, 1, 9, 3, 7], 0.0), Some(1));
        assert_eq!(quantile(&[], 0.5), None);
    }
}
