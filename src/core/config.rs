use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::encoding::{CodeTable, CodeTableError, CodeTableFile, EbcdicTable, Ibm029Table, MapTable};
use crate::core::error::ReadError;

/// Which way round the scanner renders holes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Polarity {
    /// Background and holes scan black, card stock scans light.
    #[default]
    DarkHoles,
    /// Background and holes scan white; the grid is inverted on load.
    LightHoles,
}

/// Which punch row is leftmost in the image.
///
/// The front face of a tail-first scan shows row 12 on the left; the back
/// face mirrors that, so duplex pairs read the back with `NineFirst`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RowOrder {
    #[default]
    TwelveFirst,
    NineFirst,
}

impl RowOrder {
    /// Punch-order index (0 = row 12) of the `image_row`-th row from the left.
    pub fn punch_index(self, image_row: usize) -> usize {
        match self {
            RowOrder::TwelveFirst => image_row,
            RowOrder::NineFirst => 11 - image_row,
        }
    }
}

/// FIPS-13 card constants, in inches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardDimensions {
    pub row_pitch_in: f64,
    pub column_pitch_in: f64,
    /// Distance from the front (leading) edge to the centre of column 1.
    pub first_column_in: f64,
    /// Hole extent along the row axis.
    pub hole_width_in: f64,
    /// Hole extent along the column axis.
    pub hole_height_in: f64,
    /// Sampling box, kept smaller than the hole so it can slide inside it.
    pub probe_width_in: f64,
    pub probe_height_in: f64,
}

impl Default for CardDimensions {
    fn default() -> Self {
        Self {
            row_pitch_in: 0.25,
            column_pitch_in: 0.087,
            first_column_in: 0.25,
            hole_width_in: 0.125,
            hole_height_in: 0.055,
            probe_width_in: 0.087,
            probe_height_in: 0.047,
        }
    }
}

/// Intensity cutoffs, all on the 0..255 scale after polarity normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanThresholds {
    /// Minimum card-stock vs background difference for an edge crossing.
    pub edge_min_contrast: f32,
    /// A hole must be at least this much darker than its surroundings.
    pub hole_margin: f32,
    /// A hole can never be lighter than this, whatever the surroundings.
    pub hole_ceiling: f32,
    /// Decisions within this distance of `hole_margin` are low confidence.
    pub ambiguity_band: f32,
}

impl Default for ScanThresholds {
    fn default() -> Self {
        Self {
            edge_min_contrast: 40.0,
            hole_margin: 60.0,
            hole_ceiling: 100.0,
            ambiguity_band: 20.0,
        }
    }
}

/// Sampling parameters for the edge and front-edge scans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeScan {
    pub sample_step_px: u32,
    pub top_margin_px: u32,
    pub bottom_margin_px: u32,
    /// How far in from each side (fraction of width) a crossing may lie.
    pub max_inward_fraction: f64,
    /// A crossing must stay light for this many pixels.
    pub min_run_px: u32,
    /// Fraction of sampled rows that must yield a usable crossing.
    pub min_valid_fraction: f64,
    /// Residual cutoff in robust standard deviations.
    pub outlier_sigma: f64,
    /// Depth of the upward search for the front edge.
    pub front_search_px: u32,
    /// Width of the front-edge strip as a fraction of card width.
    pub front_strip_fraction: f64,
    pub front_strip_samples: u32,
}

impl Default for EdgeScan {
    fn default() -> Self {
        Self {
            sample_step_px: 20,
            top_margin_px: 100,
            bottom_margin_px: 200,
            max_inward_fraction: 0.3,
            min_run_px: 4,
            min_valid_fraction: 0.5,
            outlier_sigma: 3.0,
            front_search_px: 200,
            front_strip_fraction: 0.6,
            front_strip_samples: 15,
        }
    }
}

/// Half-extent of the contrast hunt around each predicted hole, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchRadius {
    pub x: u32,
    pub y: u32,
}

impl Default for SearchRadius {
    fn default() -> Self {
        Self { x: 2, y: 2 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BuiltinTable {
    EbcdicCp037,
    EbcdicDanish,
    Ibm029,
}

/// The active column → character mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeTableSpec {
    Builtin(BuiltinTable),
    Custom(CodeTableFile),
}

impl Default for CodeTableSpec {
    fn default() -> Self {
        CodeTableSpec::Builtin(BuiltinTable::EbcdicCp037)
    }
}

impl CodeTableSpec {
    pub fn build(&self) -> Result<Box<dyn CodeTable>, CodeTableError> {
        Ok(match self {
            CodeTableSpec::Builtin(BuiltinTable::EbcdicCp037) => Box::new(EbcdicTable::new()),
            CodeTableSpec::Builtin(BuiltinTable::EbcdicDanish) => Box::new(EbcdicTable::danish()),
            CodeTableSpec::Builtin(BuiltinTable::Ibm029) => Box::new(Ibm029Table::new()),
            CodeTableSpec::Custom(file) => Box::new(MapTable::from_file(file)?),
        })
    }
}

/// Everything the reader needs to know about a scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    pub dpi: f64,
    pub polarity: Polarity,
    pub row_order: RowOrder,
    pub card: CardDimensions,
    pub scan_thresholds: ScanThresholds,
    pub edge_scan: EdgeScan,
    pub contrast_search_radius: SearchRadius,
    /// Fraction of a column's measured deviation folded into the drift.
    pub drift_gain: f64,
    /// Largest drift change allowed per column, in pixels per axis.
    pub drift_correction_limit: f64,
    /// Largest accumulated drift, in pixels per axis.
    pub drift_max: f64,
    pub code_table: CodeTableSpec,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            dpi: 150.0,
            polarity: Polarity::default(),
            row_order: RowOrder::default(),
            card: CardDimensions::default(),
            scan_thresholds: ScanThresholds::default(),
            edge_scan: EdgeScan::default(),
            contrast_search_radius: SearchRadius::default(),
            drift_gain: 0.25,
            drift_correction_limit: 1.0,
            drift_max: 6.0,
            code_table: CodeTableSpec::default(),
        }
    }
}

impl ReaderConfig {
    /// Load a JSON configuration file; missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: ReaderConfig = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("invalid config {}", path.display()))?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize config")
    }

    /// Convert a length in inches to pixels at the configured resolution.
    pub fn px(&self, inches: f64) -> f64 {
        inches * self.dpi
    }

    /// Half-extent of the probe box in whole pixels `(x, y)`.
    pub fn probe_half(&self) -> (u32, u32) {
        (
            half_px(self.px(self.card.probe_width_in)),
            half_px(self.px(self.card.probe_height_in)),
        )
    }

    pub fn validate(&self) -> Result<(), ReadError> {
        let fail = |msg: &str| Err(ReadError::Config(msg.to_string()));
        if !(self.dpi.is_finite() && self.dpi >= 30.0) {
            return fail("dpi must be a finite value of at least 30");
        }
        let card = &self.card;
        let lengths = [
            card.row_pitch_in,
            card.column_pitch_in,
            card.first_column_in,
            card.hole_width_in,
            card.hole_height_in,
            card.probe_width_in,
            card.probe_height_in,
        ];
        if lengths.iter().any(|v| !(v.is_finite() && *v > 0.0)) {
            return fail("card dimensions must be positive");
        }
        if card.probe_width_in > card.row_pitch_in || card.probe_height_in > card.column_pitch_in {
            return fail("probe box must fit within one row and column pitch");
        }
        let scan = &self.edge_scan;
        if scan.sample_step_px == 0 || scan.front_strip_samples < 2 {
            return fail("edge scan needs a positive step and at least two strip samples");
        }
        if !(0.0..=1.0).contains(&scan.min_valid_fraction)
            || !(0.0..=0.5).contains(&scan.max_inward_fraction)
            || !(0.0..=1.0).contains(&scan.front_strip_fraction)
        {
            return fail("edge scan fractions out of range");
        }
        if !(scan.outlier_sigma.is_finite() && scan.outlier_sigma > 0.0) {
            return fail("outlier_sigma must be positive");
        }
        if !(0.0..=1.0).contains(&self.drift_gain) {
            return fail("drift_gain must lie in 0..=1");
        }
        if !(non_negative(self.drift_correction_limit) && non_negative(self.drift_max)) {
            return fail("drift limits must be finite and not negative");
        }
        let thresholds = &self.scan_thresholds;
        if !(thresholds.hole_margin.is_finite() && thresholds.hole_margin > 0.0) {
            return fail("hole_margin must be positive");
        }
        if ![
            thresholds.edge_min_contrast,
            thresholds.hole_ceiling,
            thresholds.ambiguity_band,
        ]
        .into_iter()
        .all(|v| non_negative(f64::from(v)))
        {
            return fail("scan thresholds must be finite and not negative");
        }
        self.code_table
            .build()
            .map_err(|err| ReadError::Config(format!("code table: {err}")))?;
        Ok(())
    }
}

fn non_negative(v: f64) -> bool {
    v.is_finite() && v >= 0.0
}

fn half_px(extent: f64) -> u32 {
    ((extent - 1.0) / 2.0).round().max(1.0) as u32
}
