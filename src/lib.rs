//! Recover the data on FIPS-13 punched cards from scanned images.
//!
//! A scan is turned into a [`PixelGrid`], registered (side edges, front
//! edge, hole grid), read hole by hole, and decoded through a [`CodeTable`].

pub mod core;
pub mod render;

pub use crate::core::{
    BINARY_PLACEHOLDER, BuiltinTable, COLUMNS, CardDimensions, CardGeometry, CardReader,
    CardReading, CardState, Channel, CodeTable, CodeTableError, CodeTableFile, CodeTableSpec,
    ColumnBits, ColumnMismatch, ColumnReading, DecodedCard, Diagnostics, DriftOffset,
    DuplexVerdict, EbcdicTable, EdgeLocator, EdgeModel, FaceRecord, Finding, FrontEdgeLocator,
    FrontEdgeModel, GeometryError, GeometryFault, Hollerith, HoleObservation, HoleReader,
    Ibm029Table, MapTable, PixelGrid, Point, Polarity, PunchPattern, ROW_LABELS, ROWS,
    ReadError, ReadRecord, ReaderConfig, RenderStyle, ReportWriter, RowOrder, Symbol,
    UNKNOWN_MARKER, compare_duplex, load_report,
};
pub use render::{ScanOptions, render_overlay, render_scan};

use std::path::Path;

use anyhow::{Context, Result};

/// Open an image file and read it with `reader`.
pub fn read_card(reader: &CardReader, path: &Path, channel: Channel) -> Result<CardReading> {
    let grid = load_grid(path, channel, reader.config().polarity)?;
    reader
        .read(&grid)
        .with_context(|| format!("failed to read card {}", path.display()))
}

/// Decode an image file into a pixel grid.
pub fn load_grid(path: &Path, channel: Channel, polarity: Polarity) -> Result<PixelGrid> {
    let image = image::open(path).with_context(|| format!("failed to open image {}", path.display()))?;
    Ok(PixelGrid::from_dynamic(&image, channel, polarity))
}
