//! Card registration, hole reading and decoding.

pub mod binarize;
pub mod config;
pub mod duplex;
pub mod edges;
pub mod encoding;
pub mod error;
pub mod fit;
pub mod geometry;
pub mod holes;
pub mod pixels;
pub mod punchcards;
pub mod reader;
pub mod report;
mod tables;

pub use binarize::{Binarizer, HoleDecision};
pub use config::{
    BuiltinTable, CardDimensions, CodeTableSpec, EdgeScan, Polarity, ReaderConfig, RowOrder,
    ScanThresholds, SearchRadius,
};
pub use duplex::{ColumnMismatch, DuplexVerdict, compare_duplex};
pub use edges::{EdgeLocator, EdgeModel, FrontEdgeLocator, FrontEdgeModel};
pub use encoding::{
    CodeTable, CodeTableError, CodeTableFile, EbcdicTable, Hollerith, Ibm029Table, MapTable,
    ROW_LABELS, Symbol, UNKNOWN_MARKER,
};
pub use error::{CardState, Finding, GeometryError, GeometryFault, ReadError, Side};
pub use geometry::{COLUMNS, CardGeometry, Point, ROWS};
pub use holes::{ColumnBits, ColumnReading, DriftOffset, HoleObservation, HoleReader};
pub use pixels::{Channel, PixelGrid};
pub use punchcards::{BINARY_PLACEHOLDER, DecodedCard, PunchPattern, RenderStyle};
pub use reader::{CardReader, CardReading, Diagnostics};
pub use report::{FaceRecord, ReadRecord, ReportWriter, file_digest, load_report};
