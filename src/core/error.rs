use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::encoding::Hollerith;

/// States a card passes through while it is being read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "column")]
pub enum CardState {
    Loaded,
    EdgesFound,
    FrontEdgeFound,
    GeometryBuilt,
    Reading(usize),
    Decoded,
}

impl fmt::Display for CardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CardState::Loaded => write!(f, "loaded"),
            CardState::EdgesFound => write!(f, "edges found"),
            CardState::FrontEdgeFound => write!(f, "front edge found"),
            CardState::GeometryBuilt => write!(f, "geometry built"),
            CardState::Reading(col) => write!(f, "reading column {}", col + 1),
            CardState::Decoded => write!(f, "decoded"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}

/// Why the card could not be located.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryFault {
    #[error("image of {width}x{height} pixels is too small to hold a card")]
    ImageTooSmall { width: u32, height: u32 },
    #[error("{side} edge found in {found} sampled rows, {required} required")]
    TooFewEdgeSamples {
        side: Side,
        found: usize,
        required: usize,
    },
    #[error("left and right edges cross at y={y:.1}")]
    EdgesCross { y: f64 },
    #[error("front edge found in {found} strip samples, {required} required")]
    NoFrontEdge { found: usize, required: usize },
    #[error("hole {row} of column {column} predicted at ({x:.1}, {y:.1}), outside the image")]
    OutOfBounds {
        column: usize,
        row: usize,
        x: f64,
        y: f64,
    },
}

/// The card could not be registered; nothing is decoded.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("card aborted before reaching '{stage}': {fault}")]
pub struct GeometryError {
    /// The state the pipeline failed to reach.
    pub stage: CardState,
    pub fault: GeometryFault,
}

impl GeometryError {
    pub fn new(stage: CardState, fault: GeometryFault) -> Self {
        Self { stage, fault }
    }
}

#[derive(Debug, Error)]
pub enum ReadError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Per-hole and per-column issues that do not abort the card.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Finding {
    /// A hole decision fell close to the threshold.
    LowConfidence {
        column: usize,
        row: u8,
        confidence: f32,
    },
    /// The column pattern has no entry in the active code table.
    UnknownPattern { column: usize, code: Hollerith },
}

impl Finding {
    pub fn column(&self) -> usize {
        match self {
            Finding::LowConfidence { column, .. } | Finding::UnknownPattern { column, .. } => {
                *column
            }
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Finding::LowConfidence {
                column,
                row,
                confidence,
            } => write!(
                f,
                "column {} row {}: low confidence ({:.2})",
                column + 1,
                row,
                confidence
            ),
            Finding::UnknownPattern { column, code } => {
                write!(f, "column {}: unknown pattern {}", column + 1, code)
            }
        }
    }
}
