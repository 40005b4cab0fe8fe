//! The per-card pipeline.
//!
//! `Loaded → EdgesFound → FrontEdgeFound → GeometryBuilt → Reading(0..80) → Decoded`.
//! A geometry failure ends the card with the stage it could not reach;
//! everything after geometry is local and only produces [`Finding`]s.

use crate::core::config::ReaderConfig;
use crate::core::edges::{EdgeLocator, EdgeModel, FrontEdgeLocator, FrontEdgeModel};
use crate::core::encoding::CodeTable;
use crate::core::error::{CardState, Finding, ReadError};
use crate::core::geometry::{COLUMNS, CardGeometry};
use crate::core::holes::{ColumnReading, DriftOffset, HoleReader};
use crate::core::pixels::PixelGrid;
use crate::core::punchcards::{DecodedCard, PunchPattern};

/// Fitted models and per-hole observations behind one reading.
#[derive(Debug, Clone)]
pub struct Diagnostics {
    pub edges: EdgeModel,
    pub front: FrontEdgeModel,
    pub geometry: CardGeometry,
    pub columns: Vec<ColumnReading>,
    pub state: CardState,
}

impl Diagnostics {
    /// Drift state after each column, in reading order.
    pub fn drift_trace(&self) -> Vec<DriftOffset> {
        self.columns.iter().map(|c| c.drift).collect()
    }

    /// Lowest hole confidence on the card.
    pub fn min_confidence(&self) -> f32 {
        self.columns
            .iter()
            .flat_map(|c| c.holes.iter())
            .map(|h| h.confidence)
            .fold(1.0, f32::min)
    }
}

/// Everything read from one card face.
#[derive(Debug, Clone)]
pub struct CardReading {
    pub pattern: PunchPattern,
    pub decoded: DecodedCard,
    pub findings: Vec<Finding>,
    pub diagnostics: Diagnostics,
}

impl CardReading {
    pub fn text(&self) -> String {
        self.decoded.text()
    }
}

/// A configured reader. Holds no per-card state, so one reader can serve
/// any number of threads.
pub struct CardReader {
    config: ReaderConfig,
    table: Box<dyn CodeTable>,
}

impl CardReader {
    pub fn new(config: ReaderConfig) -> Result<Self, ReadError> {
        config.validate()?;
        let table = config
            .code_table
            .build()
            .map_err(|e| ReadError::Config(format!("code table: {}", e)))?;
        Ok(Self { config, table })
    }

    /// Use `table` instead of the one named in the configuration.
    pub fn with_table(mut self, table: Box<dyn CodeTable>) -> Self {
        self.table = table;
        self
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    pub fn table(&self) -> &dyn CodeTable {
        self.table.as_ref()
    }

    pub fn read(&self, grid: &PixelGrid) -> Result<CardReading, ReadError> {
        let config = &self.config;
        let mut state = CardState::Loaded;
        log::debug!("{}x{} grid {}", grid.width(), grid.height(), state);

        let registered = EdgeLocator::new(config)
            .locate(grid)
            .and_then(|edges| {
                advance(&mut state, CardState::EdgesFound);
                let front = FrontEdgeLocator::new(config).locate(grid, &edges)?;
                advance(&mut state, CardState::FrontEdgeFound);
                let geometry =
                    CardGeometry::build(&edges, &front, config, grid.width(), grid.height())?;
                advance(&mut state, CardState::GeometryBuilt);
                Ok((edges, front, geometry))
            })
            .inspect_err(|e| log::warn!("{}", e))?;
        let (edges, front, geometry) = registered;

        advance(&mut state, CardState::Reading(0));
        let columns = HoleReader::new(grid, &geometry, config).read_all();
        state = CardState::Reading(COLUMNS - 1);

        let pattern = PunchPattern::new(columns.iter().map(|c| c.bits.hollerith()));
        let decoded = pattern.decode(self.table.as_ref());
        let findings = collect_findings(&columns, &decoded);
        for finding in &findings {
            log::warn!("{}", finding);
        }
        advance(&mut state, CardState::Decoded);

        Ok(CardReading {
            pattern,
            decoded,
            findings,
            diagnostics: Diagnostics {
                edges,
                front,
                geometry,
                columns,
                state,
            },
        })
    }
}

fn advance(state: &mut CardState, next: CardState) {
    log::debug!("{} -> {}", state, next);
    *state = next;
}

fn collect_findings(columns: &[ColumnReading], decoded: &DecodedCard) -> Vec<Finding> {
    let mut findings: Vec<Finding> = columns
        .iter()
        .flat_map(|c| c.holes.iter())
        .filter(|h| h.confidence < 1.0)
        .map(|h| Finding::LowConfidence {
            column: h.column,
            row: h.row,
            confidence: h.confidence,
        })
        .collect();
    findings.extend(
        decoded
            .unknown()
            .map(|(column, code)| Finding::UnknownPattern { column, code }),
    );
    findings.sort_by_key(Finding::column);
    findings
}
