//! Shared clap helper types for CLI commands.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, ValueEnum};
use punchread::{BuiltinTable, CardReader, Channel, CodeTableSpec, Polarity, RenderStyle, RowOrder};

use crate::cli::utils::load_config;

/// Built-in code tables selectable on the command line.
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum TableArg {
    #[value(name = "ebcdic-cp037")]
    EbcdicCp037,
    #[value(name = "ebcdic-danish")]
    EbcdicDanish,
    Ibm029,
}

impl From<TableArg> for BuiltinTable {
    fn from(value: TableArg) -> BuiltinTable {
        match value {
            TableArg::EbcdicCp037 => BuiltinTable::EbcdicCp037,
            TableArg::EbcdicDanish => BuiltinTable::EbcdicDanish,
            TableArg::Ibm029 => BuiltinTable::Ibm029,
        }
    }
}

/// Colour plane used to build the pixel grid.
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum ChannelArg {
    Luma,
    Red,
    Green,
    Blue,
}

impl From<ChannelArg> for Channel {
    fn from(value: ChannelArg) -> Channel {
        match value {
            ChannelArg::Luma => Channel::Luma,
            ChannelArg::Red => Channel::Red,
            ChannelArg::Green => Channel::Green,
            ChannelArg::Blue => Channel::Blue,
        }
    }
}

/// Render styles available for ASCII punch views.
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum RenderStyleArg {
    #[value(name = "ascii-x")]
    AsciiX,
    #[value(name = "ascii-01")]
    Ascii01,
}

impl From<RenderStyleArg> for RenderStyle {
    fn from(value: RenderStyleArg) -> Self {
        match value {
            RenderStyleArg::AsciiX => RenderStyle::AsciiX,
            RenderStyleArg::Ascii01 => RenderStyle::Ascii01,
        }
    }
}

/// Options shared by every command that reads scans.
#[derive(Args, Debug, Clone)]
pub struct ReaderArgs {
    /// JSON reader configuration.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Code table, overriding the configuration.
    #[arg(long, value_enum)]
    pub table: Option<TableArg>,
    /// Colour plane to read from colour scans.
    #[arg(long, default_value_t = ChannelArg::Luma, value_enum)]
    pub channel: ChannelArg,
    /// The scanner renders holes light instead of dark.
    #[arg(long)]
    pub invert: bool,
}

impl ReaderArgs {
    /// Build a reader for the front (`back == false`) or back face.
    pub fn reader(&self, back: bool) -> Result<CardReader> {
        let mut config = load_config(self.config.as_deref())?;
        if let Some(table) = self.table {
            config.code_table = CodeTableSpec::Builtin(table.into());
        }
        if self.invert {
            config.polarity = Polarity::LightHoles;
        }
        if back {
            config.row_order = match config.row_order {
                RowOrder::TwelveFirst => RowOrder::NineFirst,
                RowOrder::NineFirst => RowOrder::TwelveFirst,
            };
        }
        Ok(CardReader::new(config)?)
    }
}
