//! Synthetic scans (`punchread synth ...`).

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use punchread::{CodeTableSpec, PunchPattern, RowOrder, ScanOptions, render_scan};

use crate::cli::common::TableArg;
use crate::cli::utils::{ensure_parent, load_config};

/// Args for `punchread synth`.
#[derive(Args, Debug)]
pub struct SynthArgs {
    /// Text to punch (at most 80 characters are used).
    pub text: String,
    /// Output image (PNG).
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,
    /// Dots per inch of the generated scan.
    #[arg(long, default_value_t = 150.0)]
    pub dpi: f64,
    /// Side-edge slope, in pixels across per pixel down.
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub skew: f64,
    /// Shift every hole horizontally by this many pixels.
    #[arg(long = "offset-x", default_value_t = 0.0, allow_hyphen_values = true)]
    pub offset_x: f64,
    /// Shift every hole vertically by this many pixels.
    #[arg(long = "offset-y", default_value_t = 0.0, allow_hyphen_values = true)]
    pub offset_y: f64,
    /// Draw the back face (rows mirrored).
    #[arg(long)]
    pub back: bool,
    /// Code table used to punch the text.
    #[arg(long, value_enum)]
    pub table: Option<TableArg>,
    /// Reader configuration supplying the table and card constants.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Execute `punchread synth`.
pub fn handle(args: SynthArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(table) = args.table {
        config.code_table = CodeTableSpec::Builtin(table.into());
    }
    let table = config.code_table.build()?;
    let pattern = PunchPattern::from_text(table.as_ref(), &args.text)
        .with_context(|| format!("cannot punch '{}' with {}", args.text, table.name()))?;

    let options = ScanOptions {
        skew: args.skew,
        hole_offset: (args.offset_x, args.offset_y),
        row_order: if args.back {
            RowOrder::NineFirst
        } else {
            RowOrder::TwelveFirst
        },
        card: config.card.clone(),
        ..ScanOptions::at_dpi(args.dpi)
    };
    let scan = render_scan(&pattern, &options);
    ensure_parent(&args.output)?;
    scan.save(&args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    log::info!("wrote {}x{} scan to {}", scan.width(), scan.height(), args.output.display());
    Ok(())
}
