//! Code table listing (`punchread table ...`).

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use punchread::{CodeTableSpec, MapTable};

use crate::cli::common::TableArg;
use crate::cli::utils::{load_config, write_output};

/// Args for `punchread table`.
#[derive(Args, Debug)]
pub struct TableArgs {
    /// Table to print (default: the configured one).
    #[arg(long, value_enum)]
    pub table: Option<TableArg>,
    /// Reader configuration naming the table.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Print as a JSON table file, ready to edit and load as a custom table.
    #[arg(long)]
    pub json: bool,
    /// Output file (`-` for stdout).
    #[arg(short = 'o', long = "output", default_value = "-")]
    pub output: PathBuf,
}

/// Execute `punchread table`.
pub fn handle(args: TableArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(table) = args.table {
        config.code_table = CodeTableSpec::Builtin(table.into());
    }
    let table = config.code_table.build()?;

    let content = if args.json {
        let file = MapTable::from_table(table.as_ref())?.to_file();
        let mut json = serde_json::to_string_pretty(&file)?;
        json.push('\n');
        json
    } else {
        let mut out = String::new();
        writeln!(out, "# {}", table.name())?;
        for (code, ch) in table.entries() {
            writeln!(out, "{:<16} {:?} U+{:04X}", code.to_string(), ch, ch as u32)?;
        }
        out
    };
    write_output(&args.output, &content)
}
