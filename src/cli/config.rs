//! Configuration output (`punchread config ...`).

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::cli::utils::{load_config, write_output};

/// Args for `punchread config`.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Validate and print this file instead of the defaults.
    #[arg(long)]
    pub check: Option<PathBuf>,
    /// Output file (`-` for stdout).
    #[arg(short = 'o', long = "output", default_value = "-")]
    pub output: PathBuf,
}

/// Execute `punchread config`.
pub fn handle(args: ConfigArgs) -> Result<()> {
    let config = load_config(args.check.as_deref())?;
    let mut json = config.to_json()?;
    json.push('\n');
    write_output(&args.output, &json)
}
