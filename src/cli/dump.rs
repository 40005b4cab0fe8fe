//! Punch matrix of a single scan (`punchread dump ...`).

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use punchread::read_card;

use crate::cli::common::{ReaderArgs, RenderStyleArg};

/// Args for `punchread dump`.
#[derive(Args, Debug)]
pub struct DumpArgs {
    /// Scan to read.
    pub image: PathBuf,
    /// The scan shows the back face of the card.
    #[arg(long)]
    pub back: bool,
    #[command(flatten)]
    pub reader: ReaderArgs,
    /// Rendering style for the punch matrix.
    #[arg(long, default_value_t = RenderStyleArg::AsciiX, value_enum)]
    pub style: RenderStyleArg,
    /// Also list low-confidence holes and unknown patterns.
    #[arg(long)]
    pub findings: bool,
}

/// Execute `punchread dump`.
pub fn handle(args: DumpArgs) -> Result<()> {
    let reader = args.reader.reader(args.back)?;
    let reading = read_card(&reader, &args.image, args.reader.channel.into())?;

    println!(
        "{} [{}] min confidence {:.2}",
        args.image.display(),
        reader.table().name(),
        reading.diagnostics.min_confidence()
    );
    print!(
        "{}",
        reading.pattern.render(args.style.into(), Some(&reading.decoded))
    );
    if args.findings {
        for finding in &reading.findings {
            println!("{}", finding);
        }
    }
    Ok(())
}
