//! Command-line interface wiring for the `punchread` binary.
//!
//! This module owns the clap definitions and delegates execution to
//! specialized submodules that encapsulate each command family.

use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod common;
pub mod config;
pub mod dump;
pub mod read;
pub mod synth;
pub mod table;
pub mod utils;

/// Parsed CLI entrypoint for the `punchread` binary.
#[derive(Parser, Debug)]
#[command(
    name = "punchread",
    version,
    about = "Recover data from scanned FIPS-13 punched cards"
)]
pub struct Cli {
    /// Log more (-v debug, -vv trace); RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
    /// Top-level command to execute.
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Read scans, verifying front/back pairs.
    Read(read::ReadArgs),
    /// Print the punch matrix of one scan.
    Dump(dump::DumpArgs),
    /// Draw a synthetic scan of a card.
    Synth(synth::SynthArgs),
    /// Print a code table in punch notation.
    Table(table::TableArgs),
    /// Print the default reader configuration.
    Config(config::ConfigArgs),
}

/// Execute the requested command.
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Read(args) => read::handle(args),
        Command::Dump(args) => dump::handle(args),
        Command::Synth(args) => synth::handle(args),
        Command::Table(args) => table::handle(args),
        Command::Config(args) => config::handle(args),
    }
}
