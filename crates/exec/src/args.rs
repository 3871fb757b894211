//! Command-line arguments of the `intcode` driver.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

/// Runs Intcode programs from the terminal.
#[derive(Debug, Parser)]
#[command(name = "intcode", version)]
pub struct Cli {
    /// Increases logging verbosity (`-v` for debug, `-vv` for trace).
    ///
    /// Ignored when `RUST_LOG` is set.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Runs a program, feeding it inputs and printing its outputs.
    Run(RunArgs),
    /// Parses a program and prints it back in canonical form.
    Show(ShowArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Path to the program image.
    #[arg(env = "INTCODE_PROGRAM")]
    pub program: PathBuf,

    /// Comma-separated values fed to the program before anything is read from stdin.
    #[arg(short, long, value_delimiter = ',', allow_negative_numbers = true)]
    pub input: Vec<i64>,

    /// Talks to the program in ASCII: stdin lines are sent character by character, and
    /// outputs in the ASCII range are printed as text.
    #[arg(long)]
    pub ascii: bool,

    /// Overwrites a memory cell before the program starts.
    #[arg(long = "patch", value_name = "ADDR=VALUE", value_parser = parse_patch)]
    pub patches: Vec<(i64, i64)>,

    /// Fails instead of reading stdin when the program needs more input.
    #[arg(long)]
    pub no_stdin: bool,

    /// Logs every executed instruction at the trace level.
    #[arg(long)]
    pub trace: bool,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Path to the program image.
    #[arg(env = "INTCODE_PROGRAM")]
    pub program: PathBuf,
}

/// Parses an `ADDR=VALUE` pair.
fn parse_patch(s: &str) -> Result<(i64, i64), String> {
    let (address, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected ADDR=VALUE, got `{s}`"))?;

    let address = address
        .trim()
        .parse()
        .map_err(|_| format!("invalid address `{address}`"))?;
    let value = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid value `{value}`"))?;

    Ok((address, value))
}
