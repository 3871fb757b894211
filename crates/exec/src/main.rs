//! # intcode
//!
//! A command-line driver for the [`intcode_vm`] crate.

mod args;
mod console;

use std::io;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use args::{Cli, Command};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Command::Run(args) => console::run(args),
        Command::Show(args) => console::show(args),
    }
}

/// Installs a subscriber writing to stderr, filtered by `RUST_LOG` or by the verbosity flag.
fn init_tracing(verbose: u8) {
    let default_filter = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}
