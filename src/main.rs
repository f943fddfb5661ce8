// Headless front end: load each input, run the edit ops, write PNGs.

use std::process::ExitCode;

use clap::Parser;
use rasteredit::{cli, logger};

fn main() -> ExitCode {
    // Initialize session log (overwrites previous session log)
    logger::init();

    let args = cli::CliArgs::parse();
    cli::run(args)
}
