use std::process::ExitCode;

use clap::Parser;

use atlas_edit::{cli, logger};

fn main() -> ExitCode {
    // Session log (overwrites the previous session's file)
    logger::init();

    let args = cli::CliArgs::parse();
    cli::run(args)
}
