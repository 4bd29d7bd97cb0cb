//! `pipac` binary entry point.
use std::io::{self, Write as _};

use anyhow::Result;
use clap::{CommandFactory as _, Parser as _};

use pipac::{cli, commands, logging};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = cli::Cli::parse();

    if !args.any_action() {
        let help = cli::Cli::command().render_help();
        writeln!(io::stdout().lock(), "{help}")?;
        return Ok(());
    }

    logging::init_subscriber(args.verbose);
    let log = logging::Logger::new();
    commands::sync::run(&args, &log)
}
