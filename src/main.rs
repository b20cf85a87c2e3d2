use std::io::Write as _;

use anyhow::{Context, Result};
use clap::Parser;
use rdiff::cli::{self, Cli};

fn main() {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if let Err(error) = real_main(&cli) {
        let (line, code) = cli::report(&error);
        eprintln!("{line}");
        std::process::exit(code);
    }
}

fn real_main(cli: &Cli) -> Result<()> {
    let output = cli::run(cli)?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{output}").context("failed to write result")?;
    Ok(())
}

