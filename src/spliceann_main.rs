use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};

use spliceann::annotator::annotate_lines;
use spliceann::cli::{Cli, Config, MissingInputError};

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(Config::log_level(&cli))
        .format_timestamp_millis()
        .init();

    let config = match Config::new(&cli) {
        Ok(config) => config,
        Err(e) if e.downcast_ref::<MissingInputError>().is_some() => {
            let _ = Cli::command().print_help();
            eprintln!();
            eprintln!("error: {}", e);
            return ExitCode::from(1);
        }
        Err(e) => {
            log::error!("{:#}", e);
            return ExitCode::from(1);
        }
    };

    match wrapper(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{:#}", e);
            ExitCode::from(1)
        }
    }
}

fn wrapper(config: &Config) -> Result<()> {
    let sam_file = File::open(&config.alignment)
        .with_context(|| format!("opening alignment file {}", config.alignment.display()))?;

    let mut headers = Vec::new();
    let mut alignments = Vec::new();
    for line in BufReader::new(sam_file).lines() {
        let line = line.with_context(|| format!("reading alignment file {}", config.alignment.display()))?;
        if line.is_empty() {
            continue;
        }
        if line.starts_with('@') {
            headers.push(line);
        } else {
            alignments.push(line);
        }
    }

    let tagged = annotate_lines(
        &alignments,
        &config.annotations,
        config.skip_tolerance,
        config.map_tolerance,
        config.junction_tolerance,
    )
    .context("annotating alignments")?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for header in &headers {
        writeln!(out, "{}", header)?;
    }
    for line in &tagged {
        writeln!(out, "{}", line)?;
    }

    Ok(())
}
