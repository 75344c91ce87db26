use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use crate::annotations::Annotations;

/// Tags RNA-seq alignments with the annotated splice variant(s) they could
/// have originated from.
///
/// The alignment and features files are formally optional so that
/// `--version` can be honored without requiring them; [`Config::new`]
/// enforces that both are actually present.
#[derive(Parser, Debug)]
#[command(name = "spliceann", version, about)]
pub struct Cli {
    /// SAM alignment file to annotate
    pub alignment: Option<PathBuf>,

    /// GTF file of exon features to annotate against
    pub features: Option<PathBuf>,

    /// Total overhang, in bases, a mapped region may extend past its
    /// annotated exon and still be considered contained
    #[arg(short = 'm', long = "map-tolerance", default_value_t = 10)]
    pub map_tolerance: i64,

    /// Longest gap, in bases, collapsed into the surrounding match instead
    /// of being treated as its own splice junction
    #[arg(short = 's', long = "skip-tolerance", default_value_t = 20)]
    pub skip_tolerance: i64,

    /// Distance, in bases, a read's splice junction may differ from an
    /// annotated one and still be considered a match
    #[arg(short = 'o', long = "junction-tolerance", default_value_t = 20)]
    pub junction_tolerance: i64,

    /// Only log errors
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,

    /// Log at info level
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Log at debug level
    #[arg(long = "very-verbose")]
    pub very_verbose: bool,
}

/// Validated, ready-to-run configuration built from the raw [`Cli`]
/// arguments: both positional paths are confirmed present, and the GTF
/// features file has already been fully parsed into [`Annotations`], so a
/// malformed annotation fails before a single SAM line is read.
pub struct Config {
    pub alignment: PathBuf,
    pub annotations: Annotations,
    pub map_tolerance: i64,
    pub skip_tolerance: i64,
    pub junction_tolerance: i64,
}

/// Returned by [`Config::new`] when a required positional argument is
/// missing; callers distinguish this from other setup failures (via
/// `anyhow::Error::downcast_ref`) to print usage instead of an error chain.
#[derive(Debug)]
pub struct MissingInputError;

impl std::fmt::Display for MissingInputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "both an alignment file and a features file must be given")
    }
}
impl std::error::Error for MissingInputError {}

impl Config {
    pub fn new(cli: &Cli) -> anyhow::Result<Self> {
        let (Some(alignment), Some(features)) = (cli.alignment.clone(), cli.features.clone()) else {
            return Err(MissingInputError.into());
        };

        let gtf_file = File::open(&features)
            .with_context(|| format!("opening features file {}", features.display()))?;
        let annotations = Annotations::from_gtf(BufReader::new(gtf_file))
            .with_context(|| format!("reading features file {}", features.display()))?;

        Ok(Config {
            alignment,
            annotations,
            map_tolerance: cli.map_tolerance,
            skip_tolerance: cli.skip_tolerance,
            junction_tolerance: cli.junction_tolerance,
        })
    }

    pub fn log_level(cli: &Cli) -> log::LevelFilter {
        if cli.quiet {
            log::LevelFilter::Error
        } else if cli.verbose {
            log::LevelFilter::Info
        } else if cli.very_verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        }
    }
}
