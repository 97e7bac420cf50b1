use std::path::PathBuf;
use structopt::StructOpt;

use crate::commands::common::DEFAULT_THREADS_STR;

/// Pileup depth htslib (and pysam) use unless told otherwise.
pub const DEFAULT_MAX_DEPTH: &str = "8000";

/// Secondary | QC-fail | duplicate, see `DEFAULT_EXCLUDE_FLAGS`.
pub const DEFAULT_EXCLUDE_FLAGS_STR: &str = "1792";

/// CLI arguments for the `depth` subcommand.
#[derive(Debug, Clone, StructOpt)]
#[structopt(author, name = "depth")]
pub struct DepthArgs {
    /// Input BAM files, one source per sample/segment.
    #[structopt(required = true, min_values = 1)]
    pub bams: Vec<PathBuf>,

    /// Sample identifier written to every row.
    #[structopt(long, short = "m")]
    pub meta_id: String,

    /// Output CSV. Defaults to `<meta-id>_annotated_depth.csv` (`<meta-id>_long.csv` with `--long`).
    #[structopt(long, short = "o")]
    pub output: Option<PathBuf>,

    /// Number of worker threads to use.
    #[structopt(long, short = "t", default_value = DEFAULT_THREADS_STR.as_str())]
    pub threads: usize,

    /// Minimum mapping quality for reads to be counted.
    #[structopt(long, short = "q", default_value = "0")]
    pub min_mapq: u8,

    /// Skip reads with any of these SAM flags set (secondary, QC-fail and duplicate by default; 0 keeps all).
    #[structopt(long, short = "F", default_value = DEFAULT_EXCLUDE_FLAGS_STR)]
    pub exclude_flags: u16,

    /// Minimum base quality to treat a base as [A, C, G, T]. Lower bases count as `N`.
    #[structopt(long, short = "Q")]
    pub min_baseq: Option<u8>,

    /// Maximum reads inspected per pileup column.
    #[structopt(long, short = "D", default_value = DEFAULT_MAX_DEPTH)]
    pub max_depth: u32,

    /// Emit every reference position, including ones no read covers.
    #[structopt(long, short = "a")]
    pub all_positions: bool,

    /// Write one row per (position, base) instead of one row per position.
    #[structopt(long, short = "l")]
    pub long: bool,
}

/// Normalised configuration derived from [`DepthArgs`].
#[derive(Debug, Clone)]
pub struct DepthConfig {
    pub bams: Vec<PathBuf>,
    pub meta_id: String,
    pub output: PathBuf,
    pub threads: usize,
    pub min_mapq: u8,
    pub exclude_flags: u16,
    pub min_baseq: Option<u8>,
    pub max_depth: u32,
    pub all_positions: bool,
    pub long: bool,
}

impl From<DepthArgs> for DepthConfig {
    fn from(args: DepthArgs) -> DepthConfig {
        let output = args.output.unwrap_or_else(|| {
            if args.long {
                PathBuf::from(format!("{}_long.csv", args.meta_id))
            } else {
                PathBuf::from(format!("{}_annotated_depth.csv", args.meta_id))
            }
        });
        DepthConfig {
            bams: args.bams,
            meta_id: args.meta_id,
            output,
            threads: args.threads,
            min_mapq: args.min_mapq,
            exclude_flags: args.exclude_flags,
            min_baseq: args.min_baseq,
            max_depth: args.max_depth,
            all_positions: args.all_positions,
            long: args.long,
        }
    }
}
