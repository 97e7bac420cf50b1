use anyhow::{bail, Error};
use fluannot_lib::annotate::AlignmentScoring;
use std::convert::TryFrom;
use std::path::PathBuf;
use structopt::StructOpt;

use crate::commands::common::DEFAULT_THREADS_STR;

/// CLI arguments for the `mutations` subcommand.
#[derive(Debug, Clone, StructOpt)]
#[structopt(author, name = "mutations")]
pub struct MutationsArgs {
    /// Query sequences (FASTA). Record ids of the form `sample|reference` name the sample.
    pub sequences: PathBuf,

    /// Directory holding `<subtype>/<segment>.fasta` reference files.
    #[structopt(long, short = "r")]
    pub reference_dir: Option<PathBuf>,

    /// Segment name, e.g. `HA`.
    #[structopt(long, short = "s")]
    pub segment: Option<String>,

    /// Subtype directory, e.g. `H3N2`.
    #[structopt(long, short = "S")]
    pub subtype: Option<String>,

    /// Treat `sequences` as an existing alignment: the first record is the gapped
    /// reference track, every following record a gapped query track.
    #[structopt(long)]
    pub pre_aligned: bool,

    /// Add a `Frameshift` column: 1-based position of the first `X` in the query, or `N.A.`.
    #[structopt(long)]
    pub frameshift: bool,

    /// Output CSV (`-` for stdout, `.gz` to compress).
    #[structopt(long, short = "o")]
    pub output: PathBuf,

    /// Number of worker threads to use.
    #[structopt(long, short = "t", default_value = DEFAULT_THREADS_STR.as_str())]
    pub threads: usize,

    /// Score for identical bases.
    #[structopt(long, default_value = "1", allow_hyphen_values = true)]
    pub match_score: i32,

    /// Score for differing bases.
    #[structopt(long, default_value = "0", allow_hyphen_values = true)]
    pub mismatch_score: i32,

    /// Gap opening score (<= 0).
    #[structopt(long, default_value = "-10", allow_hyphen_values = true)]
    pub gap_open: i32,

    /// Gap extension score per gap column (<= 0).
    #[structopt(long, default_value = "0", allow_hyphen_values = true)]
    pub gap_extend: i32,
}

/// Where the reference track comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceSource {
    /// Look up `<dir>/<subtype>/<segment>.fasta` and align each query against it.
    Lookup {
        dir: PathBuf,
        subtype: String,
        segment: String,
    },
    /// The input already holds the alignment.
    PreAligned,
}

/// Normalised configuration derived from [`MutationsArgs`].
#[derive(Debug, Clone)]
pub struct MutationsConfig {
    pub sequences: PathBuf,
    pub reference: ReferenceSource,
    pub output: PathBuf,
    pub threads: usize,
    pub scoring: AlignmentScoring,
    pub frameshift: bool,
}

impl TryFrom<MutationsArgs> for MutationsConfig {
    type Error = Error;

    fn try_from(args: MutationsArgs) -> Result<Self, Self::Error> {
        let reference = if args.pre_aligned {
            ReferenceSource::PreAligned
        } else {
            match (args.reference_dir, args.subtype, args.segment) {
                (Some(dir), Some(subtype), Some(segment)) => ReferenceSource::Lookup {
                    dir,
                    subtype,
                    segment,
                },
                _ => bail!(
                    "--reference-dir, --subtype and --segment are required unless --pre-aligned is set"
                ),
            }
        };

        Ok(MutationsConfig {
            sequences: args.sequences,
            reference,
            output: args.output,
            threads: args.threads,
            scoring: AlignmentScoring {
                match_score: args.match_score,
                mismatch_score: args.mismatch_score,
                gap_open: args.gap_open,
                gap_extend: args.gap_extend,
            },
            frameshift: args.frameshift,
        })
    }
}
