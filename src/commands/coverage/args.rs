use std::path::PathBuf;
use structopt::StructOpt;

/// CLI arguments for the `coverage` subcommand.
#[derive(Debug, Clone, StructOpt)]
#[structopt(author, name = "coverage")]
pub struct CoverageArgs {
    /// Consensus sequence(s) for one segment (FASTA).
    pub fasta: PathBuf,

    /// Sample name written to every row.
    #[structopt(long, short = "n")]
    pub sample: String,

    /// Segment name; selects the expected segment length.
    #[structopt(long, short = "s")]
    pub segment: String,

    /// Output CSV.
    #[structopt(long, short = "o")]
    pub output: PathBuf,

    /// Skip the `<sample>_<segment>_coverage.txt` summary file.
    #[structopt(long)]
    pub no_summary: bool,
}

/// Normalised configuration derived from [`CoverageArgs`].
#[derive(Debug, Clone)]
pub struct CoverageConfig {
    pub fasta: PathBuf,
    pub sample: String,
    pub segment: String,
    pub output: PathBuf,
    pub summary: bool,
}

impl From<CoverageArgs> for CoverageConfig {
    fn from(args: CoverageArgs) -> CoverageConfig {
        CoverageConfig {
            fasta: args.fasta,
            sample: args.sample,
            segment: args.segment,
            output: args.output,
            summary: !args.no_summary,
        }
    }
}

impl CoverageConfig {
    pub fn summary_file_name(&self) -> String {
        format!("{}_{}_coverage.txt", self.sample, self.segment)
    }
}
