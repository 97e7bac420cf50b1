//! fluannot - alignment-to-annotation engine for influenza segment sequencing
//!
//! fluannot turns alignment evidence for each sample/segment into flat,
//! position-anchored annotation tables consumed by downstream reporting.
//!
//! # Tools
//!
//! - `mutations`: align query segments to their reference and list substitutions,
//!   insertions and deletions
//! - `depth`: per-position read tallies, consensus codons and amino acids from BAM pileups
//! - `coverage`: segment completeness against the expected segment length
//!
//! # Usage
//!
//! ```bash
//! # Mutations against refs/H3N2/HA.fasta
//! fluannot mutations consensus.fasta -r refs -S H3N2 -s HA -o INF001_HA_mutations.csv
//!
//! # Mutations from an alignment produced elsewhere
//! fluannot mutations aligned.fasta --pre-aligned -o INF001_HA_mutations.csv
//!
//! # Depth/consensus table over every BAM of a sample
//! fluannot depth *.bam --meta-id INF001
//!
//! # Segment coverage
//! fluannot coverage INF001_HA.fasta --sample INF001 --segment HA -o INF001_HA_coverage.csv
//! ```

extern crate fluannot_lib;
pub mod commands;
use anyhow::Result;
use env_logger::Env;
use fluannot_lib::core::prelude::is_broken_pipe;
use log::*;
use structopt::StructOpt;

#[derive(StructOpt)]
#[structopt(rename_all = "kebab-case", author, about)]
/// Position-anchored annotations for influenza segment sequencing
struct Args {
    #[structopt(subcommand)]
    subcommand: Subcommand,
}

#[derive(StructOpt)]
enum Subcommand {
    /// Call substitutions, insertions and deletions against a reference segment
    Mutations(commands::MutationsArgs),
    /// Per-position depth, consensus codon and amino acid from BAM pileups
    Depth(commands::DepthArgs),
    /// Segment completeness from ambiguous-base counts
    Coverage(commands::CoverageArgs),
}

impl Subcommand {
    fn run(self) -> Result<()> {
        match self {
            Subcommand::Mutations(args) => commands::run_mutations(args)?,
            Subcommand::Depth(args) => commands::run_depth(args)?,
            Subcommand::Coverage(args) => commands::run_coverage(args)?,
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    if let Err(err) = Args::from_args().subcommand.run() {
        if is_broken_pipe(&err) {
            std::process::exit(0);
        }
        error!("{}", err);
        std::process::exit(1);
    }
    Ok(())
}
