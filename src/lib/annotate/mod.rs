//! Alignment-to-annotation algorithms.
//!
//! - [`diff`]: mutation tokens from an aligned reference/query pair
//! - [`align`]: global alignment through rust-bio, laid out as an [`diff::AlignedPair`]
//! - [`consensus`]: pileup consensus, codon assembly and translation
//! - [`codon`]: the standard genetic code
//! - [`coverage`]: segment completeness against fixed expected lengths
//! - [`reference`]: reference FASTA lookup by subtype and segment

pub mod align;
pub mod codon;
pub mod consensus;
pub mod coverage;
pub mod diff;
pub mod reference;

pub use align::{global_align, AlignmentScoring};
pub use codon::CodonTable;
pub use consensus::{
    ConsensusCall, CodonKey, DepthRecord, LongDepthRecord, PileupConsensusEngine, Translation,
    CONSENSUS_PRIORITY,
};
pub use coverage::{coverage, CoverageRecord, SegmentFamily};
pub use diff::{diff, render_tokens, AlignedPair, MutationToken, NO_MUTATIONS};
pub use reference::{load_references, ReferenceSequence};
