//! fluannot: alignment-to-annotation engine for influenza segment sequencing
//!
//! The library turns raw alignment evidence into position-anchored annotations:
//! 1. Mutation tokens (substitutions, insertions, deletions) from a global
//!    alignment of a query segment against its reference
//! 2. Per-position read tallies, majority consensus, codon grouping and
//!    amino-acid translation from BAM pileups
//! 3. Segment completeness against fixed expected segment lengths
//!
//! # Modules
//!
//! - [`annotate`]: the differencing, consensus, codon and coverage algorithms
//! - [`engine`]: pileup columns and the parallel per-source executor
//! - [`core`]: errors, I/O, read filters and thread-pool helpers

pub mod annotate;
pub mod core;
pub mod engine;
