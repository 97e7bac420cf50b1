//! Per-position pileup primitives.
//!
//! - [`pileup_position::PileupColumn`]: base tallies for one reference position of one source
//! - [`pileup_position::BaseCounts`]: the A/T/C/G/N counters and their ratios

pub mod pileup_position;

pub use pileup_position::{Base, BaseCounts, ColumnKey, PileupColumn, ReadObservation};
