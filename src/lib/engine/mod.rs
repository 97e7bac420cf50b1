//! Execution engine: pileup columns and the per-source batch executor.

pub mod batch;
pub mod position;

pub use batch::{BatchRunner, SourceOutcome, SourceProcessor};
