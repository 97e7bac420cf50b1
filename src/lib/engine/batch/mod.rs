//! Parallel per-source processing.
//!
//! The [`BatchRunner`] executor fans independent sources (one BAM per
//! sample/segment, one FASTA record set per sample) across a Rayon pool and
//! streams each source's outcome through a bounded crossbeam channel. Callers
//! implement [`SourceProcessor`] to define per-source work.

mod scheduler;
mod types;

pub use scheduler::{BatchRunner, InOrder};
pub use types::{SourceOutcome, SourceProcessor, CHANNEL_SLOTS_PER_THREAD};
