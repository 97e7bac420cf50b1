use crate::core::error::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Outcomes buffered per worker thread before the writer must catch up.
pub const CHANNEL_SLOTS_PER_THREAD: usize = 2;

/// Trait defining how one source file is turned into output rows.
pub trait SourceProcessor {
    /// The row type produced for a source.
    type P: 'static + Send + Sync + Serialize;

    /// Process one source end to end. An error fails this source only.
    fn process_source(&self, source: &Path) -> Result<Vec<Self::P>>;
}

/// Result of processing one source.
#[derive(Debug)]
pub struct SourceOutcome<P> {
    /// Position of the source in the submitted list.
    pub index: usize,
    pub source: PathBuf,
    pub result: Result<Vec<P>>,
}

impl<P> SourceOutcome<P> {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}
