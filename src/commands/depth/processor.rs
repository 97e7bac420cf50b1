use fluannot_lib::annotate::{DepthRecord, PileupConsensusEngine};
use fluannot_lib::core::error::Result;
use fluannot_lib::core::fs::file_label;
use fluannot_lib::core::read_filter::DefaultReadFilter;
use fluannot_lib::engine::position::PileupColumn;
use fluannot_lib::engine::SourceProcessor;
use rust_htslib::bam::{self, Read};
use std::path::Path;
use std::sync::Arc;

use super::args::DepthConfig;

/// Implements [`SourceProcessor`] for one BAM: pileup, consensus, codons.
pub struct DepthProcessor {
    meta_id: String,
    min_baseq: Option<u8>,
    max_depth: u32,
    all_positions: bool,
    read_filter: Arc<DefaultReadFilter>,
}

impl DepthProcessor {
    pub fn from_config(config: &DepthConfig, read_filter: Arc<DefaultReadFilter>) -> Self {
        Self {
            meta_id: config.meta_id.clone(),
            min_baseq: config.min_baseq,
            max_depth: config.max_depth,
            all_positions: config.all_positions,
            read_filter,
        }
    }
}

impl SourceProcessor for DepthProcessor {
    type P = DepthRecord;

    fn process_source(&self, source: &Path) -> Result<Vec<Self::P>> {
        let label = file_label(source);
        let mut reader = bam::Reader::from_path(source)?;
        let header = reader.header().to_owned();
        let mut engine = PileupConsensusEngine::new(&self.meta_id);

        let mut pileups = reader.pileup();
        pileups.set_max_depth(self.max_depth);
        for pileup in pileups {
            let pileup = pileup?;
            let column = PileupColumn::from_pileup(
                pileup,
                &header,
                &label,
                self.read_filter.as_ref(),
                self.min_baseq,
            );
            engine.ingest(column)?;
        }

        if self.all_positions {
            for tid in 0..header.target_count() {
                let reference = PileupColumn::compact_refseq(&header, tid);
                let length = header.target_len(tid).unwrap_or(0) as u32;
                for position in 1..=length {
                    engine.ingest(PileupColumn::new(&label, &reference, position))?;
                }
            }
        }

        engine.freeze(&label);
        Ok(engine.export(&label))
    }
}
