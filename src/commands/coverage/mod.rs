mod args;

use anyhow::{Context, Result};
use log::{info, warn};
use fluannot_lib::annotate::{coverage, CoverageRecord, SegmentFamily};
use fluannot_lib::core::prelude::*;
use std::fs;

use crate::commands::common::beside;

pub use args::{CoverageArgs, CoverageConfig};

/// Coverage rows for every record of the configured FASTA.
fn coverage_records(config: &CoverageConfig) -> Result<Vec<CoverageRecord>> {
    let records = read_fasta(&config.fasta)
        .with_context(|| format!("Failed to read {}", config.fasta.display()))?;

    Ok(records
        .iter()
        .map(|record| CoverageRecord {
            sample: config.sample.clone(),
            id: record.id().to_string(),
            segment: config.segment.clone(),
            coverage: coverage(record.seq(), &config.segment),
        })
        .collect())
}

/// Execute the `coverage` command end-to-end.
pub fn run_coverage(args: CoverageArgs) -> Result<()> {
    let config: CoverageConfig = args.into();
    info!(
        "Running fluannot coverage for {} segment {}",
        config.sample, config.segment
    );
    if SegmentFamily::detect(&config.segment).is_none() {
        warn!(
            "Unrecognised segment {}; coverage uses each sequence's own length",
            config.segment
        );
    }

    let rows = coverage_records(&config)?;

    make_parent_dirs(&config.output)?;
    let mut writer = get_writer(
        &Some(config.output.clone()),
        WriterOptions {
            gzipped: is_gzipped(&config.output),
            ..Default::default()
        },
    )?;
    for row in &rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    if config.summary {
        match rows.first() {
            Some(first) => {
                let path = beside(&config.output, &config.summary_file_name());
                fs::write(&path, format!("{:?}", first.coverage))
                    .with_context(|| format!("Failed to write {}", path.display()))?;
            }
            None => warn!("{} holds no sequences; no summary written", config.fasta.display()),
        }
    }

    info!("Wrote {} coverage row(s) -> {:?}", rows.len(), config.output);
    Ok(())
}
