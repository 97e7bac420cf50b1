mod args;
mod processor;

use anyhow::{bail, Result};
use log::{error, info, warn};
use fluannot_lib::core::prelude::*;
use fluannot_lib::engine::BatchRunner;
use std::sync::Arc;

pub use args::{DepthArgs, DepthConfig};
use processor::DepthProcessor;

/// Execute the `depth` command end-to-end.
pub fn run_depth(args: DepthArgs) -> Result<()> {
    let config: DepthConfig = args.into();

    info!(
        "Running fluannot depth for {} on {} BAM file(s)",
        config.meta_id,
        config.bams.len()
    );
    let threads = determine_allowed_cpus(config.threads)?;

    make_parent_dirs(&config.output)?;
    let options = WriterOptions {
        gzipped: is_gzipped(&config.output),
        ..Default::default()
    };
    let mut writer = get_writer(&Some(config.output.clone()), options)?;

    let read_filter = Arc::new(DefaultReadFilter::new(config.min_mapq, config.exclude_flags));
    let processor = DepthProcessor::from_config(&config, read_filter);
    let runner = BatchRunner::new(config.bams.clone(), Some(threads), processor)?;

    let (mut succeeded, mut failed) = (0usize, 0usize);
    for outcome in runner.process_in_order() {
        match outcome.result {
            Ok(rows) => {
                info!("{}: {} position(s)", outcome.source.display(), rows.len());
                for row in rows {
                    if config.long {
                        for long_row in row.to_long() {
                            writer.serialize(long_row)?;
                        }
                    } else {
                        writer.serialize(row)?;
                    }
                }
                succeeded += 1;
            }
            Err(err) => {
                error!("{}: no rows written: {}", outcome.source.display(), err);
                failed += 1;
            }
        }
    }
    writer.flush()?;

    if failed > 0 {
        warn!("{} of {} source(s) failed", failed, failed + succeeded);
        if succeeded == 0 {
            bail!("every BAM source failed");
        }
    }
    info!("Depth annotation complete -> {:?}", config.output);
    Ok(())
}
