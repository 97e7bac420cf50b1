mod args;
mod processor;

use anyhow::{bail, Context, Result};
use log::{error, info, warn};
use fluannot_lib::annotate::load_references;
use fluannot_lib::core::prelude::*;
use rayon::prelude::*;
use std::convert::TryFrom;

pub use args::{MutationsArgs, MutationsConfig, ReferenceSource};
use processor::{call_pre_aligned, split_pre_aligned, MutationCaller, MutationRecord};

/// Execute the `mutations` command end-to-end.
pub fn run_mutations(args: MutationsArgs) -> Result<()> {
    let config = MutationsConfig::try_from(args)?;
    info!("Running fluannot mutations on {:?}", config.sequences);

    let records = read_fasta(&config.sequences)
        .with_context(|| format!("Failed to read {}", config.sequences.display()))?;
    let pool = build_thread_pool(config.threads)?;

    let outcomes: Vec<(String, fluannot_lib::core::error::Result<Vec<MutationRecord>>)> =
        match &config.reference {
            ReferenceSource::Lookup {
                dir,
                subtype,
                segment,
            } => {
                info!("Segment {} / subtype {}", segment, subtype);
                let references = load_references(dir, subtype, segment)?;
                let caller = MutationCaller::new(references, config.scoring)
                    .with_frameshift(config.frameshift);
                pool.install(|| {
                    records
                        .par_iter()
                        .map(|query| (query.id().to_string(), caller.call(query)))
                        .collect()
                })
            }
            ReferenceSource::PreAligned => {
                let (reference, queries) = split_pre_aligned(records)?;
                info!("Using {} as the aligned reference track", reference.id());
                queries
                    .iter()
                    .map(|query| {
                        let row = call_pre_aligned(&reference, query, config.frameshift)
                            .map(|row| vec![row]);
                        (query.id().to_string(), row)
                    })
                    .collect()
            }
        };

    make_parent_dirs(&config.output)?;
    let options = WriterOptions {
        gzipped: is_gzipped(&config.output),
        ..Default::default()
    };
    let mut writer = get_writer(&Some(config.output.clone()), options)?;

    let (mut written, mut failed) = (0usize, 0usize);
    for (id, outcome) in outcomes {
        match outcome {
            Ok(rows) => {
                for row in rows {
                    writer.serialize(row)?;
                    written += 1;
                }
            }
            Err(err) => {
                error!("{}: {}", id, err);
                failed += 1;
            }
        }
    }
    writer.flush()?;

    if failed > 0 {
        warn!("{} query record(s) failed and produced no rows", failed);
        if written == 0 {
            bail!("every query record failed");
        }
    }
    info!("Wrote {} mutation row(s) -> {:?}", written, config.output);
    Ok(())
}
