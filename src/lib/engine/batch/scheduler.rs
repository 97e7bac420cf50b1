use crossbeam::channel::{bounded, Receiver, Sender};
use log::*;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::thread;

use super::types::{SourceOutcome, SourceProcessor, CHANNEL_SLOTS_PER_THREAD};
use crate::core::error::{FluError, Result};

/// Parallel per-source executor driven by [`SourceProcessor`] implementations.
///
/// Sources share no state: each worker owns its source from open to export,
/// and a failing source yields an `Err` outcome without touching the others.
#[derive(Debug)]
pub struct BatchRunner<R: 'static + SourceProcessor + Send + Sync> {
    sources: Vec<PathBuf>,
    threads: usize,
    pool: rayon::ThreadPool,
    processor: R,
}

impl<R: 'static + SourceProcessor + Send + Sync> BatchRunner<R> {
    /// Create a new [`BatchRunner`]; `threads` defaults to the number of CPUs.
    pub fn new(sources: Vec<PathBuf>, threads: Option<usize>, processor: R) -> Result<Self> {
        let threads = std::cmp::max(threads.unwrap_or_else(num_cpus::get), 1);
        info!("Using {} worker threads for {} source(s).", threads, sources.len());

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|e| FluError::Config(format!("Failed to build Rayon thread pool: {}", e)))?;

        Ok(Self {
            sources,
            threads,
            pool,
            processor,
        })
    }

    /// Launch processing; outcomes arrive in completion order.
    pub fn process(self) -> Receiver<SourceOutcome<R::P>> {
        let BatchRunner {
            sources,
            threads,
            pool,
            processor,
        } = self;

        let (sender, receiver) = bounded(threads.saturating_mul(CHANNEL_SLOTS_PER_THREAD).max(1));
        thread::spawn(move || {
            pool.install(move || run(&sources, &processor, sender));
        });
        receiver
    }

    /// Launch processing; outcomes arrive in submission order.
    pub fn process_in_order(self) -> InOrder<R::P> {
        InOrder::new(self.process())
    }
}

fn run<R: SourceProcessor + Sync>(
    sources: &[PathBuf],
    processor: &R,
    sender: Sender<SourceOutcome<R::P>>,
) {
    sources
        .par_iter()
        .enumerate()
        .for_each_with(sender, |snd, (index, source)| {
            debug!("Processing source {}", source.display());
            let result = processor.process_source(source);
            match &result {
                Ok(rows) => debug!("{}: {} row(s)", source.display(), rows.len()),
                Err(err) => error!("Source {} failed: {}", source.display(), err),
            }
            let outcome = SourceOutcome {
                index,
                source: source.clone(),
                result,
            };
            if snd.send(outcome).is_err() {
                warn!("Channel closed; dropping outcome for {}", source.display());
            }
        });
}

/// Re-sequences outcomes from a [`BatchRunner`] into submission order.
pub struct InOrder<P> {
    receiver: Receiver<SourceOutcome<P>>,
    next: usize,
    pending: BTreeMap<usize, SourceOutcome<P>>,
}

impl<P> InOrder<P> {
    fn new(receiver: Receiver<SourceOutcome<P>>) -> Self {
        Self {
            receiver,
            next: 0,
            pending: BTreeMap::new(),
        }
    }
}

impl<P> Iterator for InOrder<P> {
    type Item = SourceOutcome<P>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(outcome) = self.pending.remove(&self.next) {
                self.next += 1;
                return Some(outcome);
            }
            match self.receiver.recv() {
                Ok(outcome) => {
                    self.pending.insert(outcome.index, outcome);
                }
                // Senders are gone; drain whatever is left in index order.
                Err(_) => {
                    let (&index, _) = self.pending.iter().next()?;
                    self.next = index + 1;
                    return self.pending.remove(&index);
                }
            }
        }
    }
}
