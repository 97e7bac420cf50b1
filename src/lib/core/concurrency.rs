use anyhow::{Error, Result};
use log::{error, warn};

/// Validate and normalize a requested CPU count.
pub fn determine_allowed_cpus(desired: usize) -> Result<usize> {
    if desired == 0 {
        error!("Must select > 0 threads");
        Err(Error::msg("Too few threads selected. Min 1"))
    } else if desired > num_cpus::get() {
        warn!(
            "Specified more threads than are available, using {}",
            desired
        );
        Ok(desired)
    } else {
        Ok(desired)
    }
}

/// Build a dedicated Rayon pool sized to the validated thread count.
pub fn build_thread_pool(threads: usize) -> Result<rayon::ThreadPool> {
    let threads = determine_allowed_cpus(threads)?;
    Ok(rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()?)
}
