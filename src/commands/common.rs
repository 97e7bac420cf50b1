use lazy_static::lazy_static;
use std::path::{Path, PathBuf};

lazy_static! {
    /// Number of logical CPUs, as the default for `--threads`.
    pub static ref DEFAULT_THREADS_STR: String = num_cpus::get().to_string();
}

/// Sample name of a `sample|reference` record id; ids without `|` are used whole.
pub fn sample_from_id(id: &str) -> &str {
    id.split('|').next().unwrap_or(id)
}

/// Place `file_name` in the same directory as `sibling`.
pub fn beside(sibling: &Path, file_name: &str) -> PathBuf {
    match sibling.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join(file_name),
        _ => PathBuf::from(file_name),
    }
}
