pub mod concurrency;
pub mod error;
pub mod errors;
pub mod fs;
pub mod io;
pub mod read_filter;

pub mod prelude {
    pub use super::concurrency::{build_thread_pool, determine_allowed_cpus};
    pub use super::error::{FluError, Result};
    pub use super::errors::is_broken_pipe;
    pub use super::fs::{file_label, is_gzipped, make_parent_dirs};
    pub use super::io::{get_writer, read_fasta, WriterOptions};
    pub use super::read_filter::{DefaultReadFilter, ReadFilter};
}
