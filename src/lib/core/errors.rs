use anyhow::Error;
use std::io;

/// `true` if any error in the chain is an I/O broken pipe, e.g. stdout
/// closed by `head` while CSV rows are still being written.
#[inline]
pub fn is_broken_pipe(err: &Error) -> bool {
    err.chain()
        .filter_map(|cause| cause.downcast_ref::<io::Error>())
        .any(|io_err| io_err.kind() == io::ErrorKind::BrokenPipe)
}
