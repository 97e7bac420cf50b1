pub mod common;
pub mod coverage;
pub mod depth;
pub mod mutations;

pub use coverage::{run_coverage, CoverageArgs};
pub use depth::{run_depth, DepthArgs};
pub use mutations::{run_mutations, MutationsArgs};
