//! Reference segment lookup.
//!
//! References live at `<reference_dir>/<subtype>/<segment>.fasta`. A missing
//! file or one without records is a configuration error for the caller; it is
//! never retried.

use crate::core::error::{FluError, Result};
use crate::core::io::read_fasta;
use log::debug;
use std::path::{Path, PathBuf};

/// A named reference sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceSequence {
    pub id: String,
    pub seq: Vec<u8>,
}

/// Path of the reference FASTA for a subtype/segment pair.
pub fn reference_path<P: AsRef<Path>>(reference_dir: P, subtype: &str, segment: &str) -> PathBuf {
    reference_dir
        .as_ref()
        .join(subtype)
        .join(format!("{}.fasta", segment))
}

/// Load every reference record for a subtype/segment pair.
pub fn load_references<P: AsRef<Path>>(
    reference_dir: P,
    subtype: &str,
    segment: &str,
) -> Result<Vec<ReferenceSequence>> {
    let path = reference_path(reference_dir, subtype, segment);
    if !path.is_file() {
        return Err(FluError::ReferenceNotFound(format!(
            "no reference for subtype {} segment {} at {}",
            subtype,
            segment,
            path.display()
        )));
    }

    let references: Vec<ReferenceSequence> = read_fasta(&path)?
        .into_iter()
        .map(|record| ReferenceSequence {
            id: record.id().to_string(),
            seq: record.seq().to_vec(),
        })
        .collect();

    if references.is_empty() {
        return Err(FluError::EmptyReference(path.display().to_string()));
    }
    debug!("Loaded {} reference(s) from {}", references.len(), path.display());
    Ok(references)
}
