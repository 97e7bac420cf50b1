//! Error types for the fluannot library

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FluError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("htslib error: {0}")]
    Htslib(#[from] rust_htslib::errors::Error),

    #[error("Empty alignment: {0} track is empty")]
    EmptyAlignment(&'static str),

    #[error("Alignment length mismatch: reference track has {reference} columns, query track has {query}")]
    AlignmentLength { reference: usize, query: usize },

    #[error("Gap aligned to gap at alignment column {0}")]
    GapColumn(usize),

    #[error("Reference not found: {0}")]
    ReferenceNotFound(String),

    #[error("Reference file contains no sequences: {0}")]
    EmptyReference(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Source {0} is frozen; no further columns may be ingested")]
    SourceFrozen(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, FluError>;
