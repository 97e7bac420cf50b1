use crate::core::error::FluError;
use anyhow::Result;
use bio::io::fasta;
use grep_cli::stdout;
use gzp::{deflate::Gzip, Compression, ZBuilder};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use termcolor::ColorChoice;

/// Options for a tabular writer.
#[derive(Debug, Clone, Copy)]
pub struct WriterOptions {
    pub delimiter: u8,
    pub gzipped: bool,
    pub write_headers: bool,
    pub threads: usize,
    pub compression_level: u32,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            gzipped: false,
            write_headers: true,
            threads: 1,
            compression_level: 6,
        }
    }
}

fn wrap_gzip<W: Write + Send + 'static>(writer: W, options: &WriterOptions) -> Box<dyn Write> {
    if options.gzipped {
        Box::new(
            ZBuilder::<Gzip, _>::new()
                .num_threads(options.threads)
                .compression_level(Compression::new(options.compression_level))
                .from_writer(writer),
        )
    } else {
        Box::new(writer)
    }
}

/// Build a CSV writer targeting a file or stdout with optional gzip compression.
///
/// `None` or a path of `-` writes to stdout.
pub fn get_writer<P: AsRef<Path>>(
    path: &Option<P>,
    options: WriterOptions,
) -> Result<csv::Writer<Box<dyn Write>>> {
    let raw_writer: Box<dyn Write> = match path {
        Some(path) if path.as_ref() != Path::new("-") => {
            wrap_gzip(BufWriter::new(File::create(path)?), &options)
        }
        _ => wrap_gzip(stdout(ColorChoice::Never), &options),
    };

    Ok(csv::WriterBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(options.write_headers)
        .from_writer(raw_writer))
}

/// Read every record of a FASTA file.
pub fn read_fasta<P: AsRef<Path>>(path: P) -> std::result::Result<Vec<fasta::Record>, FluError> {
    let reader = fasta::Reader::new(File::open(path.as_ref())?);
    let mut records = Vec::new();
    for record in reader.records() {
        let record = record?;
        record
            .check()
            .map_err(|msg| FluError::InvalidInput(format!("{}: {}", path.as_ref().display(), msg)))?;
        records.push(record);
    }
    Ok(records)
}
