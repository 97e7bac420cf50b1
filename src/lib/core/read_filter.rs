//! Which reads a pileup column is allowed to tally.
//!
//! [`DefaultReadFilter`] combines a mapping-quality floor with a SAM flag
//! mask. The default mask drops secondary, QC-fail and duplicate alignments,
//! the same reads pysam's default pileup stepper never yields, so depth and
//! ratios are comparable with the pipeline that consumes them.

use rust_htslib::bam::pileup::Alignment;
use rust_htslib::bam::record::Record;

/// `BAM_FSECONDARY`.
pub const FLAG_SECONDARY: u16 = 0x100;
/// `BAM_FQCFAIL`.
pub const FLAG_QCFAIL: u16 = 0x200;
/// `BAM_FDUP`.
pub const FLAG_DUPLICATE: u16 = 0x400;

/// Reads carrying any of these flags are skipped unless configured otherwise.
pub const DEFAULT_EXCLUDE_FLAGS: u16 = FLAG_SECONDARY | FLAG_QCFAIL | FLAG_DUPLICATE;

/// Decides whether a read contributes to a pileup column.
pub trait ReadFilter {
    /// `true` when the read should be tallied.
    fn filter_read(&self, read: &Record, alignment: Option<&Alignment>) -> bool;
}

/// Mapping-quality floor plus an exclude-flags mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultReadFilter {
    min_mapq: u8,
    exclude_flags: u16,
}

impl DefaultReadFilter {
    pub fn new(min_mapq: u8, exclude_flags: u16) -> Self {
        Self {
            min_mapq,
            exclude_flags,
        }
    }

    pub fn min_mapq(&self) -> u8 {
        self.min_mapq
    }

    pub fn exclude_flags(&self) -> u16 {
        self.exclude_flags
    }
}

impl Default for DefaultReadFilter {
    fn default() -> Self {
        Self::new(0, DEFAULT_EXCLUDE_FLAGS)
    }
}

impl ReadFilter for DefaultReadFilter {
    #[inline(always)]
    fn filter_read(&self, read: &Record, _alignment: Option<&Alignment>) -> bool {
        read.flags() & self.exclude_flags == 0 && read.mapq() >= self.min_mapq
    }
}
