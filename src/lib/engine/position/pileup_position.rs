//! Pileup columns built from aligned reads.
//!
//! A [`PileupColumn`] is identified by `(source, reference, position)` with a
//! 1-based position and holds [`BaseCounts`] for `A`, `T`, `C`, `G` and `N`.
//! Every read covering the column contributes exactly one observation:
//!
//! - a concrete aligned base counts toward that base;
//! - a deletion, a reference skip, a missing query position, a low-quality
//!   base or a non-ACGT symbol counts toward `N`.
//!
//! Nothing covering the column is dropped, so `total` equals the number of
//! reads that passed the read filter.
//!
//! # Usage
//!
//! Columns are normally produced from htslib pileups:
//!
//! ```rust
//! // let column = PileupColumn::from_pileup(pileup, &header, "S01.bam", &read_filter, None);
//! ```

use crate::core::read_filter::ReadFilter;
use rust_htslib::bam::{
    pileup::{Alignment, Pileup},
    record::Record,
    HeaderView,
};
use smartstring::{LazyCompact, SmartString};

/// Compact string used for source and reference names.
pub type Label = SmartString<LazyCompact>;

/// Bases tallied per column, in output column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Base {
    A,
    T,
    C,
    G,
    N,
}

impl Base {
    /// All tallied bases in output order.
    pub const ALL: [Base; 5] = [Base::A, Base::T, Base::C, Base::G, Base::N];

    /// Map a read base to its tally bucket. Anything other than ACGT is `N`.
    #[inline]
    pub fn from_read_byte(byte: u8) -> Base {
        match byte.to_ascii_uppercase() {
            b'A' => Base::A,
            b'T' => Base::T,
            b'C' => Base::C,
            b'G' => Base::G,
            _ => Base::N,
        }
    }

    #[inline]
    pub fn as_byte(self) -> u8 {
        match self {
            Base::A => b'A',
            Base::T => b'T',
            Base::C => b'C',
            Base::G => b'G',
            Base::N => b'N',
        }
    }

    #[inline]
    pub fn as_char(self) -> char {
        self.as_byte() as char
    }
}

/// What one read shows at one reference position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadObservation {
    /// Aligned query base.
    Base(u8),
    /// Aligned base below the base-quality cutoff.
    LowQuality,
    Deletion,
    RefSkip,
    /// No aligned query position for any other reason.
    Unaligned,
}

impl ReadObservation {
    #[inline]
    pub fn tally_base(self) -> Base {
        match self {
            ReadObservation::Base(byte) => Base::from_read_byte(byte),
            ReadObservation::LowQuality
            | ReadObservation::Deletion
            | ReadObservation::RefSkip
            | ReadObservation::Unaligned => Base::N,
        }
    }
}

/// Read counts for one position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BaseCounts {
    pub a: u32,
    pub t: u32,
    pub c: u32,
    pub g: u32,
    pub n: u32,
}

impl BaseCounts {
    #[inline]
    pub fn get(&self, base: Base) -> u32 {
        match base {
            Base::A => self.a,
            Base::T => self.t,
            Base::C => self.c,
            Base::G => self.g,
            Base::N => self.n,
        }
    }

    #[inline]
    pub fn add(&mut self, base: Base, count: u32) {
        let slot = match base {
            Base::A => &mut self.a,
            Base::T => &mut self.t,
            Base::C => &mut self.c,
            Base::G => &mut self.g,
            Base::N => &mut self.n,
        };
        *slot = slot.saturating_add(count);
    }

    /// Fold another tally into this one.
    pub fn merge(&mut self, other: &BaseCounts) {
        for base in Base::ALL {
            self.add(base, other.get(base));
        }
    }

    /// Sum over all five buckets, `N` included.
    #[inline]
    pub fn total(&self) -> u32 {
        Base::ALL.iter().map(|&b| self.get(b)).sum()
    }

    /// `counts[base] / total`, or `0.0` when the column is empty.
    #[inline]
    pub fn ratio(&self, base: Base) -> f64 {
        let total = self.total();
        if total > 0 {
            self.get(base) as f64 / total as f64
        } else {
            0.0
        }
    }
}

/// Composite key of a pileup column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColumnKey {
    pub source: Label,
    pub reference: Label,
    /// 1-based reference position.
    pub position: u32,
}

impl ColumnKey {
    pub fn new(source: &str, reference: &str, position: u32) -> Self {
        Self {
            source: Label::from(source),
            reference: Label::from(reference),
            position,
        }
    }
}

/// Base tallies at one reference position of one source.
#[derive(Debug, Clone, PartialEq)]
pub struct PileupColumn {
    pub key: ColumnKey,
    pub counts: BaseCounts,
}

impl PileupColumn {
    pub fn new(source: &str, reference: &str, position: u32) -> Self {
        Self {
            key: ColumnKey::new(source, reference, position),
            counts: BaseCounts::default(),
        }
    }

    /// Record one read's observation at this column.
    #[inline]
    pub fn observe(&mut self, observation: ReadObservation) {
        self.counts.add(observation.tally_base(), 1);
    }

    #[inline]
    pub fn total(&self) -> u32 {
        self.counts.total()
    }

    #[inline]
    pub fn ratio(&self, base: Base) -> f64 {
        self.counts.ratio(base)
    }

    /// Classify a pileup alignment. Reference skips are checked first since
    /// htslib may flag them as deletions too.
    #[inline]
    fn classify(alignment: &Alignment, record: &Record, base_filter: Option<u8>) -> ReadObservation {
        if alignment.is_refskip() {
            return ReadObservation::RefSkip;
        }
        if alignment.is_del() {
            return ReadObservation::Deletion;
        }
        let Some(qpos) = alignment.qpos() else {
            return ReadObservation::Unaligned;
        };

        let is_low_qual = base_filter.map_or(false, |cutoff| {
            record.qual().get(qpos).map_or(true, |&q| q < cutoff)
        });
        if is_low_qual {
            ReadObservation::LowQuality
        } else {
            ReadObservation::Base(record.seq()[qpos])
        }
    }

    /// Convert an htslib pileup into a column.
    ///
    /// # Arguments
    ///
    /// * `pileup` - a pileup at a reference position (htslib positions are 0-based)
    /// * `header` - header of the file being read, to resolve the reference name
    /// * `source` - label of the file the pileup came from
    /// * `read_filter` - reads failing the filter are not tallied
    /// * `base_filter` - optional base-quality cutoff; lower bases count as `N`
    pub fn from_pileup<F: ReadFilter>(
        pileup: Pileup,
        header: &HeaderView,
        source: &str,
        read_filter: &F,
        base_filter: Option<u8>,
    ) -> Self {
        let reference = Self::compact_refseq(header, pileup.tid());
        let mut column = Self::new(source, &reference, pileup.pos() + 1);

        for alignment in pileup.alignments() {
            let record = alignment.record();
            if !read_filter.filter_read(&record, Some(&alignment)) {
                continue;
            }
            column.observe(Self::classify(&alignment, &record, base_filter));
        }
        column
    }

    /// Reference name for a tid as a compact string.
    #[inline]
    pub fn compact_refseq(header: &HeaderView, tid: u32) -> Label {
        Label::from(String::from_utf8_lossy(header.tid2name(tid)).as_ref())
    }
}
