//! Adapter between rust-bio's pairwise aligner and [`AlignedPair`].
//!
//! Alignment itself is delegated to [`bio::alignment::pairwise::Aligner`] in
//! global mode; this module only configures scoring and lays the resulting
//! operations out as two gapped tracks.

use crate::annotate::diff::{AlignedPair, GAP};
use crate::core::error::{FluError, Result};
use bio::alignment::pairwise::Aligner;
use bio::alignment::{Alignment, AlignmentOperation};

/// Scoring for the global aligner. A gap of length `k` scores
/// `gap_open + k * gap_extend`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlignmentScoring {
    pub match_score: i32,
    pub mismatch_score: i32,
    pub gap_open: i32,
    pub gap_extend: i32,
}

impl Default for AlignmentScoring {
    fn default() -> Self {
        Self {
            match_score: 1,
            mismatch_score: 0,
            gap_open: -10,
            gap_extend: 0,
        }
    }
}

impl AlignmentScoring {
    /// Gap penalties must not reward gaps.
    pub fn validate(&self) -> Result<()> {
        if self.gap_open > 0 || self.gap_extend > 0 {
            return Err(FluError::Config(format!(
                "gap penalties must be <= 0, got open {} / extend {}",
                self.gap_open, self.gap_extend
            )));
        }
        Ok(())
    }
}

/// Globally align `query` against `reference` (both upper-cased first).
pub fn global_align(reference: &[u8], query: &[u8], scoring: &AlignmentScoring) -> Result<AlignedPair> {
    if reference.is_empty() {
        return Err(FluError::EmptyAlignment("reference"));
    }
    if query.is_empty() {
        return Err(FluError::EmptyAlignment("query"));
    }
    scoring.validate()?;

    let reference = reference.to_ascii_uppercase();
    let query = query.to_ascii_uppercase();

    let (match_score, mismatch_score) = (scoring.match_score, scoring.mismatch_score);
    let score = move |a: u8, b: u8| if a == b { match_score } else { mismatch_score };
    let mut aligner = Aligner::with_capacity(
        reference.len(),
        query.len(),
        scoring.gap_open,
        scoring.gap_extend,
        score,
    );
    let alignment = aligner.global(&reference, &query);
    log::trace!("global alignment score {}", alignment.score);

    to_aligned_pair(&reference, &query, &alignment)
}

fn base_at(seq: &[u8], index: usize, track: &str) -> Result<u8> {
    seq.get(index).copied().ok_or_else(|| {
        FluError::InvalidInput(format!(
            "alignment operations run past the end of the {} ({} bases)",
            track,
            seq.len()
        ))
    })
}

/// Lay out an alignment of `reference` (x) and `query` (y) as gapped tracks.
pub fn to_aligned_pair(reference: &[u8], query: &[u8], alignment: &Alignment) -> Result<AlignedPair> {
    let mut ref_track = Vec::with_capacity(reference.len() + query.len());
    let mut query_track = Vec::with_capacity(reference.len() + query.len());
    let (mut x, mut y) = (0usize, 0usize);

    for op in &alignment.operations {
        match *op {
            AlignmentOperation::Match | AlignmentOperation::Subst => {
                ref_track.push(base_at(reference, x, "reference")?);
                query_track.push(base_at(query, y, "query")?);
                x += 1;
                y += 1;
            }
            AlignmentOperation::Del => {
                ref_track.push(GAP);
                query_track.push(base_at(query, y, "query")?);
                y += 1;
            }
            AlignmentOperation::Ins => {
                ref_track.push(base_at(reference, x, "reference")?);
                query_track.push(GAP);
                x += 1;
            }
            AlignmentOperation::Xclip(len) => {
                for _ in 0..len {
                    ref_track.push(base_at(reference, x, "reference")?);
                    query_track.push(GAP);
                    x += 1;
                }
            }
            AlignmentOperation::Yclip(len) => {
                for _ in 0..len {
                    ref_track.push(GAP);
                    query_track.push(base_at(query, y, "query")?);
                    y += 1;
                }
            }
        }
    }

    AlignedPair::new(ref_track, query_track)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotate::diff::{diff, render_tokens, NO_MUTATIONS};
    use proptest::prelude::*;

    fn differences(reference: &str, query: &str) -> String {
        let pair = global_align(reference.as_bytes(), query.as_bytes(), &AlignmentScoring::default())
            .unwrap();
        render_tokens(&diff(&pair))
    }

    #[test]
    fn identical_sequences_have_no_mutations() {
        assert_eq!(differences("ACGTACGTTTGA", "ACGTACGTTTGA"), NO_MUTATIONS);
    }

    #[test]
    fn mismatches_are_preferred_over_gaps() {
        assert_eq!(differences("ACGTACGT", "ACGAACGT"), "T4A");
    }

    #[test]
    fn single_base_insertion_is_placed_between_blocks() {
        assert_eq!(differences("AAAACCCCGGGGTTTT", "AAAACCCCAGGGGTTTT"), "ins9A");
    }

    #[test]
    fn single_base_deletion_is_placed_between_blocks() {
        assert_eq!(differences("AAAACCCCAGGGGTTTT", "AAAACCCCGGGGTTTT"), "del9A");
    }

    #[test]
    fn input_case_is_normalised() {
        assert_eq!(differences("acgtacgt", "ACGTACGT"), NO_MUTATIONS);
    }

    #[test]
    fn tracks_preserve_both_sequences() {
        let pair = global_align(b"AAAACCCCGGGG", b"AAAACCGGGG", &AlignmentScoring::default()).unwrap();
        let strip = |track: &[u8]| track.iter().copied().filter(|&b| b != GAP).collect::<Vec<_>>();
        assert_eq!(strip(pair.ref_track()), b"AAAACCCCGGGG".to_vec());
        assert_eq!(strip(pair.query_track()), b"AAAACCGGGG".to_vec());
    }

    #[test]
    fn empty_inputs_are_rejected() {
        let scoring = AlignmentScoring::default();
        assert!(matches!(
            global_align(b"", b"ACGT", &scoring).unwrap_err(),
            FluError::EmptyAlignment("reference")
        ));
        assert!(matches!(
            global_align(b"ACGT", b"", &scoring).unwrap_err(),
            FluError::EmptyAlignment("query")
        ));
    }

    #[test]
    fn positive_gap_scores_are_rejected() {
        let scoring = AlignmentScoring {
            gap_open: 2,
            ..Default::default()
        };
        assert!(matches!(
            global_align(b"ACGT", b"ACGT", &scoring).unwrap_err(),
            FluError::Config(_)
        ));
    }

    proptest! {
        #[test]
        fn aligning_a_sequence_to_itself_finds_nothing(seq in "[ACGTacgt]{1,200}") {
            let pair = global_align(seq.as_bytes(), seq.as_bytes(), &AlignmentScoring::default())
                .unwrap();
            let upper = seq.to_ascii_uppercase().into_bytes();
            prop_assert_eq!(pair.ref_track(), upper.as_slice());
            prop_assert_eq!(pair.query_track(), upper.as_slice());
            prop_assert!(diff(&pair).is_empty());
        }
    }
}
