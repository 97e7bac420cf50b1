//! Pairwise alignment differencing.
//!
//! [`diff`] walks the columns of an [`AlignedPair`] left to right and emits
//! [`MutationToken`]s anchored in 1-based coordinates of the ungapped
//! reference. Each column falls into exactly one class:
//!
//! | reference | query | class        | emits                    | advances `ref_pos` |
//! |-----------|-------|--------------|--------------------------|--------------------|
//! | `-`       | base  | insertion    | `Insertion` (or extends) | no                 |
//! | base      | `-`   | deletion     | `Deletion`               | yes                |
//! | base      | other | substitution | `Substitution`           | yes                |
//! | base      | same  | match        | nothing                  | yes                |
//!
//! Consecutive insertion columns share an anchor and merge into one token.

use crate::core::error::{FluError, Result};
use itertools::Itertools;
use std::fmt;

/// Gap symbol in both alignment tracks.
pub const GAP: u8 = b'-';

/// Rendering of an empty token list.
pub const NO_MUTATIONS: &str = "No mutations found";

/// A completed global alignment of a reference and a query.
///
/// Both tracks are upper-cased on construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignedPair {
    ref_track: Vec<u8>,
    query_track: Vec<u8>,
}

impl AlignedPair {
    /// Validate and wrap an aligned reference/query pair.
    ///
    /// Rejects empty tracks, tracks of different length and any column that
    /// aligns a gap to a gap.
    pub fn new(ref_track: impl Into<Vec<u8>>, query_track: impl Into<Vec<u8>>) -> Result<Self> {
        let mut ref_track = ref_track.into();
        let mut query_track = query_track.into();

        if ref_track.is_empty() {
            return Err(FluError::EmptyAlignment("reference"));
        }
        if query_track.is_empty() {
            return Err(FluError::EmptyAlignment("query"));
        }
        if ref_track.len() != query_track.len() {
            return Err(FluError::AlignmentLength {
                reference: ref_track.len(),
                query: query_track.len(),
            });
        }
        if let Some(column) = ref_track
            .iter()
            .zip(&query_track)
            .position(|(&r, &q)| r == GAP && q == GAP)
        {
            return Err(FluError::GapColumn(column + 1));
        }

        ref_track.make_ascii_uppercase();
        query_track.make_ascii_uppercase();
        Ok(Self {
            ref_track,
            query_track,
        })
    }

    pub fn ref_track(&self) -> &[u8] {
        &self.ref_track
    }

    pub fn query_track(&self) -> &[u8] {
        &self.query_track
    }

    /// Number of alignment columns.
    pub fn len(&self) -> usize {
        self.ref_track.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ref_track.is_empty()
    }

    /// Length of the ungapped reference.
    pub fn reference_length(&self) -> usize {
        self.ref_track.iter().filter(|&&b| b != GAP).count()
    }

    fn columns(&self) -> impl Iterator<Item = Column> + '_ {
        self.ref_track
            .iter()
            .zip(&self.query_track)
            .map(|(&r, &q)| Column::classify(r, q))
    }
}

/// One alignment column, tagged by how it moves the reference coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Insertion(u8),
    Deletion(u8),
    Substitution { reference: u8, alternate: u8 },
    Match,
}

impl Column {
    #[inline]
    fn classify(reference: u8, query: u8) -> Self {
        if reference == GAP {
            Column::Insertion(query)
        } else if query == GAP {
            Column::Deletion(reference)
        } else if reference != query {
            Column::Substitution {
                reference,
                alternate: query,
            }
        } else {
            Column::Match
        }
    }

    /// Whether the column consumes a reference base.
    #[inline]
    fn consumes_reference(&self) -> bool {
        !matches!(self, Column::Insertion(_))
    }
}

/// A single difference between query and reference, in 1-based ungapped
/// reference coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationToken {
    Substitution {
        ref_pos: u32,
        ref_base: u8,
        alt_base: u8,
    },
    /// Bases inserted immediately before reference position `ref_pos`.
    Insertion { ref_pos: u32, bases: Vec<u8> },
    Deletion { ref_pos: u32, ref_base: u8 },
}

impl MutationToken {
    pub fn ref_pos(&self) -> u32 {
        match self {
            MutationToken::Substitution { ref_pos, .. }
            | MutationToken::Insertion { ref_pos, .. }
            | MutationToken::Deletion { ref_pos, .. } => *ref_pos,
        }
    }
}

impl fmt::Display for MutationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MutationToken::Substitution {
                ref_pos,
                ref_base,
                alt_base,
            } => write!(f, "{}{}{}", *ref_base as char, ref_pos, *alt_base as char),
            MutationToken::Insertion { ref_pos, bases } => {
                write!(f, "ins{}{}", ref_pos, String::from_utf8_lossy(bases))
            }
            MutationToken::Deletion { ref_pos, ref_base } => {
                write!(f, "del{}{}", ref_pos, *ref_base as char)
            }
        }
    }
}

/// Differences between the query and reference tracks, in column order.
pub fn diff(pair: &AlignedPair) -> Vec<MutationToken> {
    let mut tokens: Vec<MutationToken> = Vec::new();
    let mut ref_pos: u32 = 1;

    for column in pair.columns() {
        match column {
            Column::Insertion(base) => match tokens.last_mut() {
                Some(MutationToken::Insertion { ref_pos: anchor, bases }) if *anchor == ref_pos => {
                    bases.push(base)
                }
                _ => tokens.push(MutationToken::Insertion {
                    ref_pos,
                    bases: vec![base],
                }),
            },
            Column::Deletion(ref_base) => tokens.push(MutationToken::Deletion { ref_pos, ref_base }),
            Column::Substitution {
                reference,
                alternate,
            } => tokens.push(MutationToken::Substitution {
                ref_pos,
                ref_base: reference,
                alt_base: alternate,
            }),
            Column::Match => {}
        }

        if column.consumes_reference() {
            ref_pos += 1;
        }
    }

    tokens
}

/// Join tokens with `;`, or [`NO_MUTATIONS`] when there are none.
pub fn render_tokens(tokens: &[MutationToken]) -> String {
    if tokens.is_empty() {
        NO_MUTATIONS.to_string()
    } else {
        tokens.iter().join(";")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn diff_of(reference: &str, query: &str) -> Vec<MutationToken> {
        diff(&AlignedPair::new(reference, query).unwrap())
    }

    fn rendered(reference: &str, query: &str) -> String {
        render_tokens(&diff_of(reference, query))
    }

    #[test]
    fn single_insertion_does_not_advance_reference() {
        assert_eq!(
            diff_of("AC-GT", "ACTGT"),
            vec![MutationToken::Insertion {
                ref_pos: 3,
                bases: b"T".to_vec()
            }]
        );
    }

    #[test]
    fn single_deletion_is_anchored_at_the_missing_base() {
        assert_eq!(
            diff_of("ACGT", "AC-T"),
            vec![MutationToken::Deletion {
                ref_pos: 3,
                ref_base: b'G'
            }]
        );
    }

    #[test]
    fn substitution_renders_ref_pos_alt() {
        let tokens = diff_of("ACGT", "ACAT");
        assert_eq!(
            tokens,
            vec![MutationToken::Substitution {
                ref_pos: 3,
                ref_base: b'G',
                alt_base: b'A'
            }]
        );
        assert_eq!(render_tokens(&tokens), "G3A");
    }

    #[test]
    fn consecutive_insertion_columns_merge() {
        assert_eq!(rendered("A--CGT", "ATTCGT"), "ins2TT");
    }

    #[test]
    fn consecutive_deletions_have_increasing_positions() {
        assert_eq!(rendered("ACGTA", "A--TA"), "del2C;del3G");
    }

    #[test]
    fn insertions_at_the_edges() {
        assert_eq!(rendered("-ACG", "TACG"), "ins1T");
        assert_eq!(rendered("ACG-", "ACGT"), "ins4T");
    }

    #[test]
    fn insertions_separated_by_a_base_do_not_merge() {
        assert_eq!(rendered("A-C-G", "ATCAG"), "ins2T;ins3A");
    }

    #[test]
    fn mixed_events_keep_reference_coordinates() {
        // ref:   A C G - - T A C G T
        // query: A T G C C T A - G A
        assert_eq!(
            rendered("ACG--TACGT", "ATGCCTA-GA"),
            "C2T;ins4CC;del6C;T8A"
        );
    }

    #[test]
    fn deletion_followed_by_insertion_stays_separate() {
        assert_eq!(rendered("AC-GT", "A-TGT"), "del2C;ins3T");
    }

    #[test]
    fn identity_renders_sentinel() {
        assert_eq!(rendered("ACGTN", "ACGTN"), NO_MUTATIONS);
    }

    #[test]
    fn case_is_ignored() {
        assert_eq!(rendered("acgt", "ACGT"), NO_MUTATIONS);
        assert_eq!(rendered("acgt", "acat"), "G3A");
    }

    #[test]
    fn tokens_are_ordered_by_reference_position() {
        let tokens = diff_of("A-CGTTA-", "AGC-TCAT");
        let positions: Vec<u32> = tokens.iter().map(MutationToken::ref_pos).collect();
        let mut sorted = positions.clone();
        sorted.sort_unstable();
        assert_eq!(positions, sorted);
    }

    #[test]
    fn rejects_length_mismatch() {
        let err = AlignedPair::new("ACGT", "ACG").unwrap_err();
        assert!(matches!(
            err,
            FluError::AlignmentLength {
                reference: 4,
                query: 3
            }
        ));
    }

    #[test]
    fn rejects_empty_tracks() {
        assert!(matches!(
            AlignedPair::new("", "").unwrap_err(),
            FluError::EmptyAlignment("reference")
        ));
        assert!(matches!(
            AlignedPair::new("ACGT", "").unwrap_err(),
            FluError::EmptyAlignment("query")
        ));
    }

    #[test]
    fn rejects_gap_to_gap_columns() {
        assert!(matches!(
            AlignedPair::new("AC-T", "A--T").unwrap_err(),
            FluError::GapColumn(3)
        ));
    }

    #[test]
    fn reference_length_ignores_gaps() {
        let pair = AlignedPair::new("AC--GT", "ACTTGT").unwrap();
        assert_eq!(pair.len(), 6);
        assert_eq!(pair.reference_length(), 4);
    }

    proptest! {
        #[test]
        fn identity_alignment_has_no_mutations(seq in "[ACGTN]{1,300}") {
            let pair = AlignedPair::new(seq.as_bytes(), seq.as_bytes()).unwrap();
            prop_assert!(diff(&pair).is_empty());
        }

        #[test]
        fn positions_never_exceed_reference_length(
            columns in prop::collection::vec((0u8..4, 0u8..5), 1..200)
        ) {
            // 0..4 = base, 4 = gap on the query side; reference gaps are injected by
            // swapping roles on odd columns so gap-to-gap never occurs.
            const BASES: [u8; 4] = *b"ACGT";
            let mut reference = Vec::new();
            let mut query = Vec::new();
            for (i, (r, q)) in columns.into_iter().enumerate() {
                if q == 4 && i % 2 == 1 {
                    reference.push(GAP);
                    query.push(BASES[r as usize]);
                } else if q == 4 {
                    reference.push(BASES[r as usize]);
                    query.push(GAP);
                } else {
                    reference.push(BASES[r as usize]);
                    query.push(BASES[q as usize]);
                }
            }
            let pair = AlignedPair::new(reference, query).unwrap();
            let max_anchor = pair.reference_length() as u32 + 1;
            for token in diff(&pair) {
                prop_assert!(token.ref_pos() >= 1 && token.ref_pos() <= max_anchor);
            }
        }
    }
}
