use bio::io::fasta;
use fluannot_lib::annotate::diff::GAP;
use fluannot_lib::annotate::{
    diff, global_align, render_tokens, AlignedPair, AlignmentScoring, ReferenceSequence,
};
use fluannot_lib::core::error::{FluError, Result};
use serde::Serialize;

use crate::commands::common::sample_from_id;

/// Value of `Frameshift` when the query carries no `X`.
pub const NO_FRAMESHIFT: &str = "N.A.";

/// One output row per (query, reference) pair.
///
/// `Frameshift` is only serialized when requested, so a default run writes
/// exactly `Sample,Differences`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MutationRecord {
    #[serde(rename = "Sample")]
    pub sample: String,
    #[serde(rename = "Differences")]
    pub differences: String,
    /// 1-based index of the first `X` in the query, or `N.A.`.
    #[serde(rename = "Frameshift", skip_serializing_if = "Option::is_none")]
    pub frameshift: Option<String>,
}

impl MutationRecord {
    fn new(id: &str, pair: &AlignedPair, frameshift_query: Option<&[u8]>) -> Self {
        MutationRecord {
            sample: sample_from_id(id).to_string(),
            differences: render_tokens(&diff(pair)),
            frameshift: frameshift_query.map(frameshift_hint),
        }
    }
}

/// Position of the first frameshift marker `X` (1-based).
pub fn frameshift_hint(query: &[u8]) -> String {
    query
        .iter()
        .position(|b| b.eq_ignore_ascii_case(&b'X'))
        .map_or_else(|| NO_FRAMESHIFT.to_string(), |i| (i + 1).to_string())
}

/// Aligns queries against a fixed reference set and diffs them.
pub struct MutationCaller {
    references: Vec<ReferenceSequence>,
    scoring: AlignmentScoring,
    frameshift: bool,
}

impl MutationCaller {
    pub fn new(references: Vec<ReferenceSequence>, scoring: AlignmentScoring) -> Self {
        Self {
            references,
            scoring,
            frameshift: false,
        }
    }

    /// Also report the frameshift hint column.
    pub fn with_frameshift(mut self, frameshift: bool) -> Self {
        self.frameshift = frameshift;
        self
    }

    /// One row per reference record. Any contract violation fails the whole query.
    pub fn call(&self, query: &fasta::Record) -> Result<Vec<MutationRecord>> {
        self.references
            .iter()
            .map(|reference| {
                log::trace!("Aligning {} against {}", query.id(), reference.id);
                let pair = global_align(&reference.seq, query.seq(), &self.scoring)?;
                let hint = self.frameshift.then(|| query.seq());
                Ok(MutationRecord::new(query.id(), &pair, hint))
            })
            .collect()
    }
}

/// Split a pre-aligned FASTA into its reference track and query records.
pub fn split_pre_aligned(records: Vec<fasta::Record>) -> Result<(fasta::Record, Vec<fasta::Record>)> {
    let mut records = records.into_iter();
    let reference = records
        .next()
        .ok_or_else(|| FluError::InvalidInput("pre-aligned input has no records".to_string()))?;
    Ok((reference, records.collect()))
}

/// Diff one gapped query track against the gapped reference track.
pub fn call_pre_aligned(
    reference: &fasta::Record,
    query: &fasta::Record,
    frameshift: bool,
) -> Result<MutationRecord> {
    let pair = AlignedPair::new(reference.seq(), query.seq())?;
    if !frameshift {
        return Ok(MutationRecord::new(query.id(), &pair, None));
    }
    let ungapped: Vec<u8> = query.seq().iter().copied().filter(|&b| b != GAP).collect();
    Ok(MutationRecord::new(query.id(), &pair, Some(&ungapped)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fluannot_lib::annotate::NO_MUTATIONS;

    fn record(id: &str, seq: &str) -> fasta::Record {
        fasta::Record::with_attrs(id, None, seq.as_bytes())
    }

    #[test]
    fn frameshift_hint_is_one_based() {
        assert_eq!(frameshift_hint(b"ACGXTX"), "4");
        assert_eq!(frameshift_hint(b"ACGT"), NO_FRAMESHIFT);
    }

    #[test]
    fn caller_emits_one_row_per_reference() {
        let caller = MutationCaller::new(
            vec![
                ReferenceSequence {
                    id: "ref1".into(),
                    seq: b"ACGTACGT".to_vec(),
                },
                ReferenceSequence {
                    id: "ref2".into(),
                    seq: b"ACGAACGT".to_vec(),
                },
            ],
            AlignmentScoring::default(),
        );
        let rows = caller.call(&record("INF001|HA", "ACGTACGT")).unwrap();
        assert_eq!(
            rows,
            vec![
                MutationRecord {
                    sample: "INF001".into(),
                    differences: NO_MUTATIONS.into(),
                    frameshift: None,
                },
                MutationRecord {
                    sample: "INF001".into(),
                    differences: "A4T".into(),
                    frameshift: None,
                },
            ]
        );
    }

    #[test]
    fn frameshift_column_is_opt_in() {
        let caller = MutationCaller::new(
            vec![ReferenceSequence {
                id: "ref".into(),
                seq: b"ACGTACGT".to_vec(),
            }],
            AlignmentScoring::default(),
        )
        .with_frameshift(true);
        let rows = caller.call(&record("INF001|HA", "ACGTACGT")).unwrap();
        assert_eq!(rows[0].frameshift.as_deref(), Some(NO_FRAMESHIFT));

        let (reference, queries) =
            split_pre_aligned(vec![record("ref", "ACGT-"), record("S1", "AC-TX")]).unwrap();
        let row = call_pre_aligned(&reference, &queries[0], true).unwrap();
        assert_eq!(row.frameshift.as_deref(), Some("4"));
        let row = call_pre_aligned(&reference, &queries[0], false).unwrap();
        assert_eq!(row.frameshift, None);
    }

    #[test]
    fn empty_query_fails_the_unit() {
        let caller = MutationCaller::new(
            vec![ReferenceSequence {
                id: "ref".into(),
                seq: b"ACGT".to_vec(),
            }],
            AlignmentScoring::default(),
        );
        assert!(matches!(
            caller.call(&record("S1", "")).unwrap_err(),
            FluError::EmptyAlignment("query")
        ));
    }

    #[test]
    fn pre_aligned_tracks_are_diffed_directly() {
        let (reference, queries) = split_pre_aligned(vec![
            record("ref", "AC-GT"),
            record("S1|HA", "ACTGT"),
            record("S2|HA", "ACTAT"),
        ])
        .unwrap();
        let rows: Vec<String> = queries
            .iter()
            .map(|q| call_pre_aligned(&reference, q, false).unwrap().differences)
            .collect();
        assert_eq!(rows, vec!["ins3T".to_string(), "ins3T;G3A".to_string()]);
    }

    #[test]
    fn pre_aligned_length_mismatch_is_rejected() {
        let reference = record("ref", "ACGT");
        assert!(matches!(
            call_pre_aligned(&reference, &record("S1", "ACG"), false).unwrap_err(),
            FluError::AlignmentLength { .. }
        ));
    }

    #[test]
    fn pre_aligned_input_needs_a_reference_record() {
        assert!(split_pre_aligned(Vec::new()).is_err());
    }
}
