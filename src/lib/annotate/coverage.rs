//! Segment completeness.
//!
//! Coverage is `(expected_length - n_count) / expected_length * 100`, where the
//! expected length is a fixed constant per influenza segment family and falls
//! back to the observed sequence length when the family is not recognised.
//! Downstream QC thresholds are calibrated against the fixed constants, so the
//! denominator must not be replaced by the sequence length for known families.

use serde::Serialize;

/// Influenza segment families with a fixed expected length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentFamily {
    Ha,
    Na,
    Pb2,
    Pb1,
    Pa,
    Np,
    Ns,
    M,
}

impl SegmentFamily {
    /// Families in detection order.
    pub const DETECTION_ORDER: [SegmentFamily; 8] = [
        SegmentFamily::Ha,
        SegmentFamily::Na,
        SegmentFamily::Pb2,
        SegmentFamily::Pb1,
        SegmentFamily::Pa,
        SegmentFamily::Np,
        SegmentFamily::Ns,
        SegmentFamily::M,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            SegmentFamily::Ha => "HA",
            SegmentFamily::Na => "NA",
            SegmentFamily::Pb2 => "PB2",
            SegmentFamily::Pb1 => "PB1",
            SegmentFamily::Pa => "PA",
            SegmentFamily::Np => "NP",
            SegmentFamily::Ns => "NS",
            SegmentFamily::M => "M",
        }
    }

    pub fn expected_length(self) -> usize {
        match self {
            SegmentFamily::Ha => 1800,
            SegmentFamily::Na => 1450,
            SegmentFamily::Pb2 => 2400,
            SegmentFamily::Pb1 => 2400,
            SegmentFamily::Pa => 2300,
            SegmentFamily::Np => 1600,
            SegmentFamily::Ns => 920,
            SegmentFamily::M => 1100,
        }
    }

    /// Family for a single name token. `MP` is accepted for `M`.
    fn from_token(token: &str) -> Option<SegmentFamily> {
        if token.eq_ignore_ascii_case("MP") {
            return Some(SegmentFamily::M);
        }
        Self::DETECTION_ORDER
            .into_iter()
            .find(|family| token.eq_ignore_ascii_case(family.tag()))
    }

    /// Family named by a whole token of the segment name, case-insensitively.
    ///
    /// The name is split on non-alphanumeric separators, so `A_HA_H3` and
    /// `ha` are HA while `SAMPLE` or `segment9` are not recognised. When
    /// several tokens name a family, the first one in detection order wins.
    pub fn detect(segment_name: &str) -> Option<SegmentFamily> {
        let tokens: Vec<SegmentFamily> = segment_name
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter_map(Self::from_token)
            .collect();
        Self::DETECTION_ORDER
            .into_iter()
            .find(|family| tokens.contains(family))
    }
}

/// Denominator used for a segment: the family constant, or the observed
/// length for unrecognised segments.
pub fn expected_length(sequence: &[u8], segment_name: &str) -> usize {
    SegmentFamily::detect(segment_name).map_or(sequence.len(), SegmentFamily::expected_length)
}

/// Number of `N`/`n` symbols.
pub fn ambiguous_bases(sequence: &[u8]) -> usize {
    sequence
        .iter()
        .filter(|b| b.eq_ignore_ascii_case(&b'N'))
        .count()
}

/// Percentage of the expected segment length not covered by ambiguous bases.
///
/// An unrecognised segment with an empty sequence has nothing to measure and
/// reports `0.0`.
pub fn coverage(sequence: &[u8], segment_name: &str) -> f64 {
    let length = expected_length(sequence, segment_name);
    if length == 0 {
        return 0.0;
    }
    let n_count = ambiguous_bases(sequence);
    (length as f64 - n_count as f64) / length as f64 * 100.0
}

/// One coverage row per sequence.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CoverageRecord {
    #[serde(rename = "Sample")]
    pub sample: String,
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Segment")]
    pub segment: String,
    #[serde(rename = "Coverage")]
    pub coverage: f64,
}
