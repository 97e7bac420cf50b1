//! Pileup consensus and codon translation.
//!
//! [`PileupConsensusEngine`] accumulates [`PileupColumn`]s keyed by
//! `(source, reference, position)`, calls a majority consensus base per
//! column, groups consecutive positions into codons and translates them with
//! a [`CodonTable`].
//!
//! Positions map to codons arithmetically: `codon_index = (position - 1) / 3 + 1`
//! and `frame = (position - 1) % 3`. A codon exists once any of its three
//! positions has been ingested; frames never ingested read as `N`.
//!
//! State is partitioned by source. [`PileupConsensusEngine::freeze`] closes a
//! source once its file has been fully scanned, translating its codons; no
//! further columns are accepted for it afterwards.

use crate::annotate::codon::CodonTable;
use crate::core::error::{FluError, Result};
use crate::engine::position::pileup_position::Label;
use crate::engine::position::{Base, BaseCounts, ColumnKey, PileupColumn};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use std::collections::BTreeMap;

/// Candidate bases for a consensus call, highest tie-break priority first.
///
/// `N` is never a candidate.
pub const CONSENSUS_PRIORITY: [Base; 4] = [Base::A, Base::T, Base::C, Base::G];

/// Majority base at a position, or `Undefined` when no A/T/C/G was observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsensusCall {
    Base(Base),
    #[default]
    Undefined,
}

impl ConsensusCall {
    /// Priority-ordered argmax over [`CONSENSUS_PRIORITY`]; the first base in
    /// priority order wins a tie.
    pub fn from_counts(counts: &BaseCounts) -> Self {
        let mut best: Option<(Base, u32)> = None;
        for base in CONSENSUS_PRIORITY {
            let count = counts.get(base);
            if count == 0 {
                continue;
            }
            match best {
                Some((_, top)) if top >= count => {}
                _ => best = Some((base, count)),
            }
        }
        best.map_or(ConsensusCall::Undefined, |(base, _)| ConsensusCall::Base(base))
    }

    /// The called base, `N` when undefined.
    #[inline]
    pub fn as_byte(self) -> u8 {
        match self {
            ConsensusCall::Base(base) => base.as_byte(),
            ConsensusCall::Undefined => b'N',
        }
    }
}

/// Codon index (1-based) and frame (0, 1, 2) of a 1-based position.
#[inline]
pub fn codon_coordinates(position: u32) -> (u32, usize) {
    debug_assert!(position >= 1, "positions are 1-based");
    let offset = position.saturating_sub(1);
    (offset / 3 + 1, (offset % 3) as usize)
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CodonKey {
    pub source: Label,
    pub reference: Label,
    pub codon_index: u32,
}

impl CodonKey {
    pub fn new(source: &str, reference: &str, codon_index: u32) -> Self {
        Self {
            source: Label::from(source),
            reference: Label::from(reference),
            codon_index,
        }
    }

    fn containing(key: &ColumnKey) -> (Self, usize) {
        let (codon_index, frame) = codon_coordinates(key.position);
        (
            Self {
                source: key.source.clone(),
                reference: key.reference.clone(),
                codon_index,
            },
            frame,
        )
    }
}

/// A codon's triplet and its amino acid symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Translation {
    pub triplet: [u8; 3],
    pub amino_acid: u8,
}

impl Translation {
    pub fn triplet_str(&self) -> String {
        String::from_utf8_lossy(&self.triplet).into_owned()
    }

    pub fn amino_acid_char(&self) -> char {
        self.amino_acid as char
    }
}

/// Three consensus slots, one per frame.
#[derive(Debug, Clone, Default)]
struct Codon {
    slots: [ConsensusCall; 3],
    translation: Option<Translation>,
}

impl Codon {
    fn triplet(&self) -> [u8; 3] {
        [
            self.slots[0].as_byte(),
            self.slots[1].as_byte(),
            self.slots[2].as_byte(),
        ]
    }

    fn translate(&self, table: &CodonTable) -> Translation {
        let triplet = self.triplet();
        Translation {
            triplet,
            amino_acid: table.translate(&triplet),
        }
    }
}

/// Wide per-position output row.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DepthRecord {
    #[serde(rename = "MetaID")]
    pub meta_id: String,
    #[serde(rename = "BAM")]
    pub source: Label,
    #[serde(rename = "Reference")]
    pub reference: Label,
    #[serde(rename = "Position")]
    pub position: u32,
    #[serde(rename = "TotalDepth")]
    pub total_depth: u32,
    #[serde(rename = "A_Count")]
    pub a_count: u32,
    #[serde(rename = "T_Count")]
    pub t_count: u32,
    #[serde(rename = "C_Count")]
    pub c_count: u32,
    #[serde(rename = "G_Count")]
    pub g_count: u32,
    #[serde(rename = "N_Count")]
    pub n_count: u32,
    #[serde(rename = "A_Ratio")]
    pub a_ratio: f64,
    #[serde(rename = "T_Ratio")]
    pub t_ratio: f64,
    #[serde(rename = "C_Ratio")]
    pub c_ratio: f64,
    #[serde(rename = "G_Ratio")]
    pub g_ratio: f64,
    #[serde(rename = "N_Ratio")]
    pub n_ratio: f64,
    #[serde(rename = "CodonIndex")]
    pub codon_index: u32,
    #[serde(rename = "Codon")]
    pub codon: String,
    #[serde(rename = "AA")]
    pub amino_acid: char,
}

/// Long-format output row: one per (position, base).
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LongDepthRecord {
    #[serde(rename = "MetaID")]
    pub meta_id: String,
    #[serde(rename = "BAM")]
    pub source: Label,
    #[serde(rename = "Reference")]
    pub reference: Label,
    #[serde(rename = "Position")]
    pub position: u32,
    #[serde(rename = "Base")]
    pub base: char,
    #[serde(rename = "Ratio")]
    pub ratio: f64,
    #[serde(rename = "CodonIndex")]
    pub codon_index: u32,
    /// 1-based frame within the codon.
    #[serde(rename = "Frame")]
    pub frame: u8,
    #[serde(rename = "Codon")]
    pub codon: String,
    #[serde(rename = "AA")]
    pub amino_acid: char,
    #[serde(rename = "RefPos")]
    pub ref_pos: String,
}

impl DepthRecord {
    /// Split into one long row per consensus candidate base.
    pub fn to_long(&self) -> Vec<LongDepthRecord> {
        let (_, frame) = codon_coordinates(self.position);
        let ratios = [self.a_ratio, self.t_ratio, self.c_ratio, self.g_ratio];
        CONSENSUS_PRIORITY
            .iter()
            .zip(ratios)
            .map(|(base, ratio)| LongDepthRecord {
                meta_id: self.meta_id.clone(),
                source: self.source.clone(),
                reference: self.reference.clone(),
                position: self.position,
                base: base.as_char(),
                ratio,
                codon_index: self.codon_index,
                frame: frame as u8 + 1,
                codon: self.codon.clone(),
                amino_acid: self.amino_acid,
                ref_pos: format!("{}-{}", self.reference, self.position),
            })
            .collect()
    }
}

/// Running per-position tallies with consensus and codon assembly.
#[derive(Debug)]
pub struct PileupConsensusEngine {
    meta_id: String,
    table: CodonTable,
    columns: BTreeMap<ColumnKey, BaseCounts>,
    codons: FxHashMap<CodonKey, Codon>,
    frozen: FxHashSet<Label>,
}

impl PileupConsensusEngine {
    pub fn new(meta_id: &str) -> Self {
        Self::with_table(meta_id, CodonTable::standard())
    }

    pub fn with_table(meta_id: &str, table: CodonTable) -> Self {
        Self {
            meta_id: meta_id.to_string(),
            table,
            columns: BTreeMap::new(),
            codons: FxHashMap::default(),
            frozen: FxHashSet::default(),
        }
    }

    /// Fold a column's counts into the running tally for its key and refresh
    /// the consensus slot of the codon it belongs to.
    pub fn ingest(&mut self, column: PileupColumn) -> Result<()> {
        let PileupColumn { key, counts } = column;
        if self.frozen.contains(&key.source) {
            return Err(FluError::SourceFrozen(key.source.to_string()));
        }

        let (codon_key, frame) = CodonKey::containing(&key);
        let tally = self.columns.entry(key).or_default();
        tally.merge(&counts);
        let call = ConsensusCall::from_counts(tally);

        self.codons.entry(codon_key).or_default().slots[frame] = call;
        Ok(())
    }

    /// Tally at a position, if it was ever ingested.
    pub fn counts(&self, key: &ColumnKey) -> Option<&BaseCounts> {
        self.columns.get(key)
    }

    /// Consensus at a position; `Undefined` for positions never ingested.
    pub fn consensus(&self, key: &ColumnKey) -> ConsensusCall {
        self.columns
            .get(key)
            .map_or(ConsensusCall::Undefined, ConsensusCall::from_counts)
    }

    /// Triplet and amino acid of a materialized codon.
    ///
    /// Frozen sources return the translation fixed at freeze time; open
    /// sources are translated from the current slots.
    pub fn codon(&self, key: &CodonKey) -> Option<Translation> {
        self.codons.get(key).map(|codon| {
            codon
                .translation
                .unwrap_or_else(|| codon.translate(&self.table))
        })
    }

    /// Close a source: translate each of its codons once and reject further
    /// ingestion for it.
    pub fn freeze(&mut self, source: &str) {
        let table = self.table;
        for (key, codon) in self.codons.iter_mut() {
            if key.source.as_str() == source && codon.translation.is_none() {
                codon.translation = Some(codon.translate(&table));
            }
        }
        self.frozen.insert(Label::from(source));
    }

    pub fn is_frozen(&self, source: &str) -> bool {
        self.frozen.contains(source)
    }

    /// Sources with at least one ingested column, in key order.
    pub fn sources(&self) -> Vec<Label> {
        let mut sources: Vec<Label> = self.columns.keys().map(|k| k.source.clone()).collect();
        sources.dedup();
        sources
    }

    /// Per-position rows for one source, ordered by reference then position.
    pub fn export(&self, source: &str) -> Vec<DepthRecord> {
        let start = ColumnKey::new(source, "", 0);
        self.columns
            .range(start..)
            .take_while(|(key, _)| key.source.as_str() == source)
            .map(|(key, counts)| self.record(key, counts))
            .collect()
    }

    fn record(&self, key: &ColumnKey, counts: &BaseCounts) -> DepthRecord {
        let (codon_index, _) = codon_coordinates(key.position);
        let codon_key = CodonKey {
            source: key.source.clone(),
            reference: key.reference.clone(),
            codon_index,
        };
        let translation = self.codon(&codon_key).unwrap_or_else(|| Codon::default().translate(&self.table));

        DepthRecord {
            meta_id: self.meta_id.clone(),
            source: key.source.clone(),
            reference: key.reference.clone(),
            position: key.position,
            total_depth: counts.total(),
            a_count: counts.a,
            t_count: counts.t,
            c_count: counts.c,
            g_count: counts.g,
            n_count: counts.n,
            a_ratio: counts.ratio(Base::A),
            t_ratio: counts.ratio(Base::T),
            c_ratio: counts.ratio(Base::C),
            g_ratio: counts.ratio(Base::G),
            n_ratio: counts.ratio(Base::N),
            codon_index,
            codon: translation.triplet_str(),
            amino_acid: translation.amino_acid_char(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotate::codon::UNKNOWN_AA;
    use proptest::prelude::*;

    fn column(source: &str, position: u32, counts: BaseCounts) -> PileupColumn {
        PileupColumn {
            key: ColumnKey::new(source, "HA", position),
            counts,
        }
    }

    fn only(base: Base, count: u32) -> BaseCounts {
        let mut counts = BaseCounts::default();
        counts.add(base, count);
        counts
    }

    #[test]
    fn majority_base_wins() {
        let counts = BaseCounts {
            a: 8,
            c: 2,
            ..Default::default()
        };
        assert_eq!(ConsensusCall::from_counts(&counts), ConsensusCall::Base(Base::A));
        assert_eq!(counts.ratio(Base::A), 0.8);
    }

    #[test]
    fn ties_follow_priority_order() {
        let all_equal = BaseCounts {
            a: 3,
            t: 3,
            c: 3,
            g: 3,
            n: 0,
        };
        assert_eq!(ConsensusCall::from_counts(&all_equal), ConsensusCall::Base(Base::A));

        let t_c_g = BaseCounts {
            t: 2,
            c: 2,
            g: 2,
            ..Default::default()
        };
        assert_eq!(ConsensusCall::from_counts(&t_c_g), ConsensusCall::Base(Base::T));

        let c_g = BaseCounts {
            c: 5,
            g: 5,
            a: 1,
            ..Default::default()
        };
        assert_eq!(ConsensusCall::from_counts(&c_g), ConsensusCall::Base(Base::C));
    }

    #[test]
    fn n_is_never_called() {
        let mostly_n = BaseCounts {
            n: 50,
            g: 1,
            ..Default::default()
        };
        assert_eq!(ConsensusCall::from_counts(&mostly_n), ConsensusCall::Base(Base::G));
        assert_eq!(
            ConsensusCall::from_counts(&only(Base::N, 7)),
            ConsensusCall::Undefined
        );
    }

    #[test]
    fn zero_depth_is_undefined_not_an_error() {
        let counts = BaseCounts::default();
        assert_eq!(ConsensusCall::from_counts(&counts), ConsensusCall::Undefined);
        assert_eq!(ConsensusCall::Undefined.as_byte(), b'N');
        for base in Base::ALL {
            assert_eq!(counts.ratio(base), 0.0);
        }
    }

    #[test]
    fn codon_coordinates_are_pure_arithmetic() {
        assert_eq!(codon_coordinates(1), (1, 0));
        assert_eq!(codon_coordinates(3), (1, 2));
        assert_eq!(codon_coordinates(4), (2, 0));
        assert_eq!(codon_coordinates(13), (5, 0));
        assert_eq!(codon_coordinates(15), (5, 2));
    }

    #[test]
    fn assembles_and_translates_a_codon() {
        let mut engine = PileupConsensusEngine::new("INF001");
        engine.ingest(column("S01.bam", 13, only(Base::A, 4))).unwrap();
        engine.ingest(column("S01.bam", 14, only(Base::T, 4))).unwrap();
        engine.ingest(column("S01.bam", 15, only(Base::G, 4))).unwrap();

        let translation = engine.codon(&CodonKey::new("S01.bam", "HA", 5)).unwrap();
        assert_eq!(translation.triplet_str(), "ATG");
        assert_eq!(translation.amino_acid_char(), 'M');
    }

    #[test]
    fn missing_frames_translate_as_unknown() {
        let mut engine = PileupConsensusEngine::new("INF001");
        engine.ingest(column("S01.bam", 2, only(Base::T, 1))).unwrap();

        let translation = engine.codon(&CodonKey::new("S01.bam", "HA", 1)).unwrap();
        assert_eq!(&translation.triplet, b"NTN");
        assert_eq!(translation.amino_acid, UNKNOWN_AA);
        assert!(engine.codon(&CodonKey::new("S01.bam", "HA", 2)).is_none());
    }

    #[test]
    fn ingestion_accumulates_and_updates_consensus() {
        let mut engine = PileupConsensusEngine::new("INF001");
        engine.ingest(column("S01.bam", 1, only(Base::C, 2))).unwrap();
        engine.ingest(column("S01.bam", 1, only(Base::G, 3))).unwrap();

        let key = ColumnKey::new("S01.bam", "HA", 1);
        assert_eq!(engine.counts(&key).unwrap().total(), 5);
        assert_eq!(engine.consensus(&key), ConsensusCall::Base(Base::G));
        assert_eq!(
            engine.consensus(&ColumnKey::new("S01.bam", "HA", 99)),
            ConsensusCall::Undefined
        );
    }

    #[test]
    fn frozen_sources_reject_columns_but_others_continue() {
        let mut engine = PileupConsensusEngine::new("INF001");
        engine.ingest(column("S01.bam", 1, only(Base::A, 1))).unwrap();
        engine.freeze("S01.bam");

        assert!(engine.is_frozen("S01.bam"));
        let err = engine
            .ingest(column("S01.bam", 2, only(Base::A, 1)))
            .unwrap_err();
        assert!(matches!(err, FluError::SourceFrozen(ref s) if s == "S01.bam"));

        engine.ingest(column("S02.bam", 1, only(Base::T, 1))).unwrap();
        assert_eq!(engine.export("S02.bam").len(), 1);
    }

    #[test]
    fn freezing_fixes_the_translation() {
        let mut engine = PileupConsensusEngine::new("INF001");
        for (pos, base) in [(1, Base::T), (2, Base::A), (3, Base::A)] {
            engine.ingest(column("S01.bam", pos, only(base, 1))).unwrap();
        }
        engine.freeze("S01.bam");
        let translation = engine.codon(&CodonKey::new("S01.bam", "HA", 1)).unwrap();
        assert_eq!(translation.triplet_str(), "TAA");
        assert_eq!(translation.amino_acid_char(), '*');
    }

    #[test]
    fn export_rows_carry_counts_ratios_and_codon() {
        let mut engine = PileupConsensusEngine::new("INF001");
        let counts = BaseCounts {
            a: 8,
            c: 2,
            ..Default::default()
        };
        engine.ingest(column("S01.bam", 1, counts)).unwrap();
        engine.ingest(column("S01.bam", 2, only(Base::T, 5))).unwrap();
        engine.ingest(column("S01.bam", 3, BaseCounts::default())).unwrap();
        engine.ingest(column("S02.bam", 1, only(Base::G, 1))).unwrap();
        engine.freeze("S01.bam");

        let rows = engine.export("S01.bam");
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.source.as_str() == "S01.bam"));

        let first = &rows[0];
        assert_eq!(first.meta_id, "INF001");
        assert_eq!(first.position, 1);
        assert_eq!(first.total_depth, 10);
        assert_eq!(first.a_count, 8);
        assert_eq!(first.a_ratio, 0.8);
        assert_eq!(first.c_ratio, 0.2);
        assert_eq!(first.codon_index, 1);
        assert_eq!(first.codon, "ATN");
        assert_eq!(first.amino_acid, 'X');

        let empty = &rows[2];
        assert_eq!(empty.total_depth, 0);
        assert_eq!(empty.n_ratio, 0.0);
        assert_eq!(empty.codon, "ATN");
    }

    #[test]
    fn export_is_position_ordered_within_reference() {
        let mut engine = PileupConsensusEngine::new("INF001");
        for pos in [9, 2, 5, 1] {
            engine.ingest(column("S01.bam", pos, only(Base::A, 1))).unwrap();
        }
        let positions: Vec<u32> = engine.export("S01.bam").iter().map(|r| r.position).collect();
        assert_eq!(positions, vec![1, 2, 5, 9]);
        assert_eq!(engine.sources(), vec![Label::from("S01.bam")]);
    }

    #[test]
    fn long_rows_expand_each_candidate_base() {
        let mut engine = PileupConsensusEngine::new("INF001");
        engine.ingest(column("S01.bam", 5, only(Base::C, 4))).unwrap();
        let rows = engine.export("S01.bam")[0].to_long();

        let bases: Vec<char> = rows.iter().map(|r| r.base).collect();
        assert_eq!(bases, vec!['A', 'T', 'C', 'G']);
        assert_eq!(rows[2].ratio, 1.0);
        assert!(rows.iter().all(|r| r.frame == 2 && r.codon_index == 2));
        assert_eq!(rows[0].ref_pos, "HA-5");
        assert_eq!(rows[0].codon, "NCN");
    }

    proptest! {
        #[test]
        fn ratios_sum_to_one_or_zero(a in 0u32..500, t in 0u32..500, c in 0u32..500, g in 0u32..500, n in 0u32..500) {
            let counts = BaseCounts { a, t, c, g, n };
            let sum: f64 = Base::ALL.iter().map(|&b| counts.ratio(b)).sum();
            if counts.total() == 0 {
                prop_assert_eq!(sum, 0.0);
            } else {
                prop_assert!((sum - 1.0).abs() < 1e-9);
            }
        }

        #[test]
        fn consensus_count_is_maximal(a in 0u32..50, t in 0u32..50, c in 0u32..50, g in 0u32..50) {
            let counts = BaseCounts { a, t, c, g, n: 0 };
            match ConsensusCall::from_counts(&counts) {
                ConsensusCall::Base(base) => {
                    let best = counts.get(base);
                    for other in CONSENSUS_PRIORITY {
                        prop_assert!(counts.get(other) <= best);
                    }
                }
                ConsensusCall::Undefined => prop_assert_eq!(a + t + c + g, 0),
            }
        }
    }
}
