//! Standard genetic code lookup.
//!
//! [`CodonTable`] maps a three-base string to a one-letter amino acid symbol.
//! Stop codons translate to [`STOP`]; any triplet that is not three concrete
//! `A`/`C`/`G`/`T` bases (including one carrying an `N` placeholder)
//! translates to [`UNKNOWN_AA`]. Translation never fails.

/// Symbol emitted for stop codons.
pub const STOP: u8 = b'*';

/// Symbol emitted for triplets that do not resolve to an amino acid.
pub const UNKNOWN_AA: u8 = b'X';

#[inline]
const fn base_index(base: u8) -> Option<usize> {
    match base {
        b'A' | b'a' => Some(0),
        b'C' | b'c' => Some(1),
        b'G' | b'g' => Some(2),
        b'T' | b't' => Some(3),
        _ => None,
    }
}

/// NCBI translation table 1, indexed by `first * 16 + second * 4 + third`
/// with A=0, C=1, G=2, T=3.
#[rustfmt::skip]
const STANDARD: [u8; 64] = [
    b'K', b'N', b'K', b'N',  // AA*
    b'T', b'T', b'T', b'T',  // AC*
    b'R', b'S', b'R', b'S',  // AG*
    b'I', b'I', b'M', b'I',  // AT*
    b'Q', b'H', b'Q', b'H',  // CA*
    b'P', b'P', b'P', b'P',  // CC*
    b'R', b'R', b'R', b'R',  // CG*
    b'L', b'L', b'L', b'L',  // CT*
    b'E', b'D', b'E', b'D',  // GA*
    b'A', b'A', b'A', b'A',  // GC*
    b'G', b'G', b'G', b'G',  // GG*
    b'V', b'V', b'V', b'V',  // GT*
    b'*', b'Y', b'*', b'Y',  // TA*
    b'S', b'S', b'S', b'S',  // TC*
    b'*', b'C', b'W', b'C',  // TG*
    b'L', b'F', b'L', b'F',  // TT*
];

/// Codon to amino acid lookup table.
#[derive(Debug, Clone, Copy)]
pub struct CodonTable {
    table: &'static [u8; 64],
}

impl Default for CodonTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl CodonTable {
    /// The standard genetic code.
    pub const fn standard() -> Self {
        Self { table: &STANDARD }
    }

    /// Translate a codon. Anything other than exactly three concrete bases is [`UNKNOWN_AA`].
    #[inline]
    pub fn translate(&self, codon: &[u8]) -> u8 {
        let [first, second, third] = codon else {
            return UNKNOWN_AA;
        };
        match (base_index(*first), base_index(*second), base_index(*third)) {
            (Some(a), Some(b), Some(c)) => self.table[a * 16 + b * 4 + c],
            _ => UNKNOWN_AA,
        }
    }

    /// `true` when the codon translates to a stop.
    #[inline]
    pub fn is_stop(&self, codon: &[u8]) -> bool {
        self.translate(codon) == STOP
    }
}
