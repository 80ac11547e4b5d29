// sequence.rs - Validated nucleotide sequences

use std::fmt;
use std::str::FromStr;

use crate::error::{AnalysisError, AnalysisResult};

/// Gap symbol used where one side of a comparison has no base
pub const GAP: char = '-';

/// Index of an uppercase nucleotide (A=0, C=1, G=2, T=3)
#[inline]
pub fn base_index(base: u8) -> Option<usize> {
    match base {
        b'A' => Some(0),
        b'C' => Some(1),
        b'G' => Some(2),
        b'T' => Some(3),
        _ => None,
    }
}

/// A and G are purines, C and T pyrimidines
#[inline]
pub fn is_purine(base: u8) -> bool {
    matches!(base, b'A' | b'G')
}

/// Substitution between two purines or two pyrimidines
#[inline]
pub fn is_transition(from: u8, to: u8) -> bool {
    from != to && is_purine(from) == is_purine(to)
}

/// GC percentage of raw bases, 0 for an empty slice
pub fn gc_percent(bases: &[u8]) -> f64 {
    if bases.is_empty() {
        return 0.0;
    }
    let gc = bases.iter().filter(|&&b| b == b'G' || b == b'C').count();
    gc as f64 / bases.len() as f64 * 100.0
}

/// Nucleotide sequence over {A, C, G, T}, normalized to uppercase.
///
/// Construction is the only place symbols are checked; every analysis routine
/// can rely on the alphabet invariant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Sequence {
    bases: Vec<u8>,
}

impl Sequence {
    /// Parse a sequence, trimming surrounding whitespace and uppercasing.
    ///
    /// Error positions count characters of the trimmed input.
    pub fn parse(raw: &str) -> AnalysisResult<Self> {
        let raw = raw.trim();
        let mut bases = Vec::with_capacity(raw.len());
        for (position, symbol) in raw.chars().enumerate() {
            let upper = symbol.to_ascii_uppercase();
            match u8::try_from(upper).ok().filter(|&b| base_index(b).is_some()) {
                Some(b) => bases.push(b),
                None => return Err(AnalysisError::InvalidSequence { position, symbol }),
            }
        }
        Ok(Self { bases })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bases
    }

    pub fn len(&self) -> usize {
        self.bases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }

    pub fn gc_content(&self) -> f64 {
        gc_percent(&self.bases)
    }

    /// CRC32 checksum of the bases
    pub fn checksum(&self) -> u32 {
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&self.bases);
        hasher.finalize()
    }
}

impl FromStr for Sequence {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Bases are validated ASCII
        f.write_str(&String::from_utf8_lossy(&self.bases))
    }
}

impl AsRef<[u8]> for Sequence {
    fn as_ref(&self) -> &[u8] {
        &self.bases
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalizes_case_and_whitespace() {
        let seq = Sequence::parse("  atcGaT\n").unwrap();
        assert_eq!(seq.as_bytes(), b"ATCGAT");
        assert_eq!(seq.to_string(), "ATCGAT");
        assert_eq!(seq.len(), 6);
    }

    #[test]
    fn test_parse_rejects_invalid_symbol() {
        let err = Sequence::parse("ACGNT").unwrap_err();
        assert_eq!(
            err,
            AnalysisError::InvalidSequence {
                position: 3,
                symbol: 'N'
            }
        );

        assert!(Sequence::parse("AC GT").is_err());
    }

    #[test]
    fn test_parse_reports_non_ascii_symbol_by_character() {
        let err = Sequence::parse("ACé GT").unwrap_err();
        assert_eq!(
            err,
            AnalysisError::InvalidSequence {
                position: 2,
                symbol: 'é'
            }
        );

        let err = Sequence::parse(" µAC").unwrap_err();
        assert_eq!(
            err,
            AnalysisError::InvalidSequence {
                position: 0,
                symbol: 'µ'
            }
        );
    }

    #[test]
    fn test_empty_sequence_is_valid() {
        let seq = Sequence::parse("").unwrap();
        assert!(seq.is_empty());
        assert_eq!(seq.gc_content(), 0.0);
    }

    #[test]
    fn test_gc_content() {
        assert_eq!(Sequence::parse("ATGC").unwrap().gc_content(), 50.0);
        assert_eq!(Sequence::parse("GGCC").unwrap().gc_content(), 100.0);
        assert_eq!(Sequence::parse("ATAT").unwrap().gc_content(), 0.0);
    }

    #[test]
    fn test_transition_partition() {
        assert!(is_transition(b'A', b'G'));
        assert!(is_transition(b'T', b'C'));
        assert!(!is_transition(b'A', b'T'));
        assert!(!is_transition(b'G', b'C'));
        assert!(!is_transition(b'A', b'A'));
    }

    #[test]
    fn test_checksum_is_stable() {
        let a = Sequence::parse("ATCG").unwrap();
        let b = Sequence::parse("atcg").unwrap();
        let c = Sequence::parse("GCTA").unwrap();
        assert_eq!(a.checksum(), b.checksum());
        assert_ne!(a.checksum(), c.checksum());
    }
}
