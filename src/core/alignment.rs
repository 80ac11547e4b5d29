// alignment.rs - Positional alignment and identity scoring

use serde::{Deserialize, Serialize};

use crate::core::traits::{PatientSequences, SequenceAnalyzer};
use crate::data::Sequence;

/// Identity and composition of a reference/sample pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentResult {
    pub identity_percent: f64,
    pub aligned_length: usize,
    pub gap_count: usize,
    pub mismatch_positions: Vec<usize>,
    pub gc_content_reference: f64,
    pub gc_content_sample: f64,
    pub reference_length: usize,
    pub sample_length: usize,
}

impl AlignmentResult {
    pub fn mismatch_count(&self) -> usize {
        self.mismatch_positions.len()
    }

    pub fn matches(&self) -> usize {
        self.aligned_length - self.gap_count - self.mismatch_count()
    }

    /// Mismatches plus gap positions
    pub fn hamming_distance(&self) -> usize {
        self.mismatch_count() + self.gap_count
    }
}

/// Compares sequences offset by offset; overhang of the longer one counts as gaps
#[derive(Debug, Clone, Copy, Default)]
pub struct SequenceAligner;

impl SequenceAligner {
    pub fn new() -> Self {
        Self
    }

    pub fn align(&self, reference: &Sequence, sample: &Sequence) -> AlignmentResult {
        let ref_bytes = reference.as_bytes();
        let sample_bytes = sample.as_bytes();

        let min_len = ref_bytes.len().min(sample_bytes.len());
        let aligned_length = ref_bytes.len().max(sample_bytes.len());
        let gap_count = aligned_length - min_len;

        let mismatch_positions = mismatch_positions(ref_bytes, sample_bytes);
        let matches = min_len - mismatch_positions.len();

        // Two empty sequences are identical by convention
        let identity_percent = if aligned_length == 0 {
            100.0
        } else {
            matches as f64 / aligned_length as f64 * 100.0
        };

        AlignmentResult {
            identity_percent,
            aligned_length,
            gap_count,
            mismatch_positions,
            gc_content_reference: reference.gc_content(),
            gc_content_sample: sample.gc_content(),
            reference_length: ref_bytes.len(),
            sample_length: sample_bytes.len(),
        }
    }
}

impl SequenceAnalyzer for SequenceAligner {
    type Output = AlignmentResult;

    fn name(&self) -> &'static str {
        "SequenceAligner"
    }

    fn description(&self) -> &'static str {
        "Positional identity, gaps, mismatches and GC content"
    }

    fn analyze(&self, input: &PatientSequences) -> AlignmentResult {
        self.align(&input.reference, &input.sample)
    }
}

/// Offsets within the overlapping region where the sequences differ
pub fn mismatch_positions(seq1: &[u8], seq2: &[u8]) -> Vec<usize> {
    seq1.iter()
        .zip(seq2.iter())
        .enumerate()
        .filter(|(_, (a, b))| a != b)
        .map(|(i, _)| i)
        .collect()
}
