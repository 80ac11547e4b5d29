// traits.rs - Shared call contract of the sequence analyzers

use std::fmt::Debug;

use crate::data::Sequence;

/// Validated input of one patient: reference and sample sequences
#[derive(Debug, Clone, PartialEq)]
pub struct PatientSequences {
    pub patient_id: String,
    pub gene_type: String,
    pub reference: Sequence,
    pub sample: Sequence,
}

impl PatientSequences {
    pub fn new(patient_id: &str, gene_type: &str, reference: Sequence, sample: Sequence) -> Self {
        Self {
            patient_id: patient_id.to_string(),
            gene_type: gene_type.to_string(),
            reference,
            sample,
        }
    }
}

/// Analysis unit invoked with a patient's sequences.
/// Implementations are pure: the same input always yields the same output.
pub trait SequenceAnalyzer: Send + Sync + Debug {
    type Output;

    /// Get a human-readable name for this analyzer
    fn name(&self) -> &'static str;

    /// Get a description of this analyzer
    fn description(&self) -> &'static str;

    /// Run the analysis
    fn analyze(&self, input: &PatientSequences) -> Self::Output;
}
