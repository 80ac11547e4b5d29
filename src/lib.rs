// lib.rs - geneseq library root

//! # geneseq - Reference/sample nucleotide sequence analysis
//!
//! This library compares a patient's sample sequence against a reference,
//! classifies the differences, scans the sample for regulatory motifs and
//! repeats, and condenses everything into a risk assessment.
//!
//! ## Features
//!
//! - **Alignment**: positional identity, gaps, mismatches and GC content
//! - **Mutations**: transition/transversion/indel classification with hotspot windows
//! - **Patterns**: known motifs, tandem repeats, conserved regions, repeated k-mers
//! - **Risk**: configurable thresholds with clinical, sensitive and conservative presets
//! - **Batch**: parallel analysis with an on-disk LZ4 cache and JSON/MessagePack reports
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use geneseq::prelude::*;
//!
//! let engine = AnalysisEngine::new(AnalysisConfig::default()).map_err(|e| e.to_string())?;
//! let record = PatientRecord::new("P001", "BRCA1", "ATCGATCG", "ATCGATTG");
//! let report = engine.analyze_patient(&record).map_err(|e| e.to_string())?;
//!
//! println!(
//!     "{}: {} ({})",
//!     report.patient_id, report.assessment.risk_level, report.assessment.recommendation
//! );
//! # Ok::<(), String>(())
//! ```

pub mod cli;
pub mod core;
pub mod data;
pub mod error;
pub mod output;

// Convenience prelude for common imports
pub mod prelude {
    pub use crate::cli::{validate_args, Args, ValidationResult};
    pub use crate::core::{AnalysisConfig, AnalysisEngine, PatientReport};
    pub use crate::core::{MotifScanner, MutationClassifier, RiskAggregator, SequenceAligner};
    pub use crate::core::{RiskLevel, SequenceAnalyzer};
    pub use crate::data::{PatientRecord, Sequence};
    pub use crate::error::{AnalysisError, AnalysisResult};
    pub use crate::output::{write_report, AnalysisReport, ReportFormat};
}

// Re-export main types at the root level for convenience
pub use cli::{Args, ValidationResult};
pub use core::{AnalysisConfig, AnalysisEngine, PatientReport, RiskLevel};
pub use data::{PatientRecord, Sequence};
pub use error::AnalysisError;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library information
pub fn get_info() -> String {
    format!(
        "geneseq v{} - Reference/sample sequence analysis and risk screening",
        VERSION
    )
}
