// mod.rs - Core logic module

pub mod alignment;
pub mod cache;
pub mod config;
pub mod engine;
pub mod mutation;
pub mod pattern;
pub mod risk;
pub mod traits;

// Re-export main types for convenience
pub use alignment::{AlignmentResult, SequenceAligner};
pub use cache::{AnalysisCache, CacheFile, CacheKey, CachedAnalysis};
pub use config::{default_motifs, AnalysisConfig, MotifDefinition};
pub use engine::{AnalysisBundle, AnalysisEngine, BatchOutcome, FailedAnalysis, PatientReport};
pub use mutation::{Hotspot, Mutation, MutationClassifier, MutationKind, MutationReport};
pub use pattern::{ConservedRegion, KmerRepeat, Motif, MotifScanner, PatternReport, TandemRepeat};
pub use risk::{Assessment, RiskAggregator, RiskLevel};
pub use traits::{PatientSequences, SequenceAnalyzer};
