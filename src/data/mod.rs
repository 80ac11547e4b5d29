// mod.rs - Data structures module

pub mod loaders;
pub mod patient;
pub mod sequence;

// Re-export main types for convenience
pub use patient::{filter_patients, PatientRecord};
pub use sequence::Sequence;
