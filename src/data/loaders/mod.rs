// mod.rs - Dataset loaders

pub mod csv;
pub mod fasta;

pub use self::csv::{load_dataset, DatasetLayout};
pub use self::fasta::{load_paired_fasta, read_fasta, FastaEntry};
