// error.rs - Error taxonomy of the analysis core

/// Validation failures raised by the analysis core before any computation.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Input contains a symbol outside {A, C, G, T} after normalization.
    #[error("invalid sequence: symbol '{symbol}' at position {position} is not one of A, C, G, T")]
    InvalidSequence { position: usize, symbol: char },
    /// Input is empty where the operation needs at least one symbol.
    #[error("empty input: {0}")]
    EmptyInput(String),
    /// A threshold or table entry is out of its valid range.
    #[error("invalid configuration: {0}")]
    Configuration(String),
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;
