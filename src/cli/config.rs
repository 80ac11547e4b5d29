// config.rs - Configuration file support

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    // Input/Output
    pub dataset: Option<String>,
    pub reference_fasta: Option<String>,
    pub sample_fasta: Option<String>,
    pub output: Option<String>,
    pub format: Option<String>,
    pub summary: Option<String>,
    pub summary_format: Option<String>,

    // Analysis parameters
    pub preset: Option<String>,
    pub hotspot_window: Option<usize>,
    pub hotspot_threshold: Option<f64>,
    pub high_risk_threshold: Option<f64>,
    pub moderate_risk_threshold: Option<f64>,
    pub min_conserved_length: Option<usize>,
    pub entropy_threshold: Option<f64>,
    pub min_repeat_unit: Option<usize>,
    pub max_repeat_unit: Option<usize>,
    pub min_repeat_copies: Option<usize>,
    pub motifs: Option<String>,

    // Patient filtering
    pub include_patients: Option<String>,
    pub exclude_patients: Option<String>,
    pub max_patients: Option<usize>,

    // Performance
    pub threads: Option<usize>,
    pub cache_file: Option<String>,
    pub cache_note: Option<String>,

    // Flags
    pub force_recompute: Option<bool>,
    pub no_progress: Option<bool>,
    pub dry_run: Option<bool>,
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file '{}': {}", path.display(), e))?;

        let config = Self::from_toml(&content)
            .map_err(|e| format!("Failed to parse config file '{}': {}", path.display(), e))?;

        println!("📄 Loaded configuration from: {}", path.display());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Generate a sample configuration file with comments
    pub fn generate_sample() -> String {
        r#"# geneseq.toml - Configuration file for geneseq
# Command line arguments will override these settings

# =============================================================================
# INPUT/OUTPUT
# =============================================================================

# CSV dataset: patient_id,gene_type,sequence,is_mutated
#          or: patient_id,gene_type,reference,sample
dataset = "/path/to/patients.csv"

# Alternatively, paired FASTA files (records matched by id)
# reference_fasta = "/path/to/reference.fasta"
# sample_fasta = "/path/to/sample.fasta"

# Output report file
output = "report.json"

# Report format: json, msgpack
format = "json"

# Per-patient summary table
summary = "summary.tsv"

# Summary table format: tsv, csv
summary_format = "tsv"

# =============================================================================
# ANALYSIS PARAMETERS
# =============================================================================

# Preset: clinical, sensitive, conservative
# Individual parameters below override the preset
preset = "clinical"

# Hotspot windows: size in bases and density threshold (mutations per base)
# hotspot_window = 50
# hotspot_threshold = 0.1

# Mutation rate (%) thresholds for HIGH and MODERATE risk
# high_risk_threshold = 5.0
# moderate_risk_threshold = 1.0

# Conserved regions: minimum length and Shannon entropy threshold (bits)
# min_conserved_length = 20
# entropy_threshold = 1.5

# Tandem repeats: unit length range and minimum copies
# min_repeat_unit = 1
# max_repeat_unit = 6
# min_repeat_copies = 2

# Motif table replacing the built-in motifs (name<TAB>pattern per line)
# motifs = "motifs.tsv"

# =============================================================================
# PATIENT FILTERING
# =============================================================================

# Include only patients matching regex pattern
# include_patients = "^P0.*"

# Exclude patients matching regex pattern
# exclude_patients = "CTRL.*"

# Analyze at most this many patients
# max_patients = 1000

# =============================================================================
# PERFORMANCE
# =============================================================================

# Number of threads (omit for auto-detection)
threads = 8

# Cache file path for reuse across runs (.lz4 extension)
cache_file = "analysis_cache.lz4"

# User note to save with the cache for future reference
cache_note = "Screening batch"

# =============================================================================
# FLAGS
# =============================================================================

# Ignore a cache built with different analysis parameters
force_recompute = false

# Hide the progress bar
no_progress = false

# Validate inputs without computation (dry run)
dry_run = false
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_config_parses() {
        let config = Config::from_toml(&Config::generate_sample()).unwrap();
        assert_eq!(config.dataset.as_deref(), Some("/path/to/patients.csv"));
        assert_eq!(config.preset.as_deref(), Some("clinical"));
        assert_eq!(config.threads, Some(8));
        assert_eq!(config.hotspot_window, None);
        assert_eq!(config.force_recompute, Some(false));
    }

    #[test]
    fn test_empty_config_is_all_none() {
        let config = Config::from_toml("").unwrap();
        assert!(config.dataset.is_none());
        assert!(config.hotspot_threshold.is_none());
    }

    #[test]
    fn test_unknown_type_is_an_error() {
        assert!(Config::from_toml("threads = \"many\"").is_err());
    }
}
