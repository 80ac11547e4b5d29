// config.rs - Analysis configuration and presets

use serde::{Deserialize, Serialize};

use crate::data::sequence::base_index;
use crate::error::{AnalysisError, AnalysisResult};

/// Named literal pattern searched for by the motif scanner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotifDefinition {
    pub name: String,
    pub pattern: String,
}

impl MotifDefinition {
    pub fn new(name: &str, pattern: &str) -> Self {
        Self {
            name: name.to_string(),
            pattern: pattern.to_ascii_uppercase(),
        }
    }
}

/// Largest tandem repeat unit the scanner accepts
pub const MAX_REPEAT_UNIT: usize = 64;

/// Built-in regulatory motif table
pub fn default_motifs() -> Vec<MotifDefinition> {
    vec![
        MotifDefinition::new("TATA_box", "TATAAA"),
        MotifDefinition::new("CAAT_box", "CCAAT"),
        MotifDefinition::new("GC_box", "GGGCGG"),
        MotifDefinition::new("Kozak_sequence", "GCCGCCACCATGG"),
        MotifDefinition::new("Poly_A_signal", "AATAAA"),
    ]
}

/// Configuration consumed by the analysis core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Hotspot window size in bases
    pub hotspot_window: usize,
    /// Mutations per base above which a window is a hotspot
    pub hotspot_threshold: f64,
    /// Mutation rate (%) at or above which risk is HIGH
    pub high_rate_threshold: f64,
    /// Mutation rate (%) at or above which risk is MODERATE
    pub moderate_rate_threshold: f64,
    pub min_conserved_length: usize,
    /// Shannon entropy (bits) below which a window counts as conserved
    pub conserved_entropy_threshold: f64,
    pub min_repeat_unit: usize,
    pub max_repeat_unit: usize,
    pub min_repeat_copies: usize,
    pub motifs: Vec<MotifDefinition>,
    pub description: Option<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            hotspot_window: 50,
            hotspot_threshold: 0.1,
            high_rate_threshold: 5.0,
            moderate_rate_threshold: 1.0,
            min_conserved_length: 20,
            conserved_entropy_threshold: 1.5,
            min_repeat_unit: 1,
            max_repeat_unit: 6,
            min_repeat_copies: 2,
            motifs: default_motifs(),
            description: Some("Default clinical screening parameters".to_string()),
        }
    }
}

impl AnalysisConfig {
    /// Create configuration from preset name
    pub fn from_preset(preset: &str) -> Result<Self, String> {
        match preset {
            "clinical" => Ok(Self::default()),
            "sensitive" => Ok(Self {
                hotspot_window: 25,
                hotspot_threshold: 0.08,
                high_rate_threshold: 2.0,
                moderate_rate_threshold: 0.5,
                min_conserved_length: 15,
                description: Some("Sensitive screening (lower risk thresholds)".to_string()),
                ..Self::default()
            }),
            "conservative" => Ok(Self {
                hotspot_window: 100,
                hotspot_threshold: 0.15,
                high_rate_threshold: 10.0,
                moderate_rate_threshold: 2.0,
                min_conserved_length: 30,
                description: Some("Conservative screening (higher risk thresholds)".to_string()),
                ..Self::default()
            }),
            _ => Err(format!(
                "Unknown analysis preset: {}. Use: clinical, sensitive, conservative",
                preset
            )),
        }
    }

    /// Preset name matching these parameters, or "custom"
    pub fn detect_preset(&self) -> &'static str {
        for name in ["clinical", "sensitive", "conservative"] {
            if let Ok(preset) = Self::from_preset(name) {
                if preset.same_parameters(self) {
                    return name;
                }
            }
        }
        "custom"
    }

    /// Equality ignoring the free-text description
    pub fn same_parameters(&self, other: &Self) -> bool {
        Self {
            description: None,
            ..self.clone()
        } == Self {
            description: None,
            ..other.clone()
        }
    }

    pub fn validate(&self) -> AnalysisResult<()> {
        validate_hotspots(self.hotspot_window, self.hotspot_threshold)?;
        validate_risk_thresholds(self.high_rate_threshold, self.moderate_rate_threshold)?;
        validate_conserved(self.min_conserved_length, self.conserved_entropy_threshold)?;
        validate_repeats(
            self.min_repeat_unit,
            self.max_repeat_unit,
            self.min_repeat_copies,
        )?;
        validate_motifs(&self.motifs)
    }
}

pub(crate) fn validate_hotspots(window: usize, threshold: f64) -> AnalysisResult<()> {
    if window == 0 {
        return Err(AnalysisError::Configuration(
            "hotspot window size must be greater than 0".to_string(),
        ));
    }
    if !threshold.is_finite() || threshold < 0.0 {
        return Err(AnalysisError::Configuration(format!(
            "hotspot density threshold must be a non-negative number, got {}",
            threshold
        )));
    }
    Ok(())
}

pub(crate) fn validate_risk_thresholds(high: f64, moderate: f64) -> AnalysisResult<()> {
    for (name, value) in [("high", high), ("moderate", moderate)] {
        if !value.is_finite() || value < 0.0 {
            return Err(AnalysisError::Configuration(format!(
                "{} risk threshold must be a non-negative number, got {}",
                name, value
            )));
        }
    }
    if moderate > high {
        return Err(AnalysisError::Configuration(format!(
            "moderate risk threshold ({}) cannot exceed high risk threshold ({})",
            moderate, high
        )));
    }
    Ok(())
}

pub(crate) fn validate_conserved(min_length: usize, entropy_threshold: f64) -> AnalysisResult<()> {
    if min_length == 0 {
        return Err(AnalysisError::Configuration(
            "minimum conserved region length must be greater than 0".to_string(),
        ));
    }
    if !entropy_threshold.is_finite() || entropy_threshold <= 0.0 {
        return Err(AnalysisError::Configuration(format!(
            "conserved entropy threshold must be a positive number, got {}",
            entropy_threshold
        )));
    }
    Ok(())
}

pub(crate) fn validate_repeats(min_unit: usize, max_unit: usize, min_copies: usize) -> AnalysisResult<()> {
    if min_unit == 0 || min_unit > max_unit || max_unit > MAX_REPEAT_UNIT {
        return Err(AnalysisError::Configuration(format!(
            "repeat unit range {}..={} is invalid (units must lie in 1..={})",
            min_unit, max_unit, MAX_REPEAT_UNIT
        )));
    }
    if min_copies < 2 {
        return Err(AnalysisError::Configuration(
            "tandem repeats need at least 2 copies".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn validate_motifs(motifs: &[MotifDefinition]) -> AnalysisResult<()> {
    for motif in motifs {
        if motif.name.trim().is_empty() {
            return Err(AnalysisError::Configuration(
                "motif name cannot be empty".to_string(),
            ));
        }
        if motif.pattern.is_empty() {
            return Err(AnalysisError::Configuration(format!(
                "motif '{}' has an empty pattern",
                motif.name
            )));
        }
        if let Some(bad) = motif
            .pattern
            .bytes()
            .find(|b| base_index(b.to_ascii_uppercase()).is_none())
        {
            return Err(AnalysisError::Configuration(format!(
                "motif '{}' contains invalid symbol '{}'",
                motif.name, bad as char
            )));
        }
    }
    Ok(())
}
