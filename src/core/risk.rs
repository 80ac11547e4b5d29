// risk.rs - Per-patient risk classification

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::alignment::AlignmentResult;
use crate::core::config::{validate_risk_thresholds, AnalysisConfig};
use crate::core::mutation::MutationReport;
use crate::core::pattern::PatternReport;
use crate::error::AnalysisResult;

/// Ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Normal,
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 4] = [
        RiskLevel::High,
        RiskLevel::Moderate,
        RiskLevel::Low,
        RiskLevel::Normal,
    ];

    pub fn recommendation(&self) -> &'static str {
        match self {
            RiskLevel::High => "Immediate consultation recommended",
            RiskLevel::Moderate => "Clinical follow-up advised",
            RiskLevel::Low => "Routine monitoring recommended",
            RiskLevel::Normal => "No significant mutations detected",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::High => "HIGH",
            RiskLevel::Moderate => "MODERATE",
            RiskLevel::Low => "LOW",
            RiskLevel::Normal => "NORMAL",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub risk_level: RiskLevel,
    pub recommendation: String,
    pub mutation_count: usize,
    pub mutation_rate_percent: f64,
    pub sequence_identity_percent: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct RiskAggregator {
    high_rate_threshold: f64,
    moderate_rate_threshold: f64,
}

impl RiskAggregator {
    pub fn new(high_rate_threshold: f64, moderate_rate_threshold: f64) -> AnalysisResult<Self> {
        validate_risk_thresholds(high_rate_threshold, moderate_rate_threshold)?;
        Ok(Self {
            high_rate_threshold,
            moderate_rate_threshold,
        })
    }

    pub fn from_config(config: &AnalysisConfig) -> AnalysisResult<Self> {
        Self::new(config.high_rate_threshold, config.moderate_rate_threshold)
    }

    /// First matching rule wins; any hotspot forces HIGH
    pub fn classify(&self, mutation_rate_percent: f64, hotspot_count: usize) -> RiskLevel {
        if mutation_rate_percent >= self.high_rate_threshold || hotspot_count > 0 {
            RiskLevel::High
        } else if mutation_rate_percent >= self.moderate_rate_threshold {
            RiskLevel::Moderate
        } else if mutation_rate_percent > 0.0 {
            RiskLevel::Low
        } else {
            RiskLevel::Normal
        }
    }

    // Pattern findings do not influence the level
    pub fn assess(
        &self,
        alignment: &AlignmentResult,
        mutation: &MutationReport,
        _pattern: &PatternReport,
    ) -> Assessment {
        let risk_level = self.classify(mutation.mutation_rate_percent, mutation.hotspots.len());

        Assessment {
            risk_level,
            recommendation: risk_level.recommendation().to_string(),
            mutation_count: mutation.mutation_count,
            mutation_rate_percent: mutation.mutation_rate_percent,
            sequence_identity_percent: alignment.identity_percent,
        }
    }
}
