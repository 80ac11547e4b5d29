// patient.rs - Raw patient records and selection filters

use regex::Regex;
use serde::{Deserialize, Serialize};

/// One patient as read from a dataset, before sequence validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientRecord {
    pub patient_id: String,
    pub gene_type: String,
    pub reference: String,
    pub sample: String,
}

impl PatientRecord {
    pub fn new(patient_id: &str, gene_type: &str, reference: &str, sample: &str) -> Self {
        Self {
            patient_id: patient_id.to_string(),
            gene_type: gene_type.to_string(),
            reference: reference.to_string(),
            sample: sample.to_string(),
        }
    }
}

/// Apply include/exclude regex filters and an optional cap on patient count
pub fn filter_patients(
    records: Vec<PatientRecord>,
    include: Option<&Regex>,
    exclude: Option<&Regex>,
    max_patients: Option<usize>,
) -> Vec<PatientRecord> {
    let original_count = records.len();

    let mut kept: Vec<PatientRecord> = records
        .into_iter()
        .filter(|record| {
            if let Some(regex) = include {
                if !regex.is_match(&record.patient_id) {
                    return false;
                }
            }
            if let Some(regex) = exclude {
                if regex.is_match(&record.patient_id) {
                    return false;
                }
            }
            true
        })
        .collect();

    if let Some(max) = max_patients {
        kept.truncate(max);
    }

    if kept.len() != original_count {
        println!(
            "🔍 Patient filtering: {} → {} patients",
            original_count,
            kept.len()
        );
    }

    kept
}
