// mod.rs - Report and summary table writers

use std::fs::{create_dir_all, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::engine::{FailedAnalysis, PatientReport};
use crate::core::risk::RiskLevel;

/// Serialization format of the full report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Json,
    MsgPack,
}

impl ReportFormat {
    pub fn parse(name: &str) -> Result<Self, String> {
        match name.to_lowercase().as_str() {
            "json" => Ok(ReportFormat::Json),
            "msgpack" | "messagepack" => Ok(ReportFormat::MsgPack),
            other => Err(format!("Unknown report format: {}. Use: json, msgpack", other)),
        }
    }
}

/// Field separator of the summary table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Tsv,
    Csv,
}

impl TableFormat {
    pub fn parse(name: &str) -> Result<Self, String> {
        match name.to_lowercase().as_str() {
            "tsv" => Ok(TableFormat::Tsv),
            "csv" => Ok(TableFormat::Csv),
            other => Err(format!("Unknown summary format: {}. Use: tsv, csv", other)),
        }
    }

    fn delimiter(&self) -> u8 {
        match self {
            TableFormat::Tsv => b'\t',
            TableFormat::Csv => b',',
        }
    }
}

/// Patient counts per risk level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskSummary {
    pub high_risk: usize,
    pub moderate_risk: usize,
    pub low_risk: usize,
    pub normal: usize,
}

impl RiskSummary {
    pub fn add(&mut self, level: RiskLevel) {
        match level {
            RiskLevel::High => self.high_risk += 1,
            RiskLevel::Moderate => self.moderate_risk += 1,
            RiskLevel::Low => self.low_risk += 1,
            RiskLevel::Normal => self.normal += 1,
        }
    }

    pub fn count(&self, level: RiskLevel) -> usize {
        match level {
            RiskLevel::High => self.high_risk,
            RiskLevel::Moderate => self.moderate_risk,
            RiskLevel::Low => self.low_risk,
            RiskLevel::Normal => self.normal,
        }
    }

    pub fn total(&self) -> usize {
        self.high_risk + self.moderate_risk + self.low_risk + self.normal
    }

    pub fn from_levels<I: IntoIterator<Item = RiskLevel>>(levels: I) -> Self {
        let mut summary = Self::default();
        for level in levels {
            summary.add(level);
        }
        summary
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub tool: String,
    pub version: String,
    pub generated: String,
    pub command: String,
    pub total_patients_analyzed: usize,
    pub analyses: Vec<PatientReport>,
    pub failures: Vec<FailedAnalysis>,
    pub summary: RiskSummary,
}

impl AnalysisReport {
    pub fn new(analyses: Vec<PatientReport>, failures: Vec<FailedAnalysis>, command: &str) -> Self {
        let summary = RiskSummary::from_levels(analyses.iter().map(|a| a.assessment.risk_level));
        Self {
            tool: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            generated: chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            command: command.to_string(),
            total_patients_analyzed: analyses.len(),
            analyses,
            failures,
            summary,
        }
    }

    /// Print the risk distribution to stdout
    pub fn print_summary(&self) {
        println!("\n📊 === RISK SUMMARY ===");
        println!("  Patients analyzed: {}", self.total_patients_analyzed);
        for (icon, level) in [("🔴", RiskLevel::High), ("🟠", RiskLevel::Moderate), ("🟡", RiskLevel::Low), ("🟢", RiskLevel::Normal)] {
            println!("  {} {:<9} {}", icon, level.as_str(), self.summary.count(level));
        }
        if !self.failures.is_empty() {
            println!("  ❌ Failed:   {}", self.failures.len());
        }
    }
}

/// Ensure parent directory exists before creating file
fn ensure_parent_dir(file_path: &str) -> Result<(), String> {
    if let Some(parent) = Path::new(file_path).parent() {
        create_dir_all(parent).map_err(|e| {
            format!("Failed to create parent directory '{}': {}", parent.display(), e)
        })?;
    }
    Ok(())
}

/// Write the full report as pretty JSON or MessagePack
pub fn write_report(file_path: &str, report: &AnalysisReport, format: ReportFormat) -> Result<(), String> {
    ensure_parent_dir(file_path)?;
    let file = File::create(file_path)
        .map_err(|e| format!("Failed to create output file '{}': {}", file_path, e))?;
    let mut writer = BufWriter::new(file);

    match format {
        ReportFormat::Json => serde_json::to_writer_pretty(&mut writer, report)
            .map_err(|e| format!("Failed to serialize report: {}", e))?,
        ReportFormat::MsgPack => rmp_serde::encode::write_named(&mut writer, report)
            .map_err(|e| format!("Failed to serialize report: {}", e))?,
    }

    writer.flush().map_err(|e| format!("Flush error: {}", e))?;
    println!("✅ Report written to: {}", file_path);
    Ok(())
}

/// Read a report previously written by `write_report`
pub fn read_report(file_path: &str, format: ReportFormat) -> Result<AnalysisReport, String> {
    let file = File::open(file_path)
        .map_err(|e| format!("Failed to open report '{}': {}", file_path, e))?;
    let reader = BufReader::new(file);

    match format {
        ReportFormat::Json => serde_json::from_reader(reader)
            .map_err(|e| format!("Failed to parse JSON report: {}", e)),
        ReportFormat::MsgPack => rmp_serde::from_read(reader)
            .map_err(|e| format!("Failed to parse MessagePack report: {}", e)),
    }
}

/// Write one summary row per patient
pub fn write_summary_table(
    file_path: &str,
    reports: &[PatientReport],
    format: TableFormat,
    command_line: &str,
) -> Result<(), String> {
    ensure_parent_dir(file_path)?;
    let file = File::create(file_path)
        .map_err(|e| format!("Failed to create output file '{}': {}", file_path, e))?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "# Command: {}", command_line).map_err(|e| format!("Write error: {}", e))?;
    writeln!(
        writer,
        "# Generated: {}",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    )
    .map_err(|e| format!("Write error: {}", e))?;
    writeln!(writer, "# geneseq v{}", env!("CARGO_PKG_VERSION"))
        .map_err(|e| format!("Write error: {}", e))?;

    let mut table = csv::WriterBuilder::new()
        .delimiter(format.delimiter())
        .from_writer(writer);

    table
        .write_record([
            "patient_id",
            "gene_type",
            "risk_level",
            "mutation_count",
            "mutation_rate_percent",
            "identity_percent",
            "hotspots",
            "motifs",
            "tandem_repeats",
            "complexity_score",
        ])
        .map_err(|e| format!("Write error: {}", e))?;

    for report in reports {
        let analyses = &report.analyses;
        table
            .write_record([
                report.patient_id.clone(),
                report.gene_type.clone(),
                report.assessment.risk_level.to_string(),
                analyses.mutation.mutation_count.to_string(),
                format!("{:.2}", analyses.mutation.mutation_rate_percent),
                format!("{:.2}", analyses.alignment.identity_percent),
                analyses.mutation.hotspots.len().to_string(),
                analyses.pattern.motif_names().join(";"),
                analyses.pattern.tandem_repeats.len().to_string(),
                format!("{:.4}", analyses.pattern.complexity_score),
            ])
            .map_err(|e| format!("Write error: {}", e))?;
    }

    table.flush().map_err(|e| format!("Flush error: {}", e))?;
    println!("✅ Summary table written to: {}", file_path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::AnalysisConfig;
    use crate::core::engine::AnalysisEngine;
    use crate::data::PatientRecord;

    fn sample_report() -> AnalysisReport {
        let engine = AnalysisEngine::new(AnalysisConfig::default()).unwrap();
        let analyses = vec![
            engine
                .analyze_patient(&PatientRecord::new("P001", "BRCA1", "ATCGATCG", "ATCGATCG"))
                .unwrap(),
            engine
                .analyze_patient(&PatientRecord::new("P002", "TP53", "TATAAACGCGCGATAT", "TATAAACGCGCGATTT"))
                .unwrap(),
        ];
        let failures = vec![FailedAnalysis {
            patient_id: "P003".to_string(),
            error: "empty input: no sequences".to_string(),
        }];
        AnalysisReport::new(analyses, failures, "geneseq --dataset test.csv")
    }

    #[test]
    fn test_summary_counts() {
        let report = sample_report();
        assert_eq!(report.total_patients_analyzed, 2);
        assert_eq!(report.summary.normal, 1);
        assert_eq!(report.summary.high_risk, 1);
        assert_eq!(report.summary.total(), 2);
        assert_eq!(report.tool, "geneseq");
    }

    #[test]
    fn test_json_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("report.json");
        let path = path.to_str().unwrap();

        let report = sample_report();
        write_report(path, &report, ReportFormat::Json).unwrap();
        assert_eq!(read_report(path, ReportFormat::Json).unwrap(), report);

        let raw = std::fs::read_to_string(path).unwrap();
        assert!(raw.contains("\"risk_level\": \"NORMAL\""));
        assert!(raw.contains("\"kind\": \"transversion\""));
    }

    #[test]
    fn test_msgpack_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.msgpack");
        let path = path.to_str().unwrap();

        let report = sample_report();
        write_report(path, &report, ReportFormat::MsgPack).unwrap();
        assert_eq!(read_report(path, ReportFormat::MsgPack).unwrap(), report);
    }

    #[test]
    fn test_summary_table_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.tsv");
        let path = path.to_str().unwrap();

        let report = sample_report();
        write_summary_table(path, &report.analyses, TableFormat::Tsv, "geneseq").unwrap();

        let content = std::fs::read_to_string(path).unwrap();
        let rows: Vec<&str> = content.lines().filter(|l| !l.starts_with('#')).collect();
        assert_eq!(rows.len(), 3);
        assert!(rows[0].starts_with("patient_id\tgene_type\trisk_level"));
        assert_eq!(rows[0].split('\t').count(), 10);

        let first: Vec<&str> = rows[1].split('\t').collect();
        assert_eq!(first[0], "P001");
        assert_eq!(first[2], "NORMAL");
        assert_eq!(first[5], "100.00");

        let second: Vec<&str> = rows[2].split('\t').collect();
        assert_eq!(second[2], "HIGH");
        assert_eq!(second[7], "TATA_box");
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!(ReportFormat::parse("JSON").unwrap(), ReportFormat::Json);
        assert_eq!(ReportFormat::parse("msgpack").unwrap(), ReportFormat::MsgPack);
        assert!(ReportFormat::parse("xml").is_err());
        assert_eq!(TableFormat::parse("csv").unwrap(), TableFormat::Csv);
        assert!(TableFormat::parse("phylip").is_err());
    }
}
