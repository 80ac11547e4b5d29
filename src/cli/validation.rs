// validation.rs - Input validation utilities

use std::fs::File;
use std::io::{BufRead, BufReader};

use regex::Regex;

use crate::cli::args::Args;
use crate::core::config::{AnalysisConfig, MotifDefinition};
use crate::output::{ReportFormat, TableFormat};

pub struct ValidationResult {
    pub analysis_config: AnalysisConfig,
    pub report_format: ReportFormat,
    pub table_format: TableFormat,
    pub patient_include_regex: Option<Regex>,
    pub patient_exclude_regex: Option<Regex>,
}

/// Validate all command line arguments
pub fn validate_args(args: &Args) -> Result<ValidationResult, String> {
    // Exactly one input source
    let has_fasta = args.reference_fasta.is_some() || args.sample_fasta.is_some();
    if args.dataset.is_some() && has_fasta {
        return Err("--dataset cannot be combined with --reference-fasta/--sample-fasta".to_string());
    }
    if has_fasta && (args.reference_fasta.is_none() || args.sample_fasta.is_none()) {
        return Err("--reference-fasta and --sample-fasta must be given together".to_string());
    }
    if args.dataset.is_none() && !has_fasta {
        return Err("an input is required: --dataset or --reference-fasta with --sample-fasta".to_string());
    }

    if args.cache_note.is_some() && args.cache_file.is_none() {
        return Err("--cache-note requires --cache-file".to_string());
    }
    if args.threads == Some(0) {
        return Err("--threads must be greater than 0".to_string());
    }

    let report_format = ReportFormat::parse(&args.format)?;
    let table_format = TableFormat::parse(&args.summary_format)?;
    let analysis_config = build_analysis_config(args)?;

    // Compile regex patterns
    let patient_include_regex = if let Some(pattern) = &args.include_patients {
        Some(Regex::new(pattern).map_err(|e| format!("Invalid include_patients regex: {}", e))?)
    } else {
        None
    };

    let patient_exclude_regex = if let Some(pattern) = &args.exclude_patients {
        Some(Regex::new(pattern).map_err(|e| format!("Invalid exclude_patients regex: {}", e))?)
    } else {
        None
    };

    Ok(ValidationResult {
        analysis_config,
        report_format,
        table_format,
        patient_include_regex,
        patient_exclude_regex,
    })
}

/// Start from the preset and apply every explicit override
pub fn build_analysis_config(args: &Args) -> Result<AnalysisConfig, String> {
    let mut config = AnalysisConfig::from_preset(&args.preset)?;
    let mut customized = false;

    macro_rules! apply {
        ($($arg:ident => $field:ident),* $(,)?) => {
            $(
                if let Some(value) = args.$arg {
                    config.$field = value;
                    customized = true;
                }
            )*
        };
    }

    apply!(
        hotspot_window => hotspot_window,
        hotspot_threshold => hotspot_threshold,
        high_risk_threshold => high_rate_threshold,
        moderate_risk_threshold => moderate_rate_threshold,
        min_conserved_length => min_conserved_length,
        entropy_threshold => conserved_entropy_threshold,
        min_repeat_unit => min_repeat_unit,
        max_repeat_unit => max_repeat_unit,
        min_repeat_copies => min_repeat_copies,
    );

    if let Some(path) = &args.motifs {
        config.motifs = load_motif_table(path)?;
        customized = true;
    }

    if customized {
        config.description = Some(format!("Custom parameters based on '{}' preset", args.preset));
    }

    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

/// Load a motif table from a file (name<TAB>pattern per line)
pub fn load_motif_table(file_path: &str) -> Result<Vec<MotifDefinition>, String> {
    let file = File::open(file_path)
        .map_err(|e| format!("Failed to open motif file '{}': {}", file_path, e))?;

    let reader = BufReader::new(file);
    let mut motifs = Vec::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| {
            format!("Failed to read line {} from '{}': {}", line_num + 1, file_path, e)
        })?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let parts: Vec<&str> = trimmed.split('\t').map(str::trim).collect();
        if parts.len() != 2 {
            return Err(format!(
                "Invalid motif line {} in '{}': expected name<TAB>pattern",
                line_num + 1,
                file_path
            ));
        }
        if motifs.is_empty() && parts[0].eq_ignore_ascii_case("name") {
            continue;
        }
        motifs.push(MotifDefinition::new(parts[0], parts[1]));
    }

    if motifs.is_empty() {
        return Err(format!("Motif file '{}' contains no motifs", file_path));
    }

    println!("📋 Loaded {} motifs from '{}'", motifs.len(), file_path);
    Ok(motifs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use argh::FromArgs;
    use std::io::Write;

    fn parse(args: &[&str]) -> Args {
        match Args::from_args(&["geneseq"], args) {
            Ok(args) => args,
            Err(e) => panic!("argument parsing failed: {}", e.output),
        }
    }

    #[test]
    fn test_preset_with_override() {
        let args = parse(&["--dataset", "d.csv", "--preset", "sensitive", "--hotspot-window", "40"]);
        let result = validate_args(&args).unwrap();
        let config = result.analysis_config;

        assert_eq!(config.hotspot_window, 40);
        assert_eq!(config.high_rate_threshold, 2.0);
        assert_eq!(config.detect_preset(), "custom");
    }

    #[test]
    fn test_input_source_rules() {
        assert!(validate_args(&parse(&[])).is_err());
        assert!(validate_args(&parse(&["--reference-fasta", "r.fa"])).is_err());
        assert!(validate_args(&parse(&["--dataset", "d.csv", "--sample-fasta", "s.fa"])).is_err());
        assert!(validate_args(&parse(&["--reference-fasta", "r.fa", "--sample-fasta", "s.fa"])).is_ok());
    }

    #[test]
    fn test_invalid_values() {
        assert!(validate_args(&parse(&["--dataset", "d.csv", "--format", "xml"])).is_err());
        assert!(validate_args(&parse(&["--dataset", "d.csv", "--preset", "fast"])).is_err());
        assert!(validate_args(&parse(&["--dataset", "d.csv", "--hotspot-window", "0"])).is_err());
        assert!(validate_args(&parse(&["--dataset", "d.csv", "--include-patients", "(["])).is_err());
        assert!(validate_args(&parse(&[
            "--dataset",
            "d.csv",
            "--high-risk-threshold",
            "0.5",
            "--moderate-risk-threshold",
            "1.0"
        ]))
        .is_err());
    }

    #[test]
    fn test_motif_table_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "name\tpattern").unwrap();
        writeln!(file, "# custom table").unwrap();
        writeln!(file, "E_box\tcacgtg").unwrap();
        writeln!(file, "TATA_box\tTATAAA").unwrap();

        let path = file.path().to_str().unwrap();
        let motifs = load_motif_table(path).unwrap();
        assert_eq!(motifs.len(), 2);
        assert_eq!(motifs[0], MotifDefinition::new("E_box", "CACGTG"));

        let args = parse(&["--dataset", "d.csv", "--motifs", path]);
        let config = validate_args(&args).unwrap().analysis_config;
        assert_eq!(config.motifs.len(), 2);
    }

    #[test]
    fn test_bad_motif_table() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "E_box CACGTG").unwrap();
        assert!(load_motif_table(file.path().to_str().unwrap()).is_err());

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "bad\tACGU").unwrap();
        let path = file.path().to_str().unwrap();
        let args = parse(&["--dataset", "d.csv", "--motifs", path]);
        assert!(validate_args(&args).is_err());
    }
}
