// motif_scan.rs - Standalone motif and repeat scanner for FASTA records

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use clap::{Arg, Command};
use rayon::prelude::*;
use serde::Serialize;

use geneseq::cli::validation::load_motif_table;
use geneseq::core::{AnalysisConfig, MotifScanner, PatternReport};
use geneseq::data::loaders::read_fasta;
use geneseq::data::Sequence;

#[derive(Debug, Serialize)]
struct ScannedRecord {
    id: String,
    report: PatternReport,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("❌ ERROR: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let matches = Command::new("Motif Scanner")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Scans every FASTA record for motifs, tandem repeats and conserved regions")
        .arg(Arg::new("fasta")
            .long("fasta")
            .value_name("FILE")
            .help("Path to FASTA file to scan")
            .required(true))
        .arg(Arg::new("format")
            .long("format")
            .value_name("FORMAT")
            .help("Output format: json or tsv (default: tsv)")
            .default_value("tsv"))
        .arg(Arg::new("preset")
            .long("preset")
            .value_name("NAME")
            .help("Analysis preset: clinical, sensitive, conservative (default: clinical)")
            .default_value("clinical"))
        .arg(Arg::new("motifs")
            .long("motifs")
            .value_name("FILE")
            .help("Motif table replacing the built-in motifs (name<TAB>pattern)"))
        .arg(Arg::new("output")
            .long("output")
            .value_name("FILE")
            .help("Output file (default: stdout)"))
        .get_matches();

    let fasta_path = matches
        .get_one::<String>("fasta")
        .ok_or("--fasta is required")?;
    let format = matches
        .get_one::<String>("format")
        .map(String::as_str)
        .unwrap_or("tsv");
    let preset = matches
        .get_one::<String>("preset")
        .map(String::as_str)
        .unwrap_or("clinical");

    if format != "json" && format != "tsv" {
        return Err(format!("Unknown output format: {}. Use: json, tsv", format));
    }

    let mut config = AnalysisConfig::from_preset(preset)?;
    if let Some(motif_path) = matches.get_one::<String>("motifs") {
        config.motifs = load_motif_table(motif_path)?;
    }
    let scanner = MotifScanner::from_config(&config).map_err(|e| e.to_string())?;

    eprintln!("🔬 geneseq Motif Scanner");
    eprintln!("========================");
    eprintln!("📂 FASTA: {}", fasta_path);
    eprintln!("🎯 Motifs: {}", scanner.motif_table().len());

    let entries = read_fasta(Path::new(fasta_path))?;

    let mut sequences = Vec::with_capacity(entries.len());
    for entry in entries {
        match Sequence::parse(&entry.sequence) {
            Ok(sequence) => sequences.push((entry.id, sequence)),
            Err(e) => eprintln!("⚠️  Skipping record {}: {}", entry.id, e),
        }
    }

    let scanned: Vec<ScannedRecord> = sequences
        .par_iter()
        .map(|(id, sequence)| ScannedRecord {
            id: id.clone(),
            report: scanner.scan(sequence),
        })
        .collect();

    eprintln!("✅ Scanned {} records", scanned.len());

    let sink: Box<dyn Write> = match matches.get_one::<String>("output") {
        Some(path) => Box::new(
            File::create(path).map_err(|e| format!("Failed to create output file '{}': {}", path, e))?,
        ),
        None => Box::new(std::io::stdout()),
    };
    let mut writer = BufWriter::new(sink);

    if format == "json" {
        serde_json::to_writer_pretty(&mut writer, &scanned)
            .map_err(|e| format!("Failed to serialize results: {}", e))?;
        writeln!(writer).map_err(|e| format!("Write error: {}", e))?;
    } else {
        write_tsv(&mut writer, &scanned)?;
    }

    writer.flush().map_err(|e| format!("Flush error: {}", e))?;
    Ok(())
}

fn write_tsv<W: Write>(writer: &mut W, scanned: &[ScannedRecord]) -> Result<(), String> {
    writeln!(
        writer,
        "id\tlength\tgc_content\tcomplexity\tmotifs\ttandem_repeats\tconserved_regions\ttop_kmer"
    )
    .map_err(|e| format!("Write error: {}", e))?;

    for record in scanned {
        let report = &record.report;
        let motifs = report
            .motifs
            .iter()
            .map(|m| format!("{}@{}", m.name, m.position))
            .collect::<Vec<_>>()
            .join(";");
        let top_kmer = report
            .repeated_kmers
            .first()
            .map(|k| format!("{}x{}", k.kmer, k.frequency))
            .unwrap_or_else(|| "-".to_string());

        writeln!(
            writer,
            "{}\t{}\t{:.2}\t{:.4}\t{}\t{}\t{}\t{}",
            record.id,
            report.sequence_length,
            report.gc_content,
            report.complexity_score,
            if motifs.is_empty() { "-" } else { &motifs },
            report.tandem_repeats.len(),
            report.conserved_regions.len(),
            top_kmer
        )
        .map_err(|e| format!("Write error: {}", e))?;
    }

    Ok(())
}
