// fasta.rs - Paired reference/sample FASTA loader

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use bio::io::fasta;

use crate::data::patient::PatientRecord;

/// One FASTA record as plain strings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastaEntry {
    pub id: String,
    pub description: Option<String>,
    pub sequence: String,
}

/// Read every record of a FASTA file
pub fn read_fasta(fasta_path: &Path) -> Result<Vec<FastaEntry>, String> {
    let file = File::open(fasta_path)
        .map_err(|e| format!("Failed to open FASTA file {}: {}", fasta_path.display(), e))?;

    let reader = fasta::Reader::new(BufReader::new(file));
    let mut entries = Vec::new();

    for record_result in reader.records() {
        let record = record_result
            .map_err(|e| format!("Invalid FASTA record in {}: {}", fasta_path.display(), e))?;

        entries.push(FastaEntry {
            id: record.id().to_string(),
            description: record.desc().map(|d| d.to_string()),
            sequence: String::from_utf8_lossy(record.seq()).into_owned(),
        });
    }

    Ok(entries)
}

/// Pair reference and sample records by id. Gene type comes from the
/// reference record description. Output follows the reference file order.
pub fn load_paired_fasta(reference_path: &Path, sample_path: &Path) -> Result<Vec<PatientRecord>, String> {
    println!(
        "🧬 Loading paired FASTA: {} + {}",
        reference_path.display(),
        sample_path.display()
    );

    let references = read_fasta(reference_path)?;
    let samples = read_fasta(sample_path)?;

    let mut sample_by_id: HashMap<String, String> = HashMap::with_capacity(samples.len());
    for entry in samples {
        if sample_by_id.contains_key(&entry.id) {
            return Err(format!(
                "Duplicate record id '{}' in {}",
                entry.id,
                sample_path.display()
            ));
        }
        sample_by_id.insert(entry.id, entry.sequence);
    }

    let mut records = Vec::with_capacity(references.len());
    let mut unpaired = 0;
    for entry in references {
        match sample_by_id.remove(&entry.id) {
            Some(sample) => records.push(PatientRecord {
                gene_type: entry
                    .description
                    .as_deref()
                    .and_then(|d| d.split_whitespace().next())
                    .unwrap_or("")
                    .to_string(),
                patient_id: entry.id,
                reference: entry.sequence,
                sample,
            }),
            None => {
                eprintln!("⚠️  Reference {} has no matching sample record, skipping", entry.id);
                unpaired += 1;
            }
        }
    }
    unpaired += sample_by_id.len();

    if records.is_empty() {
        return Err("No reference/sample record pairs found".to_string());
    }

    println!(
        "✅ FASTA pairs loaded: {} patients ({} unpaired records skipped)",
        records.len(),
        unpaired
    );
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_fasta(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_pairs_by_id() {
        let references = write_fasta(">P001 BRCA1 exon 11\nATCGATCG\n>P002 TP53\nAAAA\n>P003 BRCA2\nGGGG\n");
        let samples = write_fasta(">P002\nAAAAAA\n>P001\nATCG\nATTG\n");

        let records = load_paired_fasta(references.path(), samples.path()).unwrap();
        assert_eq!(
            records,
            vec![
                PatientRecord::new("P001", "BRCA1", "ATCGATCG", "ATCGATTG"),
                PatientRecord::new("P002", "TP53", "AAAA", "AAAAAA"),
            ]
        );
    }

    #[test]
    fn test_no_pairs_is_an_error() {
        let references = write_fasta(">A\nACGT\n");
        let samples = write_fasta(">B\nACGT\n");
        assert!(load_paired_fasta(references.path(), samples.path()).is_err());
    }

    #[test]
    fn test_read_fasta_keeps_description() {
        let file = write_fasta(">seq1 promoter region\nTATAAA\n");
        let entries = read_fasta(file.path()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].description.as_deref(), Some("promoter region"));
        assert_eq!(entries[0].sequence, "TATAAA");
    }
}
