// csv.rs - CSV dataset loader for reference/sample pairs

use std::collections::BTreeMap;
use std::path::Path;

use crate::data::patient::PatientRecord;

/// Column layout of a dataset file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetLayout {
    /// `patient_id,gene_type,sequence,is_mutated`, several rows per patient
    Long,
    /// `patient_id,gene_type,reference,sample`, one row per patient
    Paired,
}

struct Columns {
    patient_id: usize,
    gene_type: Option<usize>,
    layout: DatasetLayout,
    first: usize,
    second: usize,
}

fn find_column(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|h| h.trim().trim_matches('"').eq_ignore_ascii_case(name))
}

fn resolve_columns(headers: &csv::StringRecord) -> Result<Columns, String> {
    let patient_id = find_column(headers, "patient_id")
        .ok_or("CSV header must contain a 'patient_id' column")?;
    let gene_type = find_column(headers, "gene_type");

    if let (Some(sequence), Some(is_mutated)) = (
        find_column(headers, "sequence"),
        find_column(headers, "is_mutated"),
    ) {
        return Ok(Columns {
            patient_id,
            gene_type,
            layout: DatasetLayout::Long,
            first: sequence,
            second: is_mutated,
        });
    }

    if let (Some(reference), Some(sample)) = (
        find_column(headers, "reference"),
        find_column(headers, "sample"),
    ) {
        return Ok(Columns {
            patient_id,
            gene_type,
            layout: DatasetLayout::Paired,
            first: reference,
            second: sample,
        });
    }

    Err("CSV header must contain either 'sequence,is_mutated' or 'reference,sample' columns".to_string())
}

fn parse_flag(value: &str, line: usize) -> Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "y" => Ok(true),
        "false" | "0" | "no" | "n" => Ok(false),
        other => Err(format!(
            "CSV line {}: invalid is_mutated value '{}' (expected true/false)",
            line, other
        )),
    }
}

#[derive(Default)]
struct LongRows {
    gene_type: String,
    reference: Option<String>,
    sample: Option<String>,
}

/// Load a dataset, detecting its layout from the header
pub fn load_dataset(file_path: &Path) -> Result<(Vec<PatientRecord>, DatasetLayout), String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(file_path)
        .map_err(|e| format!("Failed to read CSV file '{}': {}", file_path.display(), e))?;

    let headers = reader
        .headers()
        .map_err(|e| format!("Failed to read CSV header: {}", e))?
        .clone();
    let columns = resolve_columns(&headers)?;

    let field = |row: &csv::StringRecord, index: usize, line: usize| -> Result<String, String> {
        row.get(index)
            .map(|s| s.to_string())
            .ok_or_else(|| format!("CSV line {} is missing column {}", line, index + 1))
    };

    let mut paired = Vec::new();
    let mut grouped: BTreeMap<String, LongRows> = BTreeMap::new();

    for (row_num, row) in reader.records().enumerate() {
        let line = row_num + 2;
        let row = row.map_err(|e| format!("Invalid CSV line {}: {}", line, e))?;

        let patient_id = field(&row, columns.patient_id, line)?;
        if patient_id.is_empty() {
            return Err(format!("CSV line {} has an empty patient_id", line));
        }
        let gene_type = match columns.gene_type {
            Some(index) => field(&row, index, line)?,
            None => String::new(),
        };

        match columns.layout {
            DatasetLayout::Paired => {
                let reference = field(&row, columns.first, line)?;
                let sample = field(&row, columns.second, line)?;
                paired.push(PatientRecord {
                    patient_id,
                    gene_type,
                    reference,
                    sample,
                });
            }
            DatasetLayout::Long => {
                let sequence = field(&row, columns.first, line)?;
                let is_mutated = parse_flag(&field(&row, columns.second, line)?, line)?;

                let entry = grouped.entry(patient_id).or_default();
                if entry.gene_type.is_empty() {
                    entry.gene_type = gene_type;
                }
                let slot = if is_mutated {
                    &mut entry.sample
                } else {
                    &mut entry.reference
                };
                if slot.is_none() {
                    *slot = Some(sequence);
                }
            }
        }
    }

    let records = match columns.layout {
        DatasetLayout::Paired => paired,
        DatasetLayout::Long => {
            let mut records = Vec::with_capacity(grouped.len());
            for (patient_id, rows) in grouped {
                let Some(reference) = rows.reference else {
                    eprintln!(
                        "⚠️  Patient {} has no reference (is_mutated=false) row, skipping",
                        patient_id
                    );
                    continue;
                };
                let sample = rows.sample.unwrap_or_else(|| reference.clone());
                records.push(PatientRecord {
                    patient_id,
                    gene_type: rows.gene_type,
                    reference,
                    sample,
                });
            }
            records
        }
    };

    println!(
        "✅ CSV dataset loaded: {} patients ({:?} layout)",
        records.len(),
        columns.layout
    );
    Ok((records, columns.layout))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_long_layout() {
        let file = write_csv(
            "patient_id,gene_type,sequence,is_mutated,mutation_type\n\
             P002,TP53,AAAA,False,\n\
             P001,BRCA1,ATCGATCG,False,\n\
             P001,BRCA1,ATCGATTG,True,substitution\n\
             P001,BRCA1,ATCGATTT,True,substitution\n\
             P003,BRCA2,GGGG,True,substitution\n",
        );

        let (records, layout) = load_dataset(file.path()).unwrap();
        assert_eq!(layout, DatasetLayout::Long);
        assert_eq!(
            records,
            vec![
                PatientRecord::new("P001", "BRCA1", "ATCGATCG", "ATCGATTG"),
                PatientRecord::new("P002", "TP53", "AAAA", "AAAA"),
            ]
        );
    }

    #[test]
    fn test_paired_layout_keeps_file_order() {
        let file = write_csv(
            "patient_id,gene_type,reference,sample\n\
             P010,BRCA1,ACGT,ACGA\n\
             P002,TP53,AAAA,AAAAAA\n",
        );

        let (records, layout) = load_dataset(file.path()).unwrap();
        assert_eq!(layout, DatasetLayout::Paired);
        assert_eq!(records[0], PatientRecord::new("P010", "BRCA1", "ACGT", "ACGA"));
        assert_eq!(records[1].patient_id, "P002");
    }

    #[test]
    fn test_bad_header_and_flag() {
        let file = write_csv("id,seq\nP1,ACGT\n");
        assert!(load_dataset(file.path()).is_err());

        let file = write_csv("patient_id,gene_type,sequence,is_mutated\nP1,BRCA1,ACGT,maybe\n");
        let err = load_dataset(file.path()).unwrap_err();
        assert!(err.contains("line 2"));
    }

    #[test]
    fn test_missing_file() {
        assert!(load_dataset(Path::new("/nonexistent/dataset.csv")).is_err());
    }
}
