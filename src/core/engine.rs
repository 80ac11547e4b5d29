// engine.rs - Per-patient pipeline and parallel batch orchestration

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::alignment::{AlignmentResult, SequenceAligner};
use crate::core::cache::{AnalysisCache, CacheKey, CachedAnalysis};
use crate::core::config::AnalysisConfig;
use crate::core::mutation::{MutationClassifier, MutationReport};
use crate::core::pattern::{MotifScanner, PatternReport};
use crate::core::risk::{Assessment, RiskAggregator};
use crate::core::traits::{PatientSequences, SequenceAnalyzer};
use crate::data::{PatientRecord, Sequence};
use crate::error::{AnalysisError, AnalysisResult};

/// Raw sub-results of the three analyzers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisBundle {
    pub alignment: AlignmentResult,
    pub mutation: MutationReport,
    pub pattern: PatternReport,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientReport {
    pub patient_id: String,
    pub gene_type: String,
    pub analyses: AnalysisBundle,
    pub assessment: Assessment,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedAnalysis {
    pub patient_id: String,
    pub error: String,
}

/// Outcome of a batch run, both lists in input order
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    pub reports: Vec<PatientReport>,
    pub failures: Vec<FailedAnalysis>,
    pub cache_hits: usize,
}

/// Runs the aligner, classifier and scanner for each patient and feeds the
/// results to the risk aggregator
#[derive(Debug)]
pub struct AnalysisEngine {
    config: AnalysisConfig,
    aligner: SequenceAligner,
    classifier: MutationClassifier,
    scanner: MotifScanner,
    aggregator: RiskAggregator,
    cache: Option<AnalysisCache>,
    show_progress: bool,
}

impl AnalysisEngine {
    pub fn new(config: AnalysisConfig) -> AnalysisResult<Self> {
        config.validate()?;
        Ok(Self {
            aligner: SequenceAligner::new(),
            classifier: MutationClassifier::new(config.hotspot_window, config.hotspot_threshold)?,
            scanner: MotifScanner::from_config(&config)?,
            aggregator: RiskAggregator::from_config(&config)?,
            cache: None,
            show_progress: false,
            config,
        })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn set_cache(&mut self, cache: AnalysisCache) {
        self.cache = Some(cache);
    }

    pub fn cache_mut(&mut self) -> Option<&mut AnalysisCache> {
        self.cache.as_mut()
    }

    pub fn set_show_progress(&mut self, show_progress: bool) {
        self.show_progress = show_progress;
    }

    /// Analyze already-validated sequences
    pub fn analyze_sequences(&self, input: &PatientSequences) -> AnalysisResult<PatientReport> {
        if input.reference.is_empty() && input.sample.is_empty() {
            return Err(AnalysisError::EmptyInput(format!(
                "patient '{}' has neither a reference nor a sample sequence",
                input.patient_id
            )));
        }

        let (alignment, (mutation, pattern)) = rayon::join(
            || self.aligner.analyze(input),
            || {
                rayon::join(
                    || self.classifier.analyze(input),
                    || self.scanner.analyze(input),
                )
            },
        );
        let assessment = self.aggregator.assess(&alignment, &mutation, &pattern);

        Ok(PatientReport {
            patient_id: input.patient_id.clone(),
            gene_type: input.gene_type.clone(),
            analyses: AnalysisBundle {
                alignment,
                mutation,
                pattern,
            },
            assessment,
        })
    }

    /// Validate a raw record and analyze it
    pub fn analyze_patient(&self, record: &PatientRecord) -> AnalysisResult<PatientReport> {
        let input = parse_record(record)?;
        self.analyze_sequences(&input)
    }

    /// Analyze every record in parallel. Failures are collected rather than
    /// aborting the batch; the cache is consulted during the parallel phase
    /// and updated afterwards.
    pub fn analyze_batch(&mut self, records: &[PatientRecord]) -> BatchOutcome {
        let start = Instant::now();
        let total = records.len();
        println!("🔄 Analyzing {} patients...", total);

        let pb = if self.show_progress {
            let pb = ProgressBar::new(total as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {per_sec} ETA: {eta}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            pb
        } else {
            ProgressBar::hidden()
        };

        let update_interval = std::cmp::max(1, total / 100);
        let progress_counter = AtomicUsize::new(0);

        let results: Vec<(usize, AnalysisResult<(PatientReport, ReportSource)>)> = {
            let engine = &*self;
            records
                .par_iter()
                .enumerate()
                .map(|(index, record)| {
                    let result = engine.analyze_with_cache(record);

                    let count = progress_counter.fetch_add(1, Ordering::Relaxed) + 1;
                    if count % update_interval == 0 {
                        pb.set_position(count as u64);
                    }

                    (index, result)
                })
                .collect()
        };

        pb.finish_with_message("✅ Patient analysis completed!");

        let mut outcome = BatchOutcome::default();
        let computed_at = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string();

        for (index, result) in results {
            match result {
                Ok((report, source)) => {
                    match source {
                        ReportSource::Computed(Some(key)) => {
                            if let Some(cache) = self.cache.as_mut() {
                                cache.insert(
                                    key,
                                    CachedAnalysis {
                                        analyses: report.analyses.clone(),
                                        assessment: report.assessment.clone(),
                                        computed_at: computed_at.clone(),
                                    },
                                );
                            }
                        }
                        ReportSource::Computed(None) => {}
                        ReportSource::Cached => outcome.cache_hits += 1,
                    }
                    outcome.reports.push(report);
                }
                Err(e) => {
                    let patient_id = records[index].patient_id.clone();
                    eprintln!("⚠️  Patient {} failed: {}", patient_id, e);
                    outcome.failures.push(FailedAnalysis {
                        patient_id,
                        error: e.to_string(),
                    });
                }
            }
        }

        println!(
            "✅ Analyzed {} patients in {:.2}s ({} from cache, {} failed)",
            outcome.reports.len(),
            start.elapsed().as_secs_f64(),
            outcome.cache_hits,
            outcome.failures.len()
        );

        outcome
    }

    fn analyze_with_cache(
        &self,
        record: &PatientRecord,
    ) -> AnalysisResult<(PatientReport, ReportSource)> {
        let input = parse_record(record)?;

        let Some(cache) = &self.cache else {
            return Ok((self.analyze_sequences(&input)?, ReportSource::Computed(None)));
        };

        let key = CacheKey::new(&input.reference, &input.sample);
        if let Some(hit) = cache.get(&key) {
            return Ok((
                PatientReport {
                    patient_id: input.patient_id,
                    gene_type: input.gene_type,
                    analyses: hit.analyses.clone(),
                    assessment: hit.assessment.clone(),
                },
                ReportSource::Cached,
            ));
        }

        Ok((self.analyze_sequences(&input)?, ReportSource::Computed(Some(key))))
    }
}

/// Where a batch report came from; computed reports carry the key to store
/// when a cache is attached
enum ReportSource {
    Computed(Option<CacheKey>),
    Cached,
}

fn parse_record(record: &PatientRecord) -> AnalysisResult<PatientSequences> {
    Ok(PatientSequences::new(
        &record.patient_id,
        &record.gene_type,
        Sequence::parse(&record.reference)?,
        Sequence::parse(&record.sample)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::mutation::MutationKind;
    use crate::core::risk::RiskLevel;

    fn engine() -> AnalysisEngine {
        AnalysisEngine::new(AnalysisConfig::default()).unwrap()
    }

    #[test]
    fn test_identical_pair_is_normal() {
        let report = engine()
            .analyze_patient(&PatientRecord::new("P001", "BRCA1", "ATCGATCG", "ATCGATCG"))
            .unwrap();

        assert_eq!(report.analyses.alignment.identity_percent, 100.0);
        assert_eq!(report.analyses.mutation.mutation_count, 0);
        assert_eq!(report.assessment.risk_level, RiskLevel::Normal);
    }

    #[test]
    fn test_insertion_pair() {
        let report = engine()
            .analyze_patient(&PatientRecord::new("P002", "TP53", "AAAA", "AAAAAA"))
            .unwrap();

        let mutations = &report.analyses.mutation.mutations;
        assert_eq!(mutations.len(), 2);
        assert!(mutations.iter().all(|m| m.kind == MutationKind::Insertion));
        let positions: Vec<usize> = mutations.iter().map(|m| m.position).collect();
        assert_eq!(positions, vec![4, 5]);
    }

    #[test]
    fn test_lowercase_input_is_normalized() {
        let report = engine()
            .analyze_patient(&PatientRecord::new("P003", "BRCA2", " atcg ", "ATCG"))
            .unwrap();
        assert_eq!(report.analyses.alignment.identity_percent, 100.0);
    }

    #[test]
    fn test_invalid_and_empty_input() {
        let err = engine()
            .analyze_patient(&PatientRecord::new("P004", "BRCA1", "ACGN", "ACGT"))
            .unwrap_err();
        assert_eq!(
            err,
            AnalysisError::InvalidSequence {
                position: 3,
                symbol: 'N'
            }
        );

        let err = engine()
            .analyze_patient(&PatientRecord::new("P005", "BRCA1", "", ""))
            .unwrap_err();
        assert!(matches!(err, AnalysisError::EmptyInput(_)));

        // one empty side is still analyzable
        let report = engine()
            .analyze_patient(&PatientRecord::new("P006", "BRCA1", "ACGT", ""))
            .unwrap();
        assert_eq!(report.analyses.mutation.spectrum.deletions, 4);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = AnalysisConfig {
            hotspot_window: 0,
            ..AnalysisConfig::default()
        };
        assert!(AnalysisEngine::new(config).is_err());
    }

    #[test]
    fn test_batch_keeps_order_and_records_failures() {
        let records = vec![
            PatientRecord::new("P001", "BRCA1", "ATCGATCG", "ATCGATCG"),
            PatientRecord::new("P002", "BRCA1", "ATCGXTCG", "ATCGATCG"),
            PatientRecord::new("P003", "TP53", "ATCGATCG", "ATCGATTG"),
            PatientRecord::new("P004", "TP53", "", ""),
            PatientRecord::new("P005", "BRCA2", "AAAA", "AAAAAA"),
        ];

        let outcome = engine().analyze_batch(&records);

        let ids: Vec<&str> = outcome.reports.iter().map(|r| r.patient_id.as_str()).collect();
        assert_eq!(ids, vec!["P001", "P003", "P005"]);
        let failed: Vec<&str> = outcome.failures.iter().map(|f| f.patient_id.as_str()).collect();
        assert_eq!(failed, vec!["P002", "P004"]);
        assert_eq!(outcome.cache_hits, 0);
    }

    #[test]
    fn test_batch_without_cache_counts_no_hits() {
        let mut engine = engine();
        let records = vec![
            PatientRecord::new("P001", "BRCA1", "ATCGATCG", "ATCGATTG"),
            PatientRecord::new("P002", "BRCA1", "ATCGATCG", "ATCGATTG"),
        ];

        for _ in 0..2 {
            let outcome = engine.analyze_batch(&records);
            assert_eq!(outcome.reports.len(), 2);
            assert_eq!(outcome.cache_hits, 0);
        }
        assert!(engine.cache_mut().is_none());
    }

    #[test]
    fn test_batch_matches_single_patient_analysis() {
        let engine_single = engine();
        let records: Vec<PatientRecord> = (0..20)
            .map(|i| {
                let sample = if i % 2 == 0 { "ACGTACGTTA" } else { "ACGAACGTAC" };
                PatientRecord::new(&format!("P{:03}", i), "BRCA1", "ACGTACGTAC", sample)
            })
            .collect();

        let outcome = engine().analyze_batch(&records);
        assert_eq!(outcome.reports.len(), 20);
        for (record, report) in records.iter().zip(&outcome.reports) {
            assert_eq!(report, &engine_single.analyze_patient(record).unwrap());
        }
    }

    #[test]
    fn test_batch_uses_cache() {
        let config = AnalysisConfig::default();
        let mut engine = AnalysisEngine::new(config.clone()).unwrap();
        engine.set_cache(AnalysisCache::new(config));

        let records = vec![
            PatientRecord::new("P001", "BRCA1", "ATCGATCG", "ATCGATTG"),
            PatientRecord::new("P002", "BRCA1", "ACGTACGT", "ACGTACGT"),
        ];

        let first = engine.analyze_batch(&records);
        assert_eq!(first.cache_hits, 0);
        assert_eq!(engine.cache_mut().map(|c| c.len()), Some(2));

        let renamed = vec![PatientRecord::new("P999", "TP53", "atcgatcg", "atcgattg")];
        let second = engine.analyze_batch(&renamed);
        assert_eq!(second.cache_hits, 1);
        assert_eq!(second.reports[0].patient_id, "P999");
        assert_eq!(second.reports[0].gene_type, "TP53");
        assert_eq!(second.reports[0].analyses, first.reports[0].analyses);
    }
}
