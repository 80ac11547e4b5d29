// mutation.rs - Mutation enumeration, classification and hotspot detection

use serde::{Deserialize, Serialize};

use crate::core::config::validate_hotspots;
use crate::core::traits::{PatientSequences, SequenceAnalyzer};
use crate::data::sequence::{is_transition, GAP};
use crate::data::Sequence;
use crate::error::AnalysisResult;

/// Kind of a positional difference between reference and sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MutationKind {
    Transition,
    Transversion,
    Insertion,
    Deletion,
}

impl MutationKind {
    /// Classify a substitution of `from` by `to`
    pub fn of_substitution(from: u8, to: u8) -> Self {
        if is_transition(from, to) {
            MutationKind::Transition
        } else {
            MutationKind::Transversion
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mutation {
    pub position: usize,
    /// `-` for insertions
    pub ref_base: char,
    /// `-` for deletions
    pub sample_base: char,
    pub kind: MutationKind,
}

/// Window whose mutation density exceeds the configured threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hotspot {
    pub window_start: usize,
    /// Exclusive
    pub window_end: usize,
    pub mutation_count: usize,
    pub mutation_density: f64,
}

/// Per-kind mutation counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationSpectrum {
    pub transitions: usize,
    pub transversions: usize,
    pub insertions: usize,
    pub deletions: usize,
}

impl MutationSpectrum {
    fn record(&mut self, kind: MutationKind) {
        match kind {
            MutationKind::Transition => self.transitions += 1,
            MutationKind::Transversion => self.transversions += 1,
            MutationKind::Insertion => self.insertions += 1,
            MutationKind::Deletion => self.deletions += 1,
        }
    }

    pub fn substitutions(&self) -> usize {
        self.transitions + self.transversions
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationReport {
    pub mutations: Vec<Mutation>,
    pub mutation_count: usize,
    pub mutation_rate_percent: f64,
    pub hotspots: Vec<Hotspot>,
    pub spectrum: MutationSpectrum,
}

/// Enumerates and classifies differences between reference and sample
#[derive(Debug, Clone)]
pub struct MutationClassifier {
    window_size: usize,
    density_threshold: f64,
}

impl MutationClassifier {
    pub fn new(window_size: usize, density_threshold: f64) -> AnalysisResult<Self> {
        validate_hotspots(window_size, density_threshold)?;
        Ok(Self {
            window_size,
            density_threshold,
        })
    }

    pub fn detect(&self, reference: &Sequence, sample: &Sequence) -> MutationReport {
        let ref_bytes = reference.as_bytes();
        let sample_bytes = sample.as_bytes();
        let aligned_length = ref_bytes.len().max(sample_bytes.len());

        let mutations = find_mutations(ref_bytes, sample_bytes);

        let mut spectrum = MutationSpectrum::default();
        for mutation in &mutations {
            spectrum.record(mutation.kind);
        }

        let mutation_rate_percent = if aligned_length == 0 {
            0.0
        } else {
            mutations.len() as f64 / aligned_length as f64 * 100.0
        };

        let hotspots = self.find_hotspots(&mutations, aligned_length);

        MutationReport {
            mutation_count: mutations.len(),
            mutations,
            mutation_rate_percent,
            hotspots,
            spectrum,
        }
    }

    /// Non-overlapping fixed windows over the aligned length.
    /// `mutations` must be position-ascending.
    fn find_hotspots(&self, mutations: &[Mutation], aligned_length: usize) -> Vec<Hotspot> {
        let mut hotspots = Vec::new();
        let mut next = 0;

        for window_start in (0..aligned_length).step_by(self.window_size) {
            let window_end = window_start.saturating_add(self.window_size).min(aligned_length);

            let first = next;
            while next < mutations.len() && mutations[next].position < window_end {
                next += 1;
            }
            let mutation_count = next - first;
            if mutation_count == 0 {
                continue;
            }

            let mutation_density = mutation_count as f64 / self.window_size as f64;
            if mutation_density > self.density_threshold {
                hotspots.push(Hotspot {
                    window_start,
                    window_end,
                    mutation_count,
                    mutation_density,
                });
            }
        }

        hotspots
    }
}

impl SequenceAnalyzer for MutationClassifier {
    type Output = MutationReport;

    fn name(&self) -> &'static str {
        "MutationClassifier"
    }

    fn description(&self) -> &'static str {
        "Transition/transversion/indel classification with hotspot windows"
    }

    fn analyze(&self, input: &PatientSequences) -> MutationReport {
        self.detect(&input.reference, &input.sample)
    }
}

/// All positional differences, position-ascending
pub fn find_mutations(reference: &[u8], sample: &[u8]) -> Vec<Mutation> {
    let min_len = reference.len().min(sample.len());
    let mut mutations = Vec::new();

    for (position, (&r, &s)) in reference.iter().zip(sample.iter()).enumerate() {
        if r != s {
            mutations.push(Mutation {
                position,
                ref_base: r as char,
                sample_base: s as char,
                kind: MutationKind::of_substitution(r, s),
            });
        }
    }

    if sample.len() > min_len {
        for (position, &s) in sample.iter().enumerate().skip(min_len) {
            mutations.push(Mutation {
                position,
                ref_base: GAP,
                sample_base: s as char,
                kind: MutationKind::Insertion,
            });
        }
    } else if reference.len() > min_len {
        for (position, &r) in reference.iter().enumerate().skip(min_len) {
            mutations.push(Mutation {
                position,
                ref_base: r as char,
                sample_base: GAP,
                kind: MutationKind::Deletion,
            });
        }
    }

    mutations
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(s: &str) -> Sequence {
        Sequence::parse(s).unwrap()
    }

    fn classifier() -> MutationClassifier {
        MutationClassifier::new(50, 0.1).unwrap()
    }

    #[test]
    fn test_identical_sequences_have_no_mutations() {
        let report = classifier().detect(&seq("ATCGATCG"), &seq("ATCGATCG"));
        assert_eq!(report.mutation_count, 0);
        assert_eq!(report.mutation_rate_percent, 0.0);
        assert!(report.hotspots.is_empty());
    }

    #[test]
    fn test_single_substitution() {
        let report = classifier().detect(&seq("ATCGATCG"), &seq("ATCGATTG"));
        assert_eq!(report.mutation_count, 1);
        assert_eq!(report.mutation_rate_percent, 12.5);

        let mutation = &report.mutations[0];
        assert_eq!(mutation.position, 6);
        assert_eq!(mutation.ref_base, 'C');
        assert_eq!(mutation.sample_base, 'T');
        assert_eq!(mutation.kind, MutationKind::Transition);
    }

    #[test]
    fn test_transition_and_transversion_kinds() {
        let report = classifier().detect(&seq("AAGGCT"), &seq("GTAACC"));
        let kinds: Vec<MutationKind> = report.mutations.iter().map(|m| m.kind).collect();
        assert_eq!(
            kinds,
            vec![
                MutationKind::Transition,   // A>G
                MutationKind::Transversion, // A>T
                MutationKind::Transition,   // G>A
                MutationKind::Transition,   // G>A
                MutationKind::Transition,   // T>C
            ]
        );
        assert_eq!(report.spectrum.transitions, 4);
        assert_eq!(report.spectrum.transversions, 1);
    }

    #[test]
    fn test_insertions_at_trailing_offsets() {
        let report = classifier().detect(&seq("AAAA"), &seq("AAAAAA"));
        assert_eq!(report.mutation_count, 2);

        let positions: Vec<usize> = report.mutations.iter().map(|m| m.position).collect();
        assert_eq!(positions, vec![4, 5]);
        assert!(report
            .mutations
            .iter()
            .all(|m| m.kind == MutationKind::Insertion && m.ref_base == '-'));
        assert_eq!(report.spectrum.insertions, 2);
    }

    #[test]
    fn test_deletions_when_reference_longer() {
        let report = classifier().detect(&seq("ACGTAC"), &seq("ACGT"));
        assert_eq!(report.mutation_count, 2);
        assert!(report
            .mutations
            .iter()
            .all(|m| m.kind == MutationKind::Deletion && m.sample_base == '-'));
        assert_eq!(report.mutations[0].ref_base, 'A');
        assert_eq!(report.mutations[1].position, 5);
    }

    #[test]
    fn test_detection_is_symmetric_in_positions_and_counts() {
        let pairs = [
            ("ATCGATCG", "ATCGATTG"),
            ("AAAA", "AAAAAA"),
            ("ACGTTGCA", "TGCAAC"),
            ("", "ACG"),
        ];
        let c = classifier();
        for (a, b) in pairs {
            let forward = c.detect(&seq(a), &seq(b));
            let backward = c.detect(&seq(b), &seq(a));

            assert_eq!(forward.mutation_count, backward.mutation_count);
            assert_eq!(forward.mutation_rate_percent, backward.mutation_rate_percent);
            let fwd: Vec<usize> = forward.mutations.iter().map(|m| m.position).collect();
            let bwd: Vec<usize> = backward.mutations.iter().map(|m| m.position).collect();
            assert_eq!(fwd, bwd);
            assert_eq!(forward.spectrum.insertions, backward.spectrum.deletions);
            assert_eq!(forward.spectrum.substitutions(), backward.spectrum.substitutions());
        }
    }

    #[test]
    fn test_empty_inputs() {
        let report = classifier().detect(&Sequence::empty(), &Sequence::empty());
        assert_eq!(report.mutation_count, 0);
        assert_eq!(report.mutation_rate_percent, 0.0);
    }

    #[test]
    fn test_hotspot_detection() {
        // 20 bases, window 10: first window has 2 mutations, second has 1
        let reference = seq("AAAAAAAAAAAAAAAAAAAA");
        let sample = seq("ACACAAAAAAAAAAAAAAAC");
        let c = MutationClassifier::new(10, 0.15).unwrap();
        let report = c.detect(&reference, &sample);

        assert_eq!(report.mutation_count, 3);
        assert_eq!(report.hotspots.len(), 1);
        let hotspot = &report.hotspots[0];
        assert_eq!(hotspot.window_start, 0);
        assert_eq!(hotspot.window_end, 10);
        assert_eq!(hotspot.mutation_count, 2);
        assert_eq!(hotspot.mutation_density, 0.2);
    }

    #[test]
    fn test_hotspot_threshold_is_strict_and_monotonic() {
        let reference = seq(&"A".repeat(40));
        let sample = seq(&format!("{}{}{}", "C".repeat(4), "A".repeat(26), "CCAAAAAAAA"));
        let mut previous = usize::MAX;
        for threshold in [0.0, 0.05, 0.1, 0.2, 0.3, 0.4, 0.5] {
            let c = MutationClassifier::new(10, threshold).unwrap();
            let count = c.detect(&reference, &sample).hotspots.len();
            assert!(count <= previous);
            previous = count;
        }

        // density exactly at the threshold is not a hotspot
        let c = MutationClassifier::new(10, 0.4).unwrap();
        assert!(c.detect(&reference, &sample).hotspots.is_empty());
    }

    #[test]
    fn test_trailing_window_is_clipped() {
        let c = MutationClassifier::new(4, 0.1).unwrap();
        let report = c.detect(&seq("AAAAAA"), &seq("AAAAAT"));
        assert_eq!(report.hotspots.len(), 1);
        assert_eq!(report.hotspots[0].window_start, 4);
        assert_eq!(report.hotspots[0].window_end, 6);
        assert_eq!(report.hotspots[0].mutation_density, 0.25);
    }

    #[test]
    fn test_invalid_configuration() {
        assert!(MutationClassifier::new(0, 0.1).is_err());
        assert!(MutationClassifier::new(50, -1.0).is_err());
        assert!(MutationClassifier::new(50, f64::NAN).is_err());
    }
}
