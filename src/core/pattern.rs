// pattern.rs - Motif, repeat and conserved-region discovery

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::config::{
    validate_conserved, validate_motifs, validate_repeats, AnalysisConfig, MotifDefinition,
};
use crate::core::traits::{PatientSequences, SequenceAnalyzer};
use crate::data::sequence::{base_index, gc_percent};
use crate::data::Sequence;
use crate::error::AnalysisResult;

/// Repeated k-mer lengths searched by the scanner
const KMER_LENGTHS: std::ops::RangeInclusive<usize> = 3..=10;
/// Minimum occurrences of a repeated k-mer
const MIN_KMER_FREQUENCY: usize = 3;
const MAX_REPORTED_KMERS: usize = 10;
const MAX_KMER_POSITIONS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Motif {
    pub name: String,
    pub position: usize,
    pub matched_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TandemRepeat {
    pub unit: String,
    pub start: usize,
    /// Exclusive
    pub end: usize,
    pub repeat_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConservedRegion {
    pub start: usize,
    /// Exclusive
    pub end: usize,
    pub length: usize,
    /// Shannon entropy of the region in bits
    pub entropy: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KmerRepeat {
    pub kmer: String,
    pub frequency: usize,
    /// First occurrences (at most five)
    pub positions: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternReport {
    pub motifs: Vec<Motif>,
    pub tandem_repeats: Vec<TandemRepeat>,
    pub conserved_regions: Vec<ConservedRegion>,
    pub repeated_kmers: Vec<KmerRepeat>,
    pub complexity_score: f64,
    pub sequence_length: usize,
    pub gc_content: f64,
}

impl PatternReport {
    pub fn empty() -> Self {
        Self {
            motifs: Vec::new(),
            tandem_repeats: Vec::new(),
            conserved_regions: Vec::new(),
            repeated_kmers: Vec::new(),
            complexity_score: 0.0,
            sequence_length: 0,
            gc_content: 0.0,
        }
    }

    /// Distinct motif names found, in first-match order
    pub fn motif_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for motif in &self.motifs {
            if !names.contains(&motif.name.as_str()) {
                names.push(&motif.name);
            }
        }
        names
    }
}

/// Scans a single sequence for motifs, repeats and low-complexity stretches
#[derive(Debug, Clone)]
pub struct MotifScanner {
    motifs: Vec<MotifDefinition>,
    min_unit: usize,
    max_unit: usize,
    min_copies: usize,
    min_conserved_length: usize,
    entropy_threshold: f64,
}

impl MotifScanner {
    pub fn from_config(config: &AnalysisConfig) -> AnalysisResult<Self> {
        validate_motifs(&config.motifs)?;
        validate_repeats(
            config.min_repeat_unit,
            config.max_repeat_unit,
            config.min_repeat_copies,
        )?;
        validate_conserved(config.min_conserved_length, config.conserved_entropy_threshold)?;

        let motifs = config
            .motifs
            .iter()
            .map(|m| MotifDefinition::new(&m.name, &m.pattern))
            .collect();

        Ok(Self {
            motifs,
            min_unit: config.min_repeat_unit,
            max_unit: config.max_repeat_unit,
            min_copies: config.min_repeat_copies,
            min_conserved_length: config.min_conserved_length,
            entropy_threshold: config.conserved_entropy_threshold,
        })
    }

    pub fn motif_table(&self) -> &[MotifDefinition] {
        &self.motifs
    }

    pub fn scan(&self, sequence: &Sequence) -> PatternReport {
        if sequence.is_empty() {
            return PatternReport::empty();
        }
        let bases = sequence.as_bytes();

        PatternReport {
            motifs: self.find_known_motifs(bases),
            tandem_repeats: self.find_tandem_repeats(bases),
            conserved_regions: self.find_conserved_regions(bases),
            repeated_kmers: find_repeated_kmers(bases),
            complexity_score: complexity_score(bases),
            sequence_length: bases.len(),
            gc_content: gc_percent(bases),
        }
    }

    /// Non-overlapping literal hits of every table entry, ordered by position
    /// and then by table order
    fn find_known_motifs(&self, bases: &[u8]) -> Vec<Motif> {
        let mut hits: Vec<(usize, usize)> = Vec::new();
        for (table_index, motif) in self.motifs.iter().enumerate() {
            for position in find_non_overlapping(bases, motif.pattern.as_bytes()) {
                hits.push((position, table_index));
            }
        }
        hits.sort_unstable();

        hits.into_iter()
            .map(|(position, table_index)| {
                let motif = &self.motifs[table_index];
                Motif {
                    name: motif.name.clone(),
                    position,
                    matched_text: motif.pattern.clone(),
                }
            })
            .collect()
    }

    /// Greedy left-to-right: the longest run starting at each offset wins
    /// (shorter unit on ties) and scanning resumes after it.
    fn find_tandem_repeats(&self, bases: &[u8]) -> Vec<TandemRepeat> {
        let n = bases.len();
        let mut repeats = Vec::new();
        let mut i = 0;

        while i < n {
            let mut best: Option<(usize, usize)> = None; // (unit length, copies)

            for k in self.min_unit..=self.max_unit {
                if k > (n - i) / 2 {
                    break;
                }
                let unit = &bases[i..i + k];
                let mut copies = 1;
                let mut j = i + k;
                while j + k <= n && &bases[j..j + k] == unit {
                    copies += 1;
                    j += k;
                }

                if copies >= self.min_copies {
                    let span = copies * k;
                    if best.map_or(true, |(bk, bc)| span > bk * bc) {
                        best = Some((k, copies));
                    }
                }
            }

            match best {
                Some((k, copies)) => {
                    let end = i + k * copies;
                    repeats.push(TandemRepeat {
                        unit: String::from_utf8_lossy(&bases[i..i + k]).into_owned(),
                        start: i,
                        end,
                        repeat_count: copies,
                    });
                    i = end;
                }
                None => i += 1,
            }
        }

        repeats
    }

    /// A seed window of the minimum length below the entropy threshold grows
    /// to the furthest end whose whole window is still below it; scanning
    /// resumes after that end.
    fn find_conserved_regions(&self, bases: &[u8]) -> Vec<ConservedRegion> {
        let n = bases.len();
        let w = self.min_conserved_length;
        let mut regions = Vec::new();
        if n < w {
            return regions;
        }

        let mut start = 0;
        let mut counts = count_bases(&bases[start..start + w]);

        loop {
            if shannon_entropy(&counts) < self.entropy_threshold {
                let mut end = start + w;
                let mut best_counts = counts;
                for (offset, &base) in bases[start + w..].iter().enumerate() {
                    counts[base_slot(base)] += 1;
                    if shannon_entropy(&counts) < self.entropy_threshold {
                        end = start + w + offset + 1;
                        best_counts = counts;
                    }
                }

                regions.push(ConservedRegion {
                    start,
                    end,
                    length: end - start,
                    entropy: shannon_entropy(&best_counts),
                });

                start = end;
                if start + w > n {
                    break;
                }
                counts = count_bases(&bases[start..start + w]);
            } else {
                if start + w >= n {
                    break;
                }
                counts[base_slot(bases[start])] -= 1;
                counts[base_slot(bases[start + w])] += 1;
                start += 1;
            }
        }

        regions
    }
}

impl SequenceAnalyzer for MotifScanner {
    type Output = PatternReport;

    fn name(&self) -> &'static str {
        "MotifScanner"
    }

    fn description(&self) -> &'static str {
        "Known motifs, tandem repeats, conserved regions and complexity of the sample"
    }

    fn analyze(&self, input: &PatientSequences) -> PatternReport {
        self.scan(&input.sample)
    }
}

#[inline]
fn base_slot(base: u8) -> usize {
    // Sequences are validated on construction
    base_index(base).unwrap_or(0)
}

fn count_bases(bases: &[u8]) -> [usize; 4] {
    let mut counts = [0usize; 4];
    for &b in bases {
        counts[base_slot(b)] += 1;
    }
    counts
}

/// Shannon entropy in bits of a symbol count distribution
pub fn shannon_entropy(counts: &[usize]) -> f64 {
    let total: usize = counts.iter().sum();
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    counts
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = c as f64 / total;
            -p * p.log2()
        })
        .sum()
}

/// Entropy of the most even split of `length` symbols over the alphabet
fn max_entropy_for_length(length: usize) -> f64 {
    let bins = length.min(4);
    if bins <= 1 {
        return 0.0;
    }
    let base = length / bins;
    let extra = length % bins;
    let mut counts = [0usize; 4];
    for (i, slot) in counts.iter_mut().take(bins).enumerate() {
        *slot = base + usize::from(i < extra);
    }
    shannon_entropy(&counts)
}

/// Whole-sequence entropy normalized by the maximum achievable for its length
pub fn complexity_score(bases: &[u8]) -> f64 {
    let max_entropy = max_entropy_for_length(bases.len());
    if max_entropy == 0.0 {
        return 0.0;
    }
    (shannon_entropy(&count_bases(bases)) / max_entropy).clamp(0.0, 1.0)
}

/// Start offsets of non-overlapping occurrences of `pattern`
pub fn find_non_overlapping(bases: &[u8], pattern: &[u8]) -> Vec<usize> {
    let m = pattern.len();
    let mut positions = Vec::new();
    if m == 0 || m > bases.len() {
        return positions;
    }

    let mut i = 0;
    while i + m <= bases.len() {
        if &bases[i..i + m] == pattern {
            positions.push(i);
            i += m;
        } else {
            i += 1;
        }
    }
    positions
}

/// k-mers occurring at least three times (overlapping), most frequent first
fn find_repeated_kmers(bases: &[u8]) -> Vec<KmerRepeat> {
    let n = bases.len();
    let mut repeats = Vec::new();

    for k in KMER_LENGTHS {
        if k >= n / 2 {
            break;
        }
        let mut occurrences: BTreeMap<&[u8], Vec<usize>> = BTreeMap::new();
        for i in 0..=n - k {
            occurrences.entry(&bases[i..i + k]).or_default().push(i);
        }

        for (kmer, positions) in occurrences {
            if positions.len() >= MIN_KMER_FREQUENCY {
                repeats.push(KmerRepeat {
                    kmer: String::from_utf8_lossy(kmer).into_owned(),
                    frequency: positions.len(),
                    positions: positions.into_iter().take(MAX_KMER_POSITIONS).collect(),
                });
            }
        }
    }

    repeats.sort_by(|a, b| {
        b.frequency
            .cmp(&a.frequency)
            .then(a.kmer.len().cmp(&b.kmer.len()))
            .then(a.kmer.cmp(&b.kmer))
    });
    repeats.truncate(MAX_REPORTED_KMERS);
    repeats
}
