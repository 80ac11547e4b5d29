// cache.rs - Persistent cache of per-patient analyses

use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::core::config::AnalysisConfig;
use crate::core::engine::AnalysisBundle;
use crate::core::risk::Assessment;
use crate::data::Sequence;

pub const CACHE_FORMAT_VERSION: u32 = 1;

/// CRC32 and length of one sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Fingerprint {
    pub crc32: u32,
    pub length: usize,
}

impl Fingerprint {
    pub fn of(sequence: &Sequence) -> Self {
        Self {
            crc32: sequence.checksum(),
            length: sequence.len(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CacheKey {
    pub reference: Fingerprint,
    pub sample: Fingerprint,
}

impl CacheKey {
    pub fn new(reference: &Sequence, sample: &Sequence) -> Self {
        Self {
            reference: Fingerprint::of(reference),
            sample: Fingerprint::of(sample),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedAnalysis {
    pub analyses: AnalysisBundle,
    pub assessment: Assessment,
    pub computed_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheMetadata {
    pub version: String,
    pub created: String,
    pub last_modified: String,
    pub config: AnalysisConfig,
    pub preset: String,
    pub user_note: Option<String>,
    pub total_entries: usize,
    pub format_version: u32,
}

/// On-disk layout: bincode body compressed with LZ4 (size-prepended)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheFile {
    pub metadata: CacheMetadata,
    pub entries: Vec<(CacheKey, CachedAnalysis)>,
}

impl CacheFile {
    pub fn read(cache_path: &str) -> Result<Self, String> {
        let compressed = std::fs::read(cache_path)
            .map_err(|e| format!("Failed to read cache file '{}': {}", cache_path, e))?;

        let decompressed = lz4_flex::decompress_size_prepended(&compressed)
            .map_err(|e| format!("Failed to decompress cache: {}", e))?;

        let cache_file: CacheFile = bincode::deserialize(&decompressed)
            .map_err(|e| format!("Failed to deserialize cache: {}", e))?;

        if cache_file.metadata.format_version != CACHE_FORMAT_VERSION {
            return Err(format!(
                "Unsupported cache format version {} (expected {})",
                cache_file.metadata.format_version, CACHE_FORMAT_VERSION
            ));
        }

        Ok(cache_file)
    }
}

/// In-memory cache keyed by sequence-pair fingerprints
#[derive(Debug)]
pub struct AnalysisCache {
    entries: HashMap<CacheKey, CachedAnalysis>,
    config: AnalysisConfig,
    created: Option<String>,
    note: Option<String>,
    has_new_entries: bool,
}

impl AnalysisCache {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            entries: HashMap::new(),
            config,
            created: None,
            note: None,
            has_new_entries: false,
        }
    }

    /// Set a user note for the cache
    pub fn set_note(&mut self, note: String) {
        self.note = Some(note);
    }

    pub fn get(&self, key: &CacheKey) -> Option<&CachedAnalysis> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: CacheKey, analysis: CachedAnalysis) {
        self.entries.insert(key, analysis);
        self.has_new_entries = true;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check if cache has new entries since last save/load
    pub fn has_new_entries(&self) -> bool {
        self.has_new_entries
    }

    /// Save cache to LZ4 compressed file
    pub fn save(&mut self, cache_path: &str) -> Result<(), String> {
        println!("💾 Saving cache to {}...", cache_path);
        let start = Instant::now();

        let now = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string();

        let mut entries: Vec<(CacheKey, CachedAnalysis)> = self
            .entries
            .iter()
            .map(|(key, value)| (*key, value.clone()))
            .collect();
        entries.sort_by_key(|(key, _)| *key);

        let metadata = CacheMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            created: self.created.clone().unwrap_or_else(|| now.clone()),
            last_modified: now,
            config: self.config.clone(),
            preset: self.config.detect_preset().to_string(),
            user_note: self.note.clone(),
            total_entries: entries.len(),
            format_version: CACHE_FORMAT_VERSION,
        };

        let cache_file = CacheFile { metadata, entries };
        let cache_data = bincode::serialize(&cache_file)
            .map_err(|e| format!("Failed to serialize cache: {}", e))?;

        let compressed = lz4_flex::compress_prepend_size(&cache_data);

        if let Some(parent) = Path::new(cache_path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    format!("Failed to create cache directory '{}': {}", parent.display(), e)
                })?;
            }
        }
        std::fs::write(cache_path, &compressed)
            .map_err(|e| format!("Failed to write cache file: {}", e))?;

        println!(
            "✅ Cache saved in {:.2}s ({} entries, {} KB)",
            start.elapsed().as_secs_f64(),
            self.entries.len(),
            compressed.len() / 1024
        );
        if let Some(note) = &self.note {
            println!("📝 User note: {}", note);
        }

        self.created = Some(cache_file.metadata.created);
        self.has_new_entries = false;
        Ok(())
    }

    /// Load entries from disk. A cache built with different analysis
    /// parameters is rejected unless `force_recompute` is set, in which case
    /// its entries are discarded.
    pub fn load(&mut self, cache_path: &str, force_recompute: bool) -> Result<(), String> {
        println!("📂 Loading cache from {}...", cache_path);
        let start = Instant::now();

        let cache_file = CacheFile::read(cache_path)?;
        let metadata = cache_file.metadata;

        if !metadata.config.same_parameters(&self.config) {
            if force_recompute {
                println!(
                    "⚠️  Cache was built with '{}' parameters, current run uses '{}'; ignoring cached entries",
                    metadata.preset,
                    self.config.detect_preset()
                );
                self.entries.clear();
                self.has_new_entries = false;
                return Ok(());
            }
            return Err(format!(
                "Cache configuration mismatch:\n  Cache: {:?}\n  Engine: {:?}\n  Use --force-recompute to rebuild it",
                metadata.config, self.config
            ));
        }

        self.entries = cache_file.entries.into_iter().collect();
        self.created = Some(metadata.created);
        if self.note.is_none() {
            self.note = metadata.user_note;
        }
        self.has_new_entries = false;

        if let Some(note) = &self.note {
            println!("📝 Cache note: {}", note);
        }
        println!(
            "✅ Cache loaded in {:.2}s: {} entries (v{}, {} preset)",
            start.elapsed().as_secs_f64(),
            self.entries.len(),
            metadata.version,
            metadata.preset
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::engine::AnalysisEngine;
    use crate::data::PatientRecord;

    fn cached_entry(engine: &AnalysisEngine, reference: &str, sample: &str) -> (CacheKey, CachedAnalysis) {
        let record = PatientRecord::new("P001", "BRCA1", reference, sample);
        let report = engine.analyze_patient(&record).unwrap();
        let key = CacheKey::new(
            &Sequence::parse(reference).unwrap(),
            &Sequence::parse(sample).unwrap(),
        );
        (
            key,
            CachedAnalysis {
                analyses: report.analyses,
                assessment: report.assessment,
                computed_at: "2024-01-01 00:00:00 UTC".to_string(),
            },
        )
    }

    #[test]
    fn test_fingerprint_distinguishes_pairs() {
        let a = Sequence::parse("ACGT").unwrap();
        let b = Sequence::parse("ACGA").unwrap();
        assert_eq!(CacheKey::new(&a, &b), CacheKey::new(&a, &b));
        assert_ne!(CacheKey::new(&a, &b), CacheKey::new(&b, &a));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("analysis.lz4");
        let path = path.to_str().unwrap();

        let config = AnalysisConfig::default();
        let engine = AnalysisEngine::new(config.clone()).unwrap();
        let (key, entry) = cached_entry(&engine, "ATCGATCG", "ATCGATTG");

        let mut cache = AnalysisCache::new(config.clone());
        cache.set_note("round trip".to_string());
        cache.insert(key, entry.clone());
        assert!(cache.has_new_entries());
        cache.save(path).unwrap();
        assert!(!cache.has_new_entries());

        let mut loaded = AnalysisCache::new(config);
        loaded.load(path, false).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.get(&key), Some(&entry));
        assert!(!loaded.has_new_entries());

        let file = CacheFile::read(path).unwrap();
        assert_eq!(file.metadata.total_entries, 1);
        assert_eq!(file.metadata.preset, "clinical");
        assert_eq!(file.metadata.user_note.as_deref(), Some("round trip"));
    }

    #[test]
    fn test_config_mismatch_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("analysis.lz4");
        let path = path.to_str().unwrap();

        let clinical = AnalysisConfig::default();
        let engine = AnalysisEngine::new(clinical.clone()).unwrap();
        let (key, entry) = cached_entry(&engine, "ACGTACGT", "ACGTACGA");
        let mut cache = AnalysisCache::new(clinical);
        cache.insert(key, entry);
        cache.save(path).unwrap();

        let sensitive = AnalysisConfig::from_preset("sensitive").unwrap();
        let mut other = AnalysisCache::new(sensitive.clone());
        let err = other.load(path, false).unwrap_err();
        assert!(err.contains("mismatch"));

        let mut forced = AnalysisCache::new(sensitive);
        forced.load(path, true).unwrap();
        assert!(forced.is_empty());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.lz4");
        std::fs::write(&path, b"not a cache").unwrap();

        let mut cache = AnalysisCache::new(AnalysisConfig::default());
        assert!(cache.load(path.to_str().unwrap(), false).is_err());
    }
}
