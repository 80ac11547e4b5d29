// inspector.rs - Analysis cache inspector
// Features: LZ4 cache inspection, preset detection, compatibility checks, risk distribution

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use argh::FromArgs;

use geneseq::core::{AnalysisConfig, CacheFile, RiskAggregator, RiskLevel};
use geneseq::output::RiskSummary;

#[derive(FromArgs)]
/// Inspect geneseq analysis cache files
struct Args {
    /// path to the cache file (.lz4)
    #[argh(option)]
    cache: String,

    /// show one line per cached entry
    #[argh(switch)]
    detailed: bool,

    /// check compatibility with a preset: clinical, sensitive, conservative
    #[argh(option)]
    check_compatibility: Option<String>,

    /// export per-entry summary to TSV file
    #[argh(option)]
    export_summary: Option<String>,

    /// validate cache integrity
    #[argh(switch)]
    validate: bool,

    /// quiet mode - minimal output
    #[argh(switch)]
    quiet: bool,
}

// ============================================================================
// CACHE LOADING
// ============================================================================

fn load_cache(cache_path: &Path, quiet: bool) -> Result<CacheFile, String> {
    if !cache_path.exists() {
        return Err(format!("Cache file does not exist: {}", cache_path.display()));
    }
    if !quiet {
        println!("Loading cache: {}", cache_path.display());
    }

    let path = cache_path
        .to_str()
        .ok_or_else(|| format!("Invalid cache path: {}", cache_path.display()))?;
    let cache = CacheFile::read(path)?;

    if !quiet {
        println!("✅ Cache loaded successfully");
    }
    Ok(cache)
}

// ============================================================================
// ANALYSIS FUNCTIONS
// ============================================================================

fn analyze_cache_overview(cache: &CacheFile, args: &Args) {
    if args.quiet {
        return;
    }

    let metadata = &cache.metadata;
    println!("\n=== CACHE SUMMARY ===");
    println!("Version: {}", metadata.version);
    println!("Created: {}", metadata.created);
    println!("Last modified: {}", metadata.last_modified);
    println!("Format version: {}", metadata.format_version);
    println!("Total entries: {}", cache.entries.len());
    if let Some(note) = &metadata.user_note {
        println!("📝 Note: {}", note);
    }

    let count = cache.entries.len();
    if count > 0 {
        let total_rate: f64 = cache
            .entries
            .iter()
            .map(|(_, e)| e.assessment.mutation_rate_percent)
            .sum();
        let total_identity: f64 = cache
            .entries
            .iter()
            .map(|(_, e)| e.assessment.sequence_identity_percent)
            .sum();
        let total_motifs: usize = cache
            .entries
            .iter()
            .map(|(_, e)| e.analyses.pattern.motifs.len())
            .sum();

        println!("\n=== ANALYSIS STATISTICS ===");
        println!("Average mutation rate: {:.2}%", total_rate / count as f64);
        println!("Average identity: {:.2}%", total_identity / count as f64);
        println!("Average motifs per sample: {:.2}", total_motifs as f64 / count as f64);
    }
}

fn analyze_config(cache: &CacheFile, args: &Args) {
    if args.quiet {
        return;
    }

    let config = &cache.metadata.config;
    println!("\n=== ANALYSIS CONFIGURATION ===");
    println!("Preset: {}", cache.metadata.preset);
    if let Some(description) = &config.description {
        println!("Description: {}", description);
    }
    println!("Hotspot window: {}", config.hotspot_window);
    println!("Hotspot threshold: {}", config.hotspot_threshold);
    println!("HIGH risk rate: ≥ {}%", config.high_rate_threshold);
    println!("MODERATE risk rate: ≥ {}%", config.moderate_rate_threshold);
    println!(
        "Conserved regions: ≥ {} bases below {} bits",
        config.min_conserved_length, config.conserved_entropy_threshold
    );
    println!(
        "Tandem repeats: unit {}..={} with ≥ {} copies",
        config.min_repeat_unit, config.max_repeat_unit, config.min_repeat_copies
    );
    let motif_names: Vec<&str> = config.motifs.iter().map(|m| m.name.as_str()).collect();
    println!("Motifs ({}): {}", motif_names.len(), motif_names.join(", "));
}

fn risk_distribution(cache: &CacheFile) -> RiskSummary {
    RiskSummary::from_levels(cache.entries.iter().map(|(_, e)| e.assessment.risk_level))
}

fn analyze_risk_distribution(cache: &CacheFile, args: &Args) {
    if args.quiet {
        return;
    }

    let summary = risk_distribution(cache);
    let total = summary.total().max(1) as f64;

    println!("\n=== RISK DISTRIBUTION ===");
    for level in RiskLevel::ALL {
        let count = summary.count(level);
        println!(
            "{:<9} {:>6} ({:.1}%)",
            level.as_str(),
            count,
            count as f64 / total * 100.0
        );
    }

    let mut by_kind: BTreeMap<&str, usize> = BTreeMap::new();
    for (_, entry) in &cache.entries {
        let spectrum = &entry.analyses.mutation.spectrum;
        *by_kind.entry("transitions").or_default() += spectrum.transitions;
        *by_kind.entry("transversions").or_default() += spectrum.transversions;
        *by_kind.entry("insertions").or_default() += spectrum.insertions;
        *by_kind.entry("deletions").or_default() += spectrum.deletions;
    }
    println!("\n=== MUTATION SPECTRUM ===");
    for (kind, count) in by_kind {
        println!("{:<14} {}", kind, count);
    }
}

fn show_entries(cache: &CacheFile) {
    println!("\n=== CACHED ENTRIES ===");
    println!("ref_crc32  ref_len  sample_crc32  sample_len  risk      rate%   identity%  computed_at");
    for (key, entry) in &cache.entries {
        println!(
            "{:08x}  {:>7}  {:08x}      {:>10}  {:<8}  {:>6.2}  {:>9.2}  {}",
            key.reference.crc32,
            key.reference.length,
            key.sample.crc32,
            key.sample.length,
            entry.assessment.risk_level.as_str(),
            entry.assessment.mutation_rate_percent,
            entry.assessment.sequence_identity_percent,
            entry.computed_at
        );
    }
}

fn check_compatibility(cache: &CacheFile, preset: &str) -> Result<bool, String> {
    let wanted = AnalysisConfig::from_preset(preset)?;
    println!("\n=== COMPATIBILITY CHECK ===");
    println!("Cache preset: {}", cache.metadata.preset);
    println!("Requested preset: {}", preset);

    if wanted.same_parameters(&cache.metadata.config) {
        println!("✅ Compatible: cache can be reused with --preset {}", preset);
        Ok(true)
    } else {
        println!("❌ Incompatible: analysis parameters differ");
        println!("   Use --force-recompute or a separate cache file");
        Ok(false)
    }
}

fn validate_cache_integrity(cache: &CacheFile) -> bool {
    println!("\n=== CACHE VALIDATION ===");

    let mut errors = 0;
    let mut warnings = 0;

    if cache.metadata.total_entries != cache.entries.len() {
        println!(
            "❌ ERROR: Metadata lists {} entries but file holds {}",
            cache.metadata.total_entries,
            cache.entries.len()
        );
        errors += 1;
    }

    let aggregator = match RiskAggregator::from_config(&cache.metadata.config) {
        Ok(aggregator) => Some(aggregator),
        Err(e) => {
            println!("❌ ERROR: Cached configuration is invalid: {}", e);
            errors += 1;
            None
        }
    };

    let mut inconsistent = 0;
    for (key, entry) in &cache.entries {
        let mutation = &entry.analyses.mutation;
        let alignment = &entry.analyses.alignment;

        let mut problems = Vec::new();
        if mutation.mutation_count != mutation.mutations.len() {
            problems.push("mutation count differs from mutation list");
        }
        if alignment.reference_length != key.reference.length
            || alignment.sample_length != key.sample.length
        {
            problems.push("sequence lengths differ from fingerprint");
        }
        if let Some(aggregator) = &aggregator {
            let expected = aggregator.classify(mutation.mutation_rate_percent, mutation.hotspots.len());
            if expected != entry.assessment.risk_level {
                problems.push("risk level disagrees with cached thresholds");
            }
        }

        if !problems.is_empty() {
            if inconsistent < 5 {
                println!(
                    "⚠️  WARNING: Entry {:08x}/{:08x}: {}",
                    key.reference.crc32,
                    key.sample.crc32,
                    problems.join(", ")
                );
            }
            inconsistent += 1;
        }
    }

    if inconsistent > 0 {
        if inconsistent > 5 {
            println!("⚠️  WARNING: {} total inconsistent entries found", inconsistent);
        }
        warnings += 1;
    }

    if errors == 0 && warnings == 0 {
        println!("✅ Cache validation passed - no issues found");
        true
    } else {
        println!(
            "⚠️  Cache validation completed: {} errors, {} warnings",
            errors, warnings
        );
        errors == 0
    }
}

fn export_summary_to_tsv(cache: &CacheFile, output_path: &str) -> Result<(), String> {
    let file = File::create(output_path)
        .map_err(|e| format!("Failed to create '{}': {}", output_path, e))?;
    let mut writer = BufWriter::new(file);

    let write_err = |e: std::io::Error| format!("Write error: {}", e);

    writeln!(writer, "# geneseq cache summary").map_err(write_err)?;
    writeln!(writer, "# Version: {}", cache.metadata.version).map_err(write_err)?;
    writeln!(writer, "# Created: {}", cache.metadata.created).map_err(write_err)?;
    writeln!(writer, "# Preset: {}", cache.metadata.preset).map_err(write_err)?;
    writeln!(
        writer,
        "reference_crc32\treference_length\tsample_crc32\tsample_length\trisk_level\tmutation_count\tmutation_rate_percent\tidentity_percent\thotspots\tmotifs\tcomplexity_score"
    )
    .map_err(write_err)?;

    for (key, entry) in &cache.entries {
        writeln!(
            writer,
            "{}\t{}\t{}\t{}\t{}\t{}\t{:.2}\t{:.2}\t{}\t{}\t{:.4}",
            key.reference.crc32,
            key.reference.length,
            key.sample.crc32,
            key.sample.length,
            entry.assessment.risk_level,
            entry.assessment.mutation_count,
            entry.assessment.mutation_rate_percent,
            entry.assessment.sequence_identity_percent,
            entry.analyses.mutation.hotspots.len(),
            entry.analyses.pattern.motifs.len(),
            entry.analyses.pattern.complexity_score
        )
        .map_err(write_err)?;
    }

    writer.flush().map_err(write_err)?;
    println!("✅ Summary exported to: {}", output_path);
    Ok(())
}

// ============================================================================
// MAIN FUNCTION
// ============================================================================

fn main() {
    let args: Args = argh::from_env();

    if !args.quiet {
        println!("🔍 {}", geneseq::get_info());
        println!("==========================================");
    }

    let cache = match load_cache(Path::new(&args.cache), args.quiet) {
        Ok(cache) => cache,
        Err(e) => {
            eprintln!("❌ ERROR loading cache: {}", e);
            std::process::exit(1);
        }
    };

    analyze_cache_overview(&cache, &args);
    analyze_config(&cache, &args);
    analyze_risk_distribution(&cache, &args);

    if args.detailed {
        show_entries(&cache);
    }

    if let Some(preset) = &args.check_compatibility {
        match check_compatibility(&cache, preset) {
            Ok(true) => {}
            Ok(false) => std::process::exit(1),
            Err(e) => {
                eprintln!("❌ ERROR: {}", e);
                std::process::exit(1);
            }
        }
    }

    if args.validate && !validate_cache_integrity(&cache) {
        std::process::exit(1);
    }

    if let Some(export_path) = &args.export_summary {
        if let Err(e) = export_summary_to_tsv(&cache, export_path) {
            eprintln!("❌ ERROR exporting summary: {}", e);
            std::process::exit(1);
        }
    }

    if !args.quiet {
        println!("\n✅ Cache inspection completed successfully");
        println!("\nUsage examples:");
        println!("  --detailed                           Show every cached entry");
        println!("  --check-compatibility sensitive      Check reuse with a preset");
        println!("  --validate                           Validate cache integrity");
        println!("  --export-summary out.tsv             Export summary to TSV");
        println!("  --quiet                              Minimal output mode");
    }
}
