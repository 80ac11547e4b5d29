// main.rs - CLI entry point

use std::path::Path;
use std::time::Instant;

use geneseq::cli::Config;
use geneseq::core::AnalysisCache;
use geneseq::data::filter_patients;
use geneseq::data::loaders::{load_dataset, load_paired_fasta};
use geneseq::output::write_summary_table;
use geneseq::prelude::*;

fn main() {
    if let Err(e) = run_main() {
        eprintln!("❌ ERROR: {}", e);
        std::process::exit(1);
    }
}

fn run_main() -> Result<(), String> {
    let mut args: Args = argh::from_env();
    let command_line = std::env::args().collect::<Vec<String>>().join(" ");

    // Handle generate config first
    if args.generate_config {
        println!("{}", Config::generate_sample());
        println!("\n💡 Save this content to a .toml file and use --config /path/to/config.toml");
        return Ok(());
    }

    // Load configuration file if specified
    if let Some(config_path) = args.config.clone() {
        args = args.with_config_file(&config_path)?;
    }

    let validation = validate_args(&args)?;
    let config = validation.analysis_config;

    println!("🚀 geneseq v{}", geneseq::VERSION);
    println!(
        "🧬 Preset: {} ({})",
        config.detect_preset(),
        config.description.as_deref().unwrap_or("no description")
    );
    println!(
        "⚙️  Hotspots: window {} / density > {} | Risk: HIGH ≥ {}% / MODERATE ≥ {}% | Motifs: {}",
        config.hotspot_window,
        config.hotspot_threshold,
        config.high_rate_threshold,
        config.moderate_rate_threshold,
        config.motifs.len()
    );

    // Configure thread pool
    if let Some(n) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build_global()
            .map_err(|e| format!("Failed to configure thread pool: {}", e))?;
        println!("🧵 Threads: {}", n);
    } else {
        println!("🧵 Threads: {} (auto-detected)", rayon::current_num_threads());
    }

    let total_start = Instant::now();

    let records = load_records(&args)?;
    let records = filter_patients(
        records,
        validation.patient_include_regex.as_ref(),
        validation.patient_exclude_regex.as_ref(),
        args.max_patients,
    );
    if records.is_empty() {
        return Err("No patients left to analyze".to_string());
    }

    if args.dry_run {
        println!("📋 {} patients ready for analysis", records.len());
        println!("✅ Dry run completed successfully");
        return Ok(());
    }

    let output = args.output.as_ref().ok_or("--output is required")?;

    let mut engine = AnalysisEngine::new(config.clone()).map_err(|e| e.to_string())?;
    engine.set_show_progress(!args.no_progress);

    if let Some(cache_path) = &args.cache_file {
        let mut cache = AnalysisCache::new(config);
        if let Some(note) = &args.cache_note {
            cache.set_note(note.clone());
        }
        if Path::new(cache_path).exists() {
            cache.load(cache_path, args.force_recompute)?;
        } else {
            println!("🆕 Cache file {} not found, starting a new cache", cache_path);
        }
        engine.set_cache(cache);
    }

    let outcome = engine.analyze_batch(&records);

    if let (Some(cache_path), Some(cache)) = (&args.cache_file, engine.cache_mut()) {
        if cache.has_new_entries() {
            cache.save(cache_path)?;
        } else {
            println!("💾 Cache unchanged, not rewriting {}", cache_path);
        }
    }

    let report = AnalysisReport::new(outcome.reports, outcome.failures, &command_line);
    write_report(output, &report, validation.report_format)?;

    if let Some(summary_path) = &args.summary {
        write_summary_table(
            summary_path,
            &report.analyses,
            validation.table_format,
            &command_line,
        )?;
    }

    report.print_summary();
    println!(
        "\n🏁 Total time: {:.2}s",
        total_start.elapsed().as_secs_f64()
    );

    Ok(())
}

fn load_records(args: &Args) -> Result<Vec<PatientRecord>, String> {
    if let Some(dataset) = &args.dataset {
        let (records, _) = load_dataset(Path::new(dataset))?;
        return Ok(records);
    }

    match (&args.reference_fasta, &args.sample_fasta) {
        (Some(reference), Some(sample)) => {
            load_paired_fasta(Path::new(reference), Path::new(sample))
        }
        _ => Err("an input is required: --dataset or --reference-fasta with --sample-fasta".to_string()),
    }
}
