// args.rs - Command line arguments definition

use argh::FromArgs;

#[derive(FromArgs)]
/// geneseq - Reference/sample sequence analysis and risk screening
pub struct Args {
    /// path to CSV dataset (long or paired layout)
    #[argh(option)]
    pub dataset: Option<String>,

    /// path to reference FASTA (paired with --sample-fasta by record id)
    #[argh(option)]
    pub reference_fasta: Option<String>,

    /// path to sample FASTA (paired with --reference-fasta by record id)
    #[argh(option)]
    pub sample_fasta: Option<String>,

    /// output report file
    #[argh(option)]
    pub output: Option<String>,

    /// report format: json, msgpack (default: json)
    #[argh(option, default = "String::from(\"json\")")]
    pub format: String,

    /// per-patient summary table file
    #[argh(option)]
    pub summary: Option<String>,

    /// summary table format: tsv, csv (default: tsv)
    #[argh(option, default = "String::from(\"tsv\")")]
    pub summary_format: String,

    /// analysis preset: clinical, sensitive, conservative (default: clinical)
    #[argh(option, default = "String::from(\"clinical\")")]
    pub preset: String,

    /// hotspot window size in bases (overrides preset)
    #[argh(option)]
    pub hotspot_window: Option<usize>,

    /// hotspot density threshold in mutations per base (overrides preset)
    #[argh(option)]
    pub hotspot_threshold: Option<f64>,

    /// mutation rate (%) at or above which risk is HIGH (overrides preset)
    #[argh(option)]
    pub high_risk_threshold: Option<f64>,

    /// mutation rate (%) at or above which risk is MODERATE (overrides preset)
    #[argh(option)]
    pub moderate_risk_threshold: Option<f64>,

    /// minimum conserved region length (overrides preset)
    #[argh(option)]
    pub min_conserved_length: Option<usize>,

    /// entropy threshold in bits below which a window is conserved (overrides preset)
    #[argh(option)]
    pub entropy_threshold: Option<f64>,

    /// shortest tandem repeat unit (overrides preset)
    #[argh(option)]
    pub min_repeat_unit: Option<usize>,

    /// longest tandem repeat unit (overrides preset)
    #[argh(option)]
    pub max_repeat_unit: Option<usize>,

    /// minimum copies of a tandem repeat unit (overrides preset)
    #[argh(option)]
    pub min_repeat_copies: Option<usize>,

    /// motif table file replacing the built-in motifs (name<TAB>pattern per line)
    #[argh(option)]
    pub motifs: Option<String>,

    /// include only patients matching regex pattern
    #[argh(option)]
    pub include_patients: Option<String>,

    /// exclude patients matching regex pattern
    #[argh(option)]
    pub exclude_patients: Option<String>,

    /// analyze at most this many patients
    #[argh(option)]
    pub max_patients: Option<usize>,

    /// number of threads (default: auto-detect)
    #[argh(option)]
    pub threads: Option<usize>,

    /// cache file path for reuse across runs (.lz4 extension)
    #[argh(option)]
    pub cache_file: Option<String>,

    /// user note to save with the cache for future reference
    #[argh(option)]
    pub cache_note: Option<String>,

    /// ignore a cache built with different analysis parameters (start fresh)
    #[argh(switch)]
    pub force_recompute: bool,

    /// hide the progress bar
    #[argh(switch)]
    pub no_progress: bool,

    /// validate inputs without computation (dry run)
    #[argh(switch)]
    pub dry_run: bool,

    /// path to TOML configuration file
    #[argh(option)]
    pub config: Option<String>,

    /// generate sample configuration file and exit
    #[argh(switch)]
    pub generate_config: bool,
}
