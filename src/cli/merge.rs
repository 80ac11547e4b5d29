// merge.rs - Merge configuration file with CLI arguments

use crate::cli::{Args, Config};

impl Args {
    /// Merge with configuration from file
    /// CLI arguments take precedence over config file values
    pub fn merge_with_config(mut self, config: Config) -> Self {
        // Input/Output
        if self.dataset.is_none() {
            self.dataset = config.dataset;
        }
        if self.reference_fasta.is_none() {
            self.reference_fasta = config.reference_fasta;
        }
        if self.sample_fasta.is_none() {
            self.sample_fasta = config.sample_fasta;
        }
        if self.output.is_none() {
            self.output = config.output;
        }
        if self.summary.is_none() {
            self.summary = config.summary;
        }

        // Formats and preset (only override defaults, not explicit CLI values)
        if let (true, Some(format)) = (self.format == "json", config.format) {
            self.format = format;
        }
        if let (true, Some(format)) = (self.summary_format == "tsv", config.summary_format) {
            self.summary_format = format;
        }
        if let (true, Some(preset)) = (self.preset == "clinical", config.preset) {
            self.preset = preset;
        }

        // Analysis parameters
        if self.hotspot_window.is_none() {
            self.hotspot_window = config.hotspot_window;
        }
        if self.hotspot_threshold.is_none() {
            self.hotspot_threshold = config.hotspot_threshold;
        }
        if self.high_risk_threshold.is_none() {
            self.high_risk_threshold = config.high_risk_threshold;
        }
        if self.moderate_risk_threshold.is_none() {
            self.moderate_risk_threshold = config.moderate_risk_threshold;
        }
        if self.min_conserved_length.is_none() {
            self.min_conserved_length = config.min_conserved_length;
        }
        if self.entropy_threshold.is_none() {
            self.entropy_threshold = config.entropy_threshold;
        }
        if self.min_repeat_unit.is_none() {
            self.min_repeat_unit = config.min_repeat_unit;
        }
        if self.max_repeat_unit.is_none() {
            self.max_repeat_unit = config.max_repeat_unit;
        }
        if self.min_repeat_copies.is_none() {
            self.min_repeat_copies = config.min_repeat_copies;
        }
        if self.motifs.is_none() {
            self.motifs = config.motifs;
        }

        // Patient filtering
        if self.include_patients.is_none() {
            self.include_patients = config.include_patients;
        }
        if self.exclude_patients.is_none() {
            self.exclude_patients = config.exclude_patients;
        }
        if self.max_patients.is_none() {
            self.max_patients = config.max_patients;
        }

        // Performance
        if self.threads.is_none() {
            self.threads = config.threads;
        }
        if self.cache_file.is_none() {
            self.cache_file = config.cache_file;
        }
        if self.cache_note.is_none() {
            self.cache_note = config.cache_note;
        }

        // Flags (CLI flags take precedence, config only sets if not explicitly set)
        if !self.force_recompute && config.force_recompute.unwrap_or(false) {
            self.force_recompute = true;
        }
        if !self.no_progress && config.no_progress.unwrap_or(false) {
            self.no_progress = true;
        }
        if !self.dry_run && config.dry_run.unwrap_or(false) {
            self.dry_run = true;
        }

        self
    }

    /// Load configuration and merge with CLI args
    pub fn with_config_file(self, config_path: &str) -> Result<Self, String> {
        let config = Config::from_file(config_path)?;
        Ok(self.merge_with_config(config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argh::FromArgs;

    fn parse(args: &[&str]) -> Args {
        match Args::from_args(&["geneseq"], args) {
            Ok(args) => args,
            Err(e) => panic!("argument parsing failed: {}", e.output),
        }
    }

    #[test]
    fn test_cli_values_win() {
        let args = parse(&["--dataset", "cli.csv", "--hotspot-window", "30", "--format", "msgpack"]);
        let config = Config::from_toml(
            "dataset = \"file.csv\"\nhotspot_window = 80\nformat = \"json\"\nhotspot_threshold = 0.2\n",
        )
        .unwrap();

        let merged = args.merge_with_config(config);
        assert_eq!(merged.dataset.as_deref(), Some("cli.csv"));
        assert_eq!(merged.hotspot_window, Some(30));
        assert_eq!(merged.format, "msgpack");
        assert_eq!(merged.hotspot_threshold, Some(0.2));
    }

    #[test]
    fn test_config_fills_defaults_and_flags() {
        let args = parse(&[]);
        let config = Config::from_toml(
            "preset = \"sensitive\"\nsummary_format = \"csv\"\ndry_run = true\nthreads = 4\n",
        )
        .unwrap();

        let merged = args.merge_with_config(config);
        assert_eq!(merged.preset, "sensitive");
        assert_eq!(merged.summary_format, "csv");
        assert!(merged.dry_run);
        assert!(!merged.force_recompute);
        assert_eq!(merged.threads, Some(4));
    }
}
