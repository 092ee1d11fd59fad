// src/cli.rs

//! Argument parsing and logging setup shared by the two binaries.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser};
use tracing_subscriber::{EnvFilter, filter::LevelFilter, fmt};

use crate::disfluency::{InjectorConfig, LintConfig, Result};

/// Deterministic noise injector for disfluency synthesis.
#[derive(Debug, Parser)]
#[command(name = "inject_noise", version, about)]
pub struct InjectArgs {
    /// JSONL of clean sentences (`clean`, `output` or `text` field per line).
    #[arg(long = "in", value_name = "PATH")]
    pub input: PathBuf,
    /// Where to write the `{"input","output"}` pairs.
    #[arg(long = "out", value_name = "PATH")]
    pub output: PathBuf,
    /// Global random seed.
    #[arg(long, default_value_t = InjectorConfig::DEFAULT_SEED)]
    pub seed: u64,
    /// Noise operations per sample.
    #[arg(long, default_value_t = InjectorConfig::DEFAULT_DENSITY)]
    pub density: usize,
    /// Increase logging verbosity (-v, -vv, -vvv).
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,
}

impl InjectArgs {
    pub fn injector_config(&self) -> InjectorConfig {
        InjectorConfig {
            seed: self.seed,
            density: self.density,
        }
    }
}

/// Disfluency dataset linter and deduplicator.
#[derive(Debug, Parser)]
#[command(name = "lint_dataset", version, about)]
pub struct LintArgs {
    /// JSONL of input/output pairs.
    #[arg(long = "in", value_name = "PATH")]
    pub input: PathBuf,
    /// Where to write the kept pairs.
    #[arg(long = "out", value_name = "PATH")]
    pub output: PathBuf,
    /// Where to write the CSV report of removed rows.
    #[arg(long, value_name = "PATH")]
    pub report: PathBuf,
    /// Soft duplicate similarity threshold.
    #[arg(long = "soft-th", default_value_t = LintConfig::DEFAULT_SOFT_DUP_THRESHOLD)]
    pub soft_th: f64,
    /// Minimum disfluencies in the input.
    #[arg(long = "min-d", default_value_t = LintConfig::DEFAULT_MIN_DISFLUENCIES)]
    pub min_d: usize,
    /// Maximum disfluencies in the input.
    #[arg(long = "max-d", default_value_t = LintConfig::DEFAULT_MAX_DISFLUENCIES)]
    pub max_d: usize,
    /// Only remove exact duplicates; skip soft dedup and all other checks.
    #[arg(long)]
    pub hard_dedup_only: bool,
    /// How many recently kept rows near-duplicates are compared against.
    #[arg(long, default_value_t = LintConfig::DEFAULT_RECENT_WINDOW)]
    pub window: usize,
    /// Show a progress bar (needs the `progressbar` feature).
    #[arg(long)]
    pub progress: bool,
    /// Increase logging verbosity (-v, -vv, -vvv).
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,
}

impl LintArgs {
    pub fn lint_config(&self) -> LintConfig {
        LintConfig {
            soft_dup_threshold: self.soft_th,
            min_disfluencies: self.min_d,
            max_disfluencies: self.max_d,
            hard_dedup_only: self.hard_dedup_only,
            recent_window: self.window,
            ..LintConfig::default()
        }
    }
}

pub fn log_level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Logs go to stderr so stdout stays free for the summary line. `RUST_LOG`
/// wins over the `-v` count when set.
pub fn init_tracing(verbose: u8) {
    let filter = EnvFilter::builder()
        .with_default_directive(log_level(verbose).into())
        .from_env_lossy();
    let subscriber = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        tracing::warn!("Tracing subscriber already set; skipping re-initialization.");
    }
}

/// Opens `path` for writing, creating missing parent directories first.
pub fn create_output(path: &Path) -> Result<BufWriter<File>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(BufWriter::new(File::create(path)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lint_defaults_match_config_defaults() {
        let args = LintArgs::try_parse_from(["lint_dataset", "--in", "a", "--out", "b", "--report", "c"]).unwrap();
        assert_eq!(args.lint_config(), LintConfig::default());
        assert!(!args.progress);
        assert_eq!(args.verbose, 0);
    }

    #[test]
    fn lint_flags_override_defaults() {
        let args = LintArgs::try_parse_from([
            "lint_dataset", "--in", "a", "--out", "b", "--report", "c", "--soft-th", "0.8", "--min-d", "1",
            "--max-d", "9", "--hard-dedup-only", "--window", "10", "-vv",
        ])
        .unwrap();
        let config = args.lint_config();
        assert_eq!(config.soft_dup_threshold, 0.8);
        assert_eq!((config.min_disfluencies, config.max_disfluencies), (1, 9));
        assert!(config.hard_dedup_only);
        assert_eq!(config.recent_window, 10);
        assert_eq!(log_level(args.verbose), LevelFilter::DEBUG);
    }

    #[test]
    fn inject_requires_paths() {
        assert!(InjectArgs::try_parse_from(["inject_noise", "--out", "b"]).is_err());
        let args = InjectArgs::try_parse_from(["inject_noise", "--in", "a", "--out", "b", "--seed", "7"]).unwrap();
        assert_eq!(args.injector_config(), InjectorConfig { seed: 7, density: 3 });
    }

    #[test]
    fn output_parents_are_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/out.jsonl");
        create_output(&path).unwrap();
        assert!(path.exists());
    }
}
