// src/disfluency/curator.rs

use tracing::{debug, info};

use super::dedup::{DedupIndex, canonical_pair, pair_skeleton};
use super::linter::{LintConfig, Linter, Reason};
use super::progress::{ProgressBar, ProgressStyle};
use super::records::{ReportRow, Row, Summary};
use super::Result;

struct Config {
    lint: LintConfig,
    show_progress: bool,
}

pub struct CuratorBuilder {
    config: Config,
}

impl Default for CuratorBuilder {
    fn default() -> Self {
        Self {
            config: Config {
                lint: LintConfig::default(),
                show_progress: false,
            },
        }
    }
}

impl CuratorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces every lint threshold at once.
    #[must_use]
    pub fn lint_config(mut self, config: LintConfig) -> Self {
        self.config.lint = config;
        self
    }

    #[must_use]
    pub fn soft_dup_threshold(mut self, threshold: f64) -> Self {
        self.config.lint.soft_dup_threshold = threshold;
        self
    }

    #[must_use]
    pub fn disfluency_range(mut self, min: usize, max: usize) -> Self {
        self.config.lint.min_disfluencies = min;
        self.config.lint.max_disfluencies = max;
        self
    }

    #[must_use]
    pub fn target_ratio_latin(mut self, low: f64, high: f64) -> Self {
        self.config.lint.target_ratio_latin = (low, high);
        self
    }

    #[must_use]
    pub fn hard_dedup_only(mut self, enabled: bool) -> Self {
        self.config.lint.hard_dedup_only = enabled;
        self
    }

    #[must_use]
    pub fn recent_window(mut self, window: usize) -> Self {
        self.config.lint.recent_window = window;
        self
    }

    #[must_use]
    pub fn show_progress(mut self, show: bool) -> Self {
        self.config.show_progress = show;
        self
    }

    pub fn build(self) -> Result<Curator> {
        self.config.lint.validate()?;
        Ok(Curator {
            linter: Linter::new(self.config.lint),
            index: DedupIndex::new(self.config.lint.recent_window),
            show_progress: self.config.show_progress,
        })
    }
}

/// Kept rows in input order, plus one report line per (dropped row, reason).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CurationOutcome {
    pub input_rows: usize,
    pub kept: Vec<Row>,
    pub report: Vec<ReportRow>,
}

impl CurationOutcome {
    pub fn summary(&self) -> Summary {
        Summary {
            input_rows: self.input_rows,
            kept_rows: self.kept.len(),
            removed_rows: self.input_rows - self.kept.len(),
            report_rows: self.report.len(),
        }
    }
}

/// Lints and deduplicates one corpus. Dedup state lives in the instance, so
/// each corpus run wants a fresh curator.
pub struct Curator {
    linter: Linter,
    index: DedupIndex,
    show_progress: bool,
}

impl Default for Curator {
    fn default() -> Self {
        Self {
            linter: Linter::default(),
            index: DedupIndex::default(),
            show_progress: false,
        }
    }
}

impl Curator {
    pub fn builder() -> CuratorBuilder {
        CuratorBuilder::new()
    }

    pub fn config(&self) -> &LintConfig {
        self.linter.config()
    }

    /// Rows accepted so far across all `curate` calls.
    pub fn accepted(&self) -> usize {
        self.index.len()
    }

    fn setup_progress(&self, len: usize) -> Option<ProgressBar> {
        if self.show_progress {
            let p = ProgressBar::new(len as u64);
            p.set_style(
                ProgressStyle::default_bar()
                    .template("[{elapsed_precise}] {msg:<12!} {wide_bar} {pos:>9!}/{len:<9!}")
                    .expect("Invalid progress template. This is a hardcoded internal error, should not happen."),
            );
            p.set_message("Linting");
            Some(p)
        } else {
            None
        }
    }

    fn finalize_progress(&self, p: &Option<ProgressBar>, final_len: usize) {
        if let Some(p) = p {
            p.set_length(final_len as u64);
            p.finish();
        }
    }

    /// Judges one row against everything accepted before it. `Ok` carries the
    /// row's advisory reasons; `Err` the reasons it was dropped for.
    fn judge(&mut self, row: &Row) -> std::result::Result<Vec<Reason>, Vec<Reason>> {
        let canonical = canonical_pair(&row.input, &row.output);
        if let Some(first) = self.index.hard_duplicate_of(&canonical) {
            return Err(vec![Reason::HardDuplicate { first }]);
        }
        let skeleton = pair_skeleton(&row.input, &row.output);

        let config = *self.linter.config();
        if config.hard_dedup_only {
            self.index.record(canonical, skeleton, row.idx);
            return Ok(Vec::new());
        }

        if let Some(matched) = self.index.soft_duplicate_of(&skeleton, config.soft_dup_threshold) {
            return Err(vec![Reason::SoftDuplicate { matched }]);
        }

        let verdict = self.linter.lint(&row.pair());
        if verdict.keep {
            self.index.record(canonical, skeleton, row.idx);
            Ok(verdict.reasons)
        } else {
            Err(verdict.reasons)
        }
    }

    /// Processes `rows` strictly in order; the first of any duplicate group
    /// is the one kept.
    pub fn curate(&mut self, rows: &[Row]) -> CurationOutcome {
        let progress = self.setup_progress(rows.len());
        let mut outcome = CurationOutcome {
            input_rows: rows.len(),
            ..Default::default()
        };

        for row in rows {
            match self.judge(row) {
                Ok(advisory) => {
                    if !advisory.is_empty() {
                        let tags: Vec<String> = advisory.iter().map(ToString::to_string).collect();
                        debug!(idx = row.idx, ?tags, "kept with advisories");
                    }
                    outcome.kept.push(row.clone());
                }
                Err(reasons) => {
                    debug!(idx = row.idx, reasons = reasons.len(), "dropped");
                    outcome.report.extend(reasons.iter().map(|reason| ReportRow {
                        idx: row.idx,
                        reason: reason.to_string(),
                        input: row.input.clone(),
                        output: row.output.clone(),
                    }));
                }
            }
            if let Some(p) = &progress {
                p.inc(1);
            }
        }
        self.finalize_progress(&progress, rows.len());

        let summary = outcome.summary();
        info!(
            input_rows = summary.input_rows,
            kept_rows = summary.kept_rows,
            removed_rows = summary.removed_rows,
            "curation finished"
        );
        outcome
    }
}
