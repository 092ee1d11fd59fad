// src/disfluency/linter.rs

use std::fmt;

use rustc_hash::FxHashSet as HashSet;
use tracing::trace;

use super::patterns::{
    GrammarArtifact, code_switch_ratio, disfluency_count, grammar_artifacts, has_parenthetical_not_but,
    has_self_correction, numbers_with_units,
};
use super::dedup::DedupIndex;
use super::records::Pair;
use super::tokenizer::new_tokens_in_output;
use super::{Error, Result};

/// At most this many new tokens are listed in a delete-only reason.
const MAX_REPORTED_NEW_TOKENS: usize = 6;

/// A structured finding on one row, rendered as a `category:detail` tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reason {
    DeleteOnlyViolation { new_tokens: Vec<String> },
    EntityViolation,
    TooTrivial { disfluencies: usize },
    TooNoisy { disfluencies: usize },
    ParentheticalArtifact(Vec<GrammarArtifact>),
    GrammarArtifact(GrammarArtifact),
    HardDuplicate { first: usize },
    SoftDuplicate { matched: usize },
}

impl Reason {
    /// Hard findings always reject the row. Density findings are advisory.
    pub fn is_hard(&self) -> bool {
        matches!(
            self,
            Reason::DeleteOnlyViolation { .. }
                | Reason::EntityViolation
                | Reason::ParentheticalArtifact(_)
                | Reason::GrammarArtifact(_)
        )
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reason::DeleteOnlyViolation { new_tokens } => {
                let shown: Vec<&str> = new_tokens
                    .iter()
                    .take(MAX_REPORTED_NEW_TOKENS)
                    .map(String::as_str)
                    .collect();
                write!(f, "delete_only_violation:new_tokens={}", shown.join(","))
            }
            Reason::EntityViolation => f.write_str("entity_violation:numbers_units_changed"),
            Reason::TooTrivial { disfluencies } => write!(f, "too_trivial:disfluency_count={disfluencies}"),
            Reason::TooNoisy { disfluencies } => write!(f, "too_noisy:disfluency_count={disfluencies}"),
            Reason::ParentheticalArtifact(artifacts) => {
                let tags: Vec<&str> = artifacts.iter().map(GrammarArtifact::as_str).collect();
                write!(f, "parenthetical_artifact:{}", tags.join("+"))
            }
            Reason::GrammarArtifact(artifact) => write!(f, "grammar_artifact:{artifact}"),
            Reason::HardDuplicate { first } => write!(f, "hard_duplicate~{first}"),
            Reason::SoftDuplicate { matched } => write!(f, "soft_duplicate~{matched}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub keep: bool,
    pub reasons: Vec<Reason>,
}

impl Verdict {
    fn from_reasons(reasons: Vec<Reason>) -> Self {
        Self {
            keep: !reasons.iter().any(Reason::is_hard),
            reasons,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LintConfig {
    pub soft_dup_threshold: f64,
    pub min_disfluencies: usize,
    pub max_disfluencies: usize,
    /// Advisory range for the Latin share of the input.
    pub target_ratio_latin: (f64, f64),
    pub hard_dedup_only: bool,
    pub recent_window: usize,
}

impl LintConfig {
    pub const DEFAULT_SOFT_DUP_THRESHOLD: f64 = 0.92;
    pub const DEFAULT_MIN_DISFLUENCIES: usize = 2;
    pub const DEFAULT_MAX_DISFLUENCIES: usize = 6;
    pub const DEFAULT_TARGET_RATIO_LATIN: (f64, f64) = (0.2, 0.8);
    pub const DEFAULT_RECENT_WINDOW: usize = DedupIndex::DEFAULT_RECENT_WINDOW;

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.soft_dup_threshold) {
            return Err(Error::invalid_config(format!(
                "soft duplicate threshold must lie in [0, 1], got {}",
                self.soft_dup_threshold
            )));
        }
        if self.min_disfluencies > self.max_disfluencies {
            return Err(Error::invalid_config(format!(
                "min disfluencies ({}) exceeds max disfluencies ({})",
                self.min_disfluencies, self.max_disfluencies
            )));
        }
        let (low, high) = self.target_ratio_latin;
        if low > high {
            return Err(Error::invalid_config(format!(
                "latin ratio range is inverted: {low} > {high}"
            )));
        }
        if self.recent_window == 0 {
            return Err(Error::invalid_config("recent window must hold at least one skeleton"));
        }
        Ok(())
    }
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            soft_dup_threshold: Self::DEFAULT_SOFT_DUP_THRESHOLD,
            min_disfluencies: Self::DEFAULT_MIN_DISFLUENCIES,
            max_disfluencies: Self::DEFAULT_MAX_DISFLUENCIES,
            target_ratio_latin: Self::DEFAULT_TARGET_RATIO_LATIN,
            hard_dedup_only: false,
            recent_window: Self::DEFAULT_RECENT_WINDOW,
        }
    }
}

/// Stateless per-row quality checks.
#[derive(Debug, Clone, Default)]
pub struct Linter {
    config: LintConfig,
}

impl Linter {
    pub fn new(config: LintConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LintConfig {
        &self.config
    }

    pub fn lint(&self, pair: &Pair) -> Verdict {
        let mut reasons = Vec::new();

        let new_tokens = new_tokens_in_output(&pair.input, &pair.output);
        if !new_tokens.is_empty() {
            reasons.push(Reason::DeleteOnlyViolation { new_tokens });
        }

        let numbers_in: HashSet<String> = numbers_with_units(&pair.input).into_iter().collect();
        if numbers_with_units(&pair.output)
            .iter()
            .any(|number| !numbers_in.contains(number))
        {
            reasons.push(Reason::EntityViolation);
        }

        let disfluencies = disfluency_count(&pair.input);
        if disfluencies < self.config.min_disfluencies {
            reasons.push(Reason::TooTrivial { disfluencies });
        } else if disfluencies > self.config.max_disfluencies {
            reasons.push(Reason::TooNoisy { disfluencies });
        }

        let self_corrected = has_self_correction(&pair.input);
        if has_parenthetical_not_but(&pair.input) && !self_corrected {
            let artifacts = grammar_artifacts(&pair.output);
            if !artifacts.is_empty() {
                reasons.push(Reason::ParentheticalArtifact(artifacts));
            }
        }
        // Self-corrections are not checked: the retracted and corrected spans
        // cannot be located reliably, so those rows are left to human review.

        let ratios = code_switch_ratio(&pair.input);
        let (low, high) = self.config.target_ratio_latin;
        if !(low..=high).contains(&ratios.ratio_latin) {
            trace!(
                ratio_latin = ratios.ratio_latin,
                low, high, "latin ratio outside target range"
            );
        }

        reasons.extend(grammar_artifacts(&pair.output).into_iter().map(Reason::GrammarArtifact));

        Verdict::from_reasons(reasons)
    }
}
