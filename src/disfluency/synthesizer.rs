// src/disfluency/synthesizer.rs

use std::sync::LazyLock;

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, trace};

use super::normalizer::{EM_DASH, normalize};
use super::patterns::{EN_FILLERS, SELF_CORRECTION_MARKERS_EN, SELF_CORRECTION_MARKERS_ZH, ZH_FILLERS};
use super::records::Pair;
use super::tokenizer::token_spans;
use super::{Error, Result};

/// Punctuation in front of which a filler may be dropped.
const CLAUSE_BOUNDARIES: &[char] = &[',', '，', '.', EM_DASH, ';', '；'];
const REPETITION_SEPARATORS: &[&str] = &[", ", "—"];
/// Texts shorter than this (in chars) never get a restart.
const MIN_RESTART_CHARS: usize = 6;

static FILLER_POOL: LazyLock<Vec<&'static str>> =
    LazyLock::new(|| ZH_FILLERS.iter().chain(EN_FILLERS).copied().collect());
static SELF_CORRECTION_POOL: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    SELF_CORRECTION_MARKERS_EN
        .iter()
        .chain(SELF_CORRECTION_MARKERS_ZH)
        .copied()
        .collect()
});

/// A single additive noise operation. Every operation only inserts text, so
/// the clean sentence stays recoverable by deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoiseOp {
    Filler,
    Repetition,
    Restart,
    ParentheticalContrast,
    SelfCorrection,
}

impl NoiseOp {
    pub fn apply<R: Rng + ?Sized>(self, text: &str, rng: &mut R) -> String {
        match self {
            NoiseOp::Filler => inject_fillers(text, rng),
            NoiseOp::Repetition => inject_repetition(text, rng),
            NoiseOp::Restart => inject_restart(text, rng),
            NoiseOp::ParentheticalContrast => inject_parenthetical_contrast(text),
            NoiseOp::SelfCorrection => inject_self_correction(text, rng),
        }
    }
}

/// Inserts `" <filler>, "` before up to two randomly chosen clause
/// boundaries. Positions are taken once up front, so a second insertion can
/// land in text already shifted by the first.
fn inject_fillers<R: Rng + ?Sized>(text: &str, rng: &mut R) -> String {
    let mut chars: Vec<char> = text.chars().collect();
    let boundaries: Vec<usize> = chars
        .iter()
        .enumerate()
        .filter(|(_, ch)| CLAUSE_BOUNDARIES.contains(*ch))
        .map(|(i, _)| i)
        .collect();
    let k = rng.gen_range(0..=(boundaries.len() / 4).min(2));
    for _ in 0..k {
        let Some(&at) = boundaries.choose(rng) else {
            break;
        };
        let Some(filler) = FILLER_POOL.choose(rng) else {
            break;
        };
        chars.splice(at..at, format!(" {filler}, ").chars());
    }
    chars.into_iter().collect()
}

/// Picks a non-space, non-dash character and repeats the token holding it
/// right after itself (`I, I` / `我—我`). Letter and digit runs repeat whole.
fn inject_repetition<R: Rng + ?Sized>(text: &str, rng: &mut R) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() < 2 {
        return text.to_string();
    }
    let candidates: Vec<usize> = chars
        .iter()
        .enumerate()
        .filter(|(_, ch)| !ch.is_whitespace() && **ch != EM_DASH)
        .map(|(i, _)| i)
        .collect();
    let Some(&pick) = candidates.choose(rng) else {
        return text.to_string();
    };
    let separator = REPETITION_SEPARATORS[rng.gen_range(0..REPETITION_SEPARATORS.len())];
    let span = token_spans(&chars)
        .into_iter()
        .find(|span| span.contains(&pick))
        .unwrap_or(pick..pick + 1);

    let token: String = chars[span.clone()].iter().collect();
    let mut out: String = chars[..span.end].iter().collect();
    out.push_str(separator);
    out.push_str(&token);
    out.extend(&chars[span.end..]);
    out
}

/// Drops an em-dash at a random interior offset. An offset inside a letter or
/// digit run moves to the start of that run, or to its end when the run opens
/// the text; a text that is a single run is left alone.
fn inject_restart<R: Rng + ?Sized>(text: &str, rng: &mut R) -> String {
    let mut chars: Vec<char> = text.chars().collect();
    if chars.len() < MIN_RESTART_CHARS {
        return text.to_string();
    }
    let len = chars.len();
    let mut at = rng.gen_range(1..=(len - 2).max(1));
    if let Some(span) = token_spans(&chars)
        .into_iter()
        .find(|span| span.start < at && at < span.end)
    {
        match [span.start, span.end].into_iter().find(|&edge| edge > 0 && edge < len) {
            Some(edge) => at = edge,
            None => return text.to_string(),
        }
    }
    chars.insert(at, EM_DASH);
    chars.into_iter().collect()
}

/// Head and tail around the first ASCII comma, both trimmed and non-empty.
fn split_first_clause(text: &str) -> Option<(&str, &str)> {
    let (head, tail) = text.split_once(',')?;
    let (head, tail) = (head.trim(), tail.trim());
    (!head.is_empty() && !tail.is_empty()).then_some((head, tail))
}

fn inject_parenthetical_contrast(text: &str) -> String {
    match split_first_clause(text) {
        Some((head, tail)) => format!("{head}— not the former, but {tail}"),
        None => text.to_string(),
    }
}

fn inject_self_correction<R: Rng + ?Sized>(text: &str, rng: &mut R) -> String {
    let Some((head, tail)) = split_first_clause(text) else {
        return text.to_string();
    };
    match SELF_CORRECTION_POOL.choose(rng) {
        Some(marker) => format!("{head}. {marker}, {tail}"),
        None => text.to_string(),
    }
}

/// Deterministically produces a disfluent variant of `clean`.
///
/// Filler, repetition and restart are always candidates, plus one of
/// parenthetical contrast or self-correction (a coin flip). The candidates are
/// shuffled and the first `density` applied in order, all drawing from one
/// generator seeded with `seed`, so equal arguments give equal output.
pub fn synthesize(clean: &str, seed: u64, density: usize) -> String {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut ops = vec![NoiseOp::Filler, NoiseOp::Repetition, NoiseOp::Restart];
    ops.push(if rng.r#gen::<f64>() < 0.5 {
        NoiseOp::ParentheticalContrast
    } else {
        NoiseOp::SelfCorrection
    });
    ops.shuffle(&mut rng);

    let mut text = clean.to_string();
    for op in ops.into_iter().take(density) {
        text = op.apply(&text, &mut rng);
        trace!(?op, seed, %text, "applied noise op");
    }
    normalize(&text)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InjectorConfig {
    pub seed: u64,
    pub density: usize,
}

impl InjectorConfig {
    pub const DEFAULT_SEED: u64 = 42;
    pub const DEFAULT_DENSITY: usize = 3;
    /// Upper bound (inclusive) of the per-row seeds drawn from the global seed.
    pub const MAX_ROW_SEED: u64 = 10_000_000;

    pub fn validate(&self) -> Result<()> {
        if self.density == 0 {
            return Err(Error::invalid_config("density must be at least 1"));
        }
        Ok(())
    }
}

impl Default for InjectorConfig {
    fn default() -> Self {
        Self {
            seed: Self::DEFAULT_SEED,
            density: Self::DEFAULT_DENSITY,
        }
    }
}

/// Turns a stream of clean sentences into training pairs. Each row gets its
/// own seed drawn from a generator seeded with the global seed, so a corpus
/// run is reproducible row by row.
pub struct NoiseInjector {
    rng: ChaCha8Rng,
    density: usize,
}

impl NoiseInjector {
    pub fn new(config: InjectorConfig) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            density: config.density,
        }
    }

    pub fn next_pair(&mut self, clean: &str) -> Pair {
        let row_seed = self.rng.gen_range(0..=InjectorConfig::MAX_ROW_SEED);
        Pair {
            input: synthesize(clean, row_seed, self.density),
            output: clean.to_string(),
        }
    }

    pub fn synthesize_all<S: AsRef<str>>(&mut self, sentences: &[S]) -> Vec<Pair> {
        let pairs: Vec<Pair> = sentences
            .iter()
            .map(|clean| self.next_pair(clean.as_ref()))
            .collect();
        debug!(rows = pairs.len(), density = self.density, "synthesized pairs");
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disfluency::tokenizer::new_tokens_in_output;
    use proptest::prelude::*;

    const SCENARIO: &str = "The server restarted at 3:00 and resumed normal operation.";

    #[test]
    fn scenario_is_additive_only() {
        let noisy = synthesize(SCENARIO, 7, 3);
        assert_ne!(noisy, SCENARIO);
        assert!(new_tokens_in_output(&noisy, SCENARIO).is_empty(), "{noisy}");
    }

    #[test]
    fn few_boundaries_stay_additive_for_any_seed() {
        let sentences = [
            SCENARIO,
            "We shipped the fix, then we tested it.",
            "我们明天上午开会，讨论发布计划。",
            "GPU usage hit 80% on node-7; memory stayed flat.",
        ];
        for clean in sentences {
            for seed in 0..200 {
                let noisy = synthesize(clean, seed, 4);
                assert!(
                    new_tokens_in_output(&noisy, clean).is_empty(),
                    "seed {seed}: {noisy}"
                );
            }
        }
    }

    #[test]
    fn zero_density_only_normalizes() {
        assert_eq!(synthesize("  你好，世界  ", 1, 0), "你好,世界");
    }

    #[test]
    fn parenthetical_contrast_wraps_first_clause() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert_eq!(
            NoiseOp::ParentheticalContrast.apply("we fixed the bug, then we shipped, finally", &mut rng),
            "we fixed the bug— not the former, but then we shipped, finally"
        );
    }

    #[test]
    fn self_correction_inserts_a_marker() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let out = NoiseOp::SelfCorrection.apply("it was Monday, then Tuesday", &mut rng);
        let marker = out
            .strip_prefix("it was Monday. ")
            .and_then(|rest| rest.strip_suffix(", then Tuesday"))
            .expect("marker between the two clauses");
        assert!(SELF_CORRECTION_POOL.contains(&marker));
    }

    #[test]
    fn clause_ops_leave_comma_free_text_alone() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        for op in [NoiseOp::ParentheticalContrast, NoiseOp::SelfCorrection] {
            assert_eq!(op.apply("no comma here", &mut rng), "no comma here");
            assert_eq!(op.apply(", leading", &mut rng), ", leading");
        }
    }

    #[test]
    fn restart_skips_short_text() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        assert_eq!(NoiseOp::Restart.apply("短句子", &mut rng), "短句子");
        assert_eq!(NoiseOp::Restart.apply("abcdefgh", &mut rng), "abcdefgh");
    }

    #[test]
    fn restart_inserts_one_dash_between_tokens() {
        for seed in 0..50 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let out = NoiseOp::Restart.apply("the quick brown fox", &mut rng);
            assert_eq!(out.matches(EM_DASH).count(), 1);
            assert_eq!(out.replace(EM_DASH, ""), "the quick brown fox");
            for word in ["the", "quick", "brown", "fox"] {
                assert!(out.contains(word), "{out}");
            }
        }
    }

    #[test]
    fn repetition_duplicates_whole_words() {
        for seed in 0..50 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let out = NoiseOp::Repetition.apply("go home", &mut rng);
            assert!(
                ["go, go home", "go—go home", "go home, home", "go home—home"].contains(&out.as_str()),
                "{out}"
            );
        }
    }

    #[test]
    fn fillers_need_enough_boundaries() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        assert_eq!(NoiseOp::Filler.apply("a, b, c.", &mut rng), "a, b, c.");
    }

    #[test]
    fn injector_keeps_clean_output_and_is_reproducible() {
        let sentences = vec![SCENARIO.to_string(), "我们明天开会，讨论计划。".to_string()];
        let config = InjectorConfig { seed: 42, density: 3 };
        let first = NoiseInjector::new(config).synthesize_all(&sentences);
        let second = NoiseInjector::new(config).synthesize_all(&sentences);
        assert_eq!(first, second);
        for (pair, clean) in first.iter().zip(&sentences) {
            assert_eq!(&pair.output, clean);
        }
    }

    #[test]
    fn zero_density_config_is_rejected() {
        let config = InjectorConfig { seed: 1, density: 0 };
        assert!(config.validate().is_err());
        assert!(InjectorConfig::default().validate().is_ok());
    }

    proptest! {
        #[test]
        fn synthesis_is_deterministic(clean in "\\PC{0,80}", seed in any::<u64>(), density in 0usize..6) {
            prop_assert_eq!(synthesize(&clean, seed, density), synthesize(&clean, seed, density));
        }
    }
}
