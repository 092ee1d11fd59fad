// src/disfluency/dedup.rs

use std::sync::LazyLock;

use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};
use regex::Regex;
use rustc_hash::FxHashMap as HashMap;

use super::normalizer::{collapse_whitespace, normalize};
use super::patterns::{EN_FILLERS, ZH_FILLERS};
use super::similarity::sequence_ratio;

/// Separator between the input and output halves of keys and skeletons.
const SIDE_SEPARATOR: &str = " || ";

static NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]+(?:[.,][0-9]+)*").unwrap());
static LATIN_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)[a-z][a-z'\-]{1,}").unwrap());
static CJK_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\x{4e00}-\x{9fff}]{2,}").unwrap());
static SPACE_BEFORE_PUNCT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+([,，.。;；:：!！?？—])").unwrap());

// Longest first so "就是说" goes as a whole rather than leaving "说".
static ZH_FILLER_STRIPPER: LazyLock<AhoCorasick> = LazyLock::new(|| {
    AhoCorasickBuilder::new()
        .match_kind(MatchKind::LeftmostLongest)
        .build(ZH_FILLERS)
        .expect("The filler automaton should build correctly")
});

static EN_FILLER_STRIPPER: LazyLock<Regex> = LazyLock::new(|| {
    let mut fillers: Vec<&str> = EN_FILLERS.to_vec();
    fillers.sort_by_key(|f| std::cmp::Reverse(f.len()));
    let alternation = fillers
        .iter()
        .map(|f| regex::escape(f))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b(?:{alternation})\b[,，]?")).unwrap()
});

fn strip_zh_fillers(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for mat in ZH_FILLER_STRIPPER.find_iter(text) {
        if mat.start() < last {
            continue;
        }
        out.push_str(&text[last..mat.start()]);
        out.push(' ');
        last = mat.end();
        if let Some(comma) = text[last..].chars().next().filter(|&c| c == ',' || c == '，') {
            last += comma.len_utf8();
        }
    }
    out.push_str(&text[last..]);
    out
}

/// Removes fillers (each with one directly following comma), then collapses
/// whitespace and drops whitespace left in front of clause punctuation.
pub fn strip_fillers(text: &str) -> String {
    let text = strip_zh_fillers(text);
    let text = EN_FILLER_STRIPPER.replace_all(&text, " ");
    let text = collapse_whitespace(&text);
    SPACE_BEFORE_PUNCT.replace_all(&text, "$1").into_owned()
}

fn canonical_side(text: &str) -> String {
    let text = normalize(&strip_fillers(text)).to_lowercase();
    NUMBER.replace_all(&text, "<NUM>").into_owned()
}

/// Exact-duplicate key: fillers stripped, normalized, lowercased, numbers
/// masked, both sides joined.
pub fn canonical_pair(input: &str, output: &str) -> String {
    format!("{}{SIDE_SEPARATOR}{}", canonical_side(input), canonical_side(output))
}

/// Coarse shape of one side: numbers, Latin words and CJK runs of two or more
/// characters collapse to `<num>`, `<en>` and `<zh>`.
pub fn skeletonize(text: &str) -> String {
    let text = normalize(text).to_lowercase();
    let text = NUMBER.replace_all(&text, "<num>");
    let text = LATIN_WORD.replace_all(&text, "<en>");
    let text = CJK_RUN.replace_all(&text, "<zh>");
    strip_fillers(&text)
}

pub fn pair_skeleton(input: &str, output: &str) -> String {
    format!("{}{SIDE_SEPARATOR}{}", skeletonize(input), skeletonize(output))
}

/// Cross-row dedup state for one corpus run. Only accepted rows are
/// recorded; both collections grow monotonically.
#[derive(Debug, Clone)]
pub struct DedupIndex {
    seen_canonical: HashMap<String, usize>,
    skeleton_history: Vec<(String, usize)>,
    recent_window: usize,
}

impl DedupIndex {
    pub const DEFAULT_RECENT_WINDOW: usize = 2000;

    pub fn new(recent_window: usize) -> Self {
        Self {
            seen_canonical: HashMap::default(),
            skeleton_history: Vec::new(),
            recent_window,
        }
    }

    pub fn hard_duplicate_of(&self, canonical: &str) -> Option<usize> {
        self.seen_canonical.get(canonical).copied()
    }

    /// Compares against the trailing `recent_window` skeletons only; older
    /// entries stay stored but are never consulted.
    pub fn soft_duplicate_of(&self, skeleton: &str, threshold: f64) -> Option<usize> {
        let start = self.skeleton_history.len().saturating_sub(self.recent_window);
        self.skeleton_history[start..]
            .iter()
            .find(|(previous, _)| sequence_ratio(skeleton, previous) >= threshold)
            .map(|(_, idx)| *idx)
    }

    pub fn record(&mut self, canonical: String, skeleton: String, idx: usize) {
        self.seen_canonical.insert(canonical, idx);
        self.skeleton_history.push((skeleton, idx));
    }

    pub fn len(&self) -> usize {
        self.skeleton_history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skeleton_history.is_empty()
    }
}

impl Default for DedupIndex {
    fn default() -> Self {
        Self::new(Self::DEFAULT_RECENT_WINDOW)
    }
}
