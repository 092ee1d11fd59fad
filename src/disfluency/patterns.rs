// src/disfluency/patterns.rs

//! Filler and self-correction vocabularies plus the regex detectors built on
//! them. Everything here is a shallow pattern match over text, never a parse.

use std::fmt;
use std::sync::LazyLock;

use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};
use regex::Regex;

use super::normalizer::{EM_DASH, is_cjk, normalize};

pub const ZH_FILLERS: &[&str] = &[
    "嗯", "呃", "啊", "那个", "就是", "怎么说", "就是说", "那什么", "额", "哎", "你知道吧",
];
pub const EN_FILLERS: &[&str] = &[
    "um", "uh", "like", "you know", "i mean", "kind of", "sort of", "basically", "literally",
];
pub const SELF_CORRECTION_MARKERS_EN: &[&str] =
    &["sorry", "i meant", "correction", "let me correct", "i misspoke"];
pub const SELF_CORRECTION_MARKERS_ZH: &[&str] = &[
    "不是", "哦不对", "更准确说是", "更正", "我刚刚说错了", "纠正一下", "我的意思是",
];

/// Connectors that leave a clause dangling when followed by a comma and a
/// fresh pronoun subject.
const DANGLING_CONNECTORS_ZH: &[&str] = &["但是", "不过", "然而"];

static NUMBER_WITH_UNIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)([+-]?(?:\d{1,3}(?:[.,]\d{3})+|\d+)(?:[.,]\d+)?)\s*(%|°C|°F|km/h|mph|[A-Za-z]{1,4}|小时|分钟|点|年|月|日)?",
    )
    .unwrap()
});

static NOT_BUT_EN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)not\b(.{0,80}?)\bbut\b").unwrap());
static NOT_BUT_ZH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"不是(.{0,40}?)而是").unwrap());

static SELF_CORRECTION_EN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(sorry|i\s+meant|correction|i\s+misspoke)").unwrap());
static SELF_CORRECTION_ZH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("({})", SELF_CORRECTION_MARKERS_ZH.join("|"))).unwrap()
});

static DANGLING_BUT_EN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i),\s*but\s+the\s+[^,，。]+,\s+it\b").unwrap());
static DANGLING_BUT_ZH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"[，,]\s*({})\s*[^，,。]*[，,]\s*(它|这|那)",
        DANGLING_CONNECTORS_ZH.join("|")
    ))
    .unwrap()
});

// Immediate repetitions such as "I, I", "我，我" or "I—I". Needs a backreference.
static REPEAT_COMMA: LazyLock<fancy_regex::Regex> =
    LazyLock::new(|| fancy_regex::Regex::new(r"(\b\w+\b)[，,]\s*\1\b").unwrap());
static REPEAT_DASH: LazyLock<fancy_regex::Regex> =
    LazyLock::new(|| fancy_regex::Regex::new(r"(\b\w+\b)[—-]\s*\1\b").unwrap());

/// One word-boundary, case-insensitive pattern per English filler. Unicode
/// `\w` covers combining marks, so a filler followed by a stray mark
/// (`uh` + U+0338) has no trailing boundary and is not counted.
pub(crate) static EN_FILLER_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    EN_FILLERS
        .iter()
        .map(|filler| Regex::new(&format!(r"(?i)\b{}\b", regex::escape(filler))).unwrap())
        .collect()
});

// Overlapping search so every filler substring is counted on its own, the
// way "就是说" also contains "就是".
static ZH_FILLER_COUNTER: LazyLock<AhoCorasick> = LazyLock::new(|| {
    AhoCorasickBuilder::new()
        .match_kind(MatchKind::Standard)
        .build(ZH_FILLERS)
        .expect("The filler automaton should build correctly")
});

/// Every numeric literal with its optional unit, as `"<number><unit>"` with
/// the unit lowercased. Duplicates are kept, in order of appearance.
pub fn numbers_with_units(text: &str) -> Vec<String> {
    let text = normalize(text);
    NUMBER_WITH_UNIT
        .captures_iter(&text)
        .map(|caps| {
            let number = caps.get(1).map_or("", |m| m.as_str());
            let unit = caps.get(2).map_or(String::new(), |m| m.as_str().to_lowercase());
            format!("{number}{unit}")
        })
        .collect()
}

pub fn has_self_correction(text: &str) -> bool {
    SELF_CORRECTION_EN.is_match(text) || SELF_CORRECTION_ZH.is_match(text)
}

/// "not ... but" (up to 80 chars between) or "不是...而是" (up to 40).
pub fn has_parenthetical_not_but(text: &str) -> bool {
    NOT_BUT_EN.is_match(text) || NOT_BUT_ZH.is_match(text)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GrammarArtifact {
    DanglingButEn,
    DanglingButZh,
}

impl GrammarArtifact {
    pub fn as_str(&self) -> &'static str {
        match self {
            GrammarArtifact::DanglingButEn => "dangling_but_en",
            GrammarArtifact::DanglingButZh => "dangling_but_zh",
        }
    }
}

impl fmt::Display for GrammarArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn grammar_artifacts(text: &str) -> Vec<GrammarArtifact> {
    let mut found = Vec::new();
    if DANGLING_BUT_EN.is_match(text) {
        found.push(GrammarArtifact::DanglingButEn);
    }
    if DANGLING_BUT_ZH.is_match(text) {
        found.push(GrammarArtifact::DanglingButZh);
    }
    found
}

/// Heuristic disfluency count over the normalized text: Chinese filler
/// substrings, English filler phrases, comma/dash joined repetitions, and one
/// restart per em-dash. Coincidental matches count too.
pub fn disfluency_count(text: &str) -> usize {
    let text = normalize(text);
    let zh = ZH_FILLER_COUNTER.find_overlapping_iter(&text).count();
    let en: usize = EN_FILLER_PATTERNS
        .iter()
        .map(|pattern| pattern.find_iter(&text).count())
        .sum();
    let repeats = REPEAT_COMMA.find_iter(&text).filter(|m| m.is_ok()).count()
        + REPEAT_DASH.find_iter(&text).filter(|m| m.is_ok()).count();
    let restarts = text.matches(EM_DASH).count();
    zh + en + repeats + restarts
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CodeSwitchRatio {
    pub latin: usize,
    pub cjk: usize,
    pub ratio_latin: f64,
    pub ratio_cjk: f64,
}

/// ASCII-letter vs CJK share of the normalized text. Digits and punctuation
/// are left out of the denominator; both ratios are 0.0 when it is empty.
pub fn code_switch_ratio(text: &str) -> CodeSwitchRatio {
    let text = normalize(text);
    let latin = text.chars().filter(|ch| ch.is_ascii_alphabetic()).count();
    let cjk = text.chars().filter(|&ch| is_cjk(ch)).count();
    let total = latin + cjk;
    let ratio = |n: usize| if total == 0 { 0.0 } else { n as f64 / total as f64 };
    CodeSwitchRatio {
        latin,
        cjk,
        ratio_latin: ratio(latin),
        ratio_cjk: ratio(cjk),
    }
}
