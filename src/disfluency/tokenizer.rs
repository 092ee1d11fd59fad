// src/disfluency/tokenizer.rs

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;
use rustc_hash::FxHashMap as HashMap;

use super::normalizer::{is_cjk, normalize};

/// ASCII and CJK punctuation that always counts as punctuation, on top of
/// the Unicode `P*` categories.
const PUNCT_CHARS: &[char] = &[
    '.', ',', '!', '?', ';', ':', '\'', '"', '(', ')', '[', ']', '{', '}', '<', '>',
    '，', '。', '！', '？', '；', '：', '（', '）', '【', '】', '《', '》', '—', '–', '…', '、',
];

static UNICODE_PUNCT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\p{P}$").unwrap());
// Letters are `L*` only and digits `Nd` only: combining vowel signs and
// fractions such as `½` fall through to single "other" tokens.
static LETTER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\p{L}$").unwrap());
static DIGIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\p{Nd}$").unwrap());

fn char_matches(class: &Regex, ch: char) -> bool {
    let mut buf = [0u8; 4];
    class.is_match(ch.encode_utf8(&mut buf))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunMode {
    Latin,
    Digit,
}

/// Scans `chars` and returns the char-index range of every token.
///
/// CJK ideographs and "other" characters (punctuation, whitespace, symbols)
/// are single-char tokens. Letters form runs; digits extend a letter run
/// (`GPT4`) or form their own run (`2024`), but a letter after a digit run
/// starts a new token (`80` `GB`).
pub fn token_spans(chars: &[char]) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut run: Option<(usize, RunMode)> = None;

    let flush = |run: &mut Option<(usize, RunMode)>, end: usize, spans: &mut Vec<Range<usize>>| {
        if let Some((start, _)) = run.take() {
            spans.push(start..end);
        }
    };

    for (i, &ch) in chars.iter().enumerate() {
        if is_cjk(ch) {
            flush(&mut run, i, &mut spans);
            spans.push(i..i + 1);
        } else if char_matches(&LETTER, ch) {
            match run {
                Some((_, RunMode::Latin)) => {}
                _ => {
                    flush(&mut run, i, &mut spans);
                    run = Some((i, RunMode::Latin));
                }
            }
        } else if char_matches(&DIGIT, ch) {
            if run.is_none() {
                run = Some((i, RunMode::Digit));
            }
        } else {
            flush(&mut run, i, &mut spans);
            spans.push(i..i + 1);
        }
    }
    flush(&mut run, chars.len(), &mut spans);
    spans
}

/// Splits text into CJK-character, Latin-word, digit-run and single
/// punctuation/other tokens, in order.
pub fn tokenize(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    token_spans(&chars)
        .into_iter()
        .map(|span| chars[span].iter().collect())
        .collect()
}

pub fn is_punct(token: &str) -> bool {
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => PUNCT_CHARS.contains(&ch) || UNICODE_PUNCT.is_match(token),
        _ => false,
    }
}

/// Lowercased non-punctuation tokens of the normalized text, in order.
fn content_tokens(text: &str) -> Vec<String> {
    tokenize(&normalize(text))
        .into_iter()
        .filter(|tok| !is_punct(tok))
        .map(|tok| tok.to_lowercase())
        .collect()
}

/// Order-insensitive, case-insensitive token counts with punctuation dropped.
pub fn token_multiset(text: &str) -> HashMap<String, usize> {
    let mut counts = HashMap::default();
    for tok in content_tokens(text) {
        *counts.entry(tok).or_insert(0) += 1;
    }
    counts
}

/// Output tokens whose count exceeds their count in the input, in order of
/// first appearance in the output. Empty means the pair is delete-only.
pub fn new_tokens_in_output(input: &str, output: &str) -> Vec<String> {
    let available = token_multiset(input);
    let wanted = token_multiset(output);
    let mut seen = rustc_hash::FxHashSet::default();
    content_tokens(output)
        .into_iter()
        .filter(|tok| seen.insert(tok.clone()))
        .filter(|tok| available.get(tok).copied().unwrap_or(0) < wanted[tok])
        .collect()
}
