// src/disfluency/normalizer.rs

use unicode_normalization::UnicodeNormalization;

/// Em-dash used as the single restart marker after normalization.
pub const EM_DASH: char = '—';

/// Full-width punctuation that NFKC leaves alone (or that we want collapsed
/// further) mapped to its half-width form.
fn map_fullwidth(ch: char, out: &mut String) {
    match ch {
        '，' => out.push(','),
        '。' => out.push('.'),
        '！' => out.push('!'),
        '？' => out.push('?'),
        '；' => out.push(';'),
        '：' => out.push(':'),
        '（' => out.push('('),
        '）' => out.push(')'),
        '【' => out.push('['),
        '】' => out.push(']'),
        '《' => out.push('<'),
        '》' => out.push('>'),
        '“' | '”' => out.push('"'),
        '‘' | '’' => out.push('\''),
        '—' | '–' => out.push(EM_DASH),
        '…' => out.push_str("..."),
        _ => out.push(ch),
    }
}

/// NFKC, full-width punctuation folding, whitespace collapsing and trimming.
///
/// Idempotent. The folded text goes through NFKC once more because an ASCII
/// replacement can compose with a following combining mark (`<` + U+0338).
pub fn normalize(text: &str) -> String {
    let mut mapped = String::with_capacity(text.len());
    for ch in text.nfkc() {
        map_fullwidth(ch, &mut mapped);
    }
    let recomposed: String = mapped.nfkc().collect();
    collapse_whitespace(&recomposed)
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// CJK unified ideographs, extensions A-E and the compatibility blocks.
pub fn is_cjk(ch: char) -> bool {
    matches!(ch as u32,
        0x4E00..=0x9FFF
        | 0x3400..=0x4DBF
        | 0x20000..=0x2A6DF
        | 0x2A700..=0x2B73F
        | 0x2B740..=0x2B81F
        | 0x2B820..=0x2CEAF
        | 0xF900..=0xFAFF
        | 0x2F800..=0x2FA1F)
}
