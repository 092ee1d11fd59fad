// src/disfluency/mod.rs

pub mod curator;
pub mod dedup;
pub mod linter;
pub mod normalizer;
pub mod patterns;
pub mod progress;
pub mod records;
pub mod result;
pub mod similarity;
pub mod synthesizer;
pub mod tokenizer;

// Re-export the types the binaries and integration tests work with, so they
// are reachable as `disfluency::SomeType`.
pub use curator::{CurationOutcome, Curator, CuratorBuilder};
pub use dedup::{DedupIndex, canonical_pair, pair_skeleton, skeletonize, strip_fillers};
pub use linter::{LintConfig, Linter, Reason, Verdict};
pub use normalizer::normalize;
pub use patterns::{
    CodeSwitchRatio, GrammarArtifact, code_switch_ratio, disfluency_count, grammar_artifacts,
    has_parenthetical_not_but, has_self_correction, numbers_with_units,
};
pub use records::{
    Pair, ReportRow, Row, Summary, read_clean_sentences, read_pairs, write_pairs, write_report,
};
pub use result::{Error, Result};
pub use similarity::sequence_ratio;
pub use synthesizer::{InjectorConfig, NoiseInjector, NoiseOp, synthesize};
pub use tokenizer::{is_punct, new_tokens_in_output, token_multiset, tokenize};
