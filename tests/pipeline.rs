use std::fs::{self, File};
use std::io::{BufReader, Write};

use disfluency_dataset::cli::create_output;
use disfluency_dataset::disfluency::{
    Curator, InjectorConfig, NoiseInjector, Pair, new_tokens_in_output, read_clean_sentences, read_pairs,
    write_pairs, write_report,
};

fn write_lines(path: &std::path::Path, lines: &[&str]) {
    let mut file = File::create(path).unwrap();
    for line in lines {
        writeln!(file, "{line}").unwrap();
    }
}

#[test]
fn synthesized_corpus_is_delete_only_and_reproducible() {
    let dir = tempfile::tempdir().unwrap();
    let clean_path = dir.path().join("clean.jsonl");
    write_lines(
        &clean_path,
        &[
            r#"{"clean": "We shipped the fix, then we tested it, then we merged it."}"#,
            r#"{"output": "我们明天开会，然后讨论预算。"}"#,
            r#"{"text": "The GPU usage was 80%, which is fine."}"#,
            r#"{"id": 4}"#,
            "",
        ],
    );

    let run = |out_name: &str| {
        let sentences = read_clean_sentences(BufReader::new(File::open(&clean_path).unwrap())).unwrap();
        let pairs = NoiseInjector::new(InjectorConfig::default()).synthesize_all(&sentences);
        let out_path = dir.path().join(out_name);
        write_pairs(create_output(&out_path).unwrap(), &pairs).unwrap();
        fs::read_to_string(out_path).unwrap()
    };

    let first = run("a/noisy.jsonl");
    let second = run("b/noisy.jsonl");
    assert_eq!(first, second);
    assert_eq!(first.lines().count(), 3);

    for line in first.lines() {
        let pair: Pair = serde_json::from_str(line).unwrap();
        assert!(new_tokens_in_output(&pair.input, &pair.output).is_empty(), "{line}");
    }
    assert!(first.contains("我们明天开会，然后讨论预算。"));
}

#[test]
fn lint_run_writes_kept_pairs_and_report() {
    let dir = tempfile::tempdir().unwrap();
    let in_path = dir.path().join("pairs.jsonl");
    write_lines(
        &in_path,
        &[
            r#"{"input": "um so the build, the build passed", "output": "the build passed"}"#,
            r#"{"input": "um so the build, the build passed", "output": "the build passed"}"#,
            "not json at all",
            r#"{"input": "um, uh, the GPU usage was 80%", "output": "the GPU usage was 90%"}"#,
            r#"5|{"input": "嗯 我们明天开会, 我们明天开会吧", "output": "我们明天开会吧"}"#,
        ],
    );

    let rows = read_pairs(BufReader::new(File::open(&in_path).unwrap())).unwrap();
    assert_eq!(rows.iter().map(|r| r.idx).collect::<Vec<_>>(), vec![1, 2, 4, 5]);

    let outcome = Curator::default().curate(&rows);
    let out_path = dir.path().join("out/clean.jsonl");
    let report_path = dir.path().join("out/report.csv");
    let kept: Vec<Pair> = outcome.kept.iter().map(|r| r.pair()).collect();
    write_pairs(create_output(&out_path).unwrap(), &kept).unwrap();
    write_report(create_output(&report_path).unwrap(), &outcome.report).unwrap();

    let cleaned = fs::read_to_string(&out_path).unwrap();
    assert_eq!(
        cleaned,
        "{\"input\":\"um so the build, the build passed\",\"output\":\"the build passed\"}\n\
         {\"input\":\"嗯 我们明天开会, 我们明天开会吧\",\"output\":\"我们明天开会吧\"}\n"
    );

    let report = fs::read_to_string(&report_path).unwrap();
    let lines: Vec<&str> = report.split("\r\n").collect();
    assert_eq!(lines[0], "idx,reason,input,output");
    assert_eq!(lines[1], "2,hard_duplicate~1,\"um so the build, the build passed\",the build passed");
    assert!(lines[2].starts_with("4,delete_only_violation:new_tokens=90,"));
    assert!(lines[3].starts_with("4,entity_violation:numbers_units_changed,"));
    assert_eq!(lines[4], "");

    let summary = serde_json::to_value(outcome.summary()).unwrap();
    assert_eq!(
        summary,
        serde_json::json!({"input_rows": 4, "kept_rows": 2, "removed_rows": 2, "report_rows": 3})
    );
}

#[test]
fn injected_duplicates_collapse_under_hard_dedup() {
    let clean = "We shipped the fix, then we tested it, then we merged it, then we deployed it.";
    let sentences = vec![clean; 5];
    let pairs = NoiseInjector::new(InjectorConfig { seed: 3, density: 1 }).synthesize_all(&sentences);
    let rows: Vec<_> = pairs
        .iter()
        .enumerate()
        .map(|(i, p)| disfluency_dataset::disfluency::Row::new(i + 1, p.input.clone(), p.output.clone()))
        .collect();

    let outcome = Curator::builder().hard_dedup_only(true).build().unwrap().curate(&rows);
    let distinct: std::collections::HashSet<&str> = pairs.iter().map(|p| p.input.as_str()).collect();
    assert!(outcome.kept.len() <= distinct.len());
    assert!(!outcome.kept.is_empty());
    assert_eq!(outcome.summary().removed_rows, 5 - outcome.kept.len());
}
