// src/lint_main.rs

use std::fs::File;
use std::io::BufReader;
use std::process;

use clap::Parser;
use disfluency_dataset::cli::{LintArgs, create_output, init_tracing};
use disfluency_dataset::disfluency::{Curator, Pair, Result, read_pairs, write_pairs, write_report};
use tracing::info;

fn main() {
    let args = LintArgs::parse();
    init_tracing(args.verbose);

    if let Err(err) = run(&args) {
        eprintln!("{err}");
        process::exit(1);
    }
}

fn run(args: &LintArgs) -> Result<()> {
    let mut curator = Curator::builder()
        .lint_config(args.lint_config())
        .show_progress(args.progress)
        .build()?;

    let rows = read_pairs(BufReader::new(File::open(&args.input)?))?;
    info!(rows = rows.len(), path = %args.input.display(), "loaded pairs");

    let outcome = curator.curate(&rows);
    let kept: Vec<Pair> = outcome.kept.iter().map(|row| row.pair()).collect();
    write_pairs(create_output(&args.output)?, &kept)?;
    write_report(create_output(&args.report)?, &outcome.report)?;

    println!("{}", serde_json::to_string(&outcome.summary())?);
    Ok(())
}
