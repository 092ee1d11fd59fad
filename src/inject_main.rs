// src/inject_main.rs

use std::fs::File;
use std::io::BufReader;
use std::process;

use clap::Parser;
use disfluency_dataset::cli::{InjectArgs, create_output, init_tracing};
use disfluency_dataset::disfluency::{NoiseInjector, Result, read_clean_sentences, write_pairs};
use tracing::info;

fn main() {
    let args = InjectArgs::parse();
    init_tracing(args.verbose);

    if let Err(err) = run(&args) {
        eprintln!("{err}");
        process::exit(1);
    }
}

fn run(args: &InjectArgs) -> Result<()> {
    let config = args.injector_config();
    config.validate()?;

    let sentences = read_clean_sentences(BufReader::new(File::open(&args.input)?))?;
    info!(rows = sentences.len(), path = %args.input.display(), "loaded clean sentences");

    let pairs = NoiseInjector::new(config).synthesize_all(&sentences);
    write_pairs(create_output(&args.output)?, &pairs)?;
    info!(rows = pairs.len(), path = %args.output.display(), seed = config.seed, "wrote noisy pairs");
    Ok(())
}
