use std::{
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
};

use anyhow::{Context, Result};
use bayes_tagger::{report, CorpusReader, Trainer};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "bayes_tagger", version, about = "Naive Bayes text classifier")]
struct Cli {
    /// CSV file with `tag` and `content` columns to train on
    train_file: PathBuf,
    /// CSV file with the same columns to evaluate against
    test_file: PathBuf,
    /// Print the training rows and every model parameter
    #[arg(long)]
    debug: bool,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    // Open both files up front so a bad test path fails before training.
    let train_rows = CorpusReader::from_path(&cli.train_file)
        .with_context(|| format!("Error opening file: {}", cli.train_file.display()))?;
    let test_rows = CorpusReader::from_path(&cli.test_file)
        .with_context(|| format!("Error opening file: {}", cli.test_file.display()))?;

    let mut trainer = Trainer::new();
    for doc in train_rows {
        let doc = doc.with_context(|| format!("reading {}", cli.train_file.display()))?;
        trainer.ingest(&doc.label, &doc.content);
    }
    let classifier = trainer.finish();

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if cli.debug {
        report::write_training_rows(&mut out, classifier.documents())?;
    }
    report::write_training_summary(&mut out, &classifier, cli.debug)?;

    writeln!(out)?;
    writeln!(out, "test data:")?;
    let mut eval = report::Evaluation::new();
    for doc in test_rows {
        let doc = doc.with_context(|| format!("reading {}", cli.test_file.display()))?;
        let prediction = classifier
            .predict(&doc.content)
            .context("cannot classify test data")?;
        report::write_prediction(&mut out, &doc.label, &doc.content, &prediction)?;
        eval.record(&doc.label, &prediction);
    }

    report::write_performance(&mut out, &eval)?;
    if let Some(accuracy) = eval.accuracy() {
        tracing::info!(accuracy, correct = eval.correct(), total = eval.total(), "evaluation finished");
    }

    Ok(())
}
