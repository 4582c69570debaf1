use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::style::Stylize;
use ss3_core::{load_from_disk, save_to_disk, Classifier, ClassifierConfig};
use std::io::{stdin, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "ss3", about = "Train and query per-category text classifiers")]
struct Cli {
    /// Model file (bincode snapshot)
    #[arg(long, short, env = "SS3_MODEL", default_value = "model.ss3")]
    model: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Learn documents for one category, creating the model if needed
    Train {
        #[arg(long, short)]
        category: String,
        /// TOML config used when the model does not exist yet
        #[arg(long)]
        config: Option<PathBuf>,
        /// Treat every non-empty line as its own document
        #[arg(long)]
        lines: bool,
        files: Vec<PathBuf>,
    },
    /// Classify files (or stdin when none are given)
    Classify { files: Vec<PathBuf> },
    /// Show the confidence breakdown of a word or phrase
    Explain { phrase: String },
    /// Show model metadata, or a category's top vocabulary
    Info {
        #[arg(long)]
        vocab: Option<String>,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Set hyperparameters on a saved model
    Set {
        #[arg(long)]
        s: Option<f64>,
        #[arg(long)]
        l: Option<f64>,
        #[arg(long)]
        p: Option<f64>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Train {
            category,
            config,
            lines,
            files,
        } => train(&cli.model, &category, config.as_deref(), lines, &files),
        Command::Classify { files } => classify(&cli.model, &files),
        Command::Explain { phrase } => explain(&cli.model, &phrase),
        Command::Info { vocab, limit } => info(&cli.model, vocab.as_deref(), limit),
        Command::Set { s, l, p } => set(&cli.model, s, l, p),
    }
}

fn load(model: &Path) -> Result<Classifier> {
    load_from_disk(model).with_context(|| format!("Failed to load model {}", model.display()))
}

fn read_input(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn train(model: &Path, category: &str, config: Option<&Path>, lines: bool, files: &[PathBuf]) -> Result<()> {
    let mut clf = if model.exists() {
        load(model)?
    } else {
        let config = match config {
            Some(path) => ClassifierConfig::load(path)?,
            None => {
                let mut config = ClassifierConfig::default();
                config.apply_env()?;
                config
            }
        };
        Classifier::from_config(&config)?
    };

    let mut learned = 0;
    for file in files {
        let text = read_input(file)?;
        let documents: Vec<&str> = if lines {
            text.lines().filter(|l| !l.trim().is_empty()).collect()
        } else {
            vec![text.as_str()]
        };
        for document in documents {
            match clf.train(document, category) {
                Ok(_) => learned += 1,
                Err(e) => tracing::warn!("Skipping document in {}: {}", file.display(), e),
            }
        }
    }

    save_to_disk(&clf, model)?;
    println!(
        "Learned {} documents for '{}' ({} categories)",
        learned,
        category.bold(),
        clf.category_count()
    );
    Ok(())
}

fn classify(model: &Path, files: &[PathBuf]) -> Result<()> {
    let clf = load(model)?;
    clf.ensure_trained()?;

    let inputs: Vec<(String, String)> = if files.is_empty() {
        let mut text = String::new();
        stdin().read_to_string(&mut text)?;
        vec![("<stdin>".to_string(), text)]
    } else {
        files
            .iter()
            .map(|f| read_input(f).map(|t| (f.display().to_string(), t)))
            .collect::<Result<_>>()?
    };

    let texts: Vec<&str> = inputs.iter().map(|(_, t)| t.as_str()).collect();
    for ((source, _), result) in inputs.iter().zip(clf.classify_batch(&texts)) {
        match result {
            Ok(classification) => {
                let labels = classification.labels.join(", ");
                println!("{}: {}", source, labels.green().bold());
                for entry in classification.confidences.iter() {
                    println!("    {:<20} {:.4}", entry.category, entry.score);
                }
            }
            Err(e) => println!("{}: {}", source, e.to_string().red()),
        }
    }
    Ok(())
}

fn explain(model: &Path, phrase: &str) -> Result<()> {
    let clf = load(model)?;
    println!("{}", phrase.bold());
    println!(
        "    {:<20} {:>8} {:>8} {:>8} {:>8} {:>8}",
        "category", "lv", "sg", "gv", "sn", "sgv"
    );
    for (category, v) in clf.token_breakdown(phrase) {
        println!(
            "    {:<20} {:>8.4} {:>8.4} {:>8.4} {:>8.4} {:>8.4}",
            category, v.lv, v.sg, v.gv, v.sn, v.sgv
        );
    }
    Ok(())
}

fn info(model: &Path, vocab: Option<&str>, limit: usize) -> Result<()> {
    let clf = load(model)?;
    if let Some(category) = vocab {
        for entry in clf.category_vocabulary(category, Some(limit))? {
            println!(
                "    {:<30} {:>8} {:>8.4} {:>8.4}",
                entry.term, entry.count, entry.gv, entry.sgv
            );
        }
        return Ok(());
    }

    let params = clf.hyperparameters();
    println!("Model: {}", clf.name().bold());
    println!("Max n-gram length: {}", clf.max_ngram());
    println!("Hyperparameters: s={} l={} p={}", params.s, params.l, params.p);
    println!("Vocabulary: {} words", clf.vocabulary().len());
    for category in clf.categories() {
        let stats = clf.category_stats(category)?;
        println!(
            "    {:<20} docs={} tokens={} distinct={}",
            category, stats.documents, stats.total_count, stats.vocabulary_size
        );
    }
    Ok(())
}

fn set(model: &Path, s: Option<f64>, l: Option<f64>, p: Option<f64>) -> Result<()> {
    let mut clf = load(model)?;
    let current = clf.hyperparameters();
    clf.set_hyperparameters(
        s.unwrap_or(current.s),
        l.unwrap_or(current.l),
        p.unwrap_or(current.p),
    )?;
    save_to_disk(&clf, model)?;
    let params = clf.hyperparameters();
    println!("Hyperparameters: s={} l={} p={}", params.s, params.l, params.p);
    Ok(())
}
