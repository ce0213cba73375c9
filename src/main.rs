use std::path::PathBuf;

use anyhow::{Context, Result};
use apriori_levels::records;
use apriori_levels::types::MAX_COLLECTION_LEN;
use apriori_levels::{Miner, MiningConfig, RuleSet};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "apriori-levels")]
#[command(version)]
#[command(about = "Level-wise Apriori frequent itemset and association rule miner", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Mine every level in-process, then extract rules
    Mine {
        #[command(flatten)]
        mining: MiningArgs,

        /// Write the cumulative frequent itemsets here
        #[arg(long, value_name = "PATH")]
        merged: Option<PathBuf>,

        /// Write the rules here
        #[arg(long, value_name = "PATH")]
        rules: Option<PathBuf>,

        /// Print rules with at least this confidence
        #[arg(long, default_value_t = 0.0)]
        min_confidence: f32,

        /// Print at most this many rules
        #[arg(long, default_value_t = 20)]
        top: usize,
    },
    /// Run the next level against a cumulative itemset file, updating it in place
    Stage {
        #[command(flatten)]
        mining: MiningArgs,

        /// Cumulative frequent itemset file; created when missing
        #[arg(long, value_name = "PATH")]
        merged: PathBuf,
    },
    /// Extract rules from a cumulative itemset file
    Rules {
        #[command(flatten)]
        mining: MiningArgs,

        #[arg(long, value_name = "PATH")]
        merged: PathBuf,

        #[arg(long, value_name = "PATH")]
        out: PathBuf,
    },
    /// Print the records of a rule file
    Show {
        #[arg(value_name = "PATH")]
        rules: PathBuf,
    },
}

#[derive(Args, Debug)]
struct MiningArgs {
    /// Transaction corpus file
    #[arg(long, value_name = "PATH")]
    corpus: PathBuf,

    /// Minimum number of containing transactions
    #[arg(long, default_value_t = 2)]
    min_support: u32,

    /// Last level to mine
    #[arg(long, default_value_t = 4)]
    max_level: usize,

    /// Units of work dispatched per batch
    #[arg(long, default_value_t = 4)]
    batch_size: usize,

    /// Expected number of transactions
    #[arg(long)]
    corpus_size: Option<usize>,

    /// Fail on rules whose antecedent has zero support
    #[arg(long)]
    strict_confidence: bool,
}

impl MiningArgs {
    fn config(&self) -> MiningConfig {
        let mut config = MiningConfig::new(self.min_support)
            .with_max_level(self.max_level)
            .with_batch_size(self.batch_size)
            .with_strict_confidence(self.strict_confidence);
        if let Some(corpus_size) = self.corpus_size {
            config = config.with_corpus_size(corpus_size);
        }
        config
    }

    fn miner(&self) -> Result<Miner> {
        Miner::new(self.config()).context("invalid mining configuration")
    }

    fn load_corpus(&self) -> Result<Vec<apriori_levels::Transaction>> {
        records::load_corpus(&self.corpus)
            .with_context(|| format!("failed to load corpus {}", self.corpus.display()))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Mine {
            mining,
            merged,
            rules,
            min_confidence,
            top,
        } => {
            let transactions = mining.load_corpus()?;
            let report = mining.miner()?.run(&transactions).context("mining failed")?;

            for (k, level) in report.levels.iter().enumerate() {
                println!("level {}: {} frequent itemsets", k + 1, level.len());
            }
            if let Some(path) = merged {
                records::save_merged(&path, &report.frequent)
                    .with_context(|| format!("failed to write {}", path.display()))?;
            }
            if let Some(path) = rules {
                records::save_rules(&path, &report.rules)
                    .with_context(|| format!("failed to write {}", path.display()))?;
            }
            print_rules(&report.rules, min_confidence, top);
        }
        Command::Stage { mining, merged } => {
            let transactions = mining.load_corpus()?;
            let outcome = mining
                .miner()?
                .run_stage_file(&transactions, &merged)
                .with_context(|| format!("stage against {} failed", merged.display()))?;
            info!(?outcome, "stage finished");
            println!("{:?}", outcome);
        }
        Command::Rules { mining, merged, out } => {
            let transactions = mining.load_corpus()?;
            let miner = mining.miner()?;
            let cumulative = records::load_merged(&merged, miner.config().collection_capacity)
                .with_context(|| format!("failed to load {}", merged.display()))?;

            let rules = miner
                .rules(&cumulative, transactions.len())
                .context("rule extraction failed")?;
            records::save_rules(&out, &rules)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("{} rules written to {}", rules.len(), out.display());
        }
        Command::Show { rules } => {
            let stored = records::load_rules(&rules, MAX_COLLECTION_LEN)
                .with_context(|| format!("failed to load {}", rules.display()))?;
            for record in stored {
                println!(
                    "{} => {}  support={:.4} confidence={:.4}",
                    record.antecedent, record.consequent, record.support, record.confidence
                );
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_rules(rules: &RuleSet, min_confidence: f32, top: usize) {
    let ranked = rules.ranked(min_confidence);
    println!("{} rules, {} with confidence >= {}", rules.len(), ranked.len(), min_confidence);
    for rule in ranked.into_iter().take(top) {
        match rule.lift {
            Some(lift) => println!(
                "{}  support={:.4} confidence={:.4} lift={:.4}",
                rule, rule.support, rule.confidence, lift
            ),
            None => println!(
                "{}  support={:.4} confidence={:.4}",
                rule, rule.support, rule.confidence
            ),
        }
    }
}
