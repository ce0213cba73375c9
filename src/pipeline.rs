//! Level-wise mining loop.
//!
//! `Miner::run` drives every level in-process. `Miner::run_stage` performs a
//! single level against a persisted cumulative collection, for drivers that
//! invoke one level per process.

use std::path::Path;

use tracing::{info, info_span};

use crate::config::MiningConfig;
use crate::error::{MiningError, Result};
use crate::itemsets::{count, search, seed};
use crate::records;
use crate::rules::{search as rule_search, RuleSet};
use crate::scheduler::BatchScheduler;
use crate::types::{CandidateSet, FrequentItemsets, ItemsetLength, Transaction};

#[derive(Debug, Clone)]
pub struct MiningReport {
    /// `levels[k - 1]` holds the frequent itemsets of length k.
    pub levels: Vec<FrequentItemsets>,
    pub frequent: FrequentItemsets,
    pub rules: RuleSet,
    pub num_transactions: usize,
}

/// What one staged invocation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOutcome {
    /// Level `level` had `frequent` itemsets, all appended to the cumulative set.
    Advanced { level: ItemsetLength, frequent: usize },
    /// Level `level` had no frequent itemsets; mining is complete.
    Exhausted { level: ItemsetLength },
    /// The cumulative set already reaches the level cap.
    LevelCapReached,
}

pub struct Miner {
    config: MiningConfig,
    scheduler: BatchScheduler,
}

impl Miner {
    pub fn new(config: MiningConfig) -> Result<Self> {
        config.validate()?;
        let scheduler = BatchScheduler::new(config.batch_size)?;
        Ok(Miner { config, scheduler })
    }

    pub fn config(&self) -> &MiningConfig {
        &self.config
    }

    /// Mine every level, merge them and extract rules.
    pub fn run(&self, transactions: &[Transaction]) -> Result<MiningReport> {
        let levels = self.frequent_levels(transactions)?;
        let frequent = self.cumulative(&levels)?;
        let rules = self.rules(&frequent, transactions.len())?;

        Ok(MiningReport {
            levels,
            frequent,
            rules,
            num_transactions: transactions.len(),
        })
    }

    /// Frequent itemsets of every level up to the level cap, stopping at the
    /// first empty level. The empty level is not included.
    pub fn frequent_levels(&self, transactions: &[Transaction]) -> Result<Vec<FrequentItemsets>> {
        self.check_corpus(transactions)?;

        let mut levels: Vec<FrequentItemsets> = Vec::with_capacity(self.config.max_level);
        let mut candidates = self.seed(transactions)?;

        for k in 1..=self.config.max_level {
            let span = info_span!("level", k);
            let _enter = span.enter();

            let frequent = self.count(&candidates, transactions)?;
            if frequent.is_empty() {
                info!("no frequent itemsets, stopping");
                break;
            }
            if k < self.config.max_level {
                candidates = self.generate(&frequent)?;
            }
            levels.push(frequent);
        }

        Ok(levels)
    }

    /// Union of all levels, in level order.
    pub fn cumulative(&self, levels: &[FrequentItemsets]) -> Result<FrequentItemsets> {
        let mut frequent = FrequentItemsets::with_capacity(self.config.collection_capacity);
        for level in levels {
            frequent.extend_from(level)?;
        }
        info!(frequent = frequent.len(), "merged levels");
        Ok(frequent)
    }

    pub fn seed(&self, transactions: &[Transaction]) -> Result<CandidateSet> {
        seed::seed_candidates(transactions, &self.config)
    }

    pub fn count(&self, candidates: &CandidateSet, transactions: &[Transaction]) -> Result<FrequentItemsets> {
        count::generate_frequent_k_itemset_counts(candidates, transactions, &self.scheduler, &self.config)
    }

    pub fn generate(&self, frequent: &FrequentItemsets) -> Result<CandidateSet> {
        search::generate_candidates_from_prev(frequent, &self.scheduler, &self.config)
    }

    pub fn rules(&self, frequent: &FrequentItemsets, num_transactions: usize) -> Result<RuleSet> {
        rule_search::generate_rules(frequent, num_transactions, &self.scheduler, &self.config)
    }

    /// Run the next level against `cumulative`, appending its frequent
    /// itemsets. The longest members of `cumulative` are taken as the previous
    /// level; an empty collection starts at level 1.
    pub fn run_stage(
        &self,
        transactions: &[Transaction],
        cumulative: &mut FrequentItemsets,
    ) -> Result<StageOutcome> {
        self.check_corpus(transactions)?;

        let k = cumulative.max_len();
        if k >= self.config.max_level {
            return Ok(StageOutcome::LevelCapReached);
        }
        let level = k + 1;
        let span = info_span!("stage", level);
        let _enter = span.enter();

        let candidates = if k == 0 {
            self.seed(transactions)?
        } else {
            self.generate(&cumulative.level(k))?
        };
        let frequent = self.count(&candidates, transactions)?;
        if frequent.is_empty() {
            info!("no frequent itemsets");
            return Ok(StageOutcome::Exhausted { level });
        }

        cumulative.extend_from(&frequent)?;
        Ok(StageOutcome::Advanced {
            level,
            frequent: frequent.len(),
        })
    }

    /// `run_stage` against a cumulative itemset file, creating it when missing.
    /// The file is rewritten unless the level cap was already reached, so an
    /// exhausted first level still leaves an (empty) file for rule extraction.
    pub fn run_stage_file(&self, transactions: &[Transaction], path: &Path) -> Result<StageOutcome> {
        let capacity = self.config.collection_capacity;
        let mut cumulative = if path.exists() {
            records::load_merged(path, capacity)?
        } else {
            FrequentItemsets::with_capacity(capacity)
        };

        let outcome = self.run_stage(transactions, &mut cumulative)?;
        if outcome != StageOutcome::LevelCapReached {
            records::save_merged(path, &cumulative)?;
        }
        Ok(outcome)
    }

    fn check_corpus(&self, transactions: &[Transaction]) -> Result<()> {
        if let Some(expected) = self.config.corpus_size {
            if transactions.len() != expected {
                return Err(MiningError::InvalidConfig(format!(
                    "expected {} transactions, corpus has {}",
                    expected,
                    transactions.len()
                )));
            }
        }
        Ok(())
    }
}
