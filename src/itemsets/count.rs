use tracing::info;

use crate::combi::chunk_ranges;
use crate::config::MiningConfig;
use crate::error::{Result, Stage};
use crate::itemset::{is_subset, Itemset};
use crate::scheduler::BatchScheduler;
use crate::types::{CandidateSet, FrequentItemsets, SupportCount, Transaction};

/// Number of transactions containing `candidate`.
pub fn count_support(candidate: &Itemset, transactions: &[Transaction]) -> SupportCount {
    transactions
        .iter()
        .filter(|transaction| is_subset(transaction, candidate))
        .count() as SupportCount
}

/// Count every candidate against the corpus and keep those reaching
/// `min_support`.
///
/// Candidates are handed out in whole-candidate chunks so a single counter is
/// only ever touched by one worker.
pub fn generate_frequent_k_itemset_counts(
    candidates: &CandidateSet,
    transactions: &[Transaction],
    scheduler: &BatchScheduler,
    config: &MiningConfig,
) -> Result<FrequentItemsets> {
    let mut frequent = FrequentItemsets::with_capacity(config.collection_capacity);
    let units = chunk_ranges(candidates.len(), config.chunk_size);

    scheduler.run(
        &units,
        |range| {
            candidates.as_slice()[range.clone()]
                .iter()
                .map(|candidate| candidate.with_support(count_support(candidate, transactions)))
                .collect::<Vec<Itemset>>()
        },
        |counted| {
            for itemset in counted {
                if itemset.support() >= config.min_support {
                    frequent
                        .insert(itemset)
                        .map_err(|e| e.at(Stage::Count, itemset))?;
                }
            }
            Ok(())
        },
    )?;

    info!(
        candidates = candidates.len(),
        frequent = frequent.len(),
        "counted candidates"
    );
    Ok(frequent)
}
