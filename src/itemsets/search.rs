use std::ops::Range;

use tracing::{debug, info};

use crate::combi::{chunk_ranges, UnorderedPairs};
use crate::config::MiningConfig;
use crate::error::{Buffer, MiningError, Result, Stage};
use crate::itemset::{match_count, merge, Itemset};
use crate::scheduler::BatchScheduler;
use crate::types::{CandidateSet, FrequentItemsets};

/// Generate the candidates of length k+1 from the frequent itemsets of length k.
///
/// Join: every unordered pair sharing all but one item is merged.
/// Prune: a merged candidate survives only if each of its leave-one-out
/// subsets is itself frequent.
///
/// The outer index of the pair enumeration is split into contiguous slices,
/// one slice per unit of work. Each unit joins and prunes into a private
/// buffer; buffers are merged into the result on the calling thread.
pub fn generate_candidates_from_prev(
    prev: &FrequentItemsets,
    scheduler: &BatchScheduler,
    config: &MiningConfig,
) -> Result<CandidateSet> {
    let mut candidates = CandidateSet::with_capacity(config.collection_capacity);

    let k = match prev.iter().next() {
        Some(first) => first.len(),
        None => return Ok(candidates),
    };
    debug_assert!(prev.iter().all(|itemset| itemset.len() == k));

    if k >= config.max_itemset_len {
        return Err(MiningError::capacity(
            Stage::Join,
            Buffer::Items,
            config.max_itemset_len,
        ));
    }

    let units = chunk_ranges(prev.len(), config.chunk_size);
    debug!(k, frequent = prev.len(), units = units.len(), "joining");

    scheduler.run(
        &units,
        |outer| join_and_prune(prev, outer.clone(), k, config.worker_buffer_capacity),
        |local| {
            for candidate in local? {
                candidates
                    .insert(candidate)
                    .map_err(|e| e.at(Stage::Join, candidate))?;
            }
            Ok(())
        },
    )?;

    info!(
        level = k + 1,
        candidates = candidates.len(),
        "generated candidates"
    );
    Ok(candidates)
}

fn join_and_prune(
    prev: &FrequentItemsets,
    outer: Range<usize>,
    k: usize,
    capacity: usize,
) -> Result<Vec<Itemset>> {
    let mut local: Vec<Itemset> = Vec::new();

    for (s, t) in UnorderedPairs::over_outer(prev.as_slice(), outer) {
        if match_count(s, t) + 1 != k {
            continue;
        }
        let candidate = merge(s, t)?;
        if local.contains(&candidate) || !has_frequent_subsets(&candidate, prev) {
            continue;
        }
        if local.len() == capacity {
            return Err(MiningError::capacity(Stage::Join, Buffer::WorkerResults, capacity)
                .at(Stage::Join, candidate));
        }
        local.push(candidate);
    }

    Ok(local)
}

/// True iff every subset of `candidate` with one item left out is in `prev`.
pub fn has_frequent_subsets(candidate: &Itemset, prev: &FrequentItemsets) -> bool {
    candidate
        .leave_one_out()
        .all(|subset| prev.contains(&subset))
}

#[cfg(test)]
mod test {
    use super::*;
    use itertools::Itertools;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    fn level(rows: &[&str]) -> FrequentItemsets {
        let mut level = FrequentItemsets::new();
        for row in rows {
            level.insert(Itemset::from_items(row.bytes()).unwrap()).unwrap();
        }
        level
    }

    fn names(candidates: &CandidateSet) -> Vec<String> {
        candidates.sorted().iter().map(|c| c.to_string()).collect()
    }

    fn generate(prev: &FrequentItemsets, config: &MiningConfig) -> Result<CandidateSet> {
        let scheduler = BatchScheduler::new(config.batch_size).unwrap();
        generate_candidates_from_prev(prev, &scheduler, config)
    }

    #[test]
    fn test_singletons_join_into_all_pairs() {
        let candidates = generate(&level(&["a", "b", "c"]), &MiningConfig::default()).unwrap();
        assert_eq!(names(&candidates), vec!["{a, b}", "{a, c}", "{b, c}"]);
    }

    #[test]
    fn test_join_step() {
        let candidates = generate(
            &level(&["abc", "abd", "acd", "ace", "bcd"]),
            &MiningConfig::default(),
        )
        .unwrap();
        // {a, c, d, e} is joined but pruned: {c, d, e} is not frequent
        assert_eq!(names(&candidates), vec!["{a, b, c, d}"]);
    }

    #[test]
    fn test_join_step_2() {
        let candidates =
            generate(&level(&["ab", "bc", "ac", "ad", "cd"]), &MiningConfig::default()).unwrap();
        assert_eq!(names(&candidates), vec!["{a, b, c}", "{a, c, d}"]);
    }

    #[test]
    fn test_disjoint_pairs_produce_nothing() {
        let candidates = generate(&level(&["ab", "cd"]), &MiningConfig::default()).unwrap();
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_empty_level() {
        let candidates = generate(&FrequentItemsets::new(), &MiningConfig::default()).unwrap();
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_duplicates_across_pairs_collapse() {
        // {a,b,c} is reachable from three different pairs
        let candidates = generate(&level(&["ab", "ac", "bc"]), &MiningConfig::default()).unwrap();
        assert_eq!(candidates.len(), 1);
    }

    #[test]
    fn test_worker_buffer_overflow() {
        let config = MiningConfig::default()
            .with_chunk_size(10)
            .with_worker_buffer_capacity(2);
        let err = generate(&level(&["a", "b", "c", "d"]), &config).unwrap_err();
        assert!(matches!(
            err,
            MiningError::CapacityExceeded {
                stage: Stage::Join,
                buffer: Buffer::WorkerResults,
                ..
            }
        ));
    }

    #[test]
    fn test_candidate_collection_overflow() {
        let config = MiningConfig::default()
            .with_chunk_size(1)
            .with_collection_capacity(2);
        let err = generate(&level(&["a", "b", "c"]), &config).unwrap_err();
        assert!(err.is_capacity_exceeded());
    }

    #[test]
    fn test_level_at_max_length() {
        let config = MiningConfig {
            max_itemset_len: 2,
            max_level: 2,
            ..MiningConfig::default()
        };
        let err = generate(&level(&["ab", "ac"]), &config).unwrap_err();
        assert!(err.is_capacity_exceeded());
    }

    #[test]
    fn test_same_result_for_any_batch_size() {
        let prev = level(&["ab", "ac", "ad", "bc", "bd", "cd", "ce", "de"]);
        let serial = generate(&prev, &MiningConfig::default().with_batch_size(1).with_chunk_size(1))
            .unwrap();
        let parallel = generate(&prev, &MiningConfig::default().with_batch_size(4).with_chunk_size(2))
            .unwrap();
        assert_eq!(serial.as_slice(), parallel.as_slice());
        assert_eq!(
            names(&serial),
            vec!["{a, b, c}", "{a, b, d}", "{a, c, d}", "{b, c, d}", "{c, d, e}"]
        );
    }

    proptest! {
        #[test]
        fn candidates_are_exactly_the_sets_with_frequent_subsets(
            rows in prop::collection::btree_set(prop::collection::btree_set(b'a'..b'h', 3), 0..30)
        ) {
            let mut prev = FrequentItemsets::new();
            for row in &rows {
                prev.insert(Itemset::from_items(row.iter().copied()).unwrap()).unwrap();
            }
            let candidates = generate(&prev, &MiningConfig::default()).unwrap();
            for candidate in candidates.iter() {
                prop_assert_eq!(candidate.len(), 4);
                for subset in candidate.leave_one_out() {
                    prop_assert!(prev.contains(&subset));
                }
            }

            // every 4-itemset over the level's items whose 3-subsets are all frequent
            let alphabet: BTreeSet<u8> = rows.iter().flatten().copied().collect();
            let expected: BTreeSet<Vec<u8>> = alphabet
                .into_iter()
                .combinations(4)
                .filter(|items| {
                    let itemset = Itemset::from_items(items.iter().copied()).unwrap();
                    let all_frequent = itemset.leave_one_out().all(|subset| prev.contains(&subset));
                    all_frequent
                })
                .collect();
            let generated: BTreeSet<Vec<u8>> =
                candidates.iter().map(|c| c.items().to_vec()).collect();
            prop_assert_eq!(generated.len(), candidates.len());
            prop_assert_eq!(generated, expected);
        }
    }
}
