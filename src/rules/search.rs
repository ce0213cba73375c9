#![allow(non_snake_case)]

use itertools::Itertools;
use tracing::{info, warn};

use crate::config::MiningConfig;
use crate::error::{Buffer, MiningError, Result, Stage};
use crate::itemset::{is_subset, Itemset};
use crate::rules::{AssociationRule, RuleSet};
use crate::scheduler::BatchScheduler;
use crate::types::FrequentItemsets;

/// Every `(left, right)` pair of the collection where `right` has at least two
/// items and strictly contains a non-empty `left`, outer loop over `right`.
pub fn rule_pairs(frequent: &FrequentItemsets) -> impl Iterator<Item = (&Itemset, &Itemset)> {
    frequent
        .iter()
        .cartesian_product(frequent.iter())
        .filter(|(right, left)| {
            !left.is_empty()
                && right.len() >= 2
                && right.len() > left.len()
                && is_subset(right, left)
        })
        .map(|(right, left)| (left, right))
}

/// Generate one rule per qualifying pair of the cumulative frequent itemsets.
///
/// Slots are reserved in pair order before any work is dispatched; each unit
/// computes exactly one rule into its own slot.
pub fn generate_rules(
    frequent: &FrequentItemsets,
    num_transactions: usize,
    scheduler: &BatchScheduler,
    config: &MiningConfig,
) -> Result<RuleSet> {
    let mut pairs: Vec<(&Itemset, &Itemset)> = Vec::new();
    for (left, right) in rule_pairs(frequent) {
        if pairs.len() == config.rule_capacity {
            return Err(
                MiningError::capacity(Stage::Rules, Buffer::RuleList, config.rule_capacity)
                    .at(Stage::Rules, AssociationRule::new(left, right)),
            );
        }
        pairs.push((left, right));
    }

    let mut slots = vec![AssociationRule::default(); pairs.len()];
    scheduler.fill_slots(&mut slots, config.rule_batch_size(), |index, slot| {
        let (left, right) = pairs[index];
        *slot = derive_rule(left, right, frequent, num_transactions, config.strict_confidence)?;
        Ok(())
    })?;

    info!(rules = slots.len(), "generated rules");
    Ok(RuleSet::new(slots))
}

/// Support, confidence and lift of `left => right - left`, taking counts from
/// the itemsets themselves.
pub fn derive_rule(
    left: &Itemset,
    right: &Itemset,
    frequent: &FrequentItemsets,
    num_transactions: usize,
    strict_confidence: bool,
) -> Result<AssociationRule> {
    let mut rule = AssociationRule::new(left, right);
    let N = num_transactions as f32;
    let full_count = right.support() as f32;
    let antecedent_count = left.support() as f32;

    if left.support() == 0 {
        if strict_confidence {
            return Err(MiningError::UndefinedConfidence {
                antecedent: left.to_string(),
                full: right.to_string(),
            });
        }
        warn!(rule = %rule, "antecedent support is zero, confidence is not finite");
    }

    rule.support = full_count / N;
    rule.confidence = full_count / antecedent_count;
    rule.lift = frequent
        .support_of(&rule.consequent)
        .filter(|&count| count > 0)
        .map(|count| rule.confidence / (count as f32 / N));

    Ok(rule)
}
