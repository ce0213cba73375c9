//! Association rules derived from the cumulative frequent itemsets.

pub mod rule;
pub mod search;

use std::cmp::Ordering;

pub use rule::AssociationRule;

/// Rules in the order their slots were reserved.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<AssociationRule>,
}

impl RuleSet {
    pub fn new(rules: Vec<AssociationRule>) -> Self {
        RuleSet { rules }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AssociationRule> {
        self.rules.iter()
    }

    pub fn as_slice(&self) -> &[AssociationRule] {
        &self.rules
    }

    /// Rules with confidence of at least `min_confidence`, highest confidence
    /// first, then highest support. Rules with undefined confidence go last;
    /// ties keep slot order.
    pub fn ranked(&self, min_confidence: f32) -> Vec<&AssociationRule> {
        let mut ranked: Vec<&AssociationRule> = self
            .rules
            .iter()
            .filter(|rule| rule.confidence >= min_confidence)
            .collect();
        ranked.sort_by(|a, b| rank(a, b));
        ranked
    }
}

fn rank(a: &AssociationRule, b: &AssociationRule) -> Ordering {
    b.confidence_is_defined()
        .cmp(&a.confidence_is_defined())
        .then_with(|| b.confidence.total_cmp(&a.confidence))
        .then_with(|| b.support.total_cmp(&a.support))
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a AssociationRule;
    type IntoIter = std::slice::Iter<'a, AssociationRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::itemset::Itemset;

    fn rule(antecedent: &str, full: &str, support: f32, confidence: f32) -> AssociationRule {
        let antecedent = Itemset::from_items(antecedent.bytes()).unwrap();
        let full = Itemset::from_items(full.bytes()).unwrap();
        AssociationRule {
            antecedent,
            consequent: full.difference(&antecedent),
            full,
            support,
            confidence,
            lift: None,
        }
    }

    #[test]
    fn ranked_orders_by_confidence_then_support() {
        let rules = RuleSet::new(vec![
            rule("a", "ab", 0.25, 0.5),
            rule("b", "ab", 0.5, 0.9),
            rule("c", "bc", 0.75, 0.5),
            rule("d", "cd", 0.1, f32::INFINITY),
            rule("e", "ae", 0.1, 0.1),
        ]);

        let ranked: Vec<String> = rules.ranked(0.2).iter().map(|r| r.to_string()).collect();
        assert_eq!(
            ranked,
            vec!["{b} => {a}", "{c} => {b}", "{a} => {b}", "{d} => {c}"]
        );
    }

    #[test]
    fn nan_confidence_never_passes_a_threshold() {
        let rules = RuleSet::new(vec![rule("a", "ab", 0.0, f32::NAN)]);
        assert!(rules.ranked(0.0).is_empty());
        assert_eq!(rules.len(), 1);
    }
}
