use std::fmt::{Display, Formatter, Result};

use crate::itemset::Itemset;

/// `antecedent => consequent`, where `full` is the union of both.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AssociationRule {
    pub antecedent: Itemset,
    pub consequent: Itemset,
    pub full: Itemset,
    /// count(full) / |transactions|
    pub support: f32,
    /// count(full) / count(antecedent); non-finite when the antecedent was
    /// never counted.
    pub confidence: f32,
    /// confidence / (count(consequent) / |transactions|), when the
    /// consequent's count is known.
    pub lift: Option<f32>,
}

impl AssociationRule {
    pub fn new(antecedent: &Itemset, full: &Itemset) -> Self {
        AssociationRule {
            antecedent: *antecedent,
            consequent: full.difference(antecedent),
            full: *full,
            support: 0.0,
            confidence: 0.0,
            lift: None,
        }
    }

    pub fn confidence_is_defined(&self) -> bool {
        self.confidence.is_finite()
    }
}

impl Display for AssociationRule {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{} => {}", self.antecedent, self.consequent)
    }
}
