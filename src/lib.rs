//! Level-wise Apriori mining of frequent itemsets and association rules over
//! a fixed transaction corpus with a small item alphabet.
//!
//! ```no_run
//! use apriori_levels::{apriori, Itemset, MiningConfig};
//!
//! let transactions: Vec<Itemset> = ["ab", "abc", "a", "bc"]
//!     .iter()
//!     .map(|row| Itemset::from_items(row.bytes()))
//!     .collect::<Result<_, _>>()?;
//! let report = apriori(&transactions, MiningConfig::new(2))?;
//! for rule in report.rules.ranked(0.5) {
//!     println!("{} support={} confidence={}", rule, rule.support, rule.confidence);
//! }
//! # Ok::<(), apriori_levels::MiningError>(())
//! ```

pub mod collection;
pub mod combi;
pub mod config;
pub mod error;
pub mod itemset;
pub mod itemsets;
pub mod pipeline;
pub mod records;
pub mod rules;
pub mod scheduler;
pub mod types;

pub use collection::ItemsetCollection;
pub use config::MiningConfig;
pub use error::{MiningError, Result, Stage};
pub use itemset::Itemset;
pub use pipeline::{Miner, MiningReport, StageOutcome};
pub use rules::{AssociationRule, RuleSet};
pub use types::{Item, SupportCount, Transaction};

/// Apriori algorithm for frequent itemsets and association rules.
pub fn apriori(transactions: &[Transaction], config: MiningConfig) -> Result<MiningReport> {
    Miner::new(config)?.run(transactions)
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! corpus {
        ($($x:expr),*) => {
            {
                let mut vec: Vec<Transaction> = vec![];
                $(vec.push(Itemset::from_items($x.bytes()).unwrap());)*
                vec
            }
        };
    }

    #[test]
    fn test_apriori_end_to_end() {
        let transactions = corpus!["bread", "yogurt", "milk", "mild"];
        let report = apriori(&transactions, MiningConfig::new(2)).unwrap();

        assert!(report.frequent.iter().all(|itemset| itemset.support() >= 2));
        assert!(report
            .rules
            .iter()
            .all(|rule| rule.full.len() >= 2 && rule.confidence > 0.0));
    }

    #[test]
    fn test_apriori_two_item_corpus() {
        let transactions = corpus!["ab", "abc", "a", "bc"];
        let report = apriori(&transactions, MiningConfig::new(2)).unwrap();

        let ranked: Vec<String> = report.rules.ranked(0.0).iter().map(|r| r.to_string()).collect();
        assert_eq!(
            ranked,
            vec!["{c} => {b}", "{a} => {b}", "{b} => {a}", "{b} => {c}"]
        );
    }
}
