use crate::error::{MiningError, Result};
use crate::types::{ItemsetLength, SupportCount, MAX_ALPHABET, MAX_COLLECTION_LEN, MAX_ITEMSET_LEN};

/// Workload sizing and thresholds for one mining run.
#[derive(Debug, Clone, PartialEq)]
pub struct MiningConfig {
    /// Expected number of transactions; checked against the corpus when set.
    pub corpus_size: Option<usize>,
    /// Maximum number of distinct symbols in the corpus.
    pub max_alphabet: usize,
    /// Longest itemset a level may produce.
    pub max_itemset_len: ItemsetLength,
    /// Minimum number of containing transactions for an itemset to be frequent.
    pub min_support: SupportCount,
    /// Last level the loop runs.
    pub max_level: ItemsetLength,
    pub collection_capacity: usize,
    pub rule_capacity: usize,
    /// Cap on one join worker's private candidate buffer.
    pub worker_buffer_capacity: usize,
    /// Number of units dispatched together before a join barrier.
    pub batch_size: usize,
    /// Outer indices per join unit and candidates per counting unit.
    pub chunk_size: usize,
    /// Reject rules whose antecedent has zero support instead of emitting a
    /// non-finite confidence.
    pub strict_confidence: bool,
}

impl Default for MiningConfig {
    fn default() -> Self {
        Self {
            corpus_size: None,
            max_alphabet: MAX_ALPHABET,
            max_itemset_len: MAX_ITEMSET_LEN,
            min_support: 2,
            max_level: 4,
            collection_capacity: MAX_COLLECTION_LEN,
            rule_capacity: MAX_COLLECTION_LEN,
            worker_buffer_capacity: MAX_COLLECTION_LEN,
            batch_size: 4,
            chunk_size: 16,
            strict_confidence: false,
        }
    }
}

impl MiningConfig {
    pub fn new(min_support: SupportCount) -> Self {
        Self {
            min_support,
            ..Self::default()
        }
    }

    pub fn with_max_level(mut self, max_level: ItemsetLength) -> Self {
        self.max_level = max_level;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_corpus_size(mut self, corpus_size: usize) -> Self {
        self.corpus_size = Some(corpus_size);
        self
    }

    pub fn with_collection_capacity(mut self, capacity: usize) -> Self {
        self.collection_capacity = capacity;
        self
    }

    pub fn with_rule_capacity(mut self, capacity: usize) -> Self {
        self.rule_capacity = capacity;
        self
    }

    pub fn with_worker_buffer_capacity(mut self, capacity: usize) -> Self {
        self.worker_buffer_capacity = capacity;
        self
    }

    pub fn with_strict_confidence(mut self, strict: bool) -> Self {
        self.strict_confidence = strict;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(MiningError::InvalidConfig(msg));

        if self.max_alphabet == 0 || self.max_alphabet > MAX_ALPHABET {
            return invalid(format!(
                "max_alphabet must be in 1..={}, got {}",
                MAX_ALPHABET, self.max_alphabet
            ));
        }
        if self.max_itemset_len == 0 || self.max_itemset_len > MAX_ITEMSET_LEN {
            return invalid(format!(
                "max_itemset_len must be in 1..={}, got {}",
                MAX_ITEMSET_LEN, self.max_itemset_len
            ));
        }
        if self.max_level == 0 || self.max_level > self.max_itemset_len {
            return invalid(format!(
                "max_level must be in 1..={}, got {}",
                self.max_itemset_len, self.max_level
            ));
        }
        if self.min_support == 0 {
            return invalid("min_support must be at least 1".to_string());
        }
        for (name, capacity) in [
            ("collection_capacity", self.collection_capacity),
            ("rule_capacity", self.rule_capacity),
            ("worker_buffer_capacity", self.worker_buffer_capacity),
        ] {
            if capacity == 0 || capacity > MAX_COLLECTION_LEN {
                return invalid(format!(
                    "{} must be in 1..={}, got {}",
                    name, MAX_COLLECTION_LEN, capacity
                ));
            }
        }
        if self.batch_size == 0 {
            return invalid("batch_size must be at least 1".to_string());
        }
        if self.chunk_size == 0 {
            return invalid("chunk_size must be at least 1".to_string());
        }
        Ok(())
    }

    /// Units the rule extractor runs at once; one slot of the batch is kept
    /// for the coordinator.
    pub(crate) fn rule_batch_size(&self) -> usize {
        self.batch_size.saturating_sub(1).max(1)
    }
}
