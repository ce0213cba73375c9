use std::fmt;

use thiserror::Error;

/// Which part of a mining run raised an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Load,
    Seed,
    Join,
    Count,
    Merge,
    Rules,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Load => "load",
            Stage::Seed => "seed",
            Stage::Join => "join",
            Stage::Count => "count",
            Stage::Merge => "merge",
            Stage::Rules => "rules",
        };
        f.write_str(name)
    }
}

/// The fixed-size buffer that overflowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Buffer {
    Items,
    Collection,
    WorkerResults,
    RuleList,
    Alphabet,
}

impl fmt::Display for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Buffer::Items => "itemset items",
            Buffer::Collection => "itemset collection",
            Buffer::WorkerResults => "worker result buffer",
            Buffer::RuleList => "rule list",
            Buffer::Alphabet => "item alphabet",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum MiningError {
    #[error("{stage}: {buffer} exceeded its capacity of {capacity}{}", on_itemset(.itemset))]
    CapacityExceeded {
        stage: Stage,
        buffer: Buffer,
        capacity: usize,
        itemset: Option<String>,
    },

    #[error("malformed {file} record {record}: {reason}")]
    Parse {
        file: &'static str,
        record: usize,
        reason: String,
    },

    #[error("confidence of {antecedent} => {full} is undefined: antecedent support is zero")]
    UndefinedConfidence { antecedent: String, full: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("failed to build worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

fn on_itemset(itemset: &Option<String>) -> String {
    match itemset {
        Some(itemset) => format!(" while handling {}", itemset),
        None => String::new(),
    }
}

impl MiningError {
    pub(crate) fn capacity(stage: Stage, buffer: Buffer, capacity: usize) -> Self {
        MiningError::CapacityExceeded {
            stage,
            buffer,
            capacity,
            itemset: None,
        }
    }

    /// Attach the itemset being processed, and re-tag the stage, on a capacity error.
    pub(crate) fn at(self, stage: Stage, itemset: impl fmt::Display) -> Self {
        match self {
            MiningError::CapacityExceeded {
                buffer, capacity, ..
            } => MiningError::CapacityExceeded {
                stage,
                buffer,
                capacity,
                itemset: Some(itemset.to_string()),
            },
            other => other,
        }
    }

    pub fn is_capacity_exceeded(&self) -> bool {
        matches!(self, MiningError::CapacityExceeded { .. })
    }
}

pub type Result<T> = std::result::Result<T, MiningError>;
