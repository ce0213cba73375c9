use bitvec::prelude::*;
use tracing::debug;

use crate::config::MiningConfig;
use crate::error::{Buffer, MiningError, Result, Stage};
use crate::itemset::Itemset;
use crate::types::{CandidateSet, Item, Transaction};

type Alphabet = BitArr!(for 256, in u64, Lsb0);

/// Every distinct symbol of the corpus as a one-item candidate, in symbol
/// order.
pub fn seed_candidates(transactions: &[Transaction], config: &MiningConfig) -> Result<CandidateSet> {
    let alphabet = alphabet_of(transactions);
    let distinct = alphabet.count_ones();
    debug!(distinct, "seeding level 1");

    if distinct > config.max_alphabet {
        return Err(MiningError::capacity(
            Stage::Seed,
            Buffer::Alphabet,
            config.max_alphabet,
        ));
    }

    let mut candidates = CandidateSet::with_capacity(config.collection_capacity);
    for item in alphabet.iter_ones() {
        let candidate = Itemset::singleton(item as Item);
        candidates
            .insert(candidate)
            .map_err(|e| e.at(Stage::Seed, candidate))?;
    }
    Ok(candidates)
}

fn alphabet_of(transactions: &[Transaction]) -> Alphabet {
    let mut alphabet: Alphabet = BitArray::ZERO;
    for transaction in transactions {
        for &item in transaction.items() {
            alphabet.set(item as usize, true);
        }
    }
    alphabet
}
