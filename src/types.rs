use crate::collection::ItemsetCollection;
use crate::itemset::Itemset;

/// A single item symbol. `0` is reserved as record padding.
pub type Item = u8;
pub type SupportCount = u32;

pub type ItemsetLength = usize;
pub type Transaction = Itemset;

pub type CandidateSet = ItemsetCollection;
pub type FrequentItemsets = ItemsetCollection;

/// Hard bound on the number of items a single itemset can hold.
pub const MAX_ITEMSET_LEN: usize = 10;
/// Hard bound on the number of members of a collection or rule list.
pub const MAX_COLLECTION_LEN: usize = 10_000;
/// Hard bound on the number of distinct symbols in a corpus.
pub const MAX_ALPHABET: usize = 32;
