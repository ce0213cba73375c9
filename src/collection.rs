use std::collections::HashMap;

use crate::error::{Buffer, MiningError, Result, Stage};
use crate::itemset::Itemset;
use crate::types::{ItemsetLength, SupportCount, MAX_COLLECTION_LEN};

/// Bounded, deduplicated-by-value aggregate of itemsets.
///
/// Members keep their insertion order, which is the order pair enumeration
/// walks. Inserting a value equal to an existing member is a no-op.
#[derive(Debug, Clone)]
pub struct ItemsetCollection {
    members: Vec<Itemset>,
    positions: HashMap<Itemset, usize>,
    capacity: usize,
}

impl ItemsetCollection {
    pub fn new() -> Self {
        ItemsetCollection::with_capacity(MAX_COLLECTION_LEN)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        ItemsetCollection {
            members: Vec::new(),
            positions: HashMap::new(),
            capacity,
        }
    }

    /// Returns `Ok(true)` when `itemset` was admitted, `Ok(false)` when an
    /// equal member was already present.
    pub fn insert(&mut self, itemset: Itemset) -> Result<bool> {
        if self.positions.contains_key(&itemset) {
            return Ok(false);
        }
        if self.members.len() == self.capacity {
            return Err(
                MiningError::capacity(Stage::Merge, Buffer::Collection, self.capacity)
                    .at(Stage::Merge, itemset),
            );
        }
        self.positions.insert(itemset, self.members.len());
        self.members.push(itemset);
        Ok(true)
    }

    /// Insert every member of `other`, keeping `other`'s order.
    pub fn extend_from(&mut self, other: &ItemsetCollection) -> Result<()> {
        for itemset in other.iter() {
            self.insert(*itemset)?;
        }
        Ok(())
    }

    pub fn contains(&self, itemset: &Itemset) -> bool {
        self.positions.contains_key(itemset)
    }

    /// Support recorded for the member equal to `itemset`.
    pub fn support_of(&self, itemset: &Itemset) -> Option<SupportCount> {
        self.positions
            .get(itemset)
            .map(|&pos| self.members[pos].support())
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Itemset> {
        self.members.iter()
    }

    pub fn as_slice(&self) -> &[Itemset] {
        &self.members
    }

    /// Length of the longest member, 0 when empty.
    pub fn max_len(&self) -> ItemsetLength {
        self.members.iter().map(Itemset::len).max().unwrap_or(0)
    }

    /// Members of exactly `len` items, in collection order.
    pub fn level(&self, len: ItemsetLength) -> ItemsetCollection {
        let mut level = ItemsetCollection::with_capacity(self.capacity);
        for itemset in self.members.iter().filter(|itemset| itemset.len() == len) {
            level.positions.insert(*itemset, level.members.len());
            level.members.push(*itemset);
        }
        level
    }

    /// Members in canonical order: shorter first, then lexicographic.
    pub fn sorted(&self) -> Vec<Itemset> {
        let mut members = self.members.clone();
        members.sort();
        members
    }
}

impl Default for ItemsetCollection {
    fn default() -> Self {
        ItemsetCollection::new()
    }
}

impl<'a> IntoIterator for &'a ItemsetCollection {
    type Item = &'a Itemset;
    type IntoIter = std::slice::Iter<'a, Itemset>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Item;

    fn set(items: &str) -> Itemset {
        Itemset::from_items(items.bytes()).unwrap()
    }

    #[test]
    fn insert_is_idempotent() {
        let mut collection = ItemsetCollection::new();
        assert!(collection.insert(set("ab")).unwrap());
        assert!(!collection.insert(set("ba")).unwrap());
        assert!(!collection.insert(set("ab").with_support(7)).unwrap());

        assert_eq!(collection.len(), 1);
        assert_eq!(collection.support_of(&set("ab")), Some(0));
    }

    #[test]
    fn keeps_insertion_order() {
        let mut collection = ItemsetCollection::new();
        for items in ["c", "a", "ab", "b"] {
            collection.insert(set(items)).unwrap();
        }
        let order: Vec<String> = collection.iter().map(|s| s.to_string()).collect();
        assert_eq!(order, vec!["{c}", "{a}", "{a, b}", "{b}"]);

        let sorted: Vec<String> = collection.sorted().iter().map(|s| s.to_string()).collect();
        assert_eq!(sorted, vec!["{a}", "{b}", "{c}", "{a, b}"]);
    }

    #[test]
    fn ten_thousand_and_first_member_exceeds_capacity() {
        let mut collection = ItemsetCollection::new();
        let mut admitted = 0;
        'fill: for a in 1..=255u8 {
            for b in (a + 1)..=255u8 {
                if admitted == MAX_COLLECTION_LEN {
                    break 'fill;
                }
                collection.insert(Itemset::from_items([a, b]).unwrap()).unwrap();
                admitted += 1;
            }
        }
        assert_eq!(collection.len(), MAX_COLLECTION_LEN);

        // re-inserting an existing member is still fine at capacity
        assert!(!collection.insert(Itemset::from_items([1, 2]).unwrap()).unwrap());

        let extra = Itemset::from_items([1 as Item, 2, 3]).unwrap();
        let err = collection.insert(extra).unwrap_err();
        assert!(err.is_capacity_exceeded());
        assert_eq!(collection.len(), MAX_COLLECTION_LEN);
    }

    #[test]
    fn level_filters_by_length() {
        let mut collection = ItemsetCollection::new();
        for items in ["a", "ab", "b", "bc", "abc"] {
            collection.insert(set(items)).unwrap();
        }
        let level = collection.level(2);
        assert_eq!(level.as_slice(), &[set("ab"), set("bc")]);
        assert_eq!(collection.max_len(), 3);
        assert_eq!(ItemsetCollection::new().max_len(), 0);
    }

    #[test]
    fn extend_from_dedups() {
        let mut a = ItemsetCollection::new();
        a.insert(set("a").with_support(3)).unwrap();
        let mut b = ItemsetCollection::new();
        b.insert(set("a").with_support(3)).unwrap();
        b.insert(set("b").with_support(2)).unwrap();

        a.extend_from(&b).unwrap();
        assert_eq!(a.len(), 2);
        assert_eq!(a.support_of(&set("b")), Some(2));
    }
}
