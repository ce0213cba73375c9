//! Canonical itemset representation.
//!
//! An [`Itemset`] is a fixed-capacity buffer of strictly increasing items. All
//! set operations below rely on that ordering and walk both operands once.

use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};
use std::hash::{Hash, Hasher};

use crate::error::{Buffer, MiningError, Result, Stage};
use crate::types::{Item, SupportCount, MAX_ITEMSET_LEN};

#[derive(Debug, Clone, Copy)]
pub struct Itemset {
    items: [Item; MAX_ITEMSET_LEN],
    len: usize,
    support: SupportCount,
}

impl Itemset {
    pub fn new() -> Self {
        Itemset {
            items: [0; MAX_ITEMSET_LEN],
            len: 0,
            support: 0,
        }
    }

    /// Build an itemset from items in any order. Repeated items collapse.
    pub fn from_items<I>(items: I) -> Result<Self>
    where
        I: IntoIterator<Item = Item>,
    {
        let mut itemset = Itemset::new();
        for item in items {
            itemset.insert_sorted(item)?;
        }
        Ok(itemset)
    }

    pub fn singleton(item: Item) -> Self {
        let mut itemset = Itemset::new();
        itemset.items[0] = item;
        itemset.len = 1;
        itemset
    }

    pub fn items(&self) -> &[Item] {
        &self.items[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn support(&self) -> SupportCount {
        self.support
    }

    pub fn with_support(mut self, support: SupportCount) -> Self {
        self.support = support;
        self
    }

    pub fn contains(&self, item: Item) -> bool {
        self.items().binary_search(&item).is_ok()
    }

    /// Insert `item` keeping the buffer sorted, shifting larger items right.
    pub fn insert_sorted(&mut self, item: Item) -> Result<()> {
        let pos = match self.items().binary_search(&item) {
            Ok(_) => return Ok(()),
            Err(pos) => pos,
        };
        if self.len == MAX_ITEMSET_LEN {
            return Err(MiningError::capacity(Stage::Load, Buffer::Items, MAX_ITEMSET_LEN)
                .at(Stage::Load, *self));
        }
        self.items.copy_within(pos..self.len, pos + 1);
        self.items[pos] = item;
        self.len += 1;
        Ok(())
    }

    /// The itemset with the item at `index` left out.
    pub fn without(&self, index: usize) -> Itemset {
        let mut subset = Itemset::new();
        for (i, &item) in self.items().iter().enumerate() {
            if i != index {
                subset.items[subset.len] = item;
                subset.len += 1;
            }
        }
        subset
    }

    /// Items of `self` that are not in `other`.
    pub fn difference(&self, other: &Itemset) -> Itemset {
        let mut rest = Itemset::new();
        let (a, b) = (self.items(), other.items());
        let (mut i, mut j) = (0, 0);
        while i < a.len() {
            if j == b.len() || a[i] < b[j] {
                rest.items[rest.len] = a[i];
                rest.len += 1;
                i += 1;
            } else if a[i] > b[j] {
                j += 1;
            } else {
                i += 1;
                j += 1;
            }
        }
        rest
    }

    /// All leave-one-out subsets, omission positions taken from last to first.
    pub fn leave_one_out(&self) -> impl Iterator<Item = Itemset> + '_ {
        (0..self.len).rev().map(move |index| self.without(index))
    }
}

impl Default for Itemset {
    fn default() -> Self {
        Itemset::new()
    }
}

/// Shorter itemsets first, then lexicographic by content.
pub fn compare(a: &Itemset, b: &Itemset) -> Ordering {
    a.len
        .cmp(&b.len)
        .then_with(|| a.items().cmp(b.items()))
}

/// Number of items present in both `a` and `b`.
pub fn match_count(a: &Itemset, b: &Itemset) -> usize {
    let (a, b) = (a.items(), b.items());
    let (mut i, mut j, mut count) = (0, 0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                count += 1;
                i += 1;
                j += 1;
            }
        }
    }
    count
}

/// True iff every item of `small` occurs in `large`.
pub fn is_subset(large: &Itemset, small: &Itemset) -> bool {
    small.len <= large.len && match_count(large, small) == small.len
}

pub fn is_equal(a: &Itemset, b: &Itemset) -> bool {
    a.len == b.len && match_count(a, b) == a.len
}

/// Sorted union of two itemsets that share all but one item.
pub fn merge(a: &Itemset, b: &Itemset) -> Result<Itemset> {
    debug_assert_eq!(a.len, b.len);
    debug_assert_eq!(match_count(a, b) + 1, a.len);

    let mut union = Itemset::new();
    let (x, y) = (a.items(), b.items());
    let (mut i, mut j) = (0, 0);
    while i < x.len() || j < y.len() {
        let next = if j == y.len() || (i < x.len() && x[i] < y[j]) {
            i += 1;
            x[i - 1]
        } else if i == x.len() || y[j] < x[i] {
            j += 1;
            y[j - 1]
        } else {
            i += 1;
            j += 1;
            x[i - 1]
        };
        if union.len == MAX_ITEMSET_LEN {
            return Err(MiningError::capacity(Stage::Join, Buffer::Items, MAX_ITEMSET_LEN)
                .at(Stage::Join, format!("{} + {}", a, b)));
        }
        union.items[union.len] = next;
        union.len += 1;
    }
    Ok(union)
}

impl PartialEq for Itemset {
    fn eq(&self, other: &Itemset) -> bool {
        is_equal(self, other)
    }
}

impl Eq for Itemset {}

impl Hash for Itemset {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.items().hash(state);
    }
}

impl PartialOrd for Itemset {
    fn partial_cmp(&self, other: &Itemset) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Itemset {
    fn cmp(&self, other: &Itemset) -> Ordering {
        compare(self, other)
    }
}

impl Display for Itemset {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, &item) in self.items().iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            if item.is_ascii_graphic() {
                write!(f, "{}", item as char)?;
            } else {
                write!(f, "#{}", item)?;
            }
        }
        f.write_str("}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    fn set(items: &str) -> Itemset {
        Itemset::from_items(items.bytes()).unwrap()
    }

    #[test]
    fn insert_sorted_keeps_order() {
        let itemset = set("dbca");
        assert_eq!(itemset.items(), b"abcd");
        assert_eq!(itemset.len(), 4);
        assert_eq!(itemset.support(), 0);
    }

    #[test]
    fn insert_existing_item_is_noop() {
        let mut itemset = set("ab");
        itemset.insert_sorted(b'a').unwrap();
        assert_eq!(itemset.items(), b"ab");
    }

    #[test]
    fn eleventh_item_exceeds_capacity() {
        let mut itemset = set("abcdefghij");
        assert_eq!(itemset.len(), MAX_ITEMSET_LEN);

        let err = itemset.insert_sorted(b'k').unwrap_err();
        assert!(err.is_capacity_exceeded());
        assert_eq!(itemset.len(), MAX_ITEMSET_LEN);
    }

    #[test]
    fn compare_orders_by_length_then_content() {
        assert_eq!(compare(&set("z"), &set("ab")), Ordering::Less);
        assert_eq!(compare(&set("ab"), &set("ac")), Ordering::Less);
        assert_eq!(compare(&set("bc"), &set("bc")), Ordering::Equal);
    }

    #[test]
    fn test_match_count() {
        assert_eq!(match_count(&set("abc"), &set("bcd")), 2);
        assert_eq!(match_count(&set("a"), &set("b")), 0);
        assert_eq!(match_count(&set(""), &set("abc")), 0);
    }

    #[test]
    fn test_is_subset() {
        assert!(is_subset(&set("abc"), &set("ac")));
        assert!(is_subset(&set("abc"), &set("")));
        assert!(!is_subset(&set("abc"), &set("ad")));
        assert!(!is_subset(&set("ab"), &set("abc")));
    }

    #[test]
    fn equality_ignores_support() {
        assert_eq!(set("ab").with_support(3), set("ab"));
        assert_ne!(set("ab"), set("abc"));
    }

    #[test]
    fn test_merge() {
        let merged = merge(&set("abd"), &set("abe")).unwrap();
        assert_eq!(merged.items(), b"abde");

        let merged = merge(&set("b"), &set("a")).unwrap();
        assert_eq!(merged.items(), b"ab");
    }

    #[test]
    fn merge_beyond_capacity_fails() {
        let err = merge(&set("abcdefghij"), &set("abcdefghik")).unwrap_err();
        assert!(err.is_capacity_exceeded());
    }

    #[test]
    fn test_leave_one_out_from_last() {
        let subsets: Vec<Itemset> = set("abc").leave_one_out().collect();
        assert_eq!(subsets, vec![set("ab"), set("ac"), set("bc")]);
    }

    #[test]
    fn test_difference() {
        assert_eq!(set("abcd").difference(&set("bd")), set("ac"));
        assert_eq!(set("ab").difference(&set("ab")), set(""));
    }

    #[test]
    fn test_display() {
        assert_eq!(set("ba").to_string(), "{a, b}");
        assert_eq!(Itemset::singleton(1).to_string(), "{#1}");
    }

    fn items() -> impl Strategy<Value = BTreeSet<u8>> {
        prop::collection::btree_set(b'a'..b'q', 0..MAX_ITEMSET_LEN)
    }

    proptest! {
        #[test]
        fn match_count_is_intersection_size(a in items(), b in items()) {
            let x = Itemset::from_items(a.iter().copied()).unwrap();
            let y = Itemset::from_items(b.iter().copied()).unwrap();
            prop_assert_eq!(match_count(&x, &y), a.intersection(&b).count());
            prop_assert_eq!(match_count(&y, &x), match_count(&x, &y));
        }

        #[test]
        fn is_subset_agrees_with_btreeset(a in items(), b in items()) {
            let x = Itemset::from_items(a.iter().copied()).unwrap();
            let y = Itemset::from_items(b.iter().copied()).unwrap();
            prop_assert_eq!(is_subset(&x, &y), b.is_subset(&a));
        }

        #[test]
        fn items_are_strictly_increasing(a in prop::collection::vec(b'a'..b'q', 0..MAX_ITEMSET_LEN)) {
            let x = Itemset::from_items(a.iter().copied()).unwrap();
            prop_assert!(x.items().windows(2).all(|w| w[0] < w[1]));
        }
    }
}
