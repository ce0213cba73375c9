use std::ops::Range;

/// Lazy triangular enumeration of unordered pairs `(s, t)` with `s` before
/// `t`, optionally restricted to a range of outer indices `s`.
pub struct UnorderedPairs<'a, T> {
    items: &'a [T],
    outer: usize,
    outer_end: usize,
    inner: usize,
}

impl<'a, T> UnorderedPairs<'a, T> {
    pub fn new(items: &'a [T]) -> Self {
        UnorderedPairs::over_outer(items, 0..items.len())
    }

    /// Only pairs whose first element's index lies in `outer`.
    pub fn over_outer(items: &'a [T], outer: Range<usize>) -> Self {
        let outer_end = outer.end.min(items.len());
        UnorderedPairs {
            items,
            outer: outer.start,
            outer_end,
            inner: outer.start + 1,
        }
    }
}

impl<'a, T> Iterator for UnorderedPairs<'a, T> {
    type Item = (&'a T, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        while self.outer < self.outer_end {
            if self.inner < self.items.len() {
                let pair = (&self.items[self.outer], &self.items[self.inner]);
                self.inner += 1;
                return Some(pair);
            }
            self.outer += 1;
            self.inner = self.outer + 1;
        }
        None
    }
}

/// Split `0..len` into contiguous ranges of at most `chunk` indices.
pub fn chunk_ranges(len: usize, chunk: usize) -> Vec<Range<usize>> {
    let chunk = chunk.max(1);
    (0..len)
        .step_by(chunk)
        .map(|start| start..(start + chunk).min(len))
        .collect()
}
