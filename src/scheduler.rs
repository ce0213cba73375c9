//! Batch-and-join scheduling over a fixed-size worker pool.
//!
//! Units of work are dispatched `width` at a time. The coordinator blocks
//! until the whole batch has finished, then folds the batch's results into
//! shared state on its own thread before the next batch starts. Workers only
//! ever write to private results or to disjoint slots.

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::debug;

use crate::error::Result;

pub struct BatchScheduler {
    pool: ThreadPool,
    batch_size: usize,
}

impl BatchScheduler {
    pub fn new(batch_size: usize) -> Result<Self> {
        let batch_size = batch_size.max(1);
        let pool = ThreadPoolBuilder::new()
            .num_threads(batch_size)
            .thread_name(|i| format!("apriori-worker-{}", i))
            .build()?;
        Ok(BatchScheduler { pool, batch_size })
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Run `work` over every unit, a batch at a time. After each batch joins,
    /// `merge` sees the batch's results in unit order.
    pub fn run<U, R, W, M>(&self, units: &[U], work: W, mut merge: M) -> Result<()>
    where
        U: Sync,
        R: Send,
        W: Fn(&U) -> R + Sync,
        M: FnMut(R) -> Result<()>,
    {
        for (batch, chunk) in units.chunks(self.batch_size).enumerate() {
            let results: Vec<R> = self
                .pool
                .install(|| chunk.par_iter().map(|unit| work(unit)).collect());
            debug!(batch, units = chunk.len(), "batch joined");

            for result in results {
                merge(result)?;
            }
        }
        Ok(())
    }

    /// Fill pre-reserved slots, at most `width` at a time. `work` receives the
    /// slot's sequence index and writes only into that slot.
    pub fn fill_slots<T, W>(&self, slots: &mut [T], width: usize, work: W) -> Result<()>
    where
        T: Send,
        W: Fn(usize, &mut T) -> Result<()> + Sync,
    {
        let width = width.clamp(1, self.batch_size);
        for (batch, chunk) in slots.chunks_mut(width).enumerate() {
            let base = batch * width;
            self.pool.install(|| {
                chunk
                    .par_iter_mut()
                    .enumerate()
                    .try_for_each(|(offset, slot)| work(base + offset, slot))
            })?;
            debug!(batch, slots = chunk.len(), "slot batch joined");
        }
        Ok(())
    }
}
