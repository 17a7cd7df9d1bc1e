use std::sync::atomic::{AtomicU64, Ordering};

use super::CachePadded;

/// Lock-free bucket counter on its own cache line.
///
/// All operations are `Relaxed`: counters are only read after the writers
/// have been joined, and the join provides the happens-before edge.
#[derive(Debug, Default)]
pub struct AtomicCounter(CachePadded<AtomicU64>);

impl AtomicCounter {
    pub const fn new(value: u64) -> Self {
        Self(CachePadded::new(AtomicU64::new(value)))
    }

    pub fn add(&self, n: u64) {
        self.0.fetch_add(n, Ordering::Relaxed);
    }

    pub fn load(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    pub fn into_inner(self) -> u64 {
        self.0.into_inner().into_inner()
    }
}
