use crate::TrackId;
use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic track id allocator shared by all cameras of a run.
///
/// Ids start at 1 and are never reused. Allocation is atomic, so the allocator may be shared
/// between threads, however ids are only deterministic when allocations happen in a fixed order.
///
#[derive(Debug)]
pub struct TrackIdAllocator {
    next: AtomicU64,
}

impl Default for TrackIdAllocator {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

impl TrackIdAllocator {
    pub fn starting_at(first: TrackId) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }

    pub fn allocate(&self) -> TrackId {
        self.next.fetch_add(1, Ordering::Relaxed)
    }

    /// The id the next allocation returns
    ///
    pub fn peek(&self) -> TrackId {
        self.next.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use crate::track::id_allocator::TrackIdAllocator;
    use rayon::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn sequential() {
        let ids = TrackIdAllocator::default();
        assert_eq!(ids.allocate(), 1);
        assert_eq!(ids.allocate(), 2);
        assert_eq!(ids.peek(), 3);
    }

    #[test]
    fn concurrent_allocations_are_unique() {
        let ids = TrackIdAllocator::default();
        let allocated = (0..10_000)
            .into_par_iter()
            .map(|_| ids.allocate())
            .collect::<HashSet<_>>();
        assert_eq!(allocated.len(), 10_000);
        assert_eq!(ids.peek(), 10_001);
    }
}
