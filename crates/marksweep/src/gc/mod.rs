// Garbage Collector
//
// Stop-the-world mark-sweep over the intrusive heap list.
//
// A cycle runs in two phases, always to completion:
// - Mark: every root stack entry seeds an explicit worklist; objects are
//   marked and their references pushed until the worklist drains. The mark
//   bit is the only cycle guard, so cyclic graphs terminate and deep graphs
//   never touch the native call stack.
// - Sweep: one pass over the heap list with a splicing cursor. Unmarked
//   objects are unlinked and finalized, marked ones are reset for the next
//   cycle.
//
// Invariant between cycles: no object in the heap is marked.

mod gc_id;
mod gc_object;
mod heap;

pub use gc_id::*;
pub use gc_object::*;
pub use heap::*;

use crate::runtime::gc_limits::WORKLIST_INITIAL_CAPACITY;

/// Outcome of one collection cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CollectionReport {
    /// Objects reclaimed by the sweep
    pub collected: usize,
    /// Objects still linked into the heap afterwards
    pub remaining: usize,
}

impl std::fmt::Display for CollectionReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Collected {} objects, {} remaining.",
            self.collected, self.remaining
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct GcStats {
    pub collection_count: usize,
    /// Collections started by the allocation threshold rather than explicitly
    pub triggered_collections: usize,
    pub objects_allocated: usize,
    pub objects_collected: usize,
    pub peak_live: usize,
}

/// Mark-sweep engine. Holds only the reusable worklist; the heap and the
/// roots are borrowed for the duration of a cycle.
pub struct Collector {
    worklist: Vec<ObjectRef>,
}

impl Collector {
    pub fn new() -> Self {
        Self {
            worklist: Vec::with_capacity(WORKLIST_INITIAL_CAPACITY),
        }
    }

    /// Run a full cycle against the given root set
    pub fn collect(&mut self, heap: &mut Heap, roots: &[ObjectRef]) -> CollectionReport {
        let before = heap.live_count();

        let marked = self.mark(heap, roots);
        log::trace!("mark: {} of {} objects reachable", marked, before);

        let collected = self.sweep(heap);

        let report = CollectionReport {
            collected,
            remaining: heap.live_count(),
        };
        debug_assert_eq!(before, report.collected + report.remaining);
        log::info!("{}", report);
        report
    }

    /// Mark phase. Returns the number of objects newly marked.
    pub fn mark(&mut self, heap: &mut Heap, roots: &[ObjectRef]) -> usize {
        self.worklist.clear();
        self.worklist.extend_from_slice(roots);

        let mut marked = 0;
        while let Some(obj) = self.worklist.pop() {
            let Some(object) = heap.get_mut(obj) else {
                // roots and edges are validated on entry
                log::warn!("mark: skipping stale handle {}", obj);
                continue;
            };

            if object.header.is_marked() {
                continue;
            }
            object.header.mark();
            marked += 1;

            self.worklist.extend_from_slice(&object.refs);
        }

        marked
    }

    /// Sweep phase. Returns the number of objects reclaimed.
    pub fn sweep(&mut self, heap: &mut Heap) -> usize {
        let mut collected = 0;
        let mut prev: Option<u32> = None;
        let mut cursor = heap.head();

        while let Some(index) = cursor {
            let Some(object) = heap.at_mut(index) else {
                break;
            };
            let next = object.header.next;

            if object.header.is_marked() {
                // Survivor: reset for the next cycle and step past it
                object.header.unmark();
                prev = Some(index);
            } else if let Some(unreached) = heap.release(prev, index) {
                log::trace!("sweep: freeing slot {}", index);
                unreached.payload.finalize();
                collected += 1;
            }

            cursor = next;
        }

        collected
    }
}

impl Default for Collector {
    fn default() -> Self {
        Self::new()
    }
}
