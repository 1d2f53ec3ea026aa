//! Runtime context - sole owner of the heap, the root stack and the
//! scheduling state.
//!
//! Rooting discipline for embedders: an object that must survive a later
//! allocation has to be on the root stack (or referenced from something
//! that is) before that allocation happens, because any allocation may run
//! a collection first. Pop it once the host no longer needs it. To unwind a
//! host scope, save [`Runtime::depth`] on entry and [`Runtime::truncate`]
//! back to it on exit.

mod gc_error;
pub mod gc_limits;
mod gc_option;
mod root_stack;

pub use gc_error::{GcError, GcResult};
pub use gc_option::GcOption;
pub use root_stack::RootStack;

use std::any::Any;

use ahash::AHashSet;

use self::gc_limits::HEAP_PREALLOC_MAX;
use crate::{CollectionReport, Collector, GcObject, GcStats, Heap, ObjectRef, Payload};

pub struct Runtime {
    heap: Heap,
    roots: RootStack,
    collector: Collector,
    /// Live count at or above which the next allocation collects first
    threshold: usize,
    option: GcOption,
    stats: GcStats,
}

impl Runtime {
    /// Create a runtime with validated options
    pub fn new(option: GcOption) -> GcResult<Self> {
        option.validate()?;
        Ok(Self::build(option))
    }

    fn build(option: GcOption) -> Self {
        Runtime {
            heap: Heap::with_capacity(option.initial_threshold.min(HEAP_PREALLOC_MAX)),
            roots: RootStack::new(option.stack_capacity),
            collector: Collector::new(),
            threshold: option.initial_threshold,
            option,
            stats: GcStats::default(),
        }
    }

    // ===== Allocation =====

    /// Allocate a new object owning `payload`.
    ///
    /// May run a full collection before linking the object: when the live
    /// count reached the threshold, or reached `max_objects` (then failing
    /// with `HeapLimitExceeded` if the collection freed nothing). The new
    /// object is not rooted: push it before the next allocation if it must
    /// survive.
    pub fn allocate(&mut self, payload: Payload) -> GcResult<ObjectRef> {
        let live = self.heap.live_count();
        if live >= self.threshold || live >= self.option.max_objects {
            log::debug!(
                "allocation triggered collection: {} live, threshold {}",
                live,
                self.threshold
            );
            self.stats.triggered_collections += 1;
            self.collect();
        }

        if self.heap.live_count() >= self.option.max_objects {
            return Err(GcError::HeapLimitExceeded {
                limit: self.option.max_objects,
            });
        }

        let Some(obj) = self.heap.link(payload) else {
            return Err(GcError::HeapLimitExceeded {
                limit: self.heap.slot_limit(),
            });
        };
        self.stats.objects_allocated += 1;
        self.stats.peak_live = self.stats.peak_live.max(self.heap.live_count());
        Ok(obj)
    }

    /// Allocate an object owning a plain value
    #[inline]
    pub fn allocate_value<T: Any>(&mut self, value: T) -> GcResult<ObjectRef> {
        self.allocate(Payload::new(value))
    }

    // ===== Root Stack Operations =====

    pub fn push(&mut self, obj: ObjectRef) -> GcResult<()> {
        self.check_live(obj)?;
        self.roots.push(obj)
    }

    pub fn pop(&mut self) -> GcResult<ObjectRef> {
        self.roots.pop()
    }

    #[inline]
    pub fn peek(&self) -> Option<ObjectRef> {
        self.roots.peek()
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.roots.depth()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.roots.capacity()
    }

    /// Unwind the root stack to a previously saved depth
    pub fn truncate(&mut self, depth: usize) {
        self.roots.truncate(depth);
    }

    pub fn roots(&self) -> &[ObjectRef] {
        self.roots.as_slice()
    }

    // ===== Collection =====

    /// Run a full mark-sweep cycle and reschedule the next one
    pub fn collect(&mut self) -> CollectionReport {
        let report = self.collector.collect(&mut self.heap, self.roots.as_slice());

        self.threshold = self.option.next_threshold(report.remaining);
        log::debug!("next collection at {} live objects", self.threshold);

        self.stats.collection_count += 1;
        self.stats.objects_collected += report.collected;
        report
    }

    /// Tear the runtime down: drop every root and collect, which reclaims
    /// (and finalizes) every remaining object.
    pub fn destroy(mut self) -> CollectionReport {
        self.shutdown()
    }

    fn shutdown(&mut self) -> CollectionReport {
        self.roots.clear();
        self.collect()
    }

    // ===== Object Graph =====

    /// Record that `from` references `to`; `to` stays alive as long as `from` is reachable
    pub fn add_reference(&mut self, from: ObjectRef, to: ObjectRef) -> GcResult<()> {
        self.check_live(to)?;
        self.object_mut(from)?.refs.push(to);
        Ok(())
    }

    /// Remove one `from -> to` edge. Returns false when no such edge existed.
    pub fn remove_reference(&mut self, from: ObjectRef, to: ObjectRef) -> GcResult<bool> {
        let refs = &mut self.object_mut(from)?.refs;
        match refs.iter().position(|r| *r == to) {
            Some(pos) => {
                refs.swap_remove(pos);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn clear_references(&mut self, from: ObjectRef) -> GcResult<()> {
        self.object_mut(from)?.refs.clear();
        Ok(())
    }

    pub fn references(&self, obj: ObjectRef) -> GcResult<&[ObjectRef]> {
        Ok(self.object(obj)?.references())
    }

    // ===== Payload Access =====

    pub fn payload(&self, obj: ObjectRef) -> GcResult<&Payload> {
        Ok(self.object(obj)?.payload())
    }

    /// Mutable payload access. Replacing the whole payload drops the old one,
    /// which runs its finalizer right away.
    pub fn payload_mut(&mut self, obj: ObjectRef) -> GcResult<&mut Payload> {
        Ok(self.object_mut(obj)?.payload_mut())
    }

    /// Typed view of a payload; `Ok(None)` when the payload holds another type
    pub fn get<T: Any>(&self, obj: ObjectRef) -> GcResult<Option<&T>> {
        Ok(self.payload(obj)?.downcast_ref::<T>())
    }

    pub fn get_mut<T: Any>(&mut self, obj: ObjectRef) -> GcResult<Option<&mut T>> {
        Ok(self.payload_mut(obj)?.downcast_mut::<T>())
    }

    // ===== Introspection =====

    #[inline]
    pub fn is_live(&self, obj: ObjectRef) -> bool {
        self.heap.contains(obj)
    }

    #[inline]
    pub fn live_count(&self) -> usize {
        self.heap.live_count()
    }

    #[inline]
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    pub fn option(&self) -> &GcOption {
        &self.option
    }

    pub fn stats(&self) -> &GcStats {
        &self.stats
    }

    /// Check the structural invariants of the heap and the root stack.
    ///
    /// Walks the heap list once with a visited set, so it is O(n) in space;
    /// meant for tests and debugging, never called by the collector.
    pub fn verify_heap(&self) -> GcResult<()> {
        let mut visited: AHashSet<u32> = AHashSet::with_capacity(self.heap.live_count());
        let mut cursor = self.heap.head();

        while let Some(index) = cursor {
            if !visited.insert(index) {
                return Err(GcError::HeapCorrupted(format!("slot {} linked twice", index)));
            }
            let obj = self.heap.ref_at(index).ok_or_else(|| {
                GcError::HeapCorrupted(format!("list links vacant slot {}", index))
            })?;
            let object = self.object(obj)?;

            if object.is_marked() {
                return Err(GcError::HeapCorrupted(format!(
                    "{} still marked outside a collection",
                    obj
                )));
            }
            if let Some(dangling) = object.refs.iter().find(|r| !self.heap.contains(**r)) {
                return Err(GcError::HeapCorrupted(format!(
                    "{} references reclaimed {}",
                    obj, dangling
                )));
            }
            cursor = object.header.next;
        }

        if visited.len() != self.heap.live_count() {
            return Err(GcError::HeapCorrupted(format!(
                "live count {} but {} objects linked",
                self.heap.live_count(),
                visited.len()
            )));
        }
        if let Some(index) = self
            .heap
            .free_slots()
            .iter()
            .find(|index| !self.heap.slot_is_vacant(**index))
        {
            return Err(GcError::HeapCorrupted(format!(
                "free slot {} is occupied",
                index
            )));
        }
        if visited.len() + self.heap.free_slots().len() != self.heap.slot_count() {
            return Err(GcError::HeapCorrupted("slot leaked from both list and free list".into()));
        }
        if let Some(root) = self.roots.as_slice().iter().find(|r| !self.heap.contains(**r)) {
            return Err(GcError::HeapCorrupted(format!(
                "root stack holds reclaimed {}",
                root
            )));
        }
        if self.threshold == 0 {
            return Err(GcError::HeapCorrupted("threshold dropped to zero".into()));
        }
        Ok(())
    }

    // ===== Helpers =====

    #[inline]
    fn check_live(&self, obj: ObjectRef) -> GcResult<()> {
        if self.heap.contains(obj) {
            Ok(())
        } else {
            Err(GcError::StaleReference(obj))
        }
    }

    #[inline]
    fn object(&self, obj: ObjectRef) -> GcResult<&GcObject> {
        self.heap.get(obj).ok_or(GcError::StaleReference(obj))
    }

    #[inline]
    fn object_mut(&mut self, obj: ObjectRef) -> GcResult<&mut GcObject> {
        self.heap.get_mut(obj).ok_or(GcError::StaleReference(obj))
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::build(GcOption::default())
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        // destroy() already emptied the heap; only finalize what is left
        if !self.heap.is_empty() {
            self.shutdown();
        }
    }
}
