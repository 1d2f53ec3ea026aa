use crate::runtime::gc_limits::ROOT_STACK_MAX;
use crate::{GcError, GcResult, ObjectRef};

/// Bounded LIFO stack of roots.
///
/// Entries are non-owning; the runtime validates every handle before it is
/// pushed, so each entry always names an object that is still in the heap.
#[derive(Debug, Clone)]
pub struct RootStack {
    entries: Vec<ObjectRef>,
    capacity: usize,
}

impl RootStack {
    pub fn new(capacity: usize) -> Self {
        Self {
            // the configured capacity is only a bound, reserve at most the default depth
            entries: Vec::with_capacity(capacity.min(ROOT_STACK_MAX)),
            capacity,
        }
    }

    #[inline]
    pub fn push(&mut self, obj: ObjectRef) -> GcResult<()> {
        if self.entries.len() >= self.capacity {
            return Err(GcError::StackOverflow {
                capacity: self.capacity,
            });
        }
        self.entries.push(obj);
        Ok(())
    }

    #[inline]
    pub fn pop(&mut self) -> GcResult<ObjectRef> {
        self.entries.pop().ok_or(GcError::StackUnderflow)
    }

    #[inline]
    pub fn peek(&self) -> Option<ObjectRef> {
        self.entries.last().copied()
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop entries above `depth`; no-op when the stack is already that shallow
    pub fn truncate(&mut self, depth: usize) {
        self.entries.truncate(depth);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn as_slice(&self) -> &[ObjectRef] {
        &self.entries
    }
}
