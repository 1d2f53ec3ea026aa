// ============ Object References ============
// Handles are u32 slot indices plus a generation tag, so a handle that
// outlives its object is detected instead of aliasing the slot's next tenant.

/// Non-owning handle to an object living in a [`Heap`](crate::gc::Heap).
///
/// Handles are plain `Copy` values; holding one does not keep the object
/// alive. Only the root stack and references from other reachable objects do.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ObjectRef {
    index: u32,
    generation: u32,
}

impl ObjectRef {
    #[inline(always)]
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index inside the heap storage
    #[inline(always)]
    pub fn index(self) -> u32 {
        self.index
    }

    /// Generation of the slot at the time this handle was issued
    #[inline(always)]
    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl std::fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "object#{}@{}", self.index, self.generation)
    }
}
