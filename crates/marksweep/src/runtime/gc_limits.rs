//! Centralized collector limits and default tuning constants.
//!
//! All magic numbers that control rooting and scheduling are collected here
//! so `GcOption::default()` and the CLI agree on them.

// ===== Root Stack =====

/// Maximum depth of the root stack.
pub const ROOT_STACK_MAX: usize = 256;

// ===== Heap =====

/// Slot indices are u32, so the heap can never hold more slots than this.
pub const MAX_HEAP_SLOTS: usize = u32::MAX as usize;

/// Upper bound on the slots reserved up front from `initial_threshold`.
pub const HEAP_PREALLOC_MAX: usize = 1024;

// ===== Scheduling =====

/// Live object count that triggers the first collection.
pub const DEFAULT_GC_THRESHOLD: usize = 8;

/// Threshold multiplier applied to the survivor count after each collection.
/// 2 = let the heap double before the next cycle.
pub const DEFAULT_GC_GROWTH: usize = 2;

/// Lower bound for the recomputed threshold. Keeps a heap emptied by a
/// collection from collecting again on every single allocation.
pub const DEFAULT_GC_MIN_THRESHOLD: usize = 8;

/// Default cap on live objects (unbounded).
pub const DEFAULT_MAX_OBJECTS: usize = usize::MAX;

// ===== Mark Phase =====

/// Initial worklist capacity; the worklist grows with the widest frontier seen.
pub const WORKLIST_INITIAL_CAPACITY: usize = 64;
