use crate::runtime::gc_limits::{
    DEFAULT_GC_GROWTH, DEFAULT_GC_MIN_THRESHOLD, DEFAULT_GC_THRESHOLD, DEFAULT_MAX_OBJECTS,
    ROOT_STACK_MAX,
};
use crate::{GcError, GcResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GcOption {
    /// Maximum number of entries on the root stack
    pub stack_capacity: usize,
    /// Threshold in effect before the first collection
    pub initial_threshold: usize,
    /// After a collection: threshold = live * growth_factor
    pub growth_factor: usize,
    /// Floor for the recomputed threshold
    pub min_threshold: usize,
    /// Hard cap on live objects; allocation fails once a collection cannot get below it
    pub max_objects: usize,
}

impl Default for GcOption {
    fn default() -> Self {
        Self {
            stack_capacity: ROOT_STACK_MAX,
            initial_threshold: DEFAULT_GC_THRESHOLD,
            growth_factor: DEFAULT_GC_GROWTH,
            min_threshold: DEFAULT_GC_MIN_THRESHOLD,
            max_objects: DEFAULT_MAX_OBJECTS,
        }
    }
}

impl GcOption {
    pub fn validate(&self) -> GcResult<()> {
        if self.stack_capacity == 0 {
            return Err(GcError::InvalidOption("stack_capacity must be positive"));
        }
        if self.initial_threshold == 0 {
            return Err(GcError::InvalidOption("initial_threshold must be positive"));
        }
        if self.min_threshold == 0 {
            return Err(GcError::InvalidOption("min_threshold must be positive"));
        }
        if self.growth_factor == 0 {
            return Err(GcError::InvalidOption("growth_factor must be positive"));
        }
        if self.max_objects == 0 {
            return Err(GcError::InvalidOption("max_objects must be positive"));
        }
        Ok(())
    }

    /// Threshold to use after a collection left `live` objects behind
    #[inline]
    pub fn next_threshold(&self, live: usize) -> usize {
        live.saturating_mul(self.growth_factor).max(self.min_threshold)
    }
}
