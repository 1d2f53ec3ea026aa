// ============ GC Object ============

use std::any::Any;

use crate::ObjectRef;

/// Finalizer attached to a payload, called once right before the payload is dropped
pub type Finalizer = Box<dyn FnOnce(&mut dyn Any)>;

/// Owned, type-erased object payload
///
/// The collector never looks inside a payload: data stored here does not
/// keep any other object alive. Use [`Runtime::add_reference`] to express
/// object-to-object reachability.
///
/// [`Runtime::add_reference`]: crate::Runtime::add_reference
pub struct Payload {
    value: Box<dyn Any>,
    finalizer: Option<Finalizer>,
}

impl Payload {
    pub fn new<T: Any>(value: T) -> Self {
        Self {
            value: Box::new(value),
            finalizer: None,
        }
    }

    /// Payload carrying no data, for objects that only exist to hold references
    pub fn empty() -> Self {
        Self::new(())
    }

    /// Attach a finalizer that receives the value when the owning object is swept
    pub fn with_finalizer<T: Any>(value: T, finalizer: impl FnOnce(&mut T) + 'static) -> Self {
        Self {
            value: Box::new(value),
            finalizer: Some(Box::new(move |any: &mut dyn Any| {
                if let Some(value) = any.downcast_mut::<T>() {
                    finalizer(value);
                }
            })),
        }
    }

    #[inline]
    pub fn is<T: Any>(&self) -> bool {
        self.value.is::<T>()
    }

    #[inline]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    #[inline]
    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.value.downcast_mut::<T>()
    }

    pub fn has_finalizer(&self) -> bool {
        self.finalizer.is_some()
    }

    /// Run the finalizer (if any) and drop the value
    pub(crate) fn finalize(mut self) {
        self.run_finalizer();
    }

    fn run_finalizer(&mut self) {
        if let Some(finalizer) = self.finalizer.take() {
            finalizer(self.value.as_mut());
        }
    }
}

/// A payload dropped outside a sweep (replaced through `payload_mut`, or
/// refused by a full heap) still gets its finalizer exactly once.
impl Drop for Payload {
    fn drop(&mut self) {
        self.run_finalizer();
    }
}

impl std::fmt::Debug for Payload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Payload")
            .field("type_id", &(*self.value).type_id())
            .field("has_finalizer", &self.finalizer.is_some())
            .finish()
    }
}

/// GC object header - reachability flag plus the intrusive heap link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GcHeader {
    /// Set during mark, cleared again by sweep for survivors
    pub marked: bool,
    /// Slot index of the next object in the heap list
    pub next: Option<u32>,
}

impl GcHeader {
    #[inline(always)]
    pub fn is_marked(&self) -> bool {
        self.marked
    }

    #[inline(always)]
    pub fn mark(&mut self) {
        self.marked = true;
    }

    #[inline(always)]
    pub fn unmark(&mut self) {
        self.marked = false;
    }
}

/// A heap node: header, outgoing references and the owned payload
#[derive(Debug)]
pub struct GcObject {
    pub header: GcHeader,
    /// Non-owning edges followed by the mark phase
    pub(crate) refs: Vec<ObjectRef>,
    pub(crate) payload: Payload,
}

impl GcObject {
    pub(crate) fn new(payload: Payload, next: Option<u32>) -> Self {
        Self {
            header: GcHeader {
                marked: false,
                next,
            },
            refs: Vec::new(),
            payload,
        }
    }

    #[inline]
    pub fn is_marked(&self) -> bool {
        self.header.is_marked()
    }

    #[inline]
    pub fn references(&self) -> &[ObjectRef] {
        &self.refs
    }

    #[inline]
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    #[inline]
    pub fn payload_mut(&mut self) -> &mut Payload {
        &mut self.payload
    }
}
