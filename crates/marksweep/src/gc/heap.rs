// Heap - intrusive singly-linked list of every live object
//
// Key Design Principles:
// 1. Objects live in Vec slots addressed by u32 index
// 2. The list is threaded through GcHeader::next, newest object at the head
// 3. Freed slots go to a free list and get their generation bumped,
//    so stale ObjectRefs never resolve to a recycled slot
// 4. live_count only moves on link (+1) and release (-1)
// 5. Slot indices must fit in u32; link refuses to grow past slot_limit

use crate::runtime::gc_limits::MAX_HEAP_SLOTS;
use crate::{GcObject, ObjectRef, Payload};

struct Slot {
    generation: u32,
    object: Option<GcObject>,
}

pub struct Heap {
    slots: Vec<Slot>,
    free_list: Vec<u32>,
    head: Option<u32>,
    live_count: usize,
    slot_limit: usize,
}

impl Heap {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            head: None,
            live_count: 0,
            slot_limit: MAX_HEAP_SLOTS,
        }
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            slots: Vec::with_capacity(cap),
            free_list: Vec::new(),
            head: None,
            live_count: 0,
            slot_limit: MAX_HEAP_SLOTS,
        }
    }

    /// Heap that never grows beyond `limit` slots
    pub(crate) fn with_slot_limit(limit: usize) -> Self {
        Self {
            slot_limit: limit.min(MAX_HEAP_SLOTS),
            ..Self::new()
        }
    }

    /// Link a fresh, unmarked object at the head of the list.
    ///
    /// Returns `None` (dropping the payload) when every slot is in use and
    /// the slot limit is reached.
    pub fn link(&mut self, payload: Payload) -> Option<ObjectRef> {
        let index = match self.free_list.pop() {
            Some(index) => index,
            None => {
                if self.slots.len() >= self.slot_limit {
                    return None;
                }
                let index = u32::try_from(self.slots.len()).ok()?;
                self.slots.push(Slot {
                    generation: 0,
                    object: None,
                });
                index
            }
        };

        let slot = &mut self.slots[index as usize];
        debug_assert!(slot.object.is_none(), "free list slot is occupied");
        slot.object = Some(GcObject::new(payload, self.head));
        let obj = ObjectRef::new(index, slot.generation);

        self.head = Some(index);
        self.live_count += 1;
        Some(obj)
    }

    #[inline]
    pub fn live_count(&self) -> usize {
        self.live_count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live_count == 0
    }

    /// Number of slots ever created (live + free)
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn slot_limit(&self) -> usize {
        self.slot_limit
    }

    #[inline]
    pub fn contains(&self, obj: ObjectRef) -> bool {
        self.get(obj).is_some()
    }

    #[inline]
    pub fn get(&self, obj: ObjectRef) -> Option<&GcObject> {
        let slot = self.slots.get(obj.index() as usize)?;
        if slot.generation != obj.generation() {
            return None;
        }
        slot.object.as_ref()
    }

    #[inline]
    pub fn get_mut(&mut self, obj: ObjectRef) -> Option<&mut GcObject> {
        let slot = self.slots.get_mut(obj.index() as usize)?;
        if slot.generation != obj.generation() {
            return None;
        }
        slot.object.as_mut()
    }

    /// Visit every object currently linked into the heap
    pub fn for_each(&self, mut visitor: impl FnMut(ObjectRef, &GcObject)) {
        for (obj, object) in self.iter() {
            visitor(obj, object);
        }
    }

    pub fn iter(&self) -> HeapIter<'_> {
        HeapIter {
            heap: self,
            cursor: self.head,
        }
    }

    // ==================== Sweep Cursor Primitives ====================

    #[inline]
    pub(crate) fn head(&self) -> Option<u32> {
        self.head
    }

    /// Object stored at a linked slot index
    #[inline]
    pub(crate) fn at_mut(&mut self, index: u32) -> Option<&mut GcObject> {
        self.slots.get_mut(index as usize)?.object.as_mut()
    }

    /// Splice the object at `index` out of the list and free its slot.
    /// `prev` is the slot whose link currently points at `index`
    /// (None when `index` is the head). Returns the detached object.
    pub(crate) fn release(&mut self, prev: Option<u32>, index: u32) -> Option<GcObject> {
        let slot = self.slots.get_mut(index as usize)?;
        let object = slot.object.take()?;
        slot.generation = slot.generation.wrapping_add(1);

        let next = object.header.next;
        match prev {
            Some(prev) => {
                if let Some(prev_object) = self.at_mut(prev) {
                    prev_object.header.next = next;
                }
            }
            None => self.head = next,
        }

        self.free_list.push(index);
        self.live_count -= 1;
        Some(object)
    }

    // ==================== Verification Helpers ====================

    pub(crate) fn free_slots(&self) -> &[u32] {
        &self.free_list
    }

    pub(crate) fn slot_is_vacant(&self, index: u32) -> bool {
        self.slots
            .get(index as usize)
            .is_some_and(|slot| slot.object.is_none())
    }

    pub(crate) fn ref_at(&self, index: u32) -> Option<ObjectRef> {
        let slot = self.slots.get(index as usize)?;
        slot.object
            .as_ref()
            .map(|_| ObjectRef::new(index, slot.generation))
    }
}

impl Default for Heap {
    fn default() -> Self {
        Self::new()
    }
}

/// Walks the heap list from the most recently linked object
pub struct HeapIter<'a> {
    heap: &'a Heap,
    cursor: Option<u32>,
}

impl<'a> Iterator for HeapIter<'a> {
    type Item = (ObjectRef, &'a GcObject);

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.cursor?;
        let slot = self.heap.slots.get(index as usize)?;
        let object = slot.object.as_ref()?;
        self.cursor = object.header.next;
        Some((ObjectRef::new(index, slot.generation), object))
    }
}
