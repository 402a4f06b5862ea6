use super::Handle;

#[cfg(feature = "slotgfx-serde")]
use serde::{Deserialize, Serialize};

/// Largest pool capacity a 16-bit slot index can address (slot 0 is reserved).
pub const MAX_POOL_SIZE: usize = (1 << 16) - 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "slotgfx-serde", derive(Serialize, Deserialize))]
pub enum ResourceState {
    /// Slot is free.
    #[default]
    Initial,
    /// Id minted, record not yet initialized.
    Alloc,
    Valid,
    Failed,
    /// Returned by queries for ids that no longer match their slot.
    Invalid,
}

/// Bookkeeping shared by every resource record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Slot {
    pub id: u32,
    pub ctx_id: u32,
    pub state: ResourceState,
}

/// A record type that can live in a [`Pool`].
pub trait Resource: Default {
    const KIND: &'static str;

    fn slot(&self) -> &Slot;
    fn slot_mut(&mut self) -> &mut Slot;

    /// Wipe everything but the slot and put the record back into `Alloc`.
    fn reset_to_alloc(&mut self) {
        let slot = *self.slot();
        *self = Self::default();
        *self.slot_mut() = Slot {
            state: ResourceState::Alloc,
            ..slot
        };
    }
}

/// Fixed-capacity arena of resource records addressed by generation-checked
/// handles. Freed indices are reused LIFO.
pub struct Pool<T> {
    records: Vec<T>,
    generations: Vec<u16>,
    free: Vec<u16>,
}

impl<T: Resource> Pool<T> {
    /// Builds a pool with `capacity` usable slots. `capacity` must not exceed
    /// [`MAX_POOL_SIZE`].
    pub fn new(capacity: usize) -> Self {
        debug_assert!(capacity <= MAX_POOL_SIZE);
        let capacity = capacity.min(MAX_POOL_SIZE);
        let mut records = Vec::with_capacity(capacity + 1);
        records.resize_with(capacity + 1, T::default);
        Self {
            records,
            generations: vec![0; capacity + 1],
            // top of the stack is index 1
            free: (1..=capacity as u16).rev().collect(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.records.len() - 1
    }

    pub fn num_free(&self) -> usize {
        self.free.len()
    }

    pub fn alloc_index(&mut self) -> Option<u16> {
        self.free.pop()
    }

    pub fn free_index(&mut self, index: u16) {
        debug_assert!(index != 0 && (index as usize) < self.records.len());
        if cfg!(debug_assertions) && self.free.contains(&index) {
            log::error!("{} pool: slot {} freed twice", T::KIND, index);
            return;
        }
        if self.generations[index as usize] == u16::MAX {
            log::warn!(
                "{} pool: slot {} exhausted its generation counter, retiring it",
                T::KIND,
                index
            );
            return;
        }
        self.free.push(index);
    }

    /// The single place ids are minted.
    fn alloc_into_slot(&mut self, index: u16) -> Handle<T> {
        let generation = &mut self.generations[index as usize];
        *generation += 1;
        let handle = Handle::new(index, *generation);
        let slot = self.records[index as usize].slot_mut();
        slot.id = handle.raw();
        slot.state = ResourceState::Alloc;
        handle
    }

    /// Reserve a slot and mint a fresh handle for it.
    pub fn alloc(&mut self) -> Option<Handle<T>> {
        let index = self.alloc_index()?;
        Some(self.alloc_into_slot(index))
    }

    /// Clear the slot behind `handle` and return its index to the free stack.
    pub fn dealloc(&mut self, handle: Handle<T>) -> bool {
        let Some(record) = self.lookup_mut(handle) else {
            return false;
        };
        *record = T::default();
        self.free_index(handle.slot());
        true
    }

    pub fn lookup(&self, handle: Handle<T>) -> Option<&T> {
        if !handle.valid() {
            return None;
        }
        self.records
            .get(handle.slot() as usize)
            .filter(|r| r.slot().id == handle.raw())
    }

    pub fn lookup_mut(&mut self, handle: Handle<T>) -> Option<&mut T> {
        if !handle.valid() {
            return None;
        }
        self.records
            .get_mut(handle.slot() as usize)
            .filter(|r| r.slot().id == handle.raw())
    }

    pub fn state(&self, handle: Handle<T>) -> ResourceState {
        self.lookup(handle)
            .map(|r| r.slot().state)
            .unwrap_or(ResourceState::Invalid)
    }

    /// Handles of every live record owned by `ctx_id`.
    pub fn handles_owned_by(&self, ctx_id: u32) -> Vec<Handle<T>> {
        self.records
            .iter()
            .skip(1)
            .map(|r| r.slot())
            .filter(|s| s.state != ResourceState::Initial && s.ctx_id == ctx_id)
            .map(|s| Handle::from_raw(s.id))
            .collect()
    }

    pub fn for_each_live<F>(&self, mut func: F)
    where
        F: FnMut(&T),
    {
        for record in self.records.iter().skip(1) {
            if record.slot().state != ResourceState::Initial {
                func(record);
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn force_generation(&mut self, index: u16, generation: u16) {
        self.generations[index as usize] = generation;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Thing {
        slot: Slot,
        payload: u32,
    }

    impl Resource for Thing {
        const KIND: &'static str = "thing";
        fn slot(&self) -> &Slot {
            &self.slot
        }
        fn slot_mut(&mut self) -> &mut Slot {
            &mut self.slot
        }
    }

    #[test]
    fn never_hands_out_slot_zero() {
        let mut pool = Pool::<Thing>::new(4);
        let mut seen = Vec::new();
        while let Some(h) = pool.alloc() {
            assert_ne!(h.slot(), 0);
            seen.push(h.slot());
        }
        seen.sort();
        assert_eq!(seen, vec![1, 2, 3, 4]);
    }

    #[test]
    fn exhaustion_returns_none() {
        let mut pool = Pool::<Thing>::new(2);
        assert!(pool.alloc().is_some());
        assert!(pool.alloc().is_some());
        assert!(pool.alloc().is_none());
        assert_eq!(pool.num_free(), 0);
    }

    #[test]
    fn free_stack_is_lifo() {
        let mut pool = Pool::<Thing>::new(8);
        let a = pool.alloc().unwrap();
        let b = pool.alloc().unwrap();
        assert!(pool.dealloc(a));
        assert!(pool.dealloc(b));
        assert_eq!(pool.alloc_index(), Some(b.slot()));
        assert_eq!(pool.alloc_index(), Some(a.slot()));
    }

    #[test]
    fn stale_handle_misses_after_reuse() {
        let mut pool = Pool::<Thing>::new(1);
        let first = pool.alloc().unwrap();
        pool.lookup_mut(first).unwrap().payload = 5;
        assert!(pool.dealloc(first));
        let second = pool.alloc().unwrap();

        assert_eq!(first.slot(), second.slot());
        assert!(second.generation() > first.generation());
        assert!(pool.lookup(first).is_none());
        assert_eq!(pool.state(first), ResourceState::Invalid);
        assert_eq!(pool.state(second), ResourceState::Alloc);
        assert_eq!(pool.lookup(second).unwrap().payload, 0);
    }

    #[test]
    fn double_free_is_rejected() {
        let mut pool = Pool::<Thing>::new(2);
        let h = pool.alloc().unwrap();
        assert!(pool.dealloc(h));
        assert!(!pool.dealloc(h));
        let free_before = pool.num_free();
        pool.free_index(h.slot());
        if cfg!(debug_assertions) {
            assert_eq!(pool.num_free(), free_before);
        }
    }

    #[test]
    fn reset_to_alloc_keeps_slot() {
        let mut pool = Pool::<Thing>::new(1);
        let h = pool.alloc().unwrap();
        {
            let t = pool.lookup_mut(h).unwrap();
            t.slot.ctx_id = 42;
            t.slot.state = ResourceState::Valid;
            t.payload = 9;
            t.reset_to_alloc();
        }
        let t = pool.lookup(h).unwrap();
        assert_eq!(t.slot.ctx_id, 42);
        assert_eq!(t.slot.state, ResourceState::Alloc);
        assert_eq!(t.payload, 0);
    }

    #[test]
    fn exhausted_generation_retires_slot() {
        let mut pool = Pool::<Thing>::new(1);
        pool.force_generation(1, u16::MAX - 1);
        let h = pool.alloc().unwrap();
        assert_eq!(h.generation(), u16::MAX);
        assert!(pool.dealloc(h));
        assert_eq!(pool.num_free(), 0);
        assert!(pool.alloc().is_none());
    }

    #[test]
    fn handles_owned_by_filters_context() {
        let mut pool = Pool::<Thing>::new(4);
        let a = pool.alloc().unwrap();
        let b = pool.alloc().unwrap();
        pool.lookup_mut(a).unwrap().slot.ctx_id = 1;
        pool.lookup_mut(b).unwrap().slot.ctx_id = 2;
        assert_eq!(pool.handles_owned_by(1), vec![a]);
        assert_eq!(pool.handles_owned_by(2), vec![b]);
    }
}
