use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;

/// Number of low bits of an id that hold the slot index.
pub const SLOT_SHIFT: u32 = 16;
pub const SLOT_MASK: u32 = (1 << SLOT_SHIFT) - 1;

/// Opaque 32-bit resource id: generation in the high 16 bits, slot index in
/// the low 16 bits. Slot index 0 is reserved, so the all-zero id is invalid.
pub struct Handle<T> {
    id: u32,
    phantom: PhantomData<T>,
}

impl<T> Handle<T> {
    pub const INVALID: Self = Self {
        id: 0,
        phantom: PhantomData,
    };

    pub fn new(slot: u16, generation: u16) -> Self {
        Self {
            id: ((generation as u32) << SLOT_SHIFT) | slot as u32,
            phantom: PhantomData,
        }
    }

    pub fn from_raw(id: u32) -> Self {
        Self {
            id,
            phantom: PhantomData,
        }
    }

    pub fn raw(&self) -> u32 {
        self.id
    }

    pub fn slot(&self) -> u16 {
        (self.id & SLOT_MASK) as u16
    }

    pub fn generation(&self) -> u16 {
        (self.id >> SLOT_SHIFT) as u16
    }

    /// True for any id with a non-reserved slot index. This says nothing
    /// about whether the resource behind it is still alive.
    pub fn valid(&self) -> bool {
        self.slot() != 0
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({}@gen{})", self.slot(), self.generation())
    }
}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T> Default for Handle<T> {
    fn default() -> Self {
        Self::INVALID
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Dummy;

    #[test]
    fn packs_generation_and_slot() {
        let h = Handle::<Dummy>::new(7, 3);
        assert_eq!(h.raw(), (3 << 16) | 7);
        assert_eq!(h.slot(), 7);
        assert_eq!(h.generation(), 3);
        assert!(h.valid());
    }

    #[test]
    fn default_is_invalid() {
        let h = Handle::<Dummy>::default();
        assert_eq!(h, Handle::INVALID);
        assert!(!h.valid());
        assert_eq!(h.raw(), 0);
    }

    #[test]
    fn same_slot_different_generation_differs() {
        let a = Handle::<Dummy>::new(1, 1);
        let b = Handle::<Dummy>::new(1, 2);
        assert_ne!(a, b);
        assert_eq!(a.slot(), b.slot());
    }
}
