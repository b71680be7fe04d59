// crates/oxid_vmem/src/pointer.rs
use oxide_core::{Arithmetic, MemoryBus, Primitive};
use std::marker::PhantomData;
use std::ops::{AddAssign, BitOr, BitOrAssign};

/// Handle on one typed guest location.
///
/// Building one does no I/O. `get` is exactly one load, `set` one store,
/// and the compound operators one load followed by one store (not atomic).
/// `T` has to be a [`Primitive`], so a handle on an arbitrary struct does not
/// compile.
pub struct TypedAddress<'a, B: MemoryBus, T: Primitive> {
    bus: &'a mut B,
    address: B::Address,
    _ty: PhantomData<T>,
}

impl<'a, B: MemoryBus, T: Primitive> TypedAddress<'a, B, T> {
    #[inline]
    pub fn new(bus: &'a mut B, address: B::Address) -> Self {
        Self {
            bus,
            address,
            _ty: PhantomData,
        }
    }

    #[inline]
    pub fn address(&self) -> B::Address {
        self.address
    }

    #[inline]
    pub fn get(&self) -> T {
        self.bus.load(self.address)
    }

    #[inline]
    pub fn set(&mut self, value: T) {
        self.bus.store(self.address, value)
    }
}

impl<B: MemoryBus, T: Arithmetic> TypedAddress<'_, B, T> {
    /// `++`: returns the incremented value.
    #[inline]
    pub fn increment(&mut self) -> T {
        let v = self.get().add_wrapping(T::UNIT);
        self.set(v);
        v
    }
}

impl<B: MemoryBus, T: Arithmetic> AddAssign<T> for TypedAddress<'_, B, T> {
    #[inline]
    fn add_assign(&mut self, rhs: T) {
        let v = self.get().add_wrapping(rhs);
        self.set(v);
    }
}

impl<B: MemoryBus, T: Primitive + BitOr<Output = T>> BitOrAssign<T> for TypedAddress<'_, B, T> {
    #[inline]
    fn bitor_assign(&mut self, rhs: T) {
        let v = self.get() | rhs;
        self.set(v);
    }
}
