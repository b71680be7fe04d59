// crates/oxid_vmem/src/stack.rs
use oxide_core::{GuestAddress, MemoryBus, Primitive};
use std::marker::PhantomData;

/// Push/pop conventions of a hardware stack over any [`MemoryBus`].
///
/// `ASCENDING`: the pointer grows on push. `EMPTY`: the pointer names the
/// next free slot; otherwise it names the last pushed element. Holds no state
/// and owns no memory: the bus and the stack pointer register are passed in.
pub struct StackView<T, A, const ASCENDING: bool, const EMPTY: bool> {
    _pd: PhantomData<(T, A)>,
}

/// STMFD/LDMFD, the ARM procedure-call stack.
pub type FullDescending<T, A> = StackView<T, A, false, false>;
pub type EmptyDescending<T, A> = StackView<T, A, false, true>;
pub type FullAscending<T, A> = StackView<T, A, true, false>;
pub type EmptyAscending<T, A> = StackView<T, A, true, true>;

/// Register-sized full-descending stack.
pub type Stack<A> = FullDescending<A, A>;

impl<T: Primitive, A: GuestAddress, const ASCENDING: bool, const EMPTY: bool>
    StackView<T, A, ASCENDING, EMPTY>
{
    const STEP: usize = T::SIZE;

    #[inline(always)]
    fn grow(sp: A) -> A {
        if ASCENDING {
            sp.wrapping_add(A::from_usize(Self::STEP))
        } else {
            sp.wrapping_sub(A::from_usize(Self::STEP))
        }
    }

    #[inline(always)]
    fn shrink(sp: A) -> A {
        if ASCENDING {
            sp.wrapping_sub(A::from_usize(Self::STEP))
        } else {
            sp.wrapping_add(A::from_usize(Self::STEP))
        }
    }

    #[inline]
    pub fn push_one<B: MemoryBus<Address = A>>(bus: &mut B, sp: &mut A, value: T) {
        if EMPTY {
            bus.store(*sp, value);
            *sp = Self::grow(*sp);
        } else {
            *sp = Self::grow(*sp);
            bus.store(*sp, value);
        }
    }

    #[inline]
    pub fn pop_one<B: MemoryBus<Address = A>>(bus: &B, sp: &mut A) -> T {
        if EMPTY {
            *sp = Self::shrink(*sp);
            bus.load(*sp)
        } else {
            let v = bus.load(*sp);
            *sp = Self::shrink(*sp);
            v
        }
    }

    /// Pushes `values` left to right.
    pub fn push<B: MemoryBus<Address = A>>(bus: &mut B, sp: &mut A, values: &[T]) {
        for &v in values {
            Self::push_one(bus, sp, v);
        }
    }

    /// Pops into `out` left to right, so after `push(&[a, b, c])` a
    /// `pop(&mut [x, y, z])` gives `x == c, y == b, z == a`.
    pub fn pop<B: MemoryBus<Address = A>>(bus: &B, sp: &mut A, out: &mut [T]) {
        for slot in out {
            *slot = Self::pop_one(bus, sp);
        }
    }

    /// Pops `N` values and returns them in the order they were pushed.
    pub fn pop_array<B: MemoryBus<Address = A>, const N: usize>(bus: &B, sp: &mut A) -> [T; N] {
        let mut out = [T::default(); N];
        for slot in out.iter_mut().rev() {
            *slot = Self::pop_one(bus, sp);
        }
        out
    }
}
