// crates/oxid_vmem/src/loadstore.rs
//
// LDR/STR y variantes: `base + offset` con la aritmética del guest (wrap).
// Los loads sin signo extienden con ceros; LDSB/LDSH extienden el signo.

use oxide_core::{GuestAddress, MemoryBus, Word};

#[inline(always)]
fn ea<A: GuestAddress>(base: A, offset: A) -> A {
    base.wrapping_add(offset)
}

#[inline]
pub fn strb<B: MemoryBus>(bus: &mut B, value: B::Address, base: B::Address, offset: B::Address) {
    bus.store(ea(base, offset), value.to_u64() as u8)
}

#[inline]
pub fn strh<B: MemoryBus>(bus: &mut B, value: B::Address, base: B::Address, offset: B::Address) {
    bus.store(ea(base, offset), value.to_u64() as u16)
}

#[inline]
pub fn str<B: MemoryBus>(bus: &mut B, value: B::Address, base: B::Address, offset: B::Address) {
    bus.store(ea(base, offset), value.to_u64() as u32)
}

#[inline]
pub fn ldrb<B: MemoryBus>(bus: &B, base: B::Address, offset: B::Address) -> B::Address {
    B::Address::truncate_from(bus.load::<u8>(ea(base, offset)) as u64)
}

#[inline]
pub fn ldrh<B: MemoryBus>(bus: &B, base: B::Address, offset: B::Address) -> B::Address {
    B::Address::truncate_from(bus.load::<u16>(ea(base, offset)) as u64)
}

#[inline]
pub fn ldr<B: MemoryBus>(bus: &B, base: B::Address, offset: B::Address) -> B::Address {
    B::Address::truncate_from(bus.load::<u32>(ea(base, offset)) as u64)
}

/// Signed byte, sign-extended to the register width.
#[inline]
pub fn ldsb<B: MemoryBus>(bus: &B, base: B::Address, offset: B::Address) -> B::Address {
    B::Address::truncate_from(bus.load::<i8>(ea(base, offset)) as i64 as u64)
}

/// Signed halfword, sign-extended to the register width.
#[inline]
pub fn ldsh<B: MemoryBus>(bus: &B, base: B::Address, offset: B::Address) -> B::Address {
    B::Address::truncate_from(bus.load::<i16>(ea(base, offset)) as i64 as u64)
}
