// crates/oxid_alu/src/logic.rs
//
// Operaciones lógicas y MOV/MVN. El carry del shifter ya lo puso el operando
// desplazado; aquí sólo se recalculan Z y N.

use oxide_core::{StatusFlags, Word};

#[inline(always)]
fn finish<const S: bool, T: Word, F: StatusFlags>(psr: &mut F, r: T) -> T {
    if S {
        psr.set_codes(r);
    }
    r
}

#[inline]
pub fn mov<const S: bool, T: Word, F: StatusFlags>(psr: &mut F, b: T) -> T {
    finish::<S, _, _>(psr, b)
}

#[inline]
pub fn mvn<const S: bool, T: Word, F: StatusFlags>(psr: &mut F, b: T) -> T {
    finish::<S, _, _>(psr, !b)
}

#[inline]
pub fn and<const S: bool, T: Word, F: StatusFlags>(psr: &mut F, a: T, b: T) -> T {
    finish::<S, _, _>(psr, a & b)
}

#[inline]
pub fn orr<const S: bool, T: Word, F: StatusFlags>(psr: &mut F, a: T, b: T) -> T {
    finish::<S, _, _>(psr, a | b)
}

#[inline]
pub fn eor<const S: bool, T: Word, F: StatusFlags>(psr: &mut F, a: T, b: T) -> T {
    finish::<S, _, _>(psr, a ^ b)
}

/// Bit clear, `a & !b`.
#[inline]
pub fn bic<const S: bool, T: Word, F: StatusFlags>(psr: &mut F, a: T, b: T) -> T {
    finish::<S, _, _>(psr, a & !b)
}

#[inline]
pub fn tst<T: Word, F: StatusFlags>(psr: &mut F, a: T, b: T) {
    and::<true, _, _>(psr, a, b);
}

#[inline]
pub fn teq<T: Word, F: StatusFlags>(psr: &mut F, a: T, b: T) {
    eor::<true, _, _>(psr, a, b);
}
