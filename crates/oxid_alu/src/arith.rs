// crates/oxid_alu/src/arith.rs
use oxide_core::{StatusFlags, Word};

// ============================================================================
//  SUMADOR
// ============================================================================

/// `a + b + carry_in` with the carry added as a separate step.
///
/// Returns (result, carry out, signed overflow).
#[inline(always)]
fn add_with_carry<T: Word>(a: T, b: T, carry_in: bool) -> (T, bool, bool) {
    let (partial, c1) = a.overflowing_add(b);
    let (r, c2) = partial.overflowing_add(if carry_in { T::ONE } else { T::ZERO });
    // Mismo signo en los operandos y distinto en el resultado
    let v = (!(a ^ b) & (a ^ r)).is_negative();
    (r, c1 || c2, v)
}

#[inline(always)]
fn finish<const S: bool, T: Word, F: StatusFlags>(psr: &mut F, (r, c, v): (T, bool, bool)) -> T {
    if S {
        psr.set_codes(r);
        psr.set_carry(c);
        psr.set_overflow(v);
    }
    r
}

#[inline]
pub fn add<const S: bool, T: Word, F: StatusFlags>(psr: &mut F, a: T, b: T) -> T {
    finish::<S, _, _>(psr, add_with_carry(a, b, false))
}

#[inline]
pub fn adc<const S: bool, T: Word, F: StatusFlags>(psr: &mut F, a: T, b: T) -> T {
    let cin = psr.carry();
    finish::<S, _, _>(psr, add_with_carry(a, b, cin))
}

/// `a - b`. Carry is NOT borrow: set when `a >= b` unsigned.
#[inline]
pub fn sub<const S: bool, T: Word, F: StatusFlags>(psr: &mut F, a: T, b: T) -> T {
    finish::<S, _, _>(psr, add_with_carry(a, !b, true))
}

/// `a - b - !carry`.
#[inline]
pub fn sbc<const S: bool, T: Word, F: StatusFlags>(psr: &mut F, a: T, b: T) -> T {
    let cin = psr.carry();
    finish::<S, _, _>(psr, add_with_carry(a, !b, cin))
}

/// Reverse subtract, `b - a`.
#[inline]
pub fn rsb<const S: bool, T: Word, F: StatusFlags>(psr: &mut F, a: T, b: T) -> T {
    sub::<S, _, _>(psr, b, a)
}

#[inline]
pub fn rsc<const S: bool, T: Word, F: StatusFlags>(psr: &mut F, a: T, b: T) -> T {
    sbc::<S, _, _>(psr, b, a)
}

/// Low half of the product. Only zero and sign are affected.
#[inline]
pub fn mul<const S: bool, T: Word, F: StatusFlags>(psr: &mut F, a: T, b: T) -> T {
    let r = a.wrapping_mul(b);
    if S {
        psr.set_codes(r);
    }
    r
}

// --- Comparaciones: sólo flags ---

#[inline]
pub fn cmp<T: Word, F: StatusFlags>(psr: &mut F, a: T, b: T) {
    sub::<true, _, _>(psr, a, b);
}

#[inline]
pub fn cmn<T: Word, F: StatusFlags>(psr: &mut F, a: T, b: T) {
    add::<true, _, _>(psr, a, b);
}
