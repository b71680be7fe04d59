// crates/oxid_alu/src/shift.rs
//
// Barrel shifter. `S` elige si se actualizan los flags.
// Un desplazamiento de 0 nunca toca el carry.

use oxide_core::{StatusFlags, Word};

#[inline(always)]
fn finish<const S: bool, T: Word, F: StatusFlags>(psr: &mut F, result: T, carry: Option<bool>) -> T {
    if S {
        if let Some(c) = carry {
            psr.set_carry(c);
        }
        psr.set_codes(result);
    }
    result
}

/// Logical shift left. Amounts past the width shift everything out.
#[inline]
pub fn lsl<const S: bool, T: Word, F: StatusFlags>(psr: &mut F, a: T, b: T) -> T {
    let n = b.shift_amount();
    let (r, c) = match n {
        0 => (a, None),
        n if n < T::BITS => (a.checked_shl(n).unwrap_or(T::ZERO), Some(a.bit(T::BITS - n))),
        n if n == T::BITS => (T::ZERO, Some(a.bit(0))),
        _ => (T::ZERO, Some(false)),
    };
    finish::<S, _, _>(psr, r, c)
}

/// Logical shift right.
#[inline]
pub fn lsr<const S: bool, T: Word, F: StatusFlags>(psr: &mut F, a: T, b: T) -> T {
    let n = b.shift_amount();
    let (r, c) = match n {
        0 => (a, None),
        n if n < T::BITS => (a.checked_shr(n).unwrap_or(T::ZERO), Some(a.bit(n - 1))),
        n if n == T::BITS => (T::ZERO, Some(a.is_negative())),
        _ => (T::ZERO, Some(false)),
    };
    finish::<S, _, _>(psr, r, c)
}

/// Arithmetic shift right: the sign bit is replicated into the vacated bits.
#[inline]
pub fn asr<const S: bool, T: Word, F: StatusFlags>(psr: &mut F, a: T, b: T) -> T {
    let n = b.shift_amount();
    let neg = a.is_negative();
    let (r, c) = match n {
        0 => (a, None),
        n if n < T::BITS => {
            let r = if neg {
                !((!a).checked_shr(n).unwrap_or(T::ZERO))
            } else {
                a.checked_shr(n).unwrap_or(T::ZERO)
            };
            (r, Some(a.bit(n - 1)))
        }
        // Satura al signo
        _ => (if neg { T::MAX } else { T::ZERO }, Some(neg)),
    };
    finish::<S, _, _>(psr, r, c)
}

/// Rotate right. Carry is the last bit rotated out, i.e. the top bit of the
/// result.
#[inline]
pub fn ror<const S: bool, T: Word, F: StatusFlags>(psr: &mut F, a: T, b: T) -> T {
    let n = b.shift_amount();
    if n == 0 {
        return finish::<S, _, _>(psr, a, None);
    }
    let r = a.rotate_right(n % T::BITS);
    finish::<S, _, _>(psr, r, Some(r.is_negative()))
}

// ============================================================================
//  DESPACHO EN TIEMPO DE EJECUCIÓN
// ============================================================================

/// Shift type field of a data-processing operand (bits 5-6 on ARM).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftKind {
    Lsl,
    Lsr,
    Asr,
    Ror,
}

impl ShiftKind {
    /// Decodes the two-bit shift type; higher bits are ignored.
    pub fn from_bits(bits: u32) -> Self {
        match bits & 0b11 {
            0 => ShiftKind::Lsl,
            1 => ShiftKind::Lsr,
            2 => ShiftKind::Asr,
            _ => ShiftKind::Ror,
        }
    }

    /// Runs the shift with the flag switch decided at runtime.
    pub fn apply<T: Word, F: StatusFlags>(self, psr: &mut F, set_flags: bool, a: T, b: T) -> T {
        match (self, set_flags) {
            (ShiftKind::Lsl, true) => lsl::<true, _, _>(psr, a, b),
            (ShiftKind::Lsl, false) => lsl::<false, _, _>(psr, a, b),
            (ShiftKind::Lsr, true) => lsr::<true, _, _>(psr, a, b),
            (ShiftKind::Lsr, false) => lsr::<false, _, _>(psr, a, b),
            (ShiftKind::Asr, true) => asr::<true, _, _>(psr, a, b),
            (ShiftKind::Asr, false) => asr::<false, _, _>(psr, a, b),
            (ShiftKind::Ror, true) => ror::<true, _, _>(psr, a, b),
            (ShiftKind::Ror, false) => ror::<false, _, _>(psr, a, b),
        }
    }
}
