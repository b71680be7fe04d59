// crates/oxid_alu/src/psr.rs
use bitflags::bitflags;
use oxide_core::StatusFlags;

// ============================================================================
//  REGISTRO DE ESTADO (CPSR)
// ============================================================================

bitflags! {
    /// ARM-style program status register.
    ///
    /// Only N/Z/C/V are touched by the ALU; the rest is carried along for the
    /// CPU state and never interpreted here.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Psr: u32 {
        const N = 1 << 31; // Negative
        const Z = 1 << 30; // Zero
        const C = 1 << 29; // Carry / NOT borrow
        const V = 1 << 28; // Overflow
        const Q = 1 << 27; // Sticky saturation
        const I = 1 << 7;  // IRQ disable
        const F = 1 << 6;  // FIQ disable
        const T = 1 << 5;  // Thumb
        const MODE = 0x1F;

        const CONDITION_CODES = Self::N.bits() | Self::Z.bits() | Self::C.bits() | Self::V.bits();
    }
}

impl Psr {
    /// Processor mode bits, uninterpreted.
    #[inline]
    pub fn mode(&self) -> u32 {
        self.bits() & Self::MODE.bits()
    }

    #[inline]
    pub fn set_mode(&mut self, mode: u32) {
        *self = Self::from_bits_retain((self.bits() & !Self::MODE.bits()) | (mode & Self::MODE.bits()));
    }
}

impl StatusFlags for Psr {
    #[inline]
    fn carry(&self) -> bool {
        self.contains(Psr::C)
    }
    #[inline]
    fn set_carry(&mut self, c: bool) {
        self.set(Psr::C, c);
    }

    #[inline]
    fn zero(&self) -> bool {
        self.contains(Psr::Z)
    }
    #[inline]
    fn set_zero(&mut self, z: bool) {
        self.set(Psr::Z, z);
    }

    #[inline]
    fn negative(&self) -> bool {
        self.contains(Psr::N)
    }
    #[inline]
    fn set_negative(&mut self, n: bool) {
        self.set(Psr::N, n);
    }

    #[inline]
    fn overflow(&self) -> bool {
        self.contains(Psr::V)
    }
    #[inline]
    fn set_overflow(&mut self, v: bool) {
        self.set(Psr::V, v);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_map_to_top_nibble() {
        let mut psr = Psr::empty();
        psr.set_negative(true);
        psr.set_carry(true);
        assert_eq!(psr.bits(), 0xA000_0000);
        assert!(psr.negative() && psr.carry() && !psr.zero() && !psr.overflow());
    }

    #[test]
    fn set_codes_from_result() {
        let mut psr = Psr::empty();
        psr.set_codes(0u32);
        assert_eq!(psr & Psr::CONDITION_CODES, Psr::Z);
        psr.set_codes(0x80u8);
        assert_eq!(psr & Psr::CONDITION_CODES, Psr::N);
    }

    #[test]
    fn mode_bits_are_opaque() {
        let mut psr = Psr::from_bits_retain(0x6000_00D3);
        assert_eq!(psr.mode(), 0x13);
        psr.set_mode(0x1F);
        assert_eq!(psr.bits(), 0x6000_00DF);
        psr.set_codes(1u32);
        assert_eq!(psr.mode(), 0x1F);
        assert!(psr.contains(Psr::I | Psr::F));
    }
}
