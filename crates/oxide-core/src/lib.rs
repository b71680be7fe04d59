use std::fmt::{Debug, LowerHex};
use std::fs;
use std::ops::{BitAnd, BitOr, BitXor, Not};
use std::path::Path;
use thiserror::Error;

// ============================================================================
//  PALABRAS (OPERANDOS DE LA ALU)
// ============================================================================

/// Fixed-width unsigned integer the ALU operates on.
///
/// All arithmetic is two's-complement wraparound; nothing here traps on
/// overflow.
pub trait Word:
    Copy
    + Eq
    + Ord
    + Default
    + Debug
    + LowerHex
    + Not<Output = Self>
    + BitAnd<Output = Self>
    + BitOr<Output = Self>
    + BitXor<Output = Self>
    + 'static
{
    const BITS: u32;
    const ZERO: Self;
    const ONE: Self;
    /// Only the top bit set.
    const SIGN: Self;
    const MAX: Self;

    fn wrapping_add(self, rhs: Self) -> Self;
    fn wrapping_sub(self, rhs: Self) -> Self;
    fn wrapping_mul(self, rhs: Self) -> Self;
    fn wrapping_neg(self) -> Self;
    fn overflowing_add(self, rhs: Self) -> (Self, bool);

    /// `None` when `n >= BITS`.
    fn checked_shl(self, n: u32) -> Option<Self>;
    /// `None` when `n >= BITS`.
    fn checked_shr(self, n: u32) -> Option<Self>;
    fn rotate_right(self, n: u32) -> Self;

    fn to_u64(self) -> u64;
    /// Keeps the low `BITS` bits of `v`.
    fn truncate_from(v: u64) -> Self;

    #[inline]
    fn is_negative(self) -> bool {
        self & Self::SIGN != Self::ZERO
    }

    #[inline]
    fn bit(self, n: u32) -> bool {
        n < Self::BITS && (self.to_u64() >> n) & 1 != 0
    }

    /// Shift amount as a `u32`, saturated so huge amounts stay huge.
    #[inline]
    fn shift_amount(self) -> u32 {
        self.to_u64().min(u32::MAX as u64) as u32
    }
}

macro_rules! impl_word {
    ($($t:ty),*) => {$(
        impl Word for $t {
            const BITS: u32 = <$t>::BITS;
            const ZERO: Self = 0;
            const ONE: Self = 1;
            const SIGN: Self = 1 << (<$t>::BITS - 1);
            const MAX: Self = <$t>::MAX;

            #[inline] fn wrapping_add(self, rhs: Self) -> Self { <$t>::wrapping_add(self, rhs) }
            #[inline] fn wrapping_sub(self, rhs: Self) -> Self { <$t>::wrapping_sub(self, rhs) }
            #[inline] fn wrapping_mul(self, rhs: Self) -> Self { <$t>::wrapping_mul(self, rhs) }
            #[inline] fn wrapping_neg(self) -> Self { <$t>::wrapping_neg(self) }
            #[inline] fn overflowing_add(self, rhs: Self) -> (Self, bool) { <$t>::overflowing_add(self, rhs) }
            #[inline] fn checked_shl(self, n: u32) -> Option<Self> { <$t>::checked_shl(self, n) }
            #[inline] fn checked_shr(self, n: u32) -> Option<Self> { <$t>::checked_shr(self, n) }
            #[inline] fn rotate_right(self, n: u32) -> Self { <$t>::rotate_right(self, n) }
            #[inline] fn to_u64(self) -> u64 { self as u64 }
            #[inline] fn truncate_from(v: u64) -> Self { v as $t }
        }
    )*};
}

impl_word!(u8, u16, u32, u64);

// ============================================================================
//  TIPOS PRIMITIVOS (LOAD/STORE)
// ============================================================================

mod sealed {
    pub trait Sealed {}
}

/// Trivially-copyable value that can be loaded from or stored to guest memory.
///
/// Sealed: only the built-in integer and float types qualify, so asking for a
/// typed access to anything else is a compile error. Guest memory is
/// little-endian.
pub trait Primitive: sealed::Sealed + Copy + Default + Debug + 'static {
    const SIZE: usize;

    /// Converts a value read raw from host memory into its guest meaning.
    fn from_guest(raw: Self) -> Self;
    /// Converts a value into the raw representation stored in host memory.
    fn to_guest(self) -> Self;

    /// `bytes` must be at least `SIZE` long.
    fn read_le(bytes: &[u8]) -> Self;
    /// `bytes` must be at least `SIZE` long.
    fn write_le(self, bytes: &mut [u8]);
}

macro_rules! impl_primitive_int {
    ($($t:ty),*) => {$(
        impl sealed::Sealed for $t {}
        impl Primitive for $t {
            const SIZE: usize = std::mem::size_of::<$t>();

            #[inline] fn from_guest(raw: Self) -> Self { <$t>::from_le(raw) }
            #[inline] fn to_guest(self) -> Self { self.to_le() }

            #[inline]
            fn read_le(bytes: &[u8]) -> Self {
                let mut buf = [0u8; std::mem::size_of::<$t>()];
                buf.copy_from_slice(&bytes[..Self::SIZE]);
                <$t>::from_le_bytes(buf)
            }

            #[inline]
            fn write_le(self, bytes: &mut [u8]) {
                bytes[..Self::SIZE].copy_from_slice(&self.to_le_bytes());
            }
        }
    )*};
}

macro_rules! impl_primitive_float {
    ($($t:ty => $bits:ty),*) => {$(
        impl sealed::Sealed for $t {}
        impl Primitive for $t {
            const SIZE: usize = std::mem::size_of::<$t>();

            #[inline] fn from_guest(raw: Self) -> Self { <$t>::from_bits(<$bits>::from_le(raw.to_bits())) }
            #[inline] fn to_guest(self) -> Self { <$t>::from_bits(self.to_bits().to_le()) }

            #[inline]
            fn read_le(bytes: &[u8]) -> Self {
                <$t>::from_bits(<$bits>::read_le(bytes))
            }

            #[inline]
            fn write_le(self, bytes: &mut [u8]) {
                self.to_bits().write_le(bytes)
            }
        }
    )*};
}

impl_primitive_int!(u8, i8, u16, i16, u32, i32, u64, i64);
impl_primitive_float!(f32 => u32, f64 => u64);

/// Primitive with an addition, for read-modify-write on guest memory.
///
/// Integers wrap like the guest's registers do; floats add normally.
pub trait Arithmetic: Primitive {
    const UNIT: Self;

    fn add_wrapping(self, rhs: Self) -> Self;
}

macro_rules! impl_arith_int {
    ($($t:ty),*) => {$(
        impl Arithmetic for $t {
            const UNIT: Self = 1;
            #[inline] fn add_wrapping(self, rhs: Self) -> Self { self.wrapping_add(rhs) }
        }
    )*};
}

macro_rules! impl_arith_float {
    ($($t:ty),*) => {$(
        impl Arithmetic for $t {
            const UNIT: Self = 1.0;
            #[inline] fn add_wrapping(self, rhs: Self) -> Self { self + rhs }
        }
    )*};
}

impl_arith_int!(u8, i8, u16, i16, u32, i32, u64, i64);
impl_arith_float!(f32, f64);

// ============================================================================
//  DIRECCIONES DEL GUEST
// ============================================================================

/// Address type of the emulated machine.
///
/// Must never be wider than a host pointer; `WIDTH_CHECK` turns a violation
/// into a compile error wherever it is evaluated.
pub trait GuestAddress: Word + Primitive {
    const WIDTH_CHECK: () = assert!(
        std::mem::size_of::<Self>() <= std::mem::size_of::<usize>(),
        "guest address type is wider than the host address type"
    );

    #[inline]
    fn to_usize(self) -> usize {
        self.to_u64() as usize
    }

    #[inline]
    fn from_usize(v: usize) -> Self {
        Self::truncate_from(v as u64)
    }
}

impl GuestAddress for u16 {}
impl GuestAddress for u32 {}
impl GuestAddress for u64 {}

// ============================================================================
//  FLAGS (CONTRATO CPSR)
// ============================================================================

/// Condition codes of a CPSR-like register.
///
/// The CPU state owns the register; the ALU only borrows it to update
/// carry/zero/negative/overflow.
pub trait StatusFlags {
    fn carry(&self) -> bool;
    fn set_carry(&mut self, c: bool);

    fn zero(&self) -> bool;
    fn set_zero(&mut self, z: bool);

    fn negative(&self) -> bool;
    fn set_negative(&mut self, n: bool);

    fn overflow(&self) -> bool;
    fn set_overflow(&mut self, v: bool);

    /// Zero and sign from a result.
    #[inline]
    fn set_codes<T: Word>(&mut self, result: T) {
        self.set_zero(result == T::ZERO);
        self.set_negative(result.is_negative());
    }
}

// ============================================================================
//  BUS DE MEMORIA TIPADO
// ============================================================================

/// Contrato UNIFICADO para el bus del guest: accesos tipados por dirección.
///
/// Writes take `&mut self`; a bus is not meant to be shared between threads
/// without external synchronization, and read-modify-write helpers are not
/// atomic.
pub trait MemoryBus {
    type Address: GuestAddress;

    // --- Métodos Obligatorios ---
    fn load<T: Primitive>(&self, addr: Self::Address) -> T;
    fn store<T: Primitive>(&mut self, addr: Self::Address, value: T);

    // --- Helpers Automáticos (Default Impls) ---

    fn read(&self, addr: Self::Address) -> u8 {
        self.load(addr)
    }

    fn write(&mut self, addr: Self::Address, val: u8) {
        self.store(addr, val)
    }

    // Lectura 16-bit Big Endian, byte a byte
    fn read_u16_be(&self, addr: Self::Address) -> u16 {
        let hi = self.read(addr) as u16;
        let lo = self.read(addr.wrapping_add(Self::Address::ONE)) as u16;
        (hi << 8) | lo
    }

    // Lectura 32-bit Big Endian
    fn read_u32_be(&self, addr: Self::Address) -> u32 {
        let hi = self.read_u16_be(addr) as u32;
        let lo = self.read_u16_be(addr.wrapping_add(Self::Address::from_usize(2))) as u32;
        (hi << 16) | lo
    }

    // Escritura 16-bit Big Endian
    fn write_u16_be(&mut self, addr: Self::Address, val: u16) {
        self.write(addr, (val >> 8) as u8);
        self.write(addr.wrapping_add(Self::Address::ONE), (val & 0xFF) as u8);
    }

    // Escritura 32-bit Big Endian
    fn write_u32_be(&mut self, addr: Self::Address, val: u32) {
        self.write_u16_be(addr, (val >> 16) as u16);
        self.write_u16_be(
            addr.wrapping_add(Self::Address::from_usize(2)),
            (val & 0xFFFF) as u16,
        );
    }

    /// Read-modify-write; returns the stored value.
    fn increment<T: Arithmetic>(&mut self, addr: Self::Address, delta: T) -> T {
        let v = self.load::<T>(addr).add_wrapping(delta);
        self.store(addr, v);
        v
    }
}

// ============================================================================
//  ROM LOADER (UTILIDAD)
// ============================================================================

#[derive(Error, Debug)]
pub enum RomError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("ROM file is too small or empty")]
    Empty,
}

/// Raw image used to seed a memory range (BIOS, cartridge, firmware).
pub struct Rom {
    pub data: Vec<u8>,
}

impl Rom {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, RomError> {
        let data = fs::read(path)?;
        if data.is_empty() {
            return Err(RomError::Empty);
        }
        Ok(Self { data })
    }

    /// Crea una ROM vacía de tamaño fijo (útil para tests)
    pub fn new_empty(size: usize) -> Self {
        Self {
            data: vec![0; size],
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Default)]
    struct TestBus {
        bytes: HashMap<u32, u8>,
    }

    impl MemoryBus for TestBus {
        type Address = u32;

        fn load<T: Primitive>(&self, addr: u32) -> T {
            let mut buf = [0u8; 8];
            for (i, b) in buf.iter_mut().enumerate().take(T::SIZE) {
                *b = *self.bytes.get(&(addr + i as u32)).unwrap_or(&0);
            }
            T::read_le(&buf)
        }

        fn store<T: Primitive>(&mut self, addr: u32, value: T) {
            let mut buf = [0u8; 8];
            value.write_le(&mut buf);
            for (i, b) in buf.iter().enumerate().take(T::SIZE) {
                self.bytes.insert(addr + i as u32, *b);
            }
        }
    }

    #[test]
    fn word_constants() {
        assert_eq!(u8::SIGN, 0x80);
        assert_eq!(u16::SIGN, 0x8000);
        assert_eq!(u32::SIGN, 0x8000_0000);
        assert_eq!(u64::SIGN, 0x8000_0000_0000_0000);
        assert!(0x80u8.is_negative());
        assert!(!0x7Fu8.is_negative());
    }

    #[test]
    fn word_bits_and_shift_amount() {
        assert!(0b100u32.bit(2));
        assert!(!0b100u32.bit(1));
        assert!(!0xFFu8.bit(8));
        assert_eq!(u64::MAX.shift_amount(), u32::MAX);
        assert_eq!(7u16.shift_amount(), 7);
        assert_eq!(u16::truncate_from(0x1_2345), 0x2345);
    }

    #[test]
    fn primitive_le_bytes() {
        let mut buf = [0u8; 4];
        0x1234_5678u32.write_le(&mut buf);
        assert_eq!(buf, [0x78, 0x56, 0x34, 0x12]);
        assert_eq!(u32::read_le(&buf), 0x1234_5678);
        assert_eq!(i16::read_le(&[0xFF, 0xFF]), -1);
        1.5f32.write_le(&mut buf);
        assert_eq!(f32::read_le(&buf), 1.5);
    }

    #[test]
    fn guest_address_usize() {
        let () = <u32 as GuestAddress>::WIDTH_CHECK;
        assert_eq!(0xFFFF_FFFFu32.to_usize(), 0xFFFF_FFFF);
        assert_eq!(<u16 as GuestAddress>::from_usize(0x1_0001), 1);
    }

    #[test]
    fn bus_big_endian_helpers() {
        let mut bus = TestBus::default();
        bus.write_u32_be(0x100, 0xDEAD_BEEF);
        assert_eq!(bus.read(0x100), 0xDE);
        assert_eq!(bus.read(0x103), 0xEF);
        assert_eq!(bus.read_u32_be(0x100), 0xDEAD_BEEF);
        // El bus del guest es little-endian para accesos tipados
        assert_eq!(bus.load::<u32>(0x100), 0xEFBE_ADDE);
    }

    #[test]
    fn bus_increment_wraps() {
        let mut bus = TestBus::default();
        bus.store(0x10, 0xFFu8);
        assert_eq!(bus.increment(0x10, 1u8), 0);
        assert_eq!(bus.increment(0x20, 5u16), 5);
        assert_eq!(bus.load::<u16>(0x20), 5);
        bus.store(0x30, i32::MAX);
        assert_eq!(bus.increment(0x30, 1i32), i32::MIN);
        assert_eq!(bus.increment(0x40, -3i16), -3);
    }

    #[test]
    fn arithmetic_wraps_integers_and_adds_floats() {
        assert_eq!(0xFFu8.add_wrapping(u8::UNIT), 0);
        assert_eq!((-1i64).add_wrapping(i64::UNIT), 0);
        assert_eq!(1.5f32.add_wrapping(f32::UNIT), 2.5);
    }

    #[test]
    fn rom_from_missing_file_is_io_error() {
        let err = Rom::from_file("/definitely/not/here.rom");
        assert!(matches!(err, Err(RomError::Io(_))));
        assert_eq!(Rom::new_empty(16).len(), 16);
    }

    #[test]
    fn rom_from_empty_file_is_rejected() {
        let path = std::env::temp_dir().join(format!("oxide-core-empty-{}.rom", std::process::id()));
        fs::write(&path, b"").unwrap();
        assert!(matches!(Rom::from_file(&path), Err(RomError::Empty)));
        let _ = fs::remove_file(&path);
    }
}
