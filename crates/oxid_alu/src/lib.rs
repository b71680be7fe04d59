// crates/oxid_alu/src/lib.rs
//! Bit-accurate ALU with CPSR-style condition codes.
//!
//! Every operation is a free function over any [`Word`] width. The const
//! parameter `S` selects the flag-setting encoding; with `S = false` the
//! flags register is never written. Arithmetic wraps, nothing traps.

pub mod arith;
pub mod condition;
pub mod logic;
pub mod psr;
pub mod shift;

pub use arith::{adc, add, cmn, cmp, mul, rsb, rsc, sbc, sub};
pub use condition::Condition;
pub use logic::{and, bic, eor, mov, mvn, orr, teq, tst};
pub use psr::Psr;
pub use shift::{asr, lsl, lsr, ror, ShiftKind};

pub use oxide_core::{StatusFlags, Word};
