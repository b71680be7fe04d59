// crates/oxid_alu/src/condition.rs
use oxide_core::StatusFlags;

/// Condition field (bits 28-31) of a conditionally executed instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    Eq,
    Ne,
    Cs,
    Cc,
    Mi,
    Pl,
    Vs,
    Vc,
    Hi,
    Ls,
    Ge,
    Lt,
    Gt,
    Le,
    Al,
}

impl Condition {
    /// `None` for 0b1111, which is not a condition.
    pub fn from_bits(bits: u32) -> Option<Self> {
        use Condition::*;
        Some(match bits & 0xF {
            0x0 => Eq,
            0x1 => Ne,
            0x2 => Cs,
            0x3 => Cc,
            0x4 => Mi,
            0x5 => Pl,
            0x6 => Vs,
            0x7 => Vc,
            0x8 => Hi,
            0x9 => Ls,
            0xA => Ge,
            0xB => Lt,
            0xC => Gt,
            0xD => Le,
            0xE => Al,
            _ => return None,
        })
    }

    pub fn passes<F: StatusFlags>(self, f: &F) -> bool {
        match self {
            Condition::Eq => f.zero(),
            Condition::Ne => !f.zero(),
            Condition::Cs => f.carry(),
            Condition::Cc => !f.carry(),
            Condition::Mi => f.negative(),
            Condition::Pl => !f.negative(),
            Condition::Vs => f.overflow(),
            Condition::Vc => !f.overflow(),
            Condition::Hi => f.carry() && !f.zero(),
            Condition::Ls => !f.carry() || f.zero(),
            Condition::Ge => f.negative() == f.overflow(),
            Condition::Lt => f.negative() != f.overflow(),
            Condition::Gt => !f.zero() && f.negative() == f.overflow(),
            Condition::Le => f.zero() || f.negative() != f.overflow(),
            Condition::Al => true,
        }
    }
}
