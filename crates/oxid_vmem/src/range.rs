// crates/oxid_vmem/src/range.rs
use crate::error::{VmemError, VmemResult};
use oxide_core::{GuestAddress, Rom};

/// One region of the guest memory map.
///
/// Built once from the machine's static memory table. A read-only range is
/// committed, seeded with `initial_contents` and then protected against
/// writes. A range that is not allocated is only reserved: touching it faults.
#[derive(Debug, Clone)]
pub struct AddressRange<A: GuestAddress> {
    pub start: A,
    pub size: A,
    pub writable: bool,
    pub name: String,
    pub alt_name: String,
    /// May be shorter than `size`; the rest is zero.
    pub initial_contents: Vec<u8>,
    pub allocate: bool,
}

impl<A: GuestAddress> AddressRange<A> {
    pub fn new(start: A, size: A, writable: bool, name: impl Into<String>) -> Self {
        Self {
            start,
            size,
            writable,
            name: name.into(),
            alt_name: String::new(),
            initial_contents: Vec::new(),
            allocate: true,
        }
    }

    /// Writable RAM, zero-filled.
    pub fn ram(start: A, size: A, name: impl Into<String>) -> Self {
        Self::new(start, size, true, name)
    }

    /// Committed, seeded, then write-protected.
    pub fn read_only(start: A, size: A, name: impl Into<String>, contents: Vec<u8>) -> Self {
        Self::new(start, size, false, name).with_contents(contents)
    }

    /// Address space only, no backing storage.
    pub fn reserved(start: A, size: A, name: impl Into<String>) -> Self {
        Self {
            allocate: false,
            ..Self::new(start, size, false, name)
        }
    }

    /// Read-only range seeded from a ROM image.
    pub fn from_rom(start: A, size: A, name: impl Into<String>, rom: Rom) -> Self {
        Self::read_only(start, size, name, rom.data)
    }

    pub fn with_contents(mut self, contents: Vec<u8>) -> Self {
        self.initial_contents = contents;
        self
    }

    pub fn with_alt_name(mut self, alt_name: impl Into<String>) -> Self {
        self.alt_name = alt_name.into();
        self
    }

    /// One past the last guest address; `u64` so a range ending at the top of
    /// a 32-bit guest space doesn't wrap. Saturates for 64-bit guests;
    /// `validate` rejects those ranges.
    #[inline]
    pub fn end(&self) -> u64 {
        self.start.to_u64().saturating_add(self.size.to_u64())
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size == A::ZERO
    }

    /// Guest-relative checks: the end is representable and the seed fits.
    pub fn validate(&self) -> VmemResult<()> {
        if self.start.to_u64().checked_add(self.size.to_u64()).is_none() {
            return Err(VmemError::RangeOverflow {
                name: self.name.clone(),
                start: self.start.to_u64(),
                size: self.size.to_u64(),
            });
        }
        if self.initial_contents.len() as u64 > self.size.to_u64() {
            return Err(VmemError::InitialContentsTooLarge {
                name: self.name.clone(),
                len: self.initial_contents.len(),
                size: self.size.to_u64(),
            });
        }
        Ok(())
    }

    /// Drops the setup-only copy once it lives in guest memory.
    pub fn release_initial_contents(&mut self) {
        self.initial_contents = Vec::new();
    }
}

/// Checks the table invariants: non-empty, every seed fits, ordered by start
/// and non-overlapping (size-zero entries are ignored for overlap).
pub(crate) fn validate_table<A: GuestAddress>(ranges: &[AddressRange<A>]) -> VmemResult<()> {
    if ranges.is_empty() {
        return Err(VmemError::EmptyRangeTable);
    }

    let mut previous: Option<&AddressRange<A>> = None;
    for range in ranges {
        range.validate()?;
        if range.is_empty() {
            continue;
        }
        if let Some(prev) = previous {
            if range.start.to_u64() < prev.end() {
                return Err(VmemError::UnorderedRanges {
                    name: range.name.clone(),
                    previous: prev.name.clone(),
                });
            }
        }
        previous = Some(range);
    }
    Ok(())
}
