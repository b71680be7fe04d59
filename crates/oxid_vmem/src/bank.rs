// crates/oxid_vmem/src/bank.rs
use crate::error::{VmemError, VmemResult};

/// A flat buffer sliced into `bank_count` banks of `bank_size` bytes.
///
/// Models banked windows (VRAM banks, paged cartridge ROM): a bank register
/// picks which slice is visible. Out-of-range bank indices are the decoder's
/// problem, as on real hardware.
#[derive(Debug, Clone)]
pub struct MemoryBank {
    data: Box<[u8]>,
    bank_count: usize,
    bank_size: usize,
}

impl MemoryBank {
    pub fn new(bank_count: usize, bank_size: usize) -> Self {
        Self {
            data: vec![0; bank_count * bank_size].into_boxed_slice(),
            bank_count,
            bank_size,
        }
    }

    /// Copies `source[offset..end]` into the start of the backing buffer,
    /// clipped to its capacity.
    pub fn seeded(
        bank_count: usize,
        bank_size: usize,
        source: &[u8],
        offset: usize,
        end: usize,
    ) -> VmemResult<Self> {
        if offset > source.len() || end > source.len() || offset > end {
            return Err(VmemError::BankSeedOutOfRange {
                offset,
                end,
                len: source.len(),
            });
        }

        let mut bank = Self::new(bank_count, bank_size);
        let n = (end - offset).min(bank.data.len());
        bank.data[..n].copy_from_slice(&source[offset..offset + n]);
        Ok(bank)
    }

    #[inline]
    pub fn bank_count(&self) -> usize {
        self.bank_count
    }

    #[inline]
    pub fn bank_size(&self) -> usize {
        self.bank_size
    }

    /// Host address of bank `i`. Not bounds checked.
    #[inline]
    pub fn bank_address(&self, i: usize) -> usize {
        (self.data.as_ptr() as usize).wrapping_add(i.wrapping_mul(self.bank_size))
    }

    #[inline]
    pub fn bank(&self, i: usize) -> &[u8] {
        let start = i * self.bank_size;
        &self.data[start..start + self.bank_size]
    }

    #[inline]
    pub fn bank_mut(&mut self, i: usize) -> &mut [u8] {
        let start = i * self.bank_size;
        &mut self.data[start..start + self.bank_size]
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }
}
