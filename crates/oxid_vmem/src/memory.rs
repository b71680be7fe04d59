// crates/oxid_vmem/src/memory.rs
use crate::bank::MemoryBank;
use crate::error::{VmemError, VmemResult};
use crate::host::{page_ceil, page_floor, HostMemory, Reservation};
use crate::mapper::{AddressMapper, OffsetMapper};
use crate::pointer::TypedAddress;
use crate::range::{validate_table, AddressRange};
use oxide_core::{Arithmetic, GuestAddress, MemoryBus, Primitive};
use std::marker::PhantomData;

#[cfg(unix)]
use crate::host::OsHost;

// ============================================================================
//  MEMORIA VIRTUAL DEL GUEST
// ============================================================================

/// Guest address space backed by one host reservation.
///
/// The whole span `[ranges[0].start, ranges[last].end())` is reserved up
/// front; allocated ranges are committed, seeded and (if read-only)
/// protected. Guest addresses then resolve to host memory with a single
/// mapper step and no per-access range lookup: touching a reserved but
/// uncommitted page, or writing a read-only one, faults in the host MMU.
///
/// Not `Sync`: typed accessors are plain loads and stores, and
/// read-modify-write helpers are not atomic. Sharing one instance between
/// threads needs external locking.
pub struct VirtualMemory<A: GuestAddress, M: AddressMapper, H: HostMemory> {
    reservation: Reservation<H>,
    /// Host address of guest address zero.
    origin: usize,
    span_start: usize,
    ranges: Vec<AddressRange<A>>,
    banks: Vec<MemoryBank>,
    info: Vec<u32>,
    _mapper: PhantomData<M>,
}

#[cfg(unix)]
pub type VirtualMemory16<M = OffsetMapper> = VirtualMemory<u16, M, OsHost>;
#[cfg(unix)]
pub type VirtualMemory32<M = OffsetMapper> = VirtualMemory<u32, M, OsHost>;
#[cfg(unix)]
pub type VirtualMemory64<M = OffsetMapper> = VirtualMemory<u64, M, OsHost>;

#[cfg(unix)]
impl<A: GuestAddress, M: AddressMapper> VirtualMemory<A, M, OsHost> {
    pub fn new(ranges: Vec<AddressRange<A>>) -> VmemResult<Self> {
        Self::new_in(OsHost::new(), ranges)
    }
}

impl<A: GuestAddress, M: AddressMapper, H: HostMemory> VirtualMemory<A, M, H> {
    /// Reserves the span of `ranges` on `host` and commits every allocated
    /// range. On any failure the reservation is released before returning.
    pub fn new_in(host: H, mut ranges: Vec<AddressRange<A>>) -> VmemResult<Self> {
        let () = A::WIDTH_CHECK;
        validate_table(&ranges)?;

        let page = host.page_size();
        let first = ranges[0].start.to_u64();
        let last = ranges.iter().map(AddressRange::end).max().unwrap_or(first);
        let too_large = || VmemError::SpanTooLarge {
            start: first,
            end: last,
        };

        let span_start = page_floor(usize::try_from(first).map_err(|_| too_large())?, page);
        let span_end = usize::try_from(last)
            .ok()
            .and_then(|e| page_ceil(e, page))
            .ok_or_else(too_large)?;
        let len = (span_end - span_start).max(page);

        let mut reservation = Reservation::new(host, M::placement(span_start), len)?;
        let origin = reservation.base().wrapping_sub(span_start);

        let placed = place_ranges::<A, M, H>(&reservation, origin, &ranges)?;
        let holes: Vec<Option<usize>> = ranges
            .iter()
            .map(|r| (!r.allocate && !r.is_empty()).then(|| M::map(origin, r.start)))
            .collect();
        check_protection(&placed, &ranges, page)?;
        check_holes(&placed, &holes, &ranges, page)?;

        for (range, host_addr) in ranges.iter_mut().zip(&placed) {
            let Some(host_addr) = *host_addr else {
                continue;
            };
            let size = range.size.to_usize();
            reservation
                .host_mut()
                .commit(host_addr, size, &range.initial_contents)
                .map_err(|source| VmemError::Commit {
                    name: range.name.clone(),
                    source,
                })?;
            log::debug!(
                "committed '{}' {:#x}+{:#x} at {host_addr:#x}",
                range.name,
                range.start.to_u64(),
                size
            );

            if !range.writable {
                reservation
                    .host_mut()
                    .protect_read_only(host_addr, size)
                    .map_err(|source| VmemError::Protect {
                        name: range.name.clone(),
                        source,
                    })?;
                log::debug!("protected '{}' read-only", range.name);
            }
            range.release_initial_contents();
        }

        log::info!(
            "guest space {span_start:#x}..{span_end:#x} reserved at {:#x} ({} ranges)",
            reservation.base(),
            ranges.len()
        );

        Ok(Self {
            reservation,
            origin,
            span_start,
            ranges,
            banks: Vec::new(),
            info: Vec::new(),
            _mapper: PhantomData,
        })
    }

    /// Banked variant: memory bank sets indexed by bank register.
    pub fn with_banks(mut self, banks: Vec<MemoryBank>) -> Self {
        self.banks = banks;
        self
    }

    /// Scratch values (e.g. selected bank per bank register), zeroed.
    pub fn with_info_slots(mut self, count: usize) -> Self {
        self.info = vec![0; count];
        self
    }

    /// Releases the reservation now, reporting a host failure instead of
    /// only logging it from `Drop`.
    pub fn close(mut self) -> VmemResult<()> {
        self.reservation.release()
    }

    // --- Accesos tipados ---

    #[inline(always)]
    pub fn host_address(&self, address: A) -> usize {
        M::map(self.origin, address)
    }

    #[inline(always)]
    pub fn get<T: Primitive>(&self, address: A) -> T {
        self.reservation.load(self.host_address(address))
    }

    #[inline(always)]
    pub fn set<T: Primitive>(&mut self, address: A, value: T) {
        let host = self.host_address(address);
        self.reservation.store(host, value)
    }

    /// Read-modify-write, returns the new value. Not atomic.
    #[inline]
    pub fn increment<T: Arithmetic>(&mut self, address: A, delta: T) -> T {
        let v = self.get::<T>(address).add_wrapping(delta);
        self.set(address, v);
        v
    }

    /// Typed handle on one guest location.
    #[inline]
    pub fn at<T: Primitive>(&mut self, address: A) -> TypedAddress<'_, Self, T> {
        TypedAddress::new(self, address)
    }

    // --- Memoria con bancos ---

    /// Host address of bank `index` of bank set `register`. Indices are not
    /// checked against the bank count.
    #[inline]
    pub fn get_banked(&self, register: usize, index: usize) -> usize {
        self.banks[register].bank_address(index)
    }

    #[inline]
    pub fn get_banked_memory(&self, register: usize, index: usize, offset: usize) -> usize {
        self.get_banked(register, index).wrapping_add(offset)
    }

    /// Bank currently selected by info slot `register`.
    #[inline]
    pub fn active_bank(&self, register: usize) -> usize {
        self.get_banked(register, self.info[register] as usize)
    }

    pub fn bank(&self, register: usize, index: usize) -> &[u8] {
        self.banks[register].bank(index)
    }

    pub fn bank_mut(&mut self, register: usize, index: usize) -> &mut [u8] {
        self.banks[register].bank_mut(index)
    }

    pub fn read_banked<T: Primitive>(&self, register: usize, index: usize, offset: usize) -> T {
        T::read_le(&self.bank(register, index)[offset..])
    }

    pub fn write_banked<T: Primitive>(&mut self, register: usize, index: usize, offset: usize, value: T) {
        value.write_le(&mut self.bank_mut(register, index)[offset..])
    }

    #[inline]
    pub fn info(&self, slot: usize) -> u32 {
        self.info[slot]
    }

    #[inline]
    pub fn set_info(&mut self, slot: usize, value: u32) {
        self.info[slot] = value;
    }

    // --- Introspección ---

    pub fn ranges(&self) -> &[AddressRange<A>] {
        &self.ranges
    }

    pub fn banks(&self) -> &[MemoryBank] {
        &self.banks
    }

    /// Host address where the reservation starts.
    pub fn base(&self) -> usize {
        self.reservation.base()
    }

    /// Page-aligned guest start of the reserved span and its length.
    pub fn span(&self) -> (usize, usize) {
        (self.span_start, self.reservation.len())
    }

    pub fn host(&self) -> &H {
        self.reservation.host()
    }
}

impl<A: GuestAddress, M: AddressMapper, H: HostMemory> MemoryBus for VirtualMemory<A, M, H> {
    type Address = A;

    #[inline(always)]
    fn load<T: Primitive>(&self, addr: A) -> T {
        self.get(addr)
    }

    #[inline(always)]
    fn store<T: Primitive>(&mut self, addr: A, value: T) {
        self.set(addr, value)
    }
}

/// Host address of every range that gets committed (`None` for empty or
/// reserve-only ranges). Each must map wholly inside the reservation.
fn place_ranges<A: GuestAddress, M: AddressMapper, H: HostMemory>(
    reservation: &Reservation<H>,
    origin: usize,
    ranges: &[AddressRange<A>],
) -> VmemResult<Vec<Option<usize>>> {
    ranges
        .iter()
        .map(|range| {
            if range.is_empty() {
                log::warn!("skipping empty range '{}'", range.name);
                return Ok(None);
            }
            if !range.allocate {
                log::debug!("'{}' reserved only", range.name);
                return Ok(None);
            }
            let host = M::map(origin, range.start);
            if !reservation.contains(host, range.size.to_usize()) {
                return Err(VmemError::MapperOutOfSpan {
                    name: range.name.clone(),
                    host,
                });
            }
            Ok(Some(host))
        })
        .collect()
}

/// Host page span `[lo, hi)` covered by `range` placed at `host`.
fn page_span<A: GuestAddress>(host: usize, range: &AddressRange<A>, page: usize) -> (usize, usize) {
    let end = host.saturating_add(range.size.to_usize());
    (page_floor(host, page), page_ceil(end, page).unwrap_or(usize::MAX))
}

/// Protection is page-granular: a read-only range may not share a host page
/// with a writable one.
fn check_protection<A: GuestAddress>(
    placed: &[Option<usize>],
    ranges: &[AddressRange<A>],
    page: usize,
) -> VmemResult<()> {
    let pages = |host: usize, range: &AddressRange<A>| page_span(host, range, page);

    for (ro, ro_host) in ranges.iter().zip(placed) {
        let Some(ro_host) = *ro_host else { continue };
        if ro.writable {
            continue;
        }
        let (ro_lo, ro_hi) = pages(ro_host, ro);
        for (rw, rw_host) in ranges.iter().zip(placed) {
            let Some(rw_host) = *rw_host else { continue };
            if !rw.writable {
                continue;
            }
            let (rw_lo, rw_hi) = pages(rw_host, rw);
            if ro_lo < rw_hi && rw_lo < ro_hi {
                return Err(VmemError::ProtectionConflict {
                    read_only: ro.name.clone(),
                    writable: rw.name.clone(),
                });
            }
        }
    }
    Ok(())
}

/// A reserve-only range must stay uncommitted: if it shared a host page with
/// a committed range, touching it would not fault.
fn check_holes<A: GuestAddress>(
    placed: &[Option<usize>],
    holes: &[Option<usize>],
    ranges: &[AddressRange<A>],
    page: usize,
) -> VmemResult<()> {
    for (hole, hole_host) in ranges.iter().zip(holes) {
        let Some(hole_host) = *hole_host else { continue };
        let (hole_lo, hole_hi) = page_span(hole_host, hole, page);
        for (committed, host) in ranges.iter().zip(placed) {
            let Some(host) = *host else { continue };
            let (lo, hi) = page_span(host, committed, page);
            if hole_lo < hi && lo < hole_hi {
                return Err(VmemError::UncommittedConflict {
                    reserved: hole.name.clone(),
                    committed: committed.name.clone(),
                });
            }
        }
    }
    Ok(())
}
