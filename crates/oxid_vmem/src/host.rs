// crates/oxid_vmem/src/host.rs
//
// Único módulo con punteros crudos: toda conversión dirección-host -> valor
// pasa por `Reservation`, que valida que el acceso cae dentro del span
// reservado antes de desreferenciar.

use crate::error::{VmemError, VmemResult};
use oxide_core::Primitive;
use std::io;
use std::ptr;

// ============================================================================
//  CAPACIDAD DE MEMORIA VIRTUAL DEL HOST
// ============================================================================

/// Reserve/commit/protect/release on the host's virtual memory.
///
/// # Safety
///
/// Implementors promise that:
/// - `reserve` returns a span of address space nobody else uses until it is
///   passed to `release`, and that is zero-filled when first committed;
/// - after `commit(addr, size, ..)` succeeds, every byte of `[addr, addr+size)`
///   is readable and writable, and holds `initial` at its start;
/// - after `protect_read_only`, those bytes stay readable.
pub unsafe trait HostMemory {
    fn page_size(&self) -> usize;

    /// Claims `size` bytes of address space without backing storage. With a
    /// `placement`, the host should try to put the span there; callers check.
    fn reserve(&mut self, placement: Option<usize>, size: usize) -> io::Result<usize>;

    /// Backs `[addr, addr+size)` with storage and copies `initial` to `addr`.
    fn commit(&mut self, addr: usize, size: usize, initial: &[u8]) -> io::Result<()>;

    fn protect_read_only(&mut self, addr: usize, size: usize) -> io::Result<()>;

    fn release(&mut self, addr: usize, size: usize) -> io::Result<()>;
}

#[inline]
pub(crate) fn page_floor(addr: usize, page: usize) -> usize {
    addr & !(page - 1)
}

#[inline]
pub(crate) fn page_ceil(addr: usize, page: usize) -> Option<usize> {
    Some(addr.checked_add(page - 1)? & !(page - 1))
}

/// POSIX `mmap`/`mprotect`/`munmap`.
#[cfg(unix)]
#[derive(Debug, Clone, Copy)]
pub struct OsHost {
    page: usize,
}

#[cfg(unix)]
impl OsHost {
    pub fn new() -> Self {
        // SAFETY: sysconf has no preconditions.
        let page = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
        Self {
            page: if page > 0 { page as usize } else { 4096 },
        }
    }

    fn page_span(&self, addr: usize, size: usize) -> io::Result<(usize, usize)> {
        let start = page_floor(addr, self.page);
        let end = addr
            .checked_add(size)
            .and_then(|e| page_ceil(e, self.page))
            .ok_or_else(|| io::Error::from(io::ErrorKind::InvalidInput))?;
        Ok((start, end - start))
    }

    fn mprotect(&self, addr: usize, size: usize, prot: libc::c_int) -> io::Result<()> {
        let (start, len) = self.page_span(addr, size)?;
        // SAFETY: callers only pass ranges inside a span returned by `reserve`.
        let rc = unsafe { libc::mprotect(start as *mut libc::c_void, len, prot) };
        if rc != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}

#[cfg(unix)]
impl Default for OsHost {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(any(target_os = "linux", target_os = "android"))]
const RESERVE_FLAGS: libc::c_int = libc::MAP_PRIVATE | libc::MAP_ANONYMOUS | libc::MAP_NORESERVE;
#[cfg(all(unix, not(any(target_os = "linux", target_os = "android"))))]
const RESERVE_FLAGS: libc::c_int = libc::MAP_PRIVATE | libc::MAP_ANON;

#[cfg(unix)]
unsafe impl HostMemory for OsHost {
    fn page_size(&self) -> usize {
        self.page
    }

    fn reserve(&mut self, placement: Option<usize>, size: usize) -> io::Result<usize> {
        let hint = placement.unwrap_or(0) as *mut libc::c_void;
        // SAFETY: a PROT_NONE anonymous mapping without MAP_FIXED never
        // replaces an existing mapping.
        let p = unsafe { libc::mmap(hint, size, libc::PROT_NONE, RESERVE_FLAGS, -1, 0) };
        if p == libc::MAP_FAILED {
            return Err(io::Error::last_os_error());
        }
        Ok(p as usize)
    }

    fn commit(&mut self, addr: usize, size: usize, initial: &[u8]) -> io::Result<()> {
        if initial.len() > size {
            return Err(io::Error::from(io::ErrorKind::InvalidInput));
        }
        // Las páginas anónimas llegan en cero: sólo hace falta abrirlas.
        self.mprotect(addr, size, libc::PROT_READ | libc::PROT_WRITE)?;
        // SAFETY: `[addr, addr+size)` was just made writable and
        // `initial.len() <= size`.
        unsafe { ptr::copy_nonoverlapping(initial.as_ptr(), addr as *mut u8, initial.len()) };
        Ok(())
    }

    fn protect_read_only(&mut self, addr: usize, size: usize) -> io::Result<()> {
        self.mprotect(addr, size, libc::PROT_READ)
    }

    fn release(&mut self, addr: usize, size: usize) -> io::Result<()> {
        // SAFETY: `addr`/`size` are exactly a span returned by `reserve`.
        let rc = unsafe { libc::munmap(addr as *mut libc::c_void, size) };
        if rc != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}

// ============================================================================
//  RESERVA (GUARDIA RAII)
// ============================================================================

/// The reserved span plus the host that owns it. Released exactly once:
/// either explicitly through `release` or on drop.
pub(crate) struct Reservation<H: HostMemory> {
    host: H,
    base: usize,
    len: usize,
    live: bool,
}

impl<H: HostMemory> Reservation<H> {
    pub(crate) fn new(mut host: H, placement: Option<usize>, len: usize) -> VmemResult<Self> {
        let base = host
            .reserve(placement, len)
            .map_err(|source| VmemError::Reserve { size: len, source })?;
        log::debug!("reserved {len:#x} bytes at {base:#x}");

        let reservation = Self {
            host,
            base,
            len,
            live: true,
        };
        match placement {
            Some(requested) if requested != base => Err(VmemError::Misplaced {
                requested,
                actual: base,
            }),
            _ => Ok(reservation),
        }
    }

    #[inline]
    pub(crate) fn base(&self) -> usize {
        self.base
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn host(&self) -> &H {
        &self.host
    }

    pub(crate) fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    #[inline]
    pub(crate) fn contains(&self, addr: usize, size: usize) -> bool {
        addr >= self.base && size <= self.len && addr - self.base <= self.len - size
    }

    #[inline(always)]
    fn check(&self, addr: usize, size: usize) {
        if !self.contains(addr, size) {
            self.out_of_span(addr);
        }
    }

    #[cold]
    #[inline(never)]
    fn out_of_span(&self, addr: usize) -> ! {
        panic!(
            "host address {addr:#x} outside reservation {:#x}..{:#x}",
            self.base,
            self.base + self.len
        )
    }

    /// Typed load. Faults in the host MMU if the page is reserved but not
    /// committed.
    #[inline(always)]
    pub(crate) fn load<T: Primitive>(&self, addr: usize) -> T {
        self.check(addr, T::SIZE);
        // SAFETY: the whole value lies inside our own reservation, which no
        // other Rust object aliases. Uncommitted pages trap in the MMU rather
        // than reading foreign memory.
        T::from_guest(unsafe { ptr::read_unaligned(addr as *const T) })
    }

    /// Typed store. Faults in the host MMU on read-only or uncommitted pages.
    #[inline(always)]
    pub(crate) fn store<T: Primitive>(&mut self, addr: usize, value: T) {
        self.check(addr, T::SIZE);
        // SAFETY: as in `load`; `&mut self` excludes concurrent access
        // through this reservation.
        unsafe { ptr::write_unaligned(addr as *mut T, value.to_guest()) }
    }

    pub(crate) fn release(&mut self) -> VmemResult<()> {
        if !self.live {
            return Ok(());
        }
        self.live = false;
        log::debug!("releasing {:#x} bytes at {:#x}", self.len, self.base);
        self.host
            .release(self.base, self.len)
            .map_err(VmemError::Release)
    }
}

impl<H: HostMemory> Drop for Reservation<H> {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            log::error!("{e}");
        }
    }
}
