// crates/oxid_vmem/tests/lifecycle.rs
#![cfg(unix)]

use oxid_vmem::{AddressRange, HostMemory, OffsetMapper, OsHost, VirtualMemory, VmemError};
use std::cell::RefCell;
use std::io;
use std::rc::Rc;
use test_log::test;

#[derive(Debug, Default)]
struct Calls {
    reserve: usize,
    commit: usize,
    protect: usize,
    release: usize,
    released: Vec<(usize, usize)>,
    reserved: Vec<(usize, usize)>,
}

/// Host real con contadores; opcionalmente falla el N-ésimo commit.
struct CountingHost {
    inner: OsHost,
    calls: Rc<RefCell<Calls>>,
    fail_commit_at: Option<usize>,
}

impl CountingHost {
    fn new() -> (Self, Rc<RefCell<Calls>>) {
        let calls = Rc::new(RefCell::new(Calls::default()));
        let host = Self {
            inner: OsHost::new(),
            calls: calls.clone(),
            fail_commit_at: None,
        };
        (host, calls)
    }
}

// SAFETY: every call is forwarded to `OsHost`.
unsafe impl HostMemory for CountingHost {
    fn page_size(&self) -> usize {
        self.inner.page_size()
    }

    fn reserve(&mut self, placement: Option<usize>, size: usize) -> io::Result<usize> {
        let base = self.inner.reserve(placement, size)?;
        let mut calls = self.calls.borrow_mut();
        calls.reserve += 1;
        calls.reserved.push((base, size));
        Ok(base)
    }

    fn commit(&mut self, addr: usize, size: usize, initial: &[u8]) -> io::Result<()> {
        let n = {
            let mut calls = self.calls.borrow_mut();
            calls.commit += 1;
            calls.commit
        };
        if self.fail_commit_at == Some(n) {
            return Err(io::Error::new(io::ErrorKind::OutOfMemory, "commit refused"));
        }
        self.inner.commit(addr, size, initial)
    }

    fn protect_read_only(&mut self, addr: usize, size: usize) -> io::Result<()> {
        self.calls.borrow_mut().protect += 1;
        self.inner.protect_read_only(addr, size)
    }

    fn release(&mut self, addr: usize, size: usize) -> io::Result<()> {
        let mut calls = self.calls.borrow_mut();
        calls.release += 1;
        calls.released.push((addr, size));
        self.inner.release(addr, size)
    }
}

fn table(page: u32) -> Vec<AddressRange<u32>> {
    vec![
        AddressRange::read_only(0, page, "bios", vec![0xEA; 64]),
        AddressRange::reserved(page, page, "hole"),
        AddressRange::ram(2 * page, page, "ewram"),
        AddressRange::ram(3 * page, page, "iwram"),
    ]
}

#[test]
fn drop_releases_whole_span_once() {
    let (host, calls) = CountingHost::new();
    let page = host.page_size() as u32;
    {
        let mut mem = VirtualMemory::<u32, OffsetMapper, _>::new_in(host, table(page)).unwrap();
        mem.set(2 * page, 1u32);
        let c = calls.borrow();
        assert_eq!((c.reserve, c.commit, c.protect, c.release), (1, 3, 1, 0));
    }
    let c = calls.borrow();
    assert_eq!(c.release, 1);
    assert_eq!(c.released, c.reserved);
    assert_eq!(c.reserved[0].1, 4 * page as usize);
}

#[test]
fn close_then_drop_does_not_double_free() {
    let (host, calls) = CountingHost::new();
    let page = host.page_size() as u32;
    let mem = VirtualMemory::<u32, OffsetMapper, _>::new_in(host, table(page)).unwrap();
    mem.close().unwrap();
    assert_eq!(calls.borrow().release, 1);
}

#[test]
fn failed_commit_still_releases() {
    let (mut host, calls) = CountingHost::new();
    host.fail_commit_at = Some(2);
    let page = host.page_size() as u32;
    let result = VirtualMemory::<u32, OffsetMapper, _>::new_in(host, table(page));
    assert!(matches!(result, Err(VmemError::Commit { ref name, .. }) if name == "ewram"));
    let c = calls.borrow();
    assert_eq!((c.reserve, c.release), (1, 1));
    assert_eq!(c.released, c.reserved);
}

#[test]
fn validation_failure_reserves_nothing() {
    let (host, calls) = CountingHost::new();
    let bad = vec![AddressRange::<u32>::read_only(0, 4, "bios", vec![0; 8])];
    assert!(VirtualMemory::<u32, OffsetMapper, _>::new_in(host, bad).is_err());
    let c = calls.borrow();
    assert_eq!((c.reserve, c.release), (0, 0));
}

#[test]
fn protection_conflict_releases_reservation() {
    let (host, calls) = CountingHost::new();
    let conflicting = vec![
        AddressRange::<u32>::read_only(0, 0x20, "vectors", vec![1]),
        AddressRange::<u32>::ram(0x20, 0x20, "stack"),
    ];
    let result = VirtualMemory::<u32, OffsetMapper, _>::new_in(host, conflicting);
    assert!(matches!(result, Err(VmemError::ProtectionConflict { .. })));
    let c = calls.borrow();
    assert_eq!((c.reserve, c.commit, c.release), (1, 0, 1));
}

#[test]
fn hole_sharing_a_page_releases_reservation() {
    let (host, calls) = CountingHost::new();
    let table = vec![
        AddressRange::<u32>::ram(0, 0x10, "scratch"),
        AddressRange::<u32>::reserved(0x10, 0x10, "open bus"),
    ];
    let result = VirtualMemory::<u32, OffsetMapper, _>::new_in(host, table);
    assert!(matches!(result, Err(VmemError::UncommittedConflict { .. })));
    let c = calls.borrow();
    assert_eq!((c.reserve, c.commit, c.release), (1, 0, 1));
    assert_eq!(c.released, c.reserved);
}
