// crates/oxid_vmem/tests/protection.rs
//
// Los fallos de protección los produce la MMU del host, así que se prueban en
// un proceso hijo: el padre sólo mira con qué señal murió.
#![cfg(unix)]

use oxid_vmem::{AddressRange, HostMemory, OffsetMapper, OsHost, VirtualMemory32};
use std::panic::{self, AssertUnwindSafe};

fn page() -> u32 {
    OsHost::new().page_size() as u32
}

fn build() -> VirtualMemory32<OffsetMapper> {
    let p = page();
    VirtualMemory32::<OffsetMapper>::new(vec![
        AddressRange::read_only(0, p, "rom", b"OXIDE".to_vec()),
        AddressRange::reserved(p, p, "unmapped"),
        AddressRange::ram(2 * p, p, "ram"),
    ])
    .unwrap()
}

/// How the forked child ended.
#[derive(Debug, PartialEq)]
enum Outcome {
    Exited(i32),
    Signaled(i32),
}

/// Runs `f` in a forked child. A panic in the child becomes exit code 101.
fn run_in_child(f: impl FnOnce()) -> Outcome {
    // SAFETY: the child only touches memory it inherited and then leaves
    // through `_exit`, never returning into the test harness.
    unsafe {
        let pid = libc::fork();
        assert!(pid >= 0, "fork failed");
        if pid == 0 {
            let ok = panic::catch_unwind(AssertUnwindSafe(f)).is_ok();
            libc::_exit(if ok { 0 } else { 101 });
        }
        let mut status = 0;
        assert_eq!(libc::waitpid(pid, &mut status, 0), pid);
        if libc::WIFSIGNALED(status) {
            Outcome::Signaled(libc::WTERMSIG(status))
        } else {
            Outcome::Exited(libc::WEXITSTATUS(status))
        }
    }
}

fn is_access_violation(outcome: &Outcome) -> bool {
    matches!(outcome, Outcome::Signaled(libc::SIGSEGV) | Outcome::Signaled(libc::SIGBUS))
}

#[test]
fn read_only_range_holds_contents() {
    let mem = build();
    let p = page();
    assert_eq!(mem.get::<u8>(0), b'O');
    assert_eq!(mem.get::<u32>(1), u32::from_le_bytes(*b"XIDE"));
    for offset in 5..p {
        assert_eq!(mem.get::<u8>(offset), 0);
    }
}

#[test]
fn write_to_read_only_range_faults() {
    let mut mem = build();
    let outcome = run_in_child(|| mem.set(0x10, 0xFFu8));
    assert!(is_access_violation(&outcome), "child ended with {outcome:?}");
    // El padre sigue viendo la ROM intacta
    assert_eq!(mem.get::<u8>(0x10), 0);
}

#[test]
fn read_from_reserved_only_range_faults() {
    let mem = build();
    let p = page();
    let outcome = run_in_child(|| {
        let _ = std::hint::black_box(mem.get::<u32>(p + 8));
    });
    assert!(is_access_violation(&outcome), "child ended with {outcome:?}");
}

#[test]
fn hole_edge_next_to_ram_faults() {
    let mem = build();
    let p = page();
    // Último word del hueco, pegado a la RAM comprometida
    let outcome = run_in_child(|| {
        let _ = std::hint::black_box(mem.get::<u32>(2 * p - 4));
    });
    assert!(is_access_violation(&outcome), "child ended with {outcome:?}");
}

#[test]
fn permitted_accesses_do_not_fault() {
    let mut mem = build();
    let p = page();
    let outcome = run_in_child(|| {
        mem.set(2 * p, 0x1234u16);
        assert_eq!(mem.get::<u16>(2 * p), 0x1234);
        let _ = std::hint::black_box(mem.get::<u8>(0));
    });
    assert_eq!(outcome, Outcome::Exited(0));
}
