// crates/oxid_vmem/src/lib.rs
//! Guest address space on top of host virtual memory.
//!
//! The guest memory map is reserved as one host span; allocated ranges are
//! committed and protected so that a guest address resolves to host memory
//! with one mapper step and the host MMU does the bounds and permission
//! checks.

pub mod bank;
pub mod error;
pub mod host;
pub mod loadstore;
pub mod mapper;
pub mod memory;
pub mod pointer;
pub mod range;
pub mod stack;

pub use bank::MemoryBank;
pub use error::{VmemError, VmemResult};
pub use host::HostMemory;
#[cfg(unix)]
pub use host::OsHost;
pub use mapper::{AddressMapper, MirrorMapper, OffsetMapper, OverlayMapper};
pub use memory::VirtualMemory;
#[cfg(unix)]
pub use memory::{VirtualMemory16, VirtualMemory32, VirtualMemory64};
pub use pointer::TypedAddress;
pub use range::AddressRange;
pub use stack::{EmptyAscending, EmptyDescending, FullAscending, FullDescending, Stack, StackView};

pub use oxide_core::{Arithmetic, GuestAddress, MemoryBus, Primitive};
