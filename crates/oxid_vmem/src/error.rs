// crates/oxid_vmem/src/error.rs
use std::io;
use thiserror::Error;

/// Construction/teardown failures of the guest address space.
///
/// Every variant is unrecoverable for an emulator session: the caller is
/// expected to report it and stop.
#[derive(Error, Debug)]
pub enum VmemError {
    #[error("range table is empty")]
    EmptyRangeTable,

    #[error("initial contents of '{name}' ({len:#x} bytes) exceed its size ({size:#x})")]
    InitialContentsTooLarge { name: String, len: usize, size: u64 },

    #[error("range '{name}' at {start:#x} with size {size:#x} runs past the end of the guest space")]
    RangeOverflow { name: String, start: u64, size: u64 },

    #[error("range '{name}' overlaps or precedes '{previous}'")]
    UnorderedRanges { name: String, previous: String },

    #[error("address span {start:#x}..{end:#x} does not fit the host address space")]
    SpanTooLarge { start: u64, end: u64 },

    #[error("read-only range '{read_only}' shares a host page with writable range '{writable}'")]
    ProtectionConflict { read_only: String, writable: String },

    #[error("reserve-only range '{reserved}' shares a host page with committed range '{committed}'")]
    UncommittedConflict { reserved: String, committed: String },

    #[error("couldn't reserve {size:#x} bytes: {source}")]
    Reserve {
        size: usize,
        #[source]
        source: io::Error,
    },

    #[error("reservation landed at {actual:#x}, mapper requires {requested:#x}")]
    Misplaced { requested: usize, actual: usize },

    #[error("range '{name}' maps to {host:#x}, outside the reservation")]
    MapperOutOfSpan { name: String, host: usize },

    #[error("couldn't commit range '{name}': {source}")]
    Commit {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("couldn't protect range '{name}': {source}")]
    Protect {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("couldn't release the reservation: {0}")]
    Release(#[source] io::Error),

    #[error("bank seed {offset:#x}..{end:#x} outside source of {len:#x} bytes")]
    BankSeedOutOfRange { offset: usize, end: usize, len: usize },
}

pub type VmemResult<T> = Result<T, VmemError>;
