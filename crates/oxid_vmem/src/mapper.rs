// crates/oxid_vmem/src/mapper.rs
use oxide_core::GuestAddress;

// ============================================================================
//  ESTRATEGIAS DE MAPEO (GUEST -> HOST)
// ============================================================================

/// Stateless guest-to-host address translation.
///
/// `origin` is the host address that guest address zero corresponds to in the
/// current reservation. Implementations must be pure: the same origin and
/// address always give the same host address, with no table walk.
pub trait AddressMapper {
    /// Host address the reservation has to start at for this mapping to hold,
    /// given the page-aligned guest start of the span. `None` lets the host
    /// choose.
    fn placement(_span_start: usize) -> Option<usize> {
        None
    }

    fn map<A: GuestAddress>(origin: usize, address: A) -> usize;
}

/// `host = origin + guest`. Works wherever the host puts the reservation.
#[derive(Debug, Clone, Copy, Default)]
pub struct OffsetMapper;

impl AddressMapper for OffsetMapper {
    #[inline(always)]
    fn map<A: GuestAddress>(origin: usize, address: A) -> usize {
        origin.wrapping_add(address.to_usize())
    }
}

/// Flat overlay: `host = BASE | guest`.
///
/// The reservation is pinned at `BASE + span_start`, so `BASE` must have every
/// bit the guest can set clear. One OR per access, no dependency on `origin`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OverlayMapper<const BASE: usize>;

impl<const BASE: usize> AddressMapper for OverlayMapper<BASE> {
    fn placement(span_start: usize) -> Option<usize> {
        Some(BASE | span_start)
    }

    #[inline(always)]
    fn map<A: GuestAddress>(_origin: usize, address: A) -> usize {
        BASE | address.to_usize()
    }
}

/// Mirrored decoding: only the guest bits in `MASK` select a location, so
/// every alias of an address lands on the same host byte.
#[derive(Debug, Clone, Copy, Default)]
pub struct MirrorMapper<const MASK: u64>;

impl<const MASK: u64> AddressMapper for MirrorMapper<MASK> {
    #[inline(always)]
    fn map<A: GuestAddress>(origin: usize, address: A) -> usize {
        origin.wrapping_add((address.to_u64() & MASK) as usize)
    }
}
