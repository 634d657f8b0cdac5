//! # Physical Region Containers
//!
//! All containers here are fixed-capacity arrays: the frame allocator is built
//! from their contents, so they cannot depend on a heap.

use core::fmt;
use kernel_info::boot::memory_kind;
use kernel_info::memory::MAX_RAW_REGIONS;
use kernel_memory_addresses::{PhysicalAddress, PhysicalRange};

/// What a physical region is used for.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum RegionKind {
    /// General-purpose RAM.
    Usable,
    Reserved,
    AcpiReclaimable,
    AcpiNvs,
    BadRam,
    /// Memory occupied by a boot module.
    Module,
    /// The linear framebuffer.
    Framebuffer,
    /// Any firmware kind this kernel does not know about.
    Other(u32),
}

impl RegionKind {
    #[must_use]
    pub const fn from_raw(kind: u32) -> Self {
        match kind {
            memory_kind::AVAILABLE => Self::Usable,
            memory_kind::RESERVED => Self::Reserved,
            memory_kind::ACPI_RECLAIMABLE => Self::AcpiReclaimable,
            memory_kind::ACPI_NVS => Self::AcpiNvs,
            memory_kind::BAD_RAM => Self::BadRam,
            memory_kind::MODULE => Self::Module,
            memory_kind::FRAMEBUFFER => Self::Framebuffer,
            other => Self::Other(other),
        }
    }

    #[must_use]
    pub const fn as_raw(self) -> u32 {
        match self {
            Self::Usable => memory_kind::AVAILABLE,
            Self::Reserved => memory_kind::RESERVED,
            Self::AcpiReclaimable => memory_kind::ACPI_RECLAIMABLE,
            Self::AcpiNvs => memory_kind::ACPI_NVS,
            Self::BadRam => memory_kind::BAD_RAM,
            Self::Module => memory_kind::MODULE,
            Self::Framebuffer => memory_kind::FRAMEBUFFER,
            Self::Other(other) => other,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_usable(self) -> bool {
        matches!(self, Self::Usable)
    }
}

impl fmt::Display for RegionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Usable => f.write_str("usable"),
            Self::Reserved => f.write_str("reserved"),
            Self::AcpiReclaimable => f.write_str("ACPI reclaimable"),
            Self::AcpiNvs => f.write_str("ACPI NVS"),
            Self::BadRam => f.write_str("bad RAM"),
            Self::Module => f.write_str("module"),
            Self::Framebuffer => f.write_str("framebuffer"),
            Self::Other(kind) => write!(f, "type {kind}"),
        }
    }
}

/// A region as discovered in the boot information, `[start, end)`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct RawRegion {
    pub start: PhysicalAddress,
    pub end: PhysicalAddress,
    pub kind: RegionKind,
}

impl RawRegion {
    const PLACEHOLDER: Self = Self {
        start: PhysicalAddress::zero(),
        end: PhysicalAddress::zero(),
        kind: RegionKind::Reserved,
    };

    /// A region, or `None` if it is empty or inverted.
    #[must_use]
    pub const fn new(start: PhysicalAddress, end: PhysicalAddress, kind: RegionKind) -> Option<Self> {
        if start.as_u64() < end.as_u64() {
            Some(Self { start, end, kind })
        } else {
            None
        }
    }

    #[inline]
    #[must_use]
    pub const fn range(&self) -> PhysicalRange {
        PhysicalRange::new(self.start, self.end)
    }
}

impl fmt::Display for RawRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.range(), self.kind)
    }
}

/// Bounded, ordered list of regions.
///
/// Insertions beyond capacity are dropped and counted, not reported as errors.
#[derive(Debug, Clone)]
pub struct RegionList<const N: usize = MAX_RAW_REGIONS> {
    entries: [RawRegion; N],
    len: usize,
    dropped: usize,
}

/// Regions in discovery order.
pub type RawRegionList = RegionList<MAX_RAW_REGIONS>;

impl<const N: usize> RegionList<N> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: [RawRegion::PLACEHOLDER; N],
            len: 0,
            dropped: 0,
        }
    }

    /// Insert `[start, end)` of the given kind.
    ///
    /// Empty and inverted ranges are discarded. Returns whether the region was stored.
    pub fn insert(&mut self, start: PhysicalAddress, end: PhysicalAddress, kind: RegionKind) -> bool {
        match RawRegion::new(start, end, kind) {
            Some(region) => self.push(region),
            None => false,
        }
    }

    pub(crate) fn push(&mut self, region: RawRegion) -> bool {
        if self.len == N {
            self.dropped += 1;
            return false;
        }
        self.entries[self.len] = region;
        self.len += 1;
        true
    }

    pub(crate) fn last_mut(&mut self) -> Option<&mut RawRegion> {
        self.as_mut_slice().last_mut()
    }

    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of insertions rejected because the list was full.
    #[inline]
    #[must_use]
    pub const fn dropped(&self) -> usize {
        self.dropped
    }

    #[must_use]
    pub fn as_slice(&self) -> &[RawRegion] {
        &self.entries[..self.len]
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [RawRegion] {
        &mut self.entries[..self.len]
    }

    pub fn iter(&self) -> core::slice::Iter<'_, RawRegion> {
        self.as_slice().iter()
    }
}

impl<const N: usize> Default for RegionList<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, const N: usize> IntoIterator for &'a RegionList<N> {
    type Item = &'a RawRegion;
    type IntoIter = core::slice::Iter<'a, RawRegion>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Regions sorted by start with overlapping and touching neighbors coalesced.
///
/// Only produced by [`canonicalize`](crate::canonical::canonicalize); read-only afterwards.
#[derive(Debug, Clone)]
pub struct MergedRegionList<const N: usize = MAX_RAW_REGIONS>(RegionList<N>);

impl<const N: usize> MergedRegionList<N> {
    pub(crate) const fn from_merged(list: RegionList<N>) -> Self {
        Self(list)
    }

    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[RawRegion] {
        self.0.as_slice()
    }

    pub fn iter(&self) -> core::slice::Iter<'_, RawRegion> {
        self.0.iter()
    }
}

impl<'a, const N: usize> IntoIterator for &'a MergedRegionList<N> {
    type Item = &'a RawRegion;
    type IntoIter = core::slice::Iter<'a, RawRegion>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A usable RAM region handed to the frame allocator, `[addr, addr + len)`.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct UsableRegion {
    pub addr: PhysicalAddress,
    pub len: u64,
}

impl UsableRegion {
    /// Zero-length filler for output arrays.
    pub const EMPTY: Self = Self::new(PhysicalAddress::zero(), 0);

    #[inline]
    #[must_use]
    pub const fn new(addr: PhysicalAddress, len: u64) -> Self {
        Self { addr, len }
    }

    /// End of the region; saturates instead of wrapping.
    #[inline]
    #[must_use]
    pub const fn end(&self) -> PhysicalAddress {
        self.addr.saturating_add(self.len)
    }

    #[inline]
    #[must_use]
    pub const fn range(&self) -> PhysicalRange {
        PhysicalRange::from_base_len(self.addr, self.len)
    }

    /// Always [`RegionKind::Usable`].
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> RegionKind {
        RegionKind::Usable
    }
}

impl fmt::Display for UsableRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} KiB)", self.range(), self.len / 1024)
    }
}
