//! # Allocator Layout
//!
//! Everything about the managed physical range that can be derived from the
//! usable-region list alone, before any bitmap storage exists.
//!
//! ```text
//! phys_start (≥ min_phys, unit aligned)                    phys_start + total_units * unit_size
//! │ unit 0 │ unit 1 │ ...                       │ unit total_units - 1 │ tail ≤ phys_end
//! ```

use crate::{Granularity, MapInvalid, PmmConfig};
use core::ops::Range;
use kernel_bootmap::UsableRegion;
use kernel_info::memory::MAX_USABLE_REGIONS;
use kernel_memory_addresses::{PhysicalAddress, PhysicalRange};

const NO_RANGE: PhysicalRange = PhysicalRange::new(PhysicalAddress::zero(), PhysicalAddress::zero());

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct PmmLayout {
    granularity: Granularity,
    phys_start: PhysicalAddress,
    phys_end: PhysicalAddress,
    total_units: usize,
    bitmap_phys: PhysicalAddress,
    bitmap_bytes: usize,
    reserved: PhysicalRange,
    usable: [PhysicalRange; MAX_USABLE_REGIONS],
    usable_len: usize,
}

impl PmmLayout {
    /// Derive the layout for `regions` at the given granularity.
    ///
    /// Zero-length regions are ignored. The managed range starts at the
    /// lowest region start (but not below `config.min_phys`), rounded up to
    /// the unit size, and covers whole units up to the highest region end.
    ///
    /// # Errors
    /// * [`MapInvalid::EmptyMap`] if no region has a non-zero length.
    /// * [`MapInvalid::TooManyRegions`] if more than [`MAX_USABLE_REGIONS`] regions are non-empty.
    /// * [`MapInvalid::EmptyRange`] if the highest end is not above the start.
    /// * [`MapInvalid::UnitCount`] if the range holds no whole unit or more than `config.max_units`.
    pub fn compute(
        regions: &[UsableRegion],
        granularity: Granularity,
        config: &PmmConfig,
    ) -> Result<Self, MapInvalid> {
        let unit_size = granularity.unit_size();

        let count = regions.iter().filter(|r| r.len > 0).count();
        if count > MAX_USABLE_REGIONS {
            return Err(MapInvalid::TooManyRegions {
                count,
                max: MAX_USABLE_REGIONS,
            });
        }

        let mut usable = [NO_RANGE; MAX_USABLE_REGIONS];
        for (slot, region) in usable.iter_mut().zip(regions.iter().filter(|r| r.len > 0)) {
            *slot = region.range();
        }
        let usable_len = count;

        let mut nonempty = usable[..usable_len].iter();
        let first = nonempty.next().ok_or(MapInvalid::EmptyMap)?;
        let (lowest, highest) = nonempty.fold((first.start(), first.end()), |(lo, hi), r| {
            (lo.min(r.start()), hi.max(r.end()))
        });

        let floor = lowest.max(config.min_phys);
        let phys_start = floor.align_up(unit_size).ok_or(MapInvalid::EmptyRange {
            start: floor,
            end: highest,
        })?;
        let phys_end = highest;
        let Some(span) = phys_end.offset_from(phys_start).filter(|&span| span > 0) else {
            return Err(MapInvalid::EmptyRange {
                start: phys_start,
                end: phys_end,
            });
        };

        let units = span / unit_size;
        if units == 0 || units > config.max_units {
            return Err(MapInvalid::UnitCount {
                units,
                max: config.max_units,
            });
        }
        let total_units = usize::try_from(units).map_err(|_| MapInvalid::UnitCount {
            units,
            max: config.max_units,
        })?;

        let bitmap_phys = config.bitmap_phys();
        let bitmap_bytes = total_units.div_ceil(8);
        let reserved = PhysicalRange::new(
            config.kernel_start,
            bitmap_phys.saturating_add(bitmap_bytes as u64),
        );

        Ok(Self {
            granularity,
            phys_start,
            phys_end,
            total_units,
            bitmap_phys,
            bitmap_bytes,
            reserved,
            usable,
            usable_len,
        })
    }

    #[inline]
    #[must_use]
    pub const fn granularity(&self) -> Granularity {
        self.granularity
    }

    #[inline]
    #[must_use]
    pub const fn unit_size(&self) -> u64 {
        self.granularity.unit_size()
    }

    #[inline]
    #[must_use]
    pub const fn phys_start(&self) -> PhysicalAddress {
        self.phys_start
    }

    /// Highest end of any usable region. May lie past the last whole unit.
    #[inline]
    #[must_use]
    pub const fn phys_end(&self) -> PhysicalAddress {
        self.phys_end
    }

    #[inline]
    #[must_use]
    pub const fn total_units(&self) -> usize {
        self.total_units
    }

    #[inline]
    #[must_use]
    pub const fn bitmap_phys(&self) -> PhysicalAddress {
        self.bitmap_phys
    }

    #[inline]
    #[must_use]
    pub const fn bitmap_bytes(&self) -> usize {
        self.bitmap_bytes
    }

    /// Kernel image window plus the bitmap's own footprint.
    #[inline]
    #[must_use]
    pub const fn reserved(&self) -> PhysicalRange {
        self.reserved
    }

    /// The non-empty usable regions the layout was computed from, in input order.
    #[must_use]
    pub fn usable_regions(&self) -> &[PhysicalRange] {
        &self.usable[..self.usable_len]
    }

    /// The range covered by bitmap units.
    #[must_use]
    pub const fn managed_range(&self) -> PhysicalRange {
        PhysicalRange::from_base_len(self.phys_start, self.total_units as u64 * self.unit_size())
    }

    /// Start address of unit `index`.
    #[must_use]
    pub const fn unit_base(&self, index: usize) -> PhysicalAddress {
        self.phys_start.saturating_add(index as u64 * self.unit_size())
    }

    #[must_use]
    pub const fn unit_range(&self, index: usize) -> PhysicalRange {
        PhysicalRange::from_base_len(self.unit_base(index), self.unit_size())
    }

    /// Index of the unit containing `addr`, if it is managed.
    #[must_use]
    pub fn unit_index(&self, addr: PhysicalAddress) -> Option<usize> {
        if !self.managed_range().contains(addr) {
            return None;
        }
        Some(self.units_before(addr, false))
    }

    /// Whether unit `index` lies entirely inside one usable region.
    ///
    /// Units in holes between regions, or straddling a region boundary, never
    /// become allocatable.
    #[must_use]
    pub fn is_usable_unit(&self, index: usize) -> bool {
        if index >= self.total_units {
            return false;
        }
        let unit = self.unit_range(index);
        self.usable_regions().iter().any(|r| r.contains_range(&unit))
    }

    /// Units lying entirely inside `range`.
    #[must_use]
    pub fn units_within(&self, range: &PhysicalRange) -> Range<usize> {
        let first = self.units_before(range.start(), true);
        let last = self.units_before(range.end(), false);
        first..last.max(first)
    }

    /// Units sharing at least one byte with `range`.
    #[must_use]
    pub fn units_touching(&self, range: &PhysicalRange) -> Range<usize> {
        if range.is_empty() {
            return 0..0;
        }
        let first = self.units_before(range.start(), false);
        let last = self.units_before(range.end(), true);
        first..last.max(first)
    }

    /// Number of unit boundaries in `[phys_start, addr]`, clamped to the bitmap.
    fn units_before(&self, addr: PhysicalAddress, round_up: bool) -> usize {
        let offset = addr.offset_from(self.phys_start).unwrap_or(0);
        let units = if round_up {
            offset.div_ceil(self.unit_size())
        } else {
            offset / self.unit_size()
        };
        usize::try_from(units)
            .unwrap_or(usize::MAX)
            .min(self.total_units)
    }
}
