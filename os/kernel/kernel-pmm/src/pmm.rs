//! # Bitmap Physical Memory Manager
//!
//! Construction starts from an all-used bitmap, releases every unit that lies
//! entirely inside a usable region, then reserves the kernel image window and
//! the bitmap's own footprint again. A unit straddling a region boundary
//! stays reserved.
//!
//! Usage is accounted in pages so both granularities report comparable
//! numbers: a coarse unit moves the counter by [`COARSE_BLOCK_PAGES`].
//!
//! There is no locking. The manager is owned by the boot sequence and
//! handed out by `&mut`; sharing it across cores or with interrupt handlers
//! requires wrapping it in a lock around `alloc`/`free`.
//!
//! [`COARSE_BLOCK_PAGES`]: kernel_info::memory::COARSE_BLOCK_PAGES

use crate::bitmap::UnitBitmap;
use crate::phys_mapper::PhysMapper;
use crate::{FreeViolation, Granularity, MapInvalid, PmmConfig, PmmLayout, PmmStats, SelfTestError};
use kernel_bootmap::UsableRegion;
use kernel_info::memory::PAGE_SIZE;
use kernel_memory_addresses::{PhysicalAddress, PhysicalRange};

pub struct PhysicalMemoryManager<'a> {
    layout: PmmLayout,
    bitmap: UnitBitmap<'a>,
    used_pages: u64,
}

impl<'a> PhysicalMemoryManager<'a> {
    /// Build the allocator for `layout` over caller-provided bitmap `storage`.
    ///
    /// # Errors
    /// [`MapInvalid::StorageTooSmall`] if `storage` is shorter than [`PmmLayout::bitmap_bytes`].
    pub fn new(layout: PmmLayout, storage: &'a mut [u8]) -> Result<Self, MapInvalid> {
        let bitmap = UnitBitmap::new(storage, layout.total_units())?;
        let pages_per_unit = layout.granularity().pages_per_unit();
        let mut pmm = Self {
            layout,
            bitmap,
            used_pages: layout.total_units() as u64 * pages_per_unit,
        };

        for region in layout.usable_regions() {
            let units = layout.units_within(region);
            let released = pmm.bitmap.clear_range(units.clone());
            pmm.used_pages -= released as u64 * pages_per_unit;
            log::trace!("released {released} unit(s) {units:?} of {region}");
        }

        let reserved = layout.reserved();
        let units = layout.units_touching(&reserved);
        let claimed = pmm.bitmap.set_range(units.clone());
        pmm.used_pages += claimed as u64 * pages_per_unit;
        log::debug!("reserved {claimed} unit(s) {units:?} for kernel and bitmap {reserved}");

        log::info!(
            "PMM ({}): managing {} with {} unit(s) of {:#x} bytes, bitmap {} bytes at {}",
            layout.granularity(),
            layout.managed_range(),
            layout.total_units(),
            layout.unit_size(),
            layout.bitmap_bytes(),
            layout.bitmap_phys()
        );
        Ok(pmm)
    }

    /// Compute the layout for `regions` and place the bitmap at its fixed physical address.
    ///
    /// # Errors
    /// Any [`MapInvalid`] reported by [`PmmLayout::compute`].
    ///
    /// # Safety
    /// The bitmap range `[bitmap_phys, bitmap_phys + bitmap_bytes)` must be
    /// reachable through `mapper` and not used by anything else for `'a`.
    pub unsafe fn init_from_map<M: PhysMapper>(
        regions: &[UsableRegion],
        granularity: Granularity,
        config: &PmmConfig,
        mapper: &M,
    ) -> Result<Self, MapInvalid> {
        let layout = PmmLayout::compute(regions, granularity, config)?;
        // SAFETY: The caller vouches for the bitmap range.
        let storage = unsafe { mapper.phys_to_mut_bytes(layout.bitmap_phys(), layout.bitmap_bytes()) };
        Self::new(layout, storage)
    }

    /// Initialize from a single emulated usable region `[min_phys, emulated_end)`.
    ///
    /// Used when the bootloader provided no usable memory map.
    ///
    /// # Errors
    /// Any [`MapInvalid`] reported by [`PmmLayout::compute`].
    ///
    /// # Safety
    /// As for [`init_from_map`](Self::init_from_map).
    pub unsafe fn init_emulated<M: PhysMapper>(
        granularity: Granularity,
        config: &PmmConfig,
        mapper: &M,
    ) -> Result<Self, MapInvalid> {
        let len = config
            .emulated_end
            .offset_from(config.min_phys)
            .unwrap_or(0);
        let region = UsableRegion::new(config.min_phys, len);
        log::info!("PMM: emulating usable memory {}", region.range());
        // SAFETY: Forwarded from the caller.
        unsafe { Self::init_from_map(&[region], granularity, config, mapper) }
    }

    /// Allocate one unit. `None` when every unit is in use.
    pub fn alloc(&mut self) -> Option<PhysicalAddress> {
        let Some(index) = self.bitmap.first_clear() else {
            log::debug!("PMM: out of physical memory");
            return None;
        };
        self.bitmap.replace(index, true);
        self.used_pages += self.pages_per_unit();

        let addr = self.layout.unit_base(index);
        log::trace!("PMM: alloc {addr} (unit {index})");
        Some(addr)
    }

    /// Release a unit previously returned by [`alloc`](Self::alloc).
    ///
    /// The allocator is left unchanged when a violation is reported.
    ///
    /// # Errors
    /// A [`FreeViolation`] if `addr` is outside the managed range, not
    /// aligned to the unit size, inside the kernel/bitmap window, outside
    /// usable memory, or not allocated.
    pub fn try_free(&mut self, addr: PhysicalAddress) -> Result<(), FreeViolation> {
        let range = self.layout.managed_range();
        let Some(index) = self.layout.unit_index(addr) else {
            return Err(FreeViolation::OutOfRange { addr, range });
        };

        let unit_size = self.layout.unit_size();
        if !addr.is_aligned(unit_size) {
            return Err(FreeViolation::Misaligned { addr, unit_size });
        }

        let window = self.layout.reserved();
        if window.overlaps(&self.layout.unit_range(index)) {
            return Err(FreeViolation::Reserved { addr, window });
        }

        // Holes and boundary units keep their bit set without ever being allocated.
        if !self.layout.is_usable_unit(index) {
            return Err(FreeViolation::NotUsable { addr });
        }

        if !self.bitmap.is_set(index) {
            return Err(FreeViolation::DoubleFree { addr });
        }

        self.bitmap.replace(index, false);
        self.used_pages -= self.pages_per_unit();
        log::trace!("PMM: free {addr} (unit {index})");
        Ok(())
    }

    /// Release a unit previously returned by [`alloc`](Self::alloc).
    ///
    /// # Panics
    /// On any [`FreeViolation`]. Allocator state cannot be trusted after one.
    pub fn free(&mut self, addr: PhysicalAddress) {
        if let Err(e) = self.try_free(addr) {
            log::error!("PMM: {e}");
            panic!("pmm_free: {e}");
        }
    }

    /// Whether the unit containing `addr` is allocated or reserved. `None` if unmanaged.
    #[must_use]
    pub fn is_used(&self, addr: PhysicalAddress) -> Option<bool> {
        self.layout.unit_index(addr).map(|i| self.bitmap.is_set(i))
    }

    /// Allocate one unit and release it again, checking the free byte count is unchanged.
    ///
    /// # Errors
    /// A [`SelfTestError`] describing which step failed.
    pub fn self_test(&mut self) -> Result<(), SelfTestError> {
        let before = self.free_bytes();
        let addr = self.alloc().ok_or(SelfTestError::AllocFailed)?;
        self.try_free(addr)?;
        let after = self.free_bytes();
        if before != after {
            return Err(SelfTestError::Leaked { before, after });
        }
        log::info!("PMM: self-test passed ({addr})");
        Ok(())
    }

    #[inline]
    #[must_use]
    pub const fn layout(&self) -> &PmmLayout {
        &self.layout
    }

    #[inline]
    #[must_use]
    pub const fn granularity(&self) -> Granularity {
        self.layout.granularity()
    }

    #[inline]
    #[must_use]
    pub const fn managed_range(&self) -> PhysicalRange {
        self.layout.managed_range()
    }

    #[inline]
    #[must_use]
    pub const fn total_units(&self) -> usize {
        self.layout.total_units()
    }

    /// Units currently unavailable, including the reserved window.
    #[inline]
    #[must_use]
    pub const fn used_units(&self) -> u64 {
        self.used_pages / self.pages_per_unit()
    }

    #[inline]
    #[must_use]
    pub const fn used_pages(&self) -> u64 {
        self.used_pages
    }

    #[inline]
    #[must_use]
    pub const fn total_bytes(&self) -> u64 {
        self.layout.total_units() as u64 * self.layout.unit_size()
    }

    #[inline]
    #[must_use]
    pub const fn used_bytes(&self) -> u64 {
        self.used_pages * PAGE_SIZE
    }

    #[inline]
    #[must_use]
    pub const fn free_bytes(&self) -> u64 {
        self.total_bytes().saturating_sub(self.used_bytes())
    }

    #[must_use]
    pub const fn stats(&self) -> PmmStats {
        PmmStats {
            granularity: self.granularity(),
            unit_size: self.layout.unit_size(),
            total_units: self.total_units(),
            used_units: self.used_units(),
            total_bytes: self.total_bytes(),
            used_bytes: self.used_bytes(),
            free_bytes: self.free_bytes(),
        }
    }

    const fn pages_per_unit(&self) -> u64 {
        self.layout.granularity().pages_per_unit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel_memory_addresses::MIB;

    const PAGE: u64 = 4096;

    fn pa(v: u64) -> PhysicalAddress {
        PhysicalAddress::new(v)
    }

    fn build<'a>(
        regions: &[UsableRegion],
        granularity: Granularity,
        storage: &'a mut Vec<u8>,
    ) -> PhysicalMemoryManager<'a> {
        let layout = PmmLayout::compute(regions, granularity, &PmmConfig::default()).expect("layout");
        storage.resize(layout.bitmap_bytes(), 0);
        PhysicalMemoryManager::new(layout, storage).expect("pmm")
    }

    #[test]
    fn usage_accounting_is_in_pages() {
        let regions = [UsableRegion::new(pa(64 * MIB), 4 * MIB)];
        let mut storage = Vec::new();
        let mut pmm = build(&regions, Granularity::Coarse, &mut storage);
        assert_eq!(pmm.total_units(), 32);
        assert_eq!(pmm.used_pages(), 0);

        let a = pmm.alloc().expect("block");
        assert_eq!(pmm.used_pages(), 32);
        assert_eq!(pmm.used_units(), 1);
        assert_eq!(pmm.used_bytes(), 128 * 1024);
        pmm.free(a);
        assert_eq!(pmm.used_pages(), 0);
    }

    #[test]
    fn violations_leave_state_untouched() {
        let regions = [UsableRegion::new(pa(64 * MIB), 16 * PAGE)];
        let mut storage = Vec::new();
        let mut pmm = build(&regions, Granularity::Fine, &mut storage);
        let a = pmm.alloc().expect("page");
        let used = pmm.used_pages();

        assert!(matches!(
            pmm.try_free(pa(a.as_u64() + 8)),
            Err(FreeViolation::Misaligned { .. })
        ));
        assert!(matches!(
            pmm.try_free(pa(a.as_u64() + PAGE)),
            Err(FreeViolation::DoubleFree { .. })
        ));
        assert!(matches!(
            pmm.try_free(pa(128 * MIB)),
            Err(FreeViolation::OutOfRange { .. })
        ));
        assert_eq!(pmm.used_pages(), used);
        assert_eq!(pmm.alloc().map(|p| p.as_u64()), Some(a.as_u64() + PAGE));
        assert_eq!(pmm.is_used(a), Some(true));
    }

    #[test]
    fn stats_snapshot() {
        let regions = [UsableRegion::new(pa(64 * MIB), 16 * PAGE)];
        let mut storage = Vec::new();
        let mut pmm = build(&regions, Granularity::Fine, &mut storage);
        pmm.alloc().expect("page");

        let stats = pmm.stats();
        assert_eq!(stats.total_bytes, 16 * PAGE);
        assert_eq!(stats.used_bytes, PAGE);
        assert_eq!(stats.free_bytes, 15 * PAGE);
        assert_eq!(stats.used_units, 1);
        assert_eq!(
            stats.to_string(),
            "64 KiB total, 4 KiB used, 60 KiB free (1 of 16 fine units of 4 KiB used)"
        );
    }
}
