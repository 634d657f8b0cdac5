use kernel_info::memory::{
    EMULATED_MEMORY_END, KERNEL_IMAGE_SIZE, KERNEL_PHYS_START, MAX_TRACKED_UNITS, MIN_PHYS,
};
use kernel_memory_addresses::PhysicalAddress;

/// Physical layout knobs of the frame allocator.
///
/// [`Default`] reflects the boot layout in [`kernel_info::memory`]; tests
/// construct their own.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct PmmConfig {
    /// Nothing below this address is ever managed.
    pub min_phys: PhysicalAddress,
    /// Start of the kernel image window.
    pub kernel_start: PhysicalAddress,
    /// Size of the kernel image window. The bitmap is placed directly after it.
    pub kernel_size: u64,
    /// End of the single region used by [`init_emulated`](crate::PhysicalMemoryManager::init_emulated).
    pub emulated_end: PhysicalAddress,
    /// Maps describing more units than this are rejected as corrupt.
    pub max_units: u64,
}

impl PmmConfig {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            min_phys: PhysicalAddress::new(MIN_PHYS),
            kernel_start: PhysicalAddress::new(KERNEL_PHYS_START),
            kernel_size: KERNEL_IMAGE_SIZE,
            emulated_end: PhysicalAddress::new(EMULATED_MEMORY_END),
            max_units: MAX_TRACKED_UNITS,
        }
    }

    /// Physical address of the allocation bitmap.
    #[inline]
    #[must_use]
    pub const fn bitmap_phys(&self) -> PhysicalAddress {
        self.kernel_start.saturating_add(self.kernel_size)
    }
}

impl Default for PmmConfig {
    fn default() -> Self {
        Self::new()
    }
}
