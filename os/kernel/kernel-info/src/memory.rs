//! # Physical Memory Layout

use kernel_memory_addresses::MIB;

/// Base page size in bytes.
pub const PAGE_SIZE: u64 = 4096;

/// Lowest physical address handed to the frame allocator.
///
/// Everything below is legacy/low memory (IVT, BDA, EBDA, VGA, option ROMs).
pub const MIN_PHYS: u64 = MIB;

/// Physical load address of the kernel image.
pub const KERNEL_PHYS_START: u64 = MIN_PHYS;

/// Size of the window reserved for the kernel image.
pub const KERNEL_IMAGE_SIZE: u64 = 2 * MIB;

/// Physical placement of the allocation bitmap, directly after the image window.
pub const BITMAP_PHYS: u64 = KERNEL_PHYS_START + KERNEL_IMAGE_SIZE;

/// End of the single region emulated when no memory map is available.
pub const EMULATED_MEMORY_END: u64 = 1024 * MIB;

/// Pages per bitmap bit under coarse granularity.
pub const COARSE_BLOCK_PAGES: u64 = 32;

/// Upper bound on the number of bitmap units; larger maps are treated as corrupt.
pub const MAX_TRACKED_UNITS: u64 = 1 << 30;

/// Capacity of the raw and merged region lists.
pub const MAX_RAW_REGIONS: usize = 32;

/// Capacity of the usable-region array handed from the parser to the PMM.
pub const MAX_USABLE_REGIONS: usize = 32;

const _: () = assert!(PAGE_SIZE.is_power_of_two());
const _: () = assert!(COARSE_BLOCK_PAGES.is_power_of_two());
const _: () = assert!(MIN_PHYS % PAGE_SIZE == 0);
const _: () = assert!(BITMAP_PHYS % PAGE_SIZE == 0);
const _: () = assert!(EMULATED_MEMORY_END > BITMAP_PHYS);
