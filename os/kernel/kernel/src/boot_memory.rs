use crate::tracing::{trace_pmm, trace_usable_regions};
use kernel_bootmap::{UsableRegion, boot_info_bytes, parse};
use kernel_info::memory::MAX_USABLE_REGIONS;
use kernel_pmm::{
    Granularity, MapInvalid, PhysMapper, PhysicalMemoryManager, PmmConfig, SelfTestError,
};
use log::{error, info, warn};

#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum BootMemoryError {
    #[error("pmm_init: {0}")]
    Map(#[from] MapInvalid),
    #[error("pmm_self_test: {0}")]
    SelfTest(#[from] SelfTestError),
}

/// Granularity used at boot: [`Granularity::Coarse`] with the `coarse-pmm` feature, fine otherwise.
#[must_use]
pub const fn default_granularity() -> Granularity {
    if cfg!(feature = "coarse-pmm") {
        Granularity::Coarse
    } else {
        Granularity::Fine
    }
}

/// Build the physical memory manager from the boot information at `mbi`.
///
/// Falls back to the emulated map `[min_phys, emulated_end)` when the boot
/// information is missing or describes no usable memory.
///
/// # Panics
/// If no allocator can be built or the self-test fails. Boot cannot continue
/// without physical memory.
///
/// # Safety
/// As for [`try_init_physical_memory`].
pub unsafe fn init_physical_memory<'a, M: PhysMapper>(
    mbi: *const u8,
    granularity: Granularity,
    config: &PmmConfig,
    mapper: &M,
) -> PhysicalMemoryManager<'a> {
    // SAFETY: Forwarded from the caller.
    match unsafe { try_init_physical_memory(mbi, granularity, config, mapper) } {
        Ok(pmm) => pmm,
        Err(e) => {
            error!("Physical memory initialization failed: {e}");
            panic!("{e}");
        }
    }
}

/// Like [`init_physical_memory`], but reports fatal conditions instead of panicking.
///
/// # Errors
/// * [`BootMemoryError::Map`] if the (possibly emulated) map cannot back an allocator.
/// * [`BootMemoryError::SelfTest`] if the allocate/free smoke test fails.
///
/// # Safety
/// * `mbi` must be null or point to the bootloader's information block,
///   readable for at least its declared size (and at least 12 bytes).
/// * The bitmap range at `config.bitmap_phys()` must be reachable through
///   `mapper` and not used by anything else for `'a`.
pub unsafe fn try_init_physical_memory<'a, M: PhysMapper>(
    mbi: *const u8,
    granularity: Granularity,
    config: &PmmConfig,
    mapper: &M,
) -> Result<PhysicalMemoryManager<'a>, BootMemoryError> {
    info!("Initializing physical memory manager ({granularity}) ...");

    // SAFETY: The caller guarantees `mbi` is null or readable.
    let info = unsafe { boot_info_bytes(mbi) };
    let mut regions = [UsableRegion::EMPTY; MAX_USABLE_REGIONS];
    let count = parse(info, &mut regions);
    let regions = &regions[..count];

    let mut pmm = if regions.is_empty() {
        warn!("No usable memory map from bootloader; falling back to emulated memory");
        // SAFETY: The caller vouches for the bitmap range.
        unsafe { PhysicalMemoryManager::init_emulated(granularity, config, mapper)? }
    } else {
        trace_usable_regions(regions);
        // SAFETY: The caller vouches for the bitmap range.
        unsafe { PhysicalMemoryManager::init_from_map(regions, granularity, config, mapper)? }
    };

    pmm.self_test()?;
    trace_pmm(&pmm);
    Ok(pmm)
}
