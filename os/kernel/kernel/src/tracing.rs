//! # Boot memory tracing helpers

use kernel_bootmap::UsableRegion;
use kernel_pmm::PhysicalMemoryManager;
use log::info;

pub fn trace_usable_regions(regions: &[UsableRegion]) {
    let total: u64 = regions.iter().map(|r| r.len).sum();
    info!(
        "Boot memory map: {} usable region(s), {} MiB",
        regions.len(),
        total >> 20
    );
    for (i, region) in regions.iter().enumerate() {
        info!("  usable[{i:2}] {region}");
    }
}

pub fn trace_pmm(pmm: &PhysicalMemoryManager<'_>) {
    let layout = pmm.layout();
    info!(
        concat!(
            "Physical memory manager:\n",
            "  granularity = {gran} ({unit:#x} bytes per unit)\n",
            "  managed     = {range}\n",
            "  bitmap      = {bitmap_bytes} bytes at {bitmap}\n",
            "  reserved    = {reserved}\n",
            "  usage       = {stats}"
        ),
        gran = pmm.granularity(),
        unit = layout.unit_size(),
        range = pmm.managed_range(),
        bitmap_bytes = layout.bitmap_bytes(),
        bitmap = layout.bitmap_phys(),
        reserved = layout.reserved(),
        stats = pmm.stats(),
    );
}
