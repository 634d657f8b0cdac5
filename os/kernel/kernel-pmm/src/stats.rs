use crate::Granularity;
use core::fmt;
use kernel_memory_addresses::KIB;

/// Snapshot of allocator usage.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct PmmStats {
    pub granularity: Granularity,
    pub unit_size: u64,
    pub total_units: usize,
    pub used_units: u64,
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub free_bytes: u64,
}

impl fmt::Display for PmmStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} KiB total, {} KiB used, {} KiB free ({} of {} {} units of {} KiB used)",
            self.total_bytes / KIB,
            self.used_bytes / KIB,
            self.free_bytes / KIB,
            self.used_units,
            self.total_units,
            self.granularity,
            self.unit_size / KIB
        )
    }
}
