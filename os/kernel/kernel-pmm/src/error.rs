use kernel_memory_addresses::{PhysicalAddress, PhysicalRange};

/// The usable-region list cannot back a frame allocator.
#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum MapInvalid {
    #[error("memory map contains no usable regions")]
    EmptyMap,
    #[error("{count} usable regions exceed the limit of {max}")]
    TooManyRegions { count: usize, max: usize },
    #[error("no usable physical range between {start} and {end}")]
    EmptyRange {
        start: PhysicalAddress,
        end: PhysicalAddress,
    },
    #[error("suspicious unit count {units} (limit {max})")]
    UnitCount { units: u64, max: u64 },
    #[error("bitmap needs {required} bytes but storage holds {available}")]
    StorageTooSmall { required: usize, available: usize },
}

/// A release that would corrupt the allocator state. Fatal.
#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum FreeViolation {
    #[error("free of {addr} outside managed range {range}")]
    OutOfRange {
        addr: PhysicalAddress,
        range: PhysicalRange,
    },
    #[error("free of {addr} not aligned to unit size {unit_size:#x}")]
    Misaligned { addr: PhysicalAddress, unit_size: u64 },
    #[error("free of {addr} inside reserved window {window}")]
    Reserved {
        addr: PhysicalAddress,
        window: PhysicalRange,
    },
    #[error("free of {addr} outside usable memory")]
    NotUsable { addr: PhysicalAddress },
    #[error("double free of {addr}")]
    DoubleFree { addr: PhysicalAddress },
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum SelfTestError {
    #[error("self-test allocation failed")]
    AllocFailed,
    #[error("self-test release failed: {0}")]
    Free(#[from] FreeViolation),
    #[error("self-test leaked memory: {before} bytes free before, {after} after")]
    Leaked { before: u64, after: u64 },
}
