use core::fmt;
use kernel_info::memory::{COARSE_BLOCK_PAGES, PAGE_SIZE};

/// Pages tracked per bitmap bit. Fixed for the lifetime of an allocator.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum Granularity {
    /// One bit per 4 KiB page.
    #[default]
    Fine,
    /// One bit per block of [`COARSE_BLOCK_PAGES`] pages (128 KiB).
    Coarse,
}

impl Granularity {
    #[inline]
    #[must_use]
    pub const fn pages_per_unit(self) -> u64 {
        match self {
            Self::Fine => 1,
            Self::Coarse => COARSE_BLOCK_PAGES,
        }
    }

    /// Bytes per allocation unit.
    #[inline]
    #[must_use]
    pub const fn unit_size(self) -> u64 {
        self.pages_per_unit() * PAGE_SIZE
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Fine => "fine",
            Self::Coarse => "coarse",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
