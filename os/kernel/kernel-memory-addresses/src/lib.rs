//! # Physical Memory Address Types
//!
//! Strongly typed wrappers for physical addresses and address ranges used by
//! the boot memory-map parser and the physical memory manager.
//!
//! ## Overview
//!
//! | Type | Description |
//! |------|-------------|
//! | [`PhysicalAddress`] | A raw 64-bit physical address (RAM or MMIO). |
//! | [`PhysicalRange`] | A half-open interval `[start, end)` of physical addresses. |
//!
//! Both types are `#[repr(transparent)]` / plain-old-data, `Copy`, and
//! totally ordered so they can be sorted and compared directly.
//!
//! All arithmetic that could overflow on firmware-supplied values is exposed
//! in a checked or saturating flavor; nothing in this crate wraps silently.
//!
//! ## Typical Usage
//!
//! ```rust
//! # use kernel_memory_addresses::*;
//! let region = PhysicalRange::from_base_len(PhysicalAddress::new(0x10_0000), 0x7EF_0000);
//! assert_eq!(region.end().as_u64(), 0x7FF_0000);
//! assert!(region.contains(PhysicalAddress::new(0x20_0000)));
//!
//! let aligned = PhysicalAddress::new(0x10_0123).align_up(4096);
//! assert_eq!(aligned, Some(PhysicalAddress::new(0x10_1000)));
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![deny(unsafe_code)]

mod physical_address;
mod physical_range;

pub use physical_address::PhysicalAddress;
pub use physical_range::PhysicalRange;

/// One kibibyte.
pub const KIB: u64 = 1024;

/// One mebibyte.
pub const MIB: u64 = 1024 * KIB;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alignment_helpers() {
        let a = PhysicalAddress::new(0x12345);
        assert_eq!(a.align_up(4096), Some(PhysicalAddress::new(0x13000)));
        assert!(!a.is_aligned(4096));
        assert!(PhysicalAddress::new(0x2_0000).is_aligned(128 * KIB));
    }

    #[test]
    fn align_up_reports_overflow() {
        let a = PhysicalAddress::new(u64::MAX - 5);
        assert_eq!(a.align_up(4096), None);
    }

    #[test]
    fn range_from_base_len_saturates() {
        let r = PhysicalRange::from_base_len(PhysicalAddress::new(u64::MAX - 10), 100);
        assert_eq!(r.end().as_u64(), u64::MAX);
        assert_eq!(r.len(), 10);
    }

    #[test]
    fn range_queries() {
        let r = PhysicalRange::new(PhysicalAddress::new(MIB), PhysicalAddress::new(2 * MIB));
        assert_eq!(r.len(), MIB);
        assert!(!r.is_empty());
        assert!(r.contains(PhysicalAddress::new(MIB)));
        assert!(!r.contains(PhysicalAddress::new(2 * MIB)));

        let inner = PhysicalRange::from_base_len(PhysicalAddress::new(MIB + 4096), 4096);
        assert!(r.contains_range(&inner));

        let straddling = PhysicalRange::from_base_len(PhysicalAddress::new(2 * MIB - 4096), 8192);
        assert!(!r.contains_range(&straddling));
        assert!(r.overlaps(&straddling));
    }

    #[test]
    fn adjacent_ranges_do_not_overlap() {
        let a = PhysicalRange::new(PhysicalAddress::new(0), PhysicalAddress::new(MIB));
        let b = PhysicalRange::new(PhysicalAddress::new(MIB), PhysicalAddress::new(2 * MIB));
        assert!(!a.overlaps(&b));
        assert!(!a.contains_range(&b));
    }

    #[test]
    fn inverted_range_is_empty() {
        let r = PhysicalRange::new(PhysicalAddress::new(2 * MIB), PhysicalAddress::new(MIB));
        assert!(r.is_empty());
        assert_eq!(r.len(), 0);
    }
}
