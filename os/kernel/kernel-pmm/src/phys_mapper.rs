//! # Physical Memory Access
//!
//! The bitmap lives in physical memory at a fixed address. How that address
//! becomes a writable slice depends on the environment: identity mapped in
//! early boot, a scratch buffer in tests.

use kernel_memory_addresses::PhysicalAddress;

pub trait PhysMapper {
    /// Borrow `len` bytes of physical memory starting at `pa`.
    ///
    /// # Safety
    /// The range must be mapped, writable, not aliased by any other live
    /// reference, and remain valid for `'a`.
    unsafe fn phys_to_mut_bytes<'a>(&self, pa: PhysicalAddress, len: usize) -> &'a mut [u8];
}

/// [`PhysMapper`] for code running with physical memory identity mapped.
pub struct IdentityPhysMapper;

impl PhysMapper for IdentityPhysMapper {
    #[allow(clippy::cast_possible_truncation)]
    unsafe fn phys_to_mut_bytes<'a>(&self, pa: PhysicalAddress, len: usize) -> &'a mut [u8] {
        let ptr = core::ptr::with_exposed_provenance_mut::<u8>(pa.as_u64() as usize);
        // SAFETY: Caller must ensure the range is identity mapped and exclusively ours.
        unsafe { core::slice::from_raw_parts_mut(ptr, len) }
    }
}
