#![allow(dead_code)]

use core::cell::UnsafeCell;
use kernel_memory_addresses::PhysicalAddress;
use kernel_pmm::PhysMapper;

/// Stands in for a window of physical memory starting at `base`.
pub struct ScratchMapper {
    base: PhysicalAddress,
    memory: UnsafeCell<Vec<u8>>,
}

impl ScratchMapper {
    pub fn new(base: PhysicalAddress, len: usize) -> Self {
        Self {
            base,
            memory: UnsafeCell::new(vec![0; len]),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        unsafe { &*self.memory.get() }
    }
}

impl PhysMapper for ScratchMapper {
    unsafe fn phys_to_mut_bytes<'a>(&self, pa: PhysicalAddress, len: usize) -> &'a mut [u8] {
        let offset = pa.offset_from(self.base).expect("address below scratch window");
        let offset = usize::try_from(offset).unwrap();
        let memory = unsafe { &mut *self.memory.get() };
        assert!(offset + len <= memory.len(), "scratch window too small");
        unsafe { core::slice::from_raw_parts_mut(memory.as_mut_ptr().add(offset), len) }
    }
}
