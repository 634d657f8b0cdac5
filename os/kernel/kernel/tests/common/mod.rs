#![allow(dead_code)]

use core::cell::UnsafeCell;
use kernel_memory_addresses::PhysicalAddress;
use kernel_pmm::PhysMapper;

/// A heap buffer standing in for physical memory at `base`.
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
}

impl PhysMapper for ScratchMapper {
    unsafe fn phys_to_mut_bytes<'a>(&self, pa: PhysicalAddress, len: usize) -> &'a mut [u8] {
        let offset = usize::try_from(pa.offset_from(self.base).expect("below scratch window")).unwrap();
        let memory = unsafe { &mut *self.memory.get() };
        assert!(offset + len <= memory.len(), "scratch window too small");
        unsafe { core::slice::from_raw_parts_mut(memory.as_mut_ptr().add(offset), len) }
    }
}

/// Boot information with a single memory-map tag.
pub fn mmap_info(entries: &[(u64, u64, u32)]) -> Vec<u8> {
    let mut buf = vec![0u8; 8];
    let tag_size = 16 + 24 * entries.len();
    for v in [6u32, u32::try_from(tag_size).unwrap(), 24, 0] {
        buf.extend_from_slice(&v.to_le_bytes());
    }
    for &(base, len, kind) in entries {
        buf.extend_from_slice(&base.to_le_bytes());
        buf.extend_from_slice(&len.to_le_bytes());
        buf.extend_from_slice(&kind.to_le_bytes());
        buf.extend_from_slice(&0u32.to_le_bytes());
    }
    for v in [0u32, 8] {
        buf.extend_from_slice(&v.to_le_bytes());
    }
    let total = u32::try_from(buf.len()).unwrap();
    buf[0..4].copy_from_slice(&total.to_le_bytes());
    buf
}
