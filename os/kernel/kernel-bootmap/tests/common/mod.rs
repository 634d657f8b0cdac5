#![allow(dead_code)]

/// Builds little-endian boot information blocks tag by tag.
pub struct InfoBuilder {
    buf: Vec<u8>,
}

impl InfoBuilder {
    pub fn new() -> Self {
        Self { buf: vec![0; 8] }
    }

    fn u32(&mut self, v: u32) -> &mut Self {
        self.buf.extend_from_slice(&v.to_le_bytes());
        self
    }

    fn u64(&mut self, v: u64) -> &mut Self {
        self.buf.extend_from_slice(&v.to_le_bytes());
        self
    }

    fn pad(&mut self) -> &mut Self {
        while self.buf.len() % 8 != 0 {
            self.buf.push(0);
        }
        self
    }

    /// Memory-map tag with the given declared entry size; entries are written `stride` apart.
    pub fn mmap_with(mut self, entry_size: u32, stride: usize, entries: &[(u64, u64, u32)]) -> Self {
        let size = 16 + stride * entries.len();
        self.u32(6).u32(u32::try_from(size).unwrap()).u32(entry_size).u32(0);
        for &(base, len, kind) in entries {
            self.u64(base).u64(len).u32(kind);
            self.buf.extend(std::iter::repeat_n(0u8, stride - 20));
        }
        self.pad();
        self
    }

    pub fn mmap(self, entries: &[(u64, u64, u32)]) -> Self {
        self.mmap_with(24, 24, entries)
    }

    pub fn module(mut self, start: u32, end: u32) -> Self {
        self.u32(3).u32(16 + 7).u32(start).u32(end);
        self.buf.extend_from_slice(b"initrd\0");
        self.pad();
        self
    }

    pub fn framebuffer(mut self, addr: u64, pitch: u32, width: u32, height: u32) -> Self {
        self.u32(8).u32(32).u64(addr).u32(pitch).u32(width).u32(height);
        self.buf.extend_from_slice(&[32, 1, 0, 0]);
        self
    }

    pub fn elf_sections(mut self, num: u32) -> Self {
        self.u32(9).u32(20).u32(num).u32(64).u32(0);
        self.pad();
        self
    }

    pub fn raw_tag(mut self, tag_type: u32, size: u32, payload: &[u8]) -> Self {
        self.u32(tag_type).u32(size);
        self.buf.extend_from_slice(payload);
        self.pad();
        self
    }

    pub fn cmdline(self, text: &str) -> Self {
        let mut payload = text.as_bytes().to_vec();
        payload.push(0);
        let size = u32::try_from(8 + payload.len()).unwrap();
        self.raw_tag(1, size, &payload)
    }

    /// Append the end tag and patch `total_size`.
    pub fn build(mut self) -> Vec<u8> {
        self.u32(0).u32(8);
        let total = u32::try_from(self.buf.len()).unwrap();
        self.buf[0..4].copy_from_slice(&total.to_le_bytes());
        self.buf
    }

    /// Patch `total_size` without appending an end tag.
    pub fn build_unterminated(mut self) -> Vec<u8> {
        let total = u32::try_from(self.buf.len()).unwrap();
        self.buf[0..4].copy_from_slice(&total.to_le_bytes());
        self.buf
    }
}

/// `(flags, mem_lower, mem_upper)` legacy block.
pub fn legacy_info(flags: u32, mem_lower: u32, mem_upper: u32) -> Vec<u8> {
    let mut buf = Vec::with_capacity(12);
    for v in [flags, mem_lower, mem_upper] {
        buf.extend_from_slice(&v.to_le_bytes());
    }
    buf
}
