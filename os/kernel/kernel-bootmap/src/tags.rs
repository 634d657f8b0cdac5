//! # Tag Stream
//!
//! [`Tags`] walks the tag stream that follows the 8-byte info header and
//! yields one [`Tag`] per record. The walk never leaves the declared stream
//! (clamped to the supplied buffer) and ends at the terminator tag, at the
//! stream end, or at the first malformed header.
//!
//! [`Tag::decode`] turns a tag into a typed [`BootTag`] for the tag kinds the
//! memory map is built from.

use crate::ParseError;
use crate::reader::ByteReader;
use crate::region::RegionKind;
use kernel_info::boot::{
    INFO_HEADER_SIZE, TAG_ALIGN, TAG_HEADER_SIZE, elf_sections, framebuffer, mmap, module, tag,
};
use kernel_memory_addresses::{PhysicalAddress, PhysicalRange};

/// One raw tag: its offset in the info block, header, and full bytes (header included).
#[derive(Copy, Clone)]
pub struct Tag<'a> {
    pub offset: usize,
    pub tag_type: u32,
    pub size: u32,
    bytes: ByteReader<'a>,
}

/// Iterator over the tags of a boot information block.
///
/// Yields `Err` at most once, after which it is exhausted.
pub struct Tags<'a> {
    info: ByteReader<'a>,
    cursor: usize,
    end: usize,
    done: bool,
}

impl<'a> Tags<'a> {
    /// Start walking the tag stream of `info`.
    ///
    /// # Errors
    /// * [`ParseError::TooShort`] if `info` cannot hold the 8-byte header.
    /// * [`ParseError::EmptyStream`] if the header declares a total size of zero.
    pub fn new(info: &'a [u8]) -> Result<Self, ParseError> {
        let info = ByteReader::new(info);
        if info.len() < INFO_HEADER_SIZE {
            return Err(ParseError::TooShort { len: info.len() });
        }

        let total = info.read_u32(0)? as usize;
        if total == 0 {
            return Err(ParseError::EmptyStream);
        }
        if total > info.len() {
            log::warn!(
                "boot info declares {total} bytes but only {} are available; clamping",
                info.len()
            );
        }

        Ok(Self {
            info,
            cursor: INFO_HEADER_SIZE,
            end: total.min(info.len()),
            done: false,
        })
    }

    /// Stream end as used by the walk, after clamping.
    #[must_use]
    pub const fn end(&self) -> usize {
        self.end
    }

    fn next_tag(&mut self) -> Option<Result<Tag<'a>, ParseError>> {
        let offset = self.cursor;
        if offset.saturating_add(TAG_HEADER_SIZE) > self.end {
            return None;
        }

        let header = match self.info.sub(offset, TAG_HEADER_SIZE) {
            Ok(header) => header,
            Err(e) => return Some(Err(e)),
        };
        let (tag_type, size) = match (header.read_u32(0), header.read_u32(4)) {
            (Ok(t), Ok(s)) => (t, s),
            (Err(e), _) | (_, Err(e)) => return Some(Err(e)),
        };

        if tag_type == tag::END {
            return None;
        }
        if (size as usize) < TAG_HEADER_SIZE {
            return Some(Err(ParseError::MalformedTag { offset, size }));
        }

        let tag_end = offset.saturating_add(size as usize);
        if tag_end > self.end {
            return Some(Err(ParseError::Truncated { offset }));
        }
        let bytes = match self.info.sub(offset, size as usize) {
            Ok(bytes) => bytes,
            Err(e) => return Some(Err(e)),
        };

        self.cursor = tag_end.next_multiple_of(TAG_ALIGN);
        Some(Ok(Tag {
            offset,
            tag_type,
            size,
            bytes,
        }))
    }
}

impl<'a> Iterator for Tags<'a> {
    type Item = Result<Tag<'a>, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self.next_tag();
        if !matches!(item, Some(Ok(_))) {
            self.done = true;
        }
        item
    }
}

impl core::iter::FusedIterator for Tags<'_> {}

/// A decoded tag.
#[derive(Copy, Clone)]
pub enum BootTag<'a> {
    MemoryMap(MemoryMapTag<'a>),
    Module(ModuleTag),
    Framebuffer(FramebufferTag),
    ElfSections(ElfSectionsTag),
    /// Any tag not needed for the memory map.
    Other(u32),
}

impl<'a> Tag<'a> {
    /// Decode the tag payload.
    ///
    /// # Errors
    /// [`ParseError::OutOfBounds`] if the tag is too short for its fixed fields.
    pub fn decode(&self) -> Result<BootTag<'a>, ParseError> {
        let b = self.bytes;
        Ok(match self.tag_type {
            tag::MMAP => {
                let entry_size = b.read_u32(mmap::ENTRY_SIZE_OFFSET)?;
                let entry_version = b.read_u32(mmap::ENTRY_VERSION_OFFSET)?;
                let entries = b.sub(mmap::ENTRIES_OFFSET, b.len() - mmap::ENTRIES_OFFSET)?;
                BootTag::MemoryMap(MemoryMapTag {
                    entry_size,
                    entry_version,
                    entries,
                })
            }
            tag::MODULE => BootTag::Module(ModuleTag {
                mod_start: b.read_u32(module::MOD_START_OFFSET)?,
                mod_end: b.read_u32(module::MOD_END_OFFSET)?,
            }),
            tag::FRAMEBUFFER => BootTag::Framebuffer(FramebufferTag {
                addr: b.read_u64(framebuffer::ADDR_OFFSET)?,
                pitch: b.read_u32(framebuffer::PITCH_OFFSET)?,
                width: b.read_u32(framebuffer::WIDTH_OFFSET)?,
                height: b.read_u32(framebuffer::HEIGHT_OFFSET)?,
            }),
            tag::ELF_SECTIONS => BootTag::ElfSections(ElfSectionsTag {
                num: b.read_u32(elf_sections::NUM_OFFSET)?,
                entsize: b.read_u32(elf_sections::ENTSIZE_OFFSET)?,
                shndx: b.read_u32(elf_sections::SHNDX_OFFSET)?,
            }),
            other => BootTag::Other(other),
        })
    }
}

/// Memory-map tag (type 6).
#[derive(Copy, Clone)]
pub struct MemoryMapTag<'a> {
    pub entry_size: u32,
    pub entry_version: u32,
    entries: ByteReader<'a>,
}

impl<'a> MemoryMapTag<'a> {
    /// Distance between consecutive entries; a declared size of zero means the standard 24.
    #[must_use]
    pub const fn stride(&self) -> usize {
        if self.entry_size == 0 {
            mmap::ENTRY_SIZE
        } else {
            self.entry_size as usize
        }
    }

    /// Entries in tag order. An entry is only decoded while a full 24 bytes remain.
    #[must_use]
    pub const fn entries(&self) -> MemoryMapEntries<'a> {
        MemoryMapEntries {
            entries: self.entries,
            stride: self.stride(),
            offset: 0,
        }
    }
}

/// One `(base, length, kind)` memory-map entry.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct MemoryMapEntry {
    pub base: u64,
    pub length: u64,
    pub kind: u32,
}

impl MemoryMapEntry {
    /// `[base, base + length)`, saturating at the top of the address space.
    #[must_use]
    pub const fn range(&self) -> PhysicalRange {
        PhysicalRange::from_base_len(PhysicalAddress::new(self.base), self.length)
    }

    #[must_use]
    pub const fn region_kind(&self) -> RegionKind {
        RegionKind::from_raw(self.kind)
    }
}

pub struct MemoryMapEntries<'a> {
    entries: ByteReader<'a>,
    stride: usize,
    offset: usize,
}

impl Iterator for MemoryMapEntries<'_> {
    type Item = MemoryMapEntry;

    fn next(&mut self) -> Option<Self::Item> {
        let e = self.entries.sub(self.offset, mmap::ENTRY_SIZE).ok()?;
        let entry = MemoryMapEntry {
            base: e.read_u64(mmap::ENTRY_BASE_OFFSET).ok()?,
            length: e.read_u64(mmap::ENTRY_LENGTH_OFFSET).ok()?,
            kind: e.read_u32(mmap::ENTRY_KIND_OFFSET).ok()?,
        };
        self.offset = self.offset.saturating_add(self.stride);
        Some(entry)
    }
}

/// Boot module tag (type 3). Addresses are 32-bit.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ModuleTag {
    pub mod_start: u32,
    pub mod_end: u32,
}

impl ModuleTag {
    #[must_use]
    pub fn range(&self) -> PhysicalRange {
        PhysicalRange::new(
            PhysicalAddress::new(u64::from(self.mod_start)),
            PhysicalAddress::new(u64::from(self.mod_end)),
        )
    }
}

/// Framebuffer tag (type 8); only the geometry needed to size it.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct FramebufferTag {
    pub addr: u64,
    pub pitch: u32,
    pub width: u32,
    pub height: u32,
}

impl FramebufferTag {
    /// `[addr, addr + pitch * height)`, saturating at the top of the address space.
    #[must_use]
    pub fn extent(&self) -> PhysicalRange {
        let bytes = u64::from(self.pitch).saturating_mul(u64::from(self.height));
        PhysicalRange::from_base_len(PhysicalAddress::new(self.addr), bytes)
    }
}

/// ELF section headers tag (type 9). Recognized but not turned into regions.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ElfSectionsTag {
    pub num: u32,
    pub entsize: u32,
    pub shndx: u32,
}
