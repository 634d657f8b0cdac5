//! # Boot Memory Map
//!
//! Collects raw regions from the tag stream (or the legacy fallback),
//! canonicalizes them and extracts the usable RAM above the 1 MiB floor.

use crate::ParseError;
use crate::canonical::{canonicalize, extract_usable};
use crate::reader::ByteReader;
use crate::region::{MergedRegionList, RawRegionList, RegionKind, UsableRegion};
use crate::tags::{BootTag, Tags};
use kernel_info::boot::{LegacyFlags, legacy};
use kernel_info::memory::MIN_PHYS;
use kernel_memory_addresses::{KIB, PhysicalAddress};

/// Where the raw regions came from.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum MapSource {
    /// Memory-map, module and framebuffer tags.
    TagStream,
    /// The single region synthesized from the legacy `mem_upper` field.
    Legacy,
}

/// The physical memory map as reported at boot, before and after canonicalization.
#[derive(Debug, Clone)]
pub struct BootMemoryMap {
    raw: RawRegionList,
    merged: MergedRegionList,
    source: MapSource,
}

impl BootMemoryMap {
    /// Parse a boot information block.
    ///
    /// Malformed tags are logged and skipped; a malformed tag header ends the
    /// walk but keeps the regions collected up to that point. If the tag
    /// stream yields nothing, the legacy `flags`/`mem_upper` fields of the
    /// same block are consulted.
    ///
    /// # Errors
    /// * [`ParseError::TooShort`] / [`ParseError::EmptyStream`] if there is no tag stream at all.
    /// * [`ParseError::NoRegions`] if neither the tags nor the legacy fields describe any memory.
    pub fn parse(info: &[u8]) -> Result<Self, ParseError> {
        let tags = Tags::new(info)?;
        log::debug!(
            "boot info at {:p}: {} bytes declared, walking {} bytes",
            info.as_ptr(),
            ByteReader::new(info).read_u32(0)?,
            tags.end()
        );

        let mut raw = collect_tag_regions(tags);
        let mut source = MapSource::TagStream;

        if raw.is_empty()
            && let Some((start, end)) = legacy_region(info)
        {
            log::info!("no memory map tags; using legacy mem_upper region [{start}, {end})");
            raw.insert(start, end, RegionKind::Usable);
            source = MapSource::Legacy;
        }

        if raw.is_empty() {
            return Err(ParseError::NoRegions);
        }
        if raw.dropped() > 0 {
            log::warn!(
                "region list full: dropped {} region(s) beyond {}",
                raw.dropped(),
                raw.capacity()
            );
        }

        let merged = canonicalize(&raw);
        Ok(Self {
            raw,
            merged,
            source,
        })
    }

    #[must_use]
    pub const fn source(&self) -> MapSource {
        self.source
    }

    /// Regions in discovery order.
    #[must_use]
    pub const fn raw(&self) -> &RawRegionList {
        &self.raw
    }

    #[must_use]
    pub const fn merged(&self) -> &MergedRegionList {
        &self.merged
    }

    /// Usable regions clipped to start at or above [`MIN_PHYS`], in ascending order.
    ///
    /// Writes at most `out.len()` entries and returns the number written.
    pub fn usable_regions(&self, out: &mut [UsableRegion]) -> usize {
        extract_usable(self.merged.as_slice(), PhysicalAddress::new(MIN_PHYS), out)
    }

    /// Dump the raw and merged lists at debug level.
    pub fn log_regions(&self) {
        log::debug!(
            "memory map ({:?}): {} raw, {} merged, {} dropped",
            self.source,
            self.raw.len(),
            self.merged.len(),
            self.raw.dropped()
        );
        for (i, region) in self.raw.iter().enumerate() {
            log::debug!("  raw[{i:2}] {region}");
        }
        for (i, region) in self.merged.iter().enumerate() {
            log::debug!("  merged[{i:2}] {region}");
        }
    }
}

fn collect_tag_regions(tags: Tags<'_>) -> RawRegionList {
    let mut raw = RawRegionList::new();

    for tag in tags {
        let tag = match tag {
            Ok(tag) => tag,
            Err(e) => {
                log::warn!("boot info tag walk stopped: {e}");
                break;
            }
        };
        log::trace!(
            "tag at {:#x}: type={} size={}",
            tag.offset,
            tag.tag_type,
            tag.size
        );

        let decoded = match tag.decode() {
            Ok(decoded) => decoded,
            Err(e) => {
                log::warn!("skipping tag type {} at {:#x}: {e}", tag.tag_type, tag.offset);
                continue;
            }
        };

        match decoded {
            BootTag::MemoryMap(map) => {
                log::debug!(
                    "memory map tag: entry_size={} entry_version={}",
                    map.entry_size,
                    map.entry_version
                );
                for entry in map.entries() {
                    let range = entry.range();
                    log::trace!("  mmap entry {range} type={}", entry.kind);
                    raw.insert(range.start(), range.end(), entry.region_kind());
                }
            }
            BootTag::Module(module) => {
                let range = module.range();
                raw.insert(range.start(), range.end(), RegionKind::Module);
            }
            BootTag::Framebuffer(fb) => {
                let range = fb.extent();
                log::trace!("  framebuffer {}x{} pitch={} at {range}", fb.width, fb.height, fb.pitch);
                raw.insert(range.start(), range.end(), RegionKind::Framebuffer);
            }
            BootTag::ElfSections(elf) => {
                // Section headers are not turned into reserved regions; the kernel
                // image window is reserved by the frame allocator instead.
                log::debug!(
                    "ELF sections tag: num={} entsize={} shndx={} (ignored)",
                    elf.num,
                    elf.entsize,
                    elf.shndx
                );
            }
            BootTag::Other(_) => {}
        }
    }

    raw
}

/// `[1 MiB, 1 MiB + mem_upper KiB)` if the legacy flags mark the memory fields valid.
fn legacy_region(info: &[u8]) -> Option<(PhysicalAddress, PhysicalAddress)> {
    let info = ByteReader::new(info);
    let flags = LegacyFlags::from_bits(info.read_u32(legacy::FLAGS_OFFSET).ok()?);
    if !flags.mem() {
        return None;
    }

    let mem_lower = info.read_u32(legacy::MEM_LOWER_OFFSET).ok()?;
    let mem_upper = info.read_u32(legacy::MEM_UPPER_OFFSET).ok()?;
    log::debug!("legacy memory fields: mem_lower={mem_lower} KiB mem_upper={mem_upper} KiB");
    if mem_upper == 0 {
        return None;
    }

    let start = PhysicalAddress::new(MIN_PHYS);
    Some((start, start.saturating_add(u64::from(mem_upper) * KIB)))
}

/// Parse `info` and write its usable regions into `out`.
///
/// Never fails: a missing, empty or unusable boot information block yields
/// zero regions, and the caller falls back to an emulated memory map.
pub fn parse(info: Option<&[u8]>, out: &mut [UsableRegion]) -> usize {
    let Some(info) = info else {
        log::debug!("no boot information provided");
        return 0;
    };

    let map = match BootMemoryMap::parse(info) {
        Ok(map) => map,
        Err(e) => {
            log::debug!("boot memory map unavailable: {e}");
            return 0;
        }
    };

    map.log_regions();
    let count = map.usable_regions(out);
    log::debug!("boot memory map: {count} usable region(s)");
    count
}

/// View the boot information block at `ptr` as a byte slice.
///
/// The slice covers `total_size` bytes as declared in the header, but at
/// least the 12 bytes of the legacy fields. Returns `None` for a null pointer.
///
/// # Safety
/// `ptr` must be null or point to readable memory of at least that length
/// which stays valid and unmodified for `'a`.
#[must_use]
pub unsafe fn boot_info_bytes<'a>(ptr: *const u8) -> Option<&'a [u8]> {
    if ptr.is_null() {
        return None;
    }
    // SAFETY: the caller guarantees at least the legacy header is readable.
    let total = unsafe { ptr.cast::<u32>().read_unaligned() };
    let len = (total as usize).max(legacy::INFO_SIZE);
    // SAFETY: the caller guarantees `len` bytes are readable for `'a`.
    Some(unsafe { core::slice::from_raw_parts(ptr, len) })
}
