//! # Boot Information Wire Format
//!
//! Multiboot2 boot information is a little-endian byte stream:
//!
//! ```text
//! +0   total_size: u32     size of the whole stream including this header
//! +4   reserved:   u32
//! +8   tag 0: type: u32, size: u32, payload[size - 8], padding to 8 bytes
//!      tag 1: ...
//!      tag n: type = 0 (end)
//! ```
//!
//! Field offsets below are relative to the **start of the tag** (i.e. they
//! include the 8-byte tag header), matching how the parser addresses them.

use bitfield_struct::bitfield;

/// Size of the fixed `(total_size, reserved)` header that precedes the tags.
pub const INFO_HEADER_SIZE: usize = 8;

/// Size of the `(type, size)` header at the start of every tag.
pub const TAG_HEADER_SIZE: usize = 8;

/// Tags start on 8-byte boundaries.
pub const TAG_ALIGN: usize = 8;

/// Tag type numbers.
pub mod tag {
    pub const END: u32 = 0;
    pub const CMDLINE: u32 = 1;
    pub const BOOT_LOADER_NAME: u32 = 2;
    pub const MODULE: u32 = 3;
    pub const BASIC_MEMINFO: u32 = 4;
    pub const BOOTDEV: u32 = 5;
    pub const MMAP: u32 = 6;
    pub const VBE: u32 = 7;
    pub const FRAMEBUFFER: u32 = 8;
    pub const ELF_SECTIONS: u32 = 9;
    pub const APM: u32 = 10;
}

/// Memory-map tag layout.
pub mod mmap {
    pub const ENTRY_SIZE_OFFSET: usize = 8;
    pub const ENTRY_VERSION_OFFSET: usize = 12;
    /// First entry, directly after `entry_size` and `entry_version`.
    pub const ENTRIES_OFFSET: usize = 16;

    /// Size of one `(base: u64, length: u64, kind: u32, reserved: u32)` entry.
    /// Used when the tag declares an `entry_size` of zero.
    pub const ENTRY_SIZE: usize = 24;

    pub const ENTRY_BASE_OFFSET: usize = 0;
    pub const ENTRY_LENGTH_OFFSET: usize = 8;
    pub const ENTRY_KIND_OFFSET: usize = 16;
}

/// Module tag layout.
pub mod module {
    pub const MOD_START_OFFSET: usize = 8;
    pub const MOD_END_OFFSET: usize = 12;
}

/// Framebuffer tag layout.
pub mod framebuffer {
    pub const ADDR_OFFSET: usize = 8;
    pub const PITCH_OFFSET: usize = 16;
    pub const WIDTH_OFFSET: usize = 20;
    pub const HEIGHT_OFFSET: usize = 24;
}

/// ELF section headers tag layout.
pub mod elf_sections {
    pub const NUM_OFFSET: usize = 8;
    pub const ENTSIZE_OFFSET: usize = 12;
    pub const SHNDX_OFFSET: usize = 16;
}

/// Memory kinds as reported in memory-map entries.
pub mod memory_kind {
    pub const AVAILABLE: u32 = 1;
    pub const RESERVED: u32 = 2;
    pub const ACPI_RECLAIMABLE: u32 = 3;
    pub const ACPI_NVS: u32 = 4;
    pub const BAD_RAM: u32 = 5;

    /// Synthetic kind for boot modules; never emitted by firmware.
    pub const MODULE: u32 = 99;
    /// Synthetic kind for the linear framebuffer; never emitted by firmware.
    pub const FRAMEBUFFER: u32 = 98;
}

/// Legacy (Multiboot1-style) info block used when no tag stream is present.
pub mod legacy {
    pub const FLAGS_OFFSET: usize = 0;
    pub const MEM_LOWER_OFFSET: usize = 4;
    pub const MEM_UPPER_OFFSET: usize = 8;

    /// Bytes needed to read all three legacy fields.
    pub const INFO_SIZE: usize = 12;
}

/// `flags` word of the legacy info block.
///
/// Only [`mem`](Self::mem) is consulted; the rest document which other legacy
/// fields a loader claims to have filled.
#[bitfield(u32)]
#[derive(Eq, PartialEq)]
pub struct LegacyFlags {
    /// Bit 0: `mem_lower` / `mem_upper` are valid.
    pub mem: bool,
    /// Bit 1: `boot_device` is valid.
    pub boot_device: bool,
    /// Bit 2: `cmdline` is valid.
    pub cmdline: bool,
    /// Bit 3: module list is valid.
    pub mods: bool,
    /// Bit 4: a.out symbol table is valid.
    pub aout_syms: bool,
    /// Bit 5: ELF section header table is valid.
    pub elf_shdr: bool,
    /// Bit 6: full memory map is valid.
    pub mmap: bool,
    #[bits(25)]
    __: u32,
}
