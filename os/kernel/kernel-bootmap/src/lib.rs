//! # Boot Memory-Map Parsing
//!
//! Turns the bootloader's Multiboot2 information block into the list of
//! usable physical regions the frame allocator is built from.
//!
//! ## Pipeline
//!
//! ```text
//! firmware bytes ──► Tags (bounds-checked walk) ──► RawRegionList (≤ 32, discovery order)
//!                                                        │
//!                      legacy flags/mem_upper ◄──────────┤ (only if nothing was found)
//!                                                        ▼
//!                                   sort by start (stable) + merge overlaps
//!                                                        │
//!                                                        ▼
//!                                   MergedRegionList ──► UsableRegion[] (≥ 1 MiB)
//! ```
//!
//! ## Components
//!
//! * [`reader`]: a little-endian byte view whose every read is bounds checked.
//!   Malformed input produces a [`ParseError`], never an out-of-bounds access.
//! * [`tags`]: an iterator over the tag stream plus typed decoders for the
//!   memory-map, module, framebuffer and ELF-sections tags.
//! * [`region`]: fixed-capacity region containers. No heap is involved, since
//!   this code runs before any allocator exists.
//! * [`canonical`]: the sort / merge / usable-extraction passes.
//! * [`parser`]: [`BootMemoryMap`] and the soft [`parse`] entry point.
//!
//! ## Failure Model
//!
//! Parsing degrades instead of failing: a garbled tag ends the walk but keeps
//! what was collected so far, an unknown tag is skipped, and a missing tag
//! stream falls back to the legacy `mem_upper` field. [`parse`] reports
//! problems through the `log` facade and returns a region count of zero when
//! nothing usable remains. Deciding what to do about an empty result is up to
//! the caller.
//!
//! ## Example
//!
//! ```rust
//! use kernel_bootmap::{UsableRegion, parse};
//!
//! // Header with total_size = 8 and no tags: nothing usable, no legacy fields.
//! let info = [8u8, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
//! let mut out = [UsableRegion::EMPTY; 4];
//! assert_eq!(parse(Some(&info), &mut out), 0);
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

pub mod canonical;
mod error;
pub mod parser;
pub mod reader;
pub mod region;
pub mod tags;

pub use error::ParseError;
pub use parser::{BootMemoryMap, MapSource, boot_info_bytes, parse};
pub use region::{
    MergedRegionList, RawRegion, RawRegionList, RegionKind, RegionList, UsableRegion,
};
