//! # Kernel Boot Protocol and Physical Layout
//!
//! This crate is the single source of truth for the constants shared by the
//! boot memory-map parser, the physical memory manager, and the boot glue.
//!
//! ## Modules
//!
//! ### Boot Protocol ([`boot`])
//! The bootloader-to-kernel handoff as it appears in memory:
//! * **Multiboot2 tag stream**: header size, tag alignment, tag type numbers
//! * **Memory-map entries**: fixed entry size and firmware memory kinds
//! * **Legacy info block**: `flags` / `mem_lower` / `mem_upper` and the
//!   [`LegacyFlags`](boot::LegacyFlags) bitfield gating them
//!
//! ### Physical Layout ([`memory`])
//! Where things live in physical memory during early boot:
//!
//! ```text
//! Physical Memory Layout:
//! 0x0000_0000 ┌─────────────────────────────────┐
//!             │     Low Memory (< 1MiB)         │
//!             │  (BIOS, VGA, legacy devices)    │
//! MIN_PHYS    ├─────────────────────────────────┤ 0x0010_0000 (1 MiB)
//!             │       Kernel Image              │
//!             │   (KERNEL_IMAGE_SIZE bytes)     │
//! BITMAP_PHYS ├─────────────────────────────────┤ 0x0030_0000 (3 MiB)
//!             │   Allocation Bitmap             │
//!             ├─────────────────────────────────┤
//!             │    Available RAM                │
//!             │  (Managed by the PMM)           │
//!             └─────────────────────────────────┘
//! ```
//!
//! Everything here is `const` and free of `unsafe`.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![deny(unsafe_code)]

pub mod boot;
pub mod memory;
