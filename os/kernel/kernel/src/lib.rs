//! # Kernel Boot Memory Bring-Up
//!
//! Glue between the bootloader handoff and the physical memory manager:
//!
//! ```text
//! mbi pointer ──► boot_info_bytes ──► kernel_bootmap::parse ──► UsableRegion[..n]
//!                                                                    │
//!                         n == 0: emulated [1 MiB, 1 GiB) ◄──────────┤
//!                                                                    ▼
//!                                   PhysicalMemoryManager::init_from_map
//!                                                                    │
//!                                                 self_test ──► stats ──► caller
//! ```
//!
//! The resulting allocator is returned to the caller, which owns it for the
//! rest of the kernel's life and lends it out by `&mut`. There is no global
//! instance.
//!
//! Invalid maps and self-test failures are fatal: [`init_physical_memory`]
//! logs them and panics, and the kernel's panic handler halts.
//! [`try_init_physical_memory`] reports them instead.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

pub mod boot_memory;
pub mod logging;
mod tracing;

pub use boot_memory::{
    BootMemoryError, default_granularity, init_physical_memory, try_init_physical_memory,
};
pub use logging::init_logging;
