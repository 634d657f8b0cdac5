//! # Physical Memory Manager
//!
//! A bitmap frame allocator built from the usable-region list produced by
//! `kernel-bootmap`.
//!
//! ```text
//! UsableRegion[] ──► PmmLayout::compute ──► PhysMapper (bitmap storage at BITMAP_PHYS)
//!                                                  │
//!                                                  ▼
//!                                       PhysicalMemoryManager
//!                                       alloc / free / stats / self_test
//! ```
//!
//! ## Granularity
//!
//! * [`Granularity::Fine`]: one bit per 4 KiB page.
//! * [`Granularity::Coarse`]: one bit per 32-page (128 KiB) block, for a 32x
//!   smaller bitmap at the cost of allocation precision.
//!
//! The granularity is chosen at initialization and never changes.
//!
//! ## Failure Model
//!
//! * An unusable map is a [`MapInvalid`]. Without a frame allocator the
//!   kernel cannot continue, so callers are expected to halt on it.
//! * Exhaustion is `None` from [`PhysicalMemoryManager::alloc`], an ordinary result.
//! * A bad release is a [`FreeViolation`]. [`PhysicalMemoryManager::free`]
//!   panics on it; [`PhysicalMemoryManager::try_free`] reports it.
//!
//! ## Example
//!
//! ```rust
//! use kernel_bootmap::UsableRegion;
//! use kernel_memory_addresses::{MIB, PhysicalAddress};
//! use kernel_pmm::{Granularity, PhysicalMemoryManager, PmmConfig, PmmLayout};
//!
//! let regions = [UsableRegion::new(PhysicalAddress::new(16 * MIB), 16 * MIB)];
//! let layout = PmmLayout::compute(&regions, Granularity::Fine, &PmmConfig::default())?;
//! let mut storage = vec![0u8; layout.bitmap_bytes()];
//! let mut pmm = PhysicalMemoryManager::new(layout, &mut storage)?;
//!
//! let page = pmm.alloc().expect("free page");
//! assert!(page.is_aligned(4096));
//! pmm.free(page);
//! assert_eq!(pmm.used_units(), 0);
//! # Ok::<(), kernel_pmm::MapInvalid>(())
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

pub mod bitmap;
mod config;
mod error;
mod granularity;
mod layout;
pub mod phys_mapper;
mod pmm;
mod stats;

pub use config::PmmConfig;
pub use error::{FreeViolation, MapInvalid, SelfTestError};
pub use granularity::Granularity;
pub use layout::PmmLayout;
pub use phys_mapper::{IdentityPhysMapper, PhysMapper};
pub use pmm::PhysicalMemoryManager;
pub use stats::PmmStats;
