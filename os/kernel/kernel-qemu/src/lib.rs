//! # QEMU Debug Console Output
//!
//! Log output for kernels running under QEMU, written byte by byte to the
//! debug console port `0x402`. Nothing here allocates, so it works from the
//! first instruction of the boot path, long before a frame allocator exists.
//!
//! ```text
//! log::info!(..) ──► QemuLogger ──► QemuSink (fmt::Write) ──► out 0x402 ──► -debugcon
//! ```
//!
//! Capture the output on the host with
//!
//! ```bash
//! qemu-system-x86_64 -kernel kernel.elf -debugcon stdio
//! ```
//!
//! ## Features
//!
//! * `enabled` (default): compiles the port writes in. Without it, and on
//!   targets other than `x86_64`, every write is a no-op and the logger only
//!   filters.
//!
//! ## Example
//!
//! ```rust,no_run
//! use kernel_qemu::QemuLogger;
//! use log::LevelFilter;
//!
//! QemuLogger::new(LevelFilter::Debug)
//!     .init()
//!     .expect("logger already installed");
//! log::info!("memory map parsed");
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

mod logger;

pub use logger::{QemuLogger, write_record};

#[cfg(all(feature = "enabled", target_arch = "x86_64"))]
#[doc(hidden)]
pub mod qemu_fmt {
    use core::fmt::{self, Write};

    /// QEMU's `-debugcon` I/O port.
    const QEMU_DEBUG_PORT: u16 = 0x402;

    #[allow(clippy::inline_always)]
    #[inline(always)]
    pub fn dbg_putc(c: u8) {
        // SAFETY: Writing to the debug console port has no side effects on guest state.
        unsafe { outb(QEMU_DEBUG_PORT, c) }
    }

    #[allow(clippy::inline_always)]
    #[inline(always)]
    unsafe fn outb(port: u16, val: u8) {
        unsafe {
            core::arch::asm!(
            "out dx, al",
            in("dx") port,
            in("al") val,
            options(nomem, nostack, preserves_flags)
            );
        }
    }

    pub struct QemuSink;

    impl Write for QemuSink {
        #[inline]
        fn write_str(&mut self, s: &str) -> fmt::Result {
            s.bytes().for_each(dbg_putc);
            Ok(())
        }
    }

    #[inline]
    pub fn qemu_write(args: fmt::Arguments) {
        // Best effort: there is nowhere to report a failed debug write.
        let _ = fmt::write(&mut QemuSink, args);
    }
}

#[cfg(not(all(feature = "enabled", target_arch = "x86_64")))]
#[doc(hidden)]
pub mod qemu_fmt {
    use core::fmt;

    #[inline(always)]
    #[allow(clippy::inline_always)]
    pub const fn qemu_write(_: fmt::Arguments) {}
}

/// `format_args!`-style output straight to the debug console, bypassing `log`.
#[macro_export]
macro_rules! qemu_trace {
    ($($arg:tt)*) => {{
        $crate::qemu_fmt::qemu_write(core::format_args!($($arg)*));
    }};
}
