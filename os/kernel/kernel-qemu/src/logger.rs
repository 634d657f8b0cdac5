use core::fmt::{self, Write};
use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

/// `log` backend writing `[LEVEL] target: message` lines to the debug console.
pub struct QemuLogger {
    max_level: LevelFilter,
}

/// The installed instance. The configured level is applied through
/// [`log::set_max_level`], so a single static serves every level.
static LOGGER: QemuLogger = QemuLogger::new(LevelFilter::Trace);

impl QemuLogger {
    #[must_use]
    pub const fn new(max_level: LevelFilter) -> Self {
        Self { max_level }
    }

    /// Install the logger. Call once during early init.
    ///
    /// # Errors
    /// If a logger is already installed.
    pub fn init(self) -> Result<(), SetLoggerError> {
        log::set_logger(&LOGGER)?;
        log::set_max_level(self.max_level);
        Ok(())
    }
}

impl Log for QemuLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.max_level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        crate::qemu_trace!("{}", Line(record));
    }

    fn flush(&self) {}
}

struct Line<'a, 'r>(&'a Record<'r>);

impl fmt::Display for Line<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_record(f, self.0)
    }
}

/// Format `record` as one log line, including the trailing newline.
///
/// # Errors
/// Whatever `w` reports.
pub fn write_record<W: Write + ?Sized>(w: &mut W, record: &Record) -> fmt::Result {
    writeln!(w, "[{:<5}] {}: {}", record.level(), record.target(), record.args())
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Level;

    #[test]
    fn formats_level_target_and_message() {
        let mut line = String::new();
        write_record(
            &mut line,
            &Record::builder()
                .level(Level::Info)
                .target("kernel_pmm::pmm")
                .args(format_args!("self-test passed ({:#x})", 0x30_8000))
                .build(),
        )
        .expect("write to string");
        assert_eq!(line, "[INFO ] kernel_pmm::pmm: self-test passed (0x308000)\n");
    }

    #[test]
    fn filters_above_configured_level() {
        let logger = QemuLogger::new(LevelFilter::Info);
        let meta = |level| Metadata::builder().level(level).target("t").build();
        assert!(logger.enabled(&meta(Level::Warn)));
        assert!(!logger.enabled(&meta(Level::Debug)));
    }
}
