use kernel_qemu::QemuLogger;
use log::LevelFilter;

/// Route `log` output to the QEMU debug console.
///
/// Only the first call installs the logger; later calls change nothing.
/// Without the `qemu` feature the logger is installed but writes nowhere.
pub fn init_logging(level: LevelFilter) {
    if QemuLogger::new(level).init().is_ok() {
        log::info!("Kernel reporting to QEMU at level {level}");
    }
}
