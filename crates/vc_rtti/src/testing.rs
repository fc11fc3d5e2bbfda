//! Helpers shared by unit tests.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use std::sync::{Mutex, Once, PoisonError};

static WARNINGS: Mutex<Vec<String>> = Mutex::new(Vec::new());

/// Keeps warnings and errors in memory.
struct Capture;

impl log::Log for Capture {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        metadata.level() <= log::Level::Warn
    }

    fn log(&self, record: &log::Record<'_>) {
        if self.enabled(record.metadata()) {
            WARNINGS
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(record.args().to_string());
        }
    }

    fn flush(&self) {}
}

/// Installs the capturing logger, once per test binary.
pub(crate) fn capture_warnings() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        if log::set_logger(&Capture).is_ok() {
            log::set_max_level(log::LevelFilter::Warn);
        }
    });
}

/// Returns `true` if one captured message contains every fragment.
pub(crate) fn warned(fragments: &[&str]) -> bool {
    WARNINGS
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .iter()
        .any(|message| fragments.iter().all(|fragment| message.contains(fragment)))
}
