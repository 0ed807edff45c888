use std::sync::{Mutex, MutexGuard, OnceLock};

use logtest::Logger;
use rstest::fixture;

/// Handle to the global logger with exclusive access.
///
/// This guard ensures tests do not interfere with each other's log capture by
/// serialising access to a [`logtest::Logger`].
pub struct LoggerHandle {
    guard: MutexGuard<'static, Logger>,
}

impl LoggerHandle {
    /// Acquire the global [`Logger`] instance, discarding records captured
    /// by earlier tests.
    ///
    /// # Panics
    ///
    /// Panics if a previous holder panicked while holding the logger.
    #[must_use]
    pub fn new() -> Self {
        static LOGGER: OnceLock<Mutex<Logger>> = OnceLock::new();

        let logger = LOGGER.get_or_init(|| Mutex::new(Logger::start()));
        let mut guard = logger.lock().expect("logger poisoned");
        while guard.pop().is_some() {}

        Self { guard }
    }

    /// Drain captured records and return those whose message contains
    /// `needle`.
    pub fn take_matching(&mut self, needle: &str) -> Vec<String> {
        let mut found = Vec::new();
        while let Some(record) = self.guard.pop() {
            if record.args().contains(needle) {
                found.push(record.args().to_owned());
            }
        }
        found
    }
}

impl Default for LoggerHandle {
    fn default() -> Self { Self::new() }
}

impl std::ops::Deref for LoggerHandle {
    type Target = Logger;

    fn deref(&self) -> &Self::Target { &self.guard }
}

impl std::ops::DerefMut for LoggerHandle {
    fn deref_mut(&mut self) -> &mut Self::Target { &mut self.guard }
}

#[allow(
    unused_braces,
    reason = "rustc false positive for single line rstest fixtures"
)]
#[fixture]
pub fn logger() -> LoggerHandle { LoggerHandle::new() }
