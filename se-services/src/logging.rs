use core::fmt;

use log::{LevelFilter, SetLoggerError};

/// Board hook that writes formatted text to a debug console.
pub type PrintHook = fn(fmt::Arguments);

/// Hook that drops everything.
pub fn discard(_args: fmt::Arguments) {}

/// `log` backend that forwards every record to a [`PrintHook`].
///
/// ```ignore
/// static LOGGER: Logger = Logger::new(uart_print);
/// LOGGER.init(LevelFilter::Debug)?;
/// ```
pub struct Logger {
    print: PrintHook,
}

impl Logger {
    pub const fn new(print: PrintHook) -> Self {
        Self { print }
    }

    /// Install as the global logger.
    pub fn init(&'static self, level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_logger(self)?;
        log::set_max_level(level);
        Ok(())
    }
}

impl log::Log for Logger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            (self.print)(format_args!(
                "[{}:{}] {}: {}\n",
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.level(),
                record.args()
            ));
        }
    }

    fn flush(&self) {
        // nothing
    }
}
