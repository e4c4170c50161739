//! Logging setup shared by the translator and its command-line front end
//!
//! The translator itself only emits records through the `slog_scope` macros;
//! installing a global logger is left to whoever embeds it.

use std::io::Write;
use std::str::FromStr;
use std::sync::Once;

use slog::{Drain, Filter, Logger, o};
use slog_async::OverflowStrategy;
use slog_scope::GlobalLoggerGuard;

// re-export these so callers don't need slog directly
pub use slog::FilterLevel;
pub use slog_scope::{debug, error, info, warn, trace};

static INIT_TEST_LOGGER: Once = Once::new();

pub fn setup_with_level(level: FilterLevel) -> GlobalLoggerGuard {
    setup_with_level_location(level, std::io::stderr())
}

/// Installs the global logger writing to `location`
///
/// Debug logging is synchronous and carries file locations, everything else
/// goes through an async drain.
pub fn setup_with_level_location<W: 'static + Write + Send>(level: FilterLevel, location: W) -> GlobalLoggerGuard {
    let logger = if level == FilterLevel::Debug || level == FilterLevel::Trace {
        let decorator = slog_term::PlainSyncDecorator::new(location);
        let drain = slog_term::FullFormat::new(decorator)
            .use_local_timestamp()
            .use_file_location()
            .build()
            .fuse();
        let drain = Filter::new(drain, move |r| level.accepts(r.level())).fuse();

        Logger::root(drain, o!())
    } else {
        let decorator = slog_term::PlainDecorator::new(location);
        let drain = slog_term::FullFormat::new(decorator).use_local_timestamp().build();
        let drain = Filter::new(drain, move |r| level.accepts(r.level())).fuse();
        let drain = slog_async::Async::new(drain)
            .chan_size(1024)
            .overflow_strategy(OverflowStrategy::Block)
            .build()
            .fuse();

        Logger::root(drain, o!())
    };

    slog_scope::set_global_logger(logger)
}

/// Parses a level name such as `debug` or `warn`; unknown names yield None
pub fn parse_level(level: &str) -> Option<FilterLevel> {
    FilterLevel::from_str(level.trim()).ok()
}

/// Installs a synchronous stdout logger once per test binary
pub fn init_test_logger() {
    INIT_TEST_LOGGER.call_once(|| {
        let decorator = slog_term::PlainSyncDecorator::new(std::io::stdout());
        let drain = slog_term::FullFormat::new(decorator)
            .use_local_timestamp()
            .use_file_location()
            .build()
            .fuse();
        let logger = Logger::root(drain, o!());

        // the guard has to outlive every test in the binary
        std::mem::forget(slog_scope::set_global_logger(logger));
    });
}
