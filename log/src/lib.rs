use std::sync::Mutex;

use slog::Drain;
use slog::{Discard, Fuse};
use slog_async::Async;
use slog_json::Json;

pub use slog::{debug, error, info, o, trace, warn, Logger};

/// Creates the root logger, which writes one JSON object per line to
/// standard error.
pub fn initialize_logger() -> Logger {
    let drain = Mutex::new(Json::default(std::io::stderr())).map(Fuse);
    let drain = Async::new(drain).build().fuse();

    Logger::root(
        drain,
        o!("version" => info::VERSION, "revision" => info::REVISION, "build_timestamp" => info::BUILD_TIMESTAMP),
    )
}

/// Creates a logger that drops everything, for tests and embedding.
pub fn discard() -> Logger {
    Logger::root(Discard, o!())
}
