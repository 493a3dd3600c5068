use std::io;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

pub mod api;
pub mod card;
pub mod command;
pub mod render;
pub mod rules;
pub mod snapshot;
pub mod sound;
pub mod view;

pub use api::{ApiClient, ApiError, PlayRequest};
pub use card::{normalize_card, Card, CardColor};
pub use rules::can_play_on;
pub use snapshot::GameSnapshot;
pub use view::{table::Table, TableActor};

pub struct LoggerManager {
    _guard: tracing_appender::non_blocking::WorkerGuard,
}

impl LoggerManager {
    /// Everything the filter allows goes to the daily file; the console only
    /// gets warnings, on stderr, so the frame on stdout stays readable.
    pub fn setup(logging: &uno_env::LoggingConfig) -> Self {
        // 1. daily file, written off the caller's thread
        let file_appender =
            RollingFileAppender::new(Rotation::DAILY, &logging.directory, &logging.filename);
        let (non_blocking_file_writer, guard) = tracing_appender::non_blocking(file_appender);

        // 2. RUST_LOG wins over the configured level
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

        // 3. console: warnings only, on stderr
        let console_layer = fmt::layer()
            .with_writer(io::stderr)
            .with_ansi(true)
            .with_target(false)
            .compact()
            .with_filter(LevelFilter::WARN);

        // 4. file: everything the filter lets through
        let file_layer = fmt::layer()
            .with_writer(non_blocking_file_writer)
            .with_ansi(false)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_target(false);

        // 5. filter first, then both layers
        tracing_subscriber::registry()
            .with(filter)
            .with(console_layer)
            .with(file_layer)
            .init();

        tracing::info!(
            "Logger ready: stderr and {}/{}",
            logging.directory,
            logging.filename
        );

        Self { _guard: guard }
    }
}
