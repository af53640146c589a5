//! Store plugins. A plugin is called once with the finished store and
//! usually subscribes to mutations or actions.

pub mod logger;

pub use logger::{create_logger, LogEntry, LogSink, LoggerOptions, TracingSink};
