//! Logging infrastructure: structured failure reports.
//!
//! Provides [`JsonlErrorReporter`], a JSONL file writer that implements
//! the [`ErrorReporter`](govbot_application::ErrorReporter) port.

mod jsonl_reporter;

pub use jsonl_reporter::JsonlErrorReporter;
