//! Port for reporting failed evaluations.
//!
//! Defines the [`ErrorReporter`] trait used to hand failure details to
//! whoever maintains the bot (email, an issue, a log file).
//!
//! Reporting is best-effort: `report` is synchronous and infallible.

/// Port for reporting evaluation failures.
pub trait ErrorReporter: Send + Sync {
    /// Record a failure with a one-line subject and full detail.
    fn report(&self, subject: &str, body: &str);
}

/// No-op implementation for tests and when reporting is disabled.
pub struct NoErrorReporter;

impl ErrorReporter for NoErrorReporter {
    fn report(&self, _subject: &str, _body: &str) {}
}
