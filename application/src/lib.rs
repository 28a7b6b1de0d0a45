//! Application layer for govbot
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{AlternateMapping, LifecycleParams, RepositoryConfig, VoteLabels};
pub use ports::{
    error_reporter::{ErrorReporter, NoErrorReporter},
    platform::{
        CommentRef, MembershipProvider, PlatformError, PlatformMutation, PlatformQuery,
        SourceFileProvider,
    },
    progress::{NoProgress, ScanProgressNotifier},
};
pub use use_cases::collect_signals::{CollectedSignals, SignalCollector};
pub use use_cases::resolve_group::{AlternatesCache, TeamResolver};
pub use use_cases::run_vote::{
    SkipReason, TriggerKind, VoteError, VoteLifecycleUseCase, VoteOutcome,
};
pub use use_cases::scan_votes::{ScanVotesInput, ScanVotesUseCase};
pub use use_cases::single_flight::{FlightGuard, SingleFlightRegistry};
