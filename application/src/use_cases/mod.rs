//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod collect_signals;
pub mod resolve_group;
pub mod run_vote;
pub mod scan_votes;
pub mod single_flight;

#[cfg(test)]
pub(crate) mod test_support;
