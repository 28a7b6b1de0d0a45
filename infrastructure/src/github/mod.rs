//! GitHub adapter built on the `gh` CLI.
//!
//! [`GhCliPlatform`] implements all four platform ports of the application
//! layer. It relies on an installed and authenticated `gh`, which takes care
//! of tokens, pagination, and GitHub Enterprise hosts.

mod cli;
mod platform;
mod types;

pub use cli::GhCli;
pub use platform::GhCliPlatform;
