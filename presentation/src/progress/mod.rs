//! Progress display for scans

pub mod reporter;
