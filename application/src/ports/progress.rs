//! Progress notification port
//!
//! Defines the interface for reporting progress while a repository scan
//! evaluates its open votes.

use govbot_domain::VoteItem;

/// Callback for progress updates during a scan
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (progress bars, plain text, nothing).
pub trait ScanProgressNotifier: Send + Sync {
    /// Called once the open items have been listed
    fn on_scan_start(&self, total_items: usize);

    /// Called when one item's evaluation finishes
    fn on_item_complete(&self, item: &VoteItem, status: &str, success: bool);

    /// Called when every item has been evaluated
    fn on_scan_complete(&self);
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ScanProgressNotifier for NoProgress {
    fn on_scan_start(&self, _total_items: usize) {}
    fn on_item_complete(&self, _item: &VoteItem, _status: &str, _success: bool) {}
    fn on_scan_complete(&self) {}
}
